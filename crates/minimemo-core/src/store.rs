//! In-memory notes and schedules with write-through persistence.
//!
//! Every mutating call applies the change, restores the ordering, keeps the
//! schedule's timer in step, and writes the whole affected collection through
//! the [`PersistenceGateway`] before returning.
//!
//! Ordering:
//! - schedules ascend by start time, undated entries last, ties in insertion
//!   order;
//! - notes descend by `modified_at`, so new and freshly edited notes come
//!   first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::merge::{merge, MergeReport};
use crate::models::{NewSchedule, Note, NoteId, Schedule, ScheduleId};
use crate::persistence::PersistenceGateway;
use crate::scheduler::{PendingTimer, ScheduleBook, SchedulerConfig, TimerScheduler};
use crate::util::non_blank_owned;

/// Sort schedules by start time, undated last. Stable.
pub fn sort_schedules(schedules: &mut [Schedule]) {
    schedules.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Sort notes most recently modified first. Stable.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
}

/// Authoritative owner of notes, schedules, and their timers.
pub struct Store<P: PersistenceGateway> {
    persistence: P,
    notes: Vec<Note>,
    book: ScheduleBook,
    scheduler: TimerScheduler,
}

impl<P: PersistenceGateway> Store<P> {
    /// Load persisted data and arm timers for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(persistence: P, config: SchedulerConfig) -> Self {
        let book = ScheduleBook::new();
        let scheduler = TimerScheduler::new(book.clone(), config);
        let mut store = Self {
            persistence,
            notes: Vec::new(),
            book,
            scheduler,
        };
        store.load();
        store
    }

    /// Replace in-memory state with what the gateway holds and rebuild timers.
    pub fn load(&mut self) {
        let mut notes = self.persistence.load_notes();
        sort_notes(&mut notes);
        self.notes = notes;

        let mut schedules = self.persistence.load_schedules();
        sort_schedules(&mut schedules);
        *self.book.write() = schedules;

        let armed = self.scheduler.reschedule_all(&self.book.snapshot());
        tracing::info!(
            "Loaded {} notes and {} schedules ({} timers armed)",
            self.notes.len(),
            self.book.len(),
            armed
        );
    }

    /// Pick up data another handle wrote through the same gateway.
    ///
    /// Notes are always replaced. Timers are rebuilt only when the persisted
    /// schedule list differs from the one in memory. Returns whether it did.
    pub fn reload(&mut self) -> bool {
        let mut notes = self.persistence.load_notes();
        sort_notes(&mut notes);
        self.notes = notes;

        let mut schedules = self.persistence.load_schedules();
        sort_schedules(&mut schedules);
        let unchanged = {
            let current = self.book.read();
            current.len() == schedules.len()
                && current
                    .iter()
                    .zip(&schedules)
                    .all(|(ours, theirs)| ours.same_content(theirs))
        };
        if unchanged {
            return false;
        }

        *self.book.write() = schedules;
        let armed = self.scheduler.reschedule_all(&self.book.snapshot());
        tracing::info!(
            "Reloaded {} changed schedules ({} timers armed)",
            self.book.len(),
            armed
        );
        true
    }

    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    pub const fn scheduler(&self) -> &TimerScheduler {
        &self.scheduler
    }

    fn now(&self) -> DateTime<Utc> {
        self.scheduler.now()
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }

    pub fn add_note(&mut self, content: impl Into<String>) -> Result<Note> {
        let note = Note::new_at(content, self.now());
        self.notes.insert(0, note.clone());
        sort_notes(&mut self.notes);
        self.persistence.save_notes(&self.notes)?;
        tracing::debug!("Added note {}", note.id);
        Ok(note)
    }

    /// Replace a note's content. Returns `None` when the id is unknown.
    pub fn update_note(&mut self, id: &NoteId, content: impl Into<String>) -> Result<Option<Note>> {
        let now = self.now();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == *id) else {
            return Ok(None);
        };
        note.set_content(content, now);
        let updated = note.clone();

        sort_notes(&mut self.notes);
        self.persistence.save_notes(&self.notes)?;
        Ok(Some(updated))
    }

    /// Remove a note. Returns whether it existed.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool> {
        let Some(index) = self.notes.iter().position(|note| note.id == *id) else {
            return Ok(false);
        };
        self.notes.remove(index);
        self.persistence.save_notes(&self.notes)?;
        Ok(true)
    }

    pub fn reset_notes(&mut self) -> Result<()> {
        self.notes.clear();
        self.persistence.save_notes(&self.notes)
    }

    // ------------------------------------------------------------------
    // Schedules
    // ------------------------------------------------------------------

    /// Schedules in display order.
    pub fn schedules(&self) -> Vec<Schedule> {
        self.book.snapshot()
    }

    pub fn schedule(&self, id: &ScheduleId) -> Option<Schedule> {
        self.book.get(id)
    }

    pub fn add_schedule(&mut self, new: NewSchedule) -> Result<Schedule> {
        let schedule = Schedule::local(new);
        {
            let mut schedules = self.book.write();
            schedules.push(schedule.clone());
            sort_schedules(&mut schedules);
        }
        self.scheduler.schedule_for(&schedule);
        self.persist_schedules()?;
        tracing::debug!("Added schedule '{}' ({})", schedule.title, schedule.id);
        Ok(schedule)
    }

    /// Overwrite a schedule's editable fields and re-arm its timer.
    ///
    /// The stored origin is kept: editing a fetched entry does not make it
    /// local. Returns `None` when the id is unknown.
    pub fn update_schedule(&mut self, schedule: Schedule) -> Result<Option<Schedule>> {
        let updated = {
            let mut schedules = self.book.write();
            let Some(existing) = schedules.iter_mut().find(|item| item.id == schedule.id) else {
                return Ok(None);
            };
            let origin = existing.origin.clone();
            *existing = Schedule {
                meet_link: non_blank_owned(schedule.meet_link),
                notes: non_blank_owned(schedule.notes),
                origin,
                ..schedule
            };
            let updated = existing.clone();
            sort_schedules(&mut schedules);
            updated
        };

        self.scheduler.cancel(&updated.id);
        self.scheduler.schedule_for(&updated);
        self.persist_schedules()?;
        Ok(Some(updated))
    }

    /// Remove a schedule and its timer. Returns whether it existed.
    pub fn delete_schedule(&mut self, id: &ScheduleId) -> Result<bool> {
        {
            let mut schedules = self.book.write();
            let Some(index) = schedules.iter().position(|schedule| schedule.id == *id) else {
                return Ok(false);
            };
            self.scheduler.cancel(id);
            schedules.remove(index);
        }
        self.persist_schedules()?;
        Ok(true)
    }

    pub fn reset_schedules(&mut self) -> Result<()> {
        self.scheduler.cancel_all();
        self.book.write().clear();
        self.persist_schedules()
    }

    /// Cancel all timers and wipe notes and schedules, in memory and on disk.
    ///
    /// The calendar credential is left in place.
    pub fn reset_all(&mut self) -> Result<()> {
        tracing::info!("Resetting all notes and schedules");
        self.scheduler.cancel_all();
        self.notes.clear();
        self.book.write().clear();
        self.persistence.clear()
    }

    /// Fold a freshly fetched remote batch into the schedule list.
    pub fn apply_remote(&mut self, incoming: Vec<Schedule>) -> Result<MergeReport> {
        let report = {
            let mut schedules = self.book.write();
            let current = std::mem::take(&mut *schedules);
            let (mut merged, report) = merge(current, incoming);
            sort_schedules(&mut merged);
            *schedules = merged;
            report
        };

        self.scheduler.reschedule_all(&self.book.snapshot());
        self.persist_schedules()?;
        tracing::info!(
            "Merged calendar events: {} local kept, {} remote dropped, {} remote added",
            report.kept_local,
            report.dropped_remote,
            report.added_remote
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Calendar credential
    // ------------------------------------------------------------------

    pub fn auth_token(&self) -> Option<String> {
        self.persistence.load_auth_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    pub fn set_auth_token(&mut self, token: Option<&str>) -> Result<()> {
        self.persistence.save_auth_token(token)
    }

    /// Forget the calendar credential and every fetched schedule.
    ///
    /// Returns the number of schedules removed.
    pub fn disconnect_remote(&mut self) -> Result<usize> {
        self.persistence.save_auth_token(None)?;

        let removed = {
            let mut schedules = self.book.write();
            let before = schedules.len();
            schedules.retain(|schedule| {
                if schedule.is_remote() {
                    self.scheduler.cancel(&schedule.id);
                    false
                } else {
                    true
                }
            });
            before - schedules.len()
        };

        self.persist_schedules()?;
        tracing::info!("Disconnected calendar; removed {} fetched schedules", removed);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending()
    }

    /// Rebuild every timer from the current schedule list.
    pub fn reschedule_all(&self) -> usize {
        self.scheduler.reschedule_all(&self.book.snapshot())
    }

    /// Stop all timers for good. Call once at teardown.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    fn persist_schedules(&self) -> Result<()> {
        let schedules = self.book.read();
        self.persistence.save_schedules(&schedules)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::Clock;
    use crate::persistence::{
        FileBackend, KeyValueBackend, KeyValuePersistence, MemoryBackend, SCHEDULES_KEY,
    };
    use crate::testing::{ManualClock, RecordingActions};

    type MemoryStore = Store<KeyValuePersistence<MemoryBackend>>;

    struct Harness {
        store: MemoryStore,
        clock: Arc<ManualClock>,
        actions: Arc<RecordingActions>,
    }

    fn config(clock: &Arc<ManualClock>, actions: &Arc<RecordingActions>) -> SchedulerConfig {
        SchedulerConfig::new(actions.clone()).with_clock(clock.clone())
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::default());
        let actions = Arc::new(RecordingActions::default());
        let store = Store::open(KeyValuePersistence::in_memory(), config(&clock, &actions));
        Harness {
            store,
            clock,
            actions,
        }
    }

    impl Harness {
        fn in_minutes(&self, minutes: i64) -> DateTime<Utc> {
            self.clock.now() + ChronoDuration::minutes(minutes)
        }
    }

    fn assert_schedules_sorted(schedules: &[Schedule]) {
        let mut seen_undated = false;
        let mut last = None;
        for schedule in schedules {
            match schedule.date {
                Some(date) => {
                    assert!(!seen_undated, "dated schedule after an undated one");
                    if let Some(previous) = last {
                        assert!(previous <= date, "schedules out of order");
                    }
                    last = Some(date);
                }
                None => seen_undated = true,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn add_meeting_arms_one_timer() {
        let mut h = harness();
        let standup = h
            .store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(60))
                    .with_meet_link("https://x/y"),
            )
            .unwrap();

        let pending = h.store.pending_timers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].schedule_id, standup.id);
        assert_eq!(pending[0].delay, Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn add_without_link_arms_nothing() {
        let mut h = harness();
        h.store
            .add_schedule(NewSchedule::new("Notes only").at(h.in_minutes(60)))
            .unwrap();

        assert!(h.store.pending_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn add_schedule_persists_before_returning() {
        let mut h = harness();
        let added = h.store.add_schedule(NewSchedule::new("Dentist")).unwrap();

        let persisted = h.store.persistence().load_schedules();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, added.id);
    }

    #[tokio::test(start_paused = true)]
    async fn schedules_stay_sorted_with_undated_last() {
        let mut h = harness();
        h.store.add_schedule(NewSchedule::new("undated-1")).unwrap();
        h.store
            .add_schedule(NewSchedule::new("later").at(h.in_minutes(120)))
            .unwrap();
        h.store.add_schedule(NewSchedule::new("undated-2")).unwrap();
        let sooner = h
            .store
            .add_schedule(NewSchedule::new("sooner").at(h.in_minutes(30)))
            .unwrap();

        let titles = h
            .store
            .schedules()
            .iter()
            .map(|schedule| schedule.title.clone())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["sooner", "later", "undated-1", "undated-2"]);

        let mut moved = sooner;
        moved.date = None;
        h.store.update_schedule(moved).unwrap();
        assert_schedules_sorted(&h.store.schedules());
        assert_eq!(h.store.schedules()[0].title, "later");
    }

    #[tokio::test(start_paused = true)]
    async fn equal_dates_keep_insertion_order() {
        let mut h = harness();
        let at = h.in_minutes(45);
        for title in ["a", "b", "c"] {
            h.store.add_schedule(NewSchedule::new(title).at(at)).unwrap();
        }

        let titles = h
            .store
            .schedules()
            .iter()
            .map(|schedule| schedule.title.clone())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn moving_date_into_past_cancels_timer() {
        let mut h = harness();
        let mut standup = h
            .store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(60))
                    .with_meet_link("https://x/y"),
            )
            .unwrap();

        standup.date = Some(h.in_minutes(-60));
        h.store.update_schedule(standup.clone()).unwrap();

        assert!(!h.store.scheduler().is_pending(&standup.id));
    }

    #[tokio::test(start_paused = true)]
    async fn moving_date_into_future_arms_timer() {
        let mut h = harness();
        let mut standup = h
            .store
            .add_schedule(NewSchedule::new("Standup").with_meet_link("https://x/y"))
            .unwrap();
        assert!(h.store.pending_timers().is_empty());

        standup.date = Some(h.in_minutes(15));
        h.store.update_schedule(standup.clone()).unwrap();

        let pending = h.store.pending_timers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].schedule_id, standup.id);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_link_cancels_timer() {
        let mut h = harness();
        let mut standup = h
            .store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(60))
                    .with_meet_link("https://x/y"),
            )
            .unwrap();

        standup.meet_link = Some(" ".to_string());
        let updated = h.store.update_schedule(standup).unwrap().unwrap();

        assert_eq!(updated.meet_link, None);
        assert!(h.store.pending_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn update_keeps_stored_origin() {
        let mut h = harness();
        h.store
            .apply_remote(vec![Schedule::remote("evt-1", NewSchedule::new("Sync"))])
            .unwrap();
        let mut remote = h.store.schedules()[0].clone();

        remote.title = "Renamed".to_string();
        remote.origin = crate::models::Origin::Local;
        let updated = h.store.update_schedule(remote).unwrap().unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.origin.remote_id(), Some("evt-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn update_unknown_schedule_is_noop() {
        let mut h = harness();
        let stranger = Schedule::local(NewSchedule::new("stranger"));

        assert!(h.store.update_schedule(stranger).unwrap().is_none());
        assert!(h.store.schedules().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_cancels_timer_and_never_fires() {
        let mut h = harness();
        let standup = h
            .store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(10))
                    .with_meet_link("https://x/standup"),
            )
            .unwrap();
        h.store
            .add_schedule(
                NewSchedule::new("Review")
                    .at(h.in_minutes(20))
                    .with_meet_link("https://x/review"),
            )
            .unwrap();
        assert_eq!(h.store.pending_timers().len(), 2);

        assert!(h.store.delete_schedule(&standup.id).unwrap());
        assert_eq!(h.store.pending_timers().len(), 1);

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        tokio::task::yield_now().await;

        assert_eq!(h.actions.opened(), vec!["https://x/review"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_unknown_schedule_is_noop() {
        let mut h = harness();
        assert!(!h.store.delete_schedule(&ScheduleId::new()).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_schedules_cancels_everything() {
        let mut h = harness();
        h.store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(10))
                    .with_meet_link("https://x/y"),
            )
            .unwrap();

        h.store.reset_schedules().unwrap();

        assert!(h.store.schedules().is_empty());
        assert!(h.store.pending_timers().is_empty());
        assert!(h.store.persistence().load_schedules().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_persisted_schedules_start_empty() {
        let clock = Arc::new(ManualClock::default());
        let actions = Arc::new(RecordingActions::default());
        let backend = MemoryBackend::new();
        backend.set(SCHEDULES_KEY, "this is not json").unwrap();

        let store = Store::open(KeyValuePersistence::new(backend), config(&clock, &actions));

        assert!(store.schedules().is_empty());
        assert!(store.pending_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_rearms_future_and_skips_missed() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let actions = Arc::new(RecordingActions::default());

        let mut first = Store::open(
            KeyValuePersistence::new(FileBackend::open(dir.path()).unwrap()),
            config(&clock, &actions),
        );
        let soon = first
            .add_schedule(
                NewSchedule::new("Soon")
                    .at(clock.now() + ChronoDuration::hours(1))
                    .with_meet_link("https://x/soon"),
            )
            .unwrap();
        let later = first
            .add_schedule(
                NewSchedule::new("Later")
                    .at(clock.now() + ChronoDuration::hours(3))
                    .with_meet_link("https://x/later"),
            )
            .unwrap();
        first.shutdown();
        drop(first);

        clock.advance(ChronoDuration::hours(2));
        let second = Store::open(
            KeyValuePersistence::new(FileBackend::open(dir.path()).unwrap()),
            config(&clock, &actions),
        );

        assert_eq!(second.schedules().len(), 2);
        assert!(!second.scheduler().is_pending(&soon.id));
        let pending = second.pending_timers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].schedule_id, later.id);
        assert_eq!(pending[0].delay, Duration::from_secs(3600));
        assert!(actions.opened().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reload_follows_edits_from_another_handle() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let watcher_actions = Arc::new(RecordingActions::default());
        let open = |actions: &Arc<RecordingActions>| {
            Store::open(
                KeyValuePersistence::new(FileBackend::open(dir.path()).unwrap()),
                config(&clock, actions),
            )
        };

        let mut editor = open(&Arc::new(RecordingActions::default()));
        let doomed = editor
            .add_schedule(
                NewSchedule::new("Cancelled sync")
                    .at(clock.now() + ChronoDuration::minutes(30))
                    .with_meet_link("https://x/doomed"),
            )
            .unwrap();
        editor.shutdown();

        let mut watcher = open(&watcher_actions);
        assert!(watcher.scheduler().is_pending(&doomed.id));
        assert!(!watcher.reload());

        let mut editor = open(&Arc::new(RecordingActions::default()));
        assert!(editor.delete_schedule(&doomed.id).unwrap());
        let added = editor
            .add_schedule(
                NewSchedule::new("Planning")
                    .at(clock.now() + ChronoDuration::minutes(45))
                    .with_meet_link("https://x/planning"),
            )
            .unwrap();
        editor.add_note("from the other shell").unwrap();
        editor.shutdown();

        assert!(watcher.reload());
        let pending = watcher
            .pending_timers()
            .into_iter()
            .map(|timer| timer.schedule_id)
            .collect::<Vec<_>>();
        assert_eq!(pending, vec![added.id]);
        assert_eq!(watcher.notes().len(), 1);

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(watcher_actions.opened(), vec!["https://x/planning"]);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_rearms_edited_schedule() {
        let mut h = harness();
        let review = h
            .store
            .add_schedule(
                NewSchedule::new("Review")
                    .at(h.in_minutes(30))
                    .with_meet_link("https://x/review"),
            )
            .unwrap();

        let mut edited = h.store.persistence().load_schedules();
        edited[0].date = Some(h.in_minutes(90));
        h.store.persistence().save_schedules(&edited).unwrap();

        assert!(h.store.reload());
        let pending = h.store.pending_timers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].schedule_id, review.id);
        assert_eq!(pending[0].delay, Duration::from_secs(90 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn notes_are_most_recently_modified_first() {
        let mut h = harness();
        let first = h.store.add_note("first").unwrap();
        h.clock.advance(ChronoDuration::minutes(1));
        h.store.add_note("second").unwrap();
        h.clock.advance(ChronoDuration::minutes(1));

        let contents = |store: &MemoryStore| {
            store
                .notes()
                .iter()
                .map(|note| note.content.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(contents(&h.store), vec!["second", "first"]);

        let updated = h.store.update_note(&first.id, "first, edited").unwrap().unwrap();
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.modified_at > first.modified_at);
        assert_eq!(contents(&h.store), vec!["first, edited", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn notes_added_in_same_instant_put_newest_first() {
        let mut h = harness();
        h.store.add_note("one").unwrap();
        h.store.add_note("two").unwrap();

        assert_eq!(h.store.notes()[0].content, "two");
    }

    #[tokio::test(start_paused = true)]
    async fn note_mutations_write_through() {
        let mut h = harness();
        let note = h.store.add_note("keep me").unwrap();
        assert_eq!(h.store.persistence().load_notes().len(), 1);

        assert!(h.store.update_note(&NoteId::new(), "nobody").unwrap().is_none());
        assert!(!h.store.delete_note(&NoteId::new()).unwrap());

        assert!(h.store.delete_note(&note.id).unwrap());
        assert!(h.store.persistence().load_notes().is_empty());

        h.store.add_note("again").unwrap();
        h.store.reset_notes().unwrap();
        assert!(h.store.notes().is_empty());
        assert!(h.store.persistence().load_notes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn apply_remote_replaces_stale_remote_entries() {
        let mut h = harness();
        let local = h
            .store
            .add_schedule(NewSchedule::new("Local").at(h.in_minutes(5)))
            .unwrap();
        h.store
            .apply_remote(vec![Schedule::remote(
                "stale",
                NewSchedule::new("Stale")
                    .at(h.in_minutes(10))
                    .with_meet_link("https://x/stale"),
            )])
            .unwrap();
        assert_eq!(h.store.pending_timers().len(), 1);

        let report = h
            .store
            .apply_remote(vec![
                Schedule::remote(
                    "evt-2",
                    NewSchedule::new("Demo")
                        .at(h.in_minutes(90))
                        .with_meet_link("https://x/demo"),
                ),
                Schedule::remote(
                    "evt-1",
                    NewSchedule::new("Team")
                        .at(h.in_minutes(60))
                        .with_meet_link("https://x/team"),
                ),
            ])
            .unwrap();

        assert_eq!(report.dropped_remote, 1);
        let titles = h
            .store
            .schedules()
            .iter()
            .map(|schedule| schedule.title.clone())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Local", "Team", "Demo"]);
        assert_eq!(h.store.schedule(&local.id).unwrap().title, "Local");
        assert_eq!(h.store.pending_timers().len(), 2);
        assert_eq!(h.store.persistence().load_schedules().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_drops_remote_schedules_and_token() {
        let mut h = harness();
        h.store.set_auth_token(Some("token")).unwrap();
        h.store.add_schedule(NewSchedule::new("Mine")).unwrap();
        h.store
            .apply_remote(vec![Schedule::remote(
                "evt-1",
                NewSchedule::new("Theirs")
                    .at(h.in_minutes(30))
                    .with_meet_link("https://x/theirs"),
            )])
            .unwrap();

        assert_eq!(h.store.disconnect_remote().unwrap(), 1);

        assert!(!h.store.is_authenticated());
        assert_eq!(h.store.schedules().len(), 1);
        assert_eq!(h.store.schedules()[0].title, "Mine");
        assert!(h.store.pending_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_all_clears_data_but_keeps_token() {
        let mut h = harness();
        h.store.set_auth_token(Some("token")).unwrap();
        h.store.add_note("note").unwrap();
        h.store
            .add_schedule(
                NewSchedule::new("Standup")
                    .at(h.in_minutes(10))
                    .with_meet_link("https://x/y"),
            )
            .unwrap();

        h.store.reset_all().unwrap();

        assert!(h.store.notes().is_empty());
        assert!(h.store.schedules().is_empty());
        assert!(h.store.pending_timers().is_empty());
        assert!(h.store.persistence().load_schedules().is_empty());
        assert!(h.store.is_authenticated());
    }
}
