//! Pulling calendar events into the store.

use std::sync::{Arc, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::calendar::CalendarGateway;
use crate::error::{Error, Result};
use crate::merge::MergeReport;
use crate::persistence::PersistenceGateway;
use crate::state::{SyncState, SyncStatus};
use crate::store::Store;

/// Outcome of one successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub merge: MergeReport,
    pub pending_timers: usize,
    pub synced_at: DateTime<Utc>,
}

/// Runs calendar syncs against a shared store, one at a time.
pub struct SyncOrchestrator<P: PersistenceGateway, G: CalendarGateway> {
    store: Arc<Mutex<Store<P>>>,
    calendar: Arc<G>,
    in_flight: Mutex<()>,
    status: std::sync::Mutex<SyncStatus>,
}

impl<P: PersistenceGateway, G: CalendarGateway> SyncOrchestrator<P, G> {
    pub fn new(store: Arc<Mutex<Store<P>>>, calendar: Arc<G>) -> Self {
        Self {
            store,
            calendar,
            in_flight: Mutex::new(()),
            status: std::sync::Mutex::new(SyncStatus::default()),
        }
    }

    pub fn store(&self) -> &Arc<Mutex<Store<P>>> {
        &self.store
    }

    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch remote events and merge them into the store.
    ///
    /// Rejected with [`Error::SyncInProgress`] while another sync runs and with
    /// [`Error::AuthRequired`] when no calendar credential is stored. The store
    /// lock is not held while the fetch is awaited. A failed fetch leaves the
    /// store untouched.
    pub async fn sync(&self) -> Result<SyncReport> {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            tracing::debug!("Calendar sync already running");
            return Err(Error::SyncInProgress);
        };

        if !self.store.lock().await.is_authenticated() {
            self.update_status(|status| status.state = SyncState::NeedsAuth);
            return Err(Error::AuthRequired);
        }

        self.update_status(|status| {
            status.state = SyncState::Loading;
            status.last_error = None;
        });
        tracing::info!("Fetching calendar events");

        let fetched = match self.calendar.fetch_schedules().await {
            Ok(fetched) => fetched,
            Err(error) => {
                let message = error.to_string();
                tracing::warn!("Calendar fetch failed: {}", message);
                self.record_failure(&message);
                return Err(Error::RemoteFetch(message));
            }
        };

        let mut store = self.store.lock().await;
        let count = fetched.len();
        let merge = match store.apply_remote(fetched) {
            Ok(merge) => merge,
            Err(error) => {
                self.record_failure(&error.to_string());
                return Err(error);
            }
        };
        let report = SyncReport {
            fetched: count,
            merge,
            pending_timers: store.scheduler().pending_count(),
            synced_at: store.scheduler().now(),
        };
        drop(store);

        self.update_status(|status| {
            status.state = SyncState::Synced;
            status.last_synced_at = Some(report.synced_at);
        });
        tracing::info!(
            "Calendar sync complete: {} events, {} timers pending",
            report.fetched,
            report.pending_timers
        );
        Ok(report)
    }

    fn record_failure(&self, message: &str) {
        self.update_status(|status| {
            status.state = SyncState::Error;
            status.last_error = Some(message.to_string());
        });
    }

    fn update_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut status);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calendar::{CalendarError, CalendarResult, DemoCalendar};
    use crate::clock::Clock;
    use crate::models::{NewSchedule, Schedule};
    use crate::persistence::{KeyValuePersistence, MemoryBackend};
    use crate::scheduler::SchedulerConfig;
    use crate::testing::{ManualClock, RecordingActions};

    type MemoryStore = Store<KeyValuePersistence<MemoryBackend>>;

    struct StaticCalendar(Vec<Schedule>);

    impl CalendarGateway for StaticCalendar {
        async fn fetch_schedules(&self) -> CalendarResult<Vec<Schedule>> {
            Ok(self.0.clone())
        }
    }

    struct FailingCalendar;

    impl CalendarGateway for FailingCalendar {
        async fn fetch_schedules(&self) -> CalendarResult<Vec<Schedule>> {
            Err(CalendarError::Unavailable("provider offline".to_string()))
        }
    }

    fn open_store(clock: &Arc<ManualClock>) -> Arc<Mutex<MemoryStore>> {
        let config = SchedulerConfig::new(Arc::new(RecordingActions::default()))
            .with_clock(clock.clone());
        Arc::new(Mutex::new(Store::open(
            KeyValuePersistence::in_memory(),
            config,
        )))
    }

    fn titles(schedules: &[Schedule]) -> Vec<String> {
        schedules
            .iter()
            .map(|schedule| schedule.title.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn sync_replaces_stale_remote_and_keeps_local() {
        let clock = Arc::new(ManualClock::default());
        let now = clock.now();
        let store = open_store(&clock);
        {
            let mut store = store.lock().await;
            store.set_auth_token(Some("token")).unwrap();
            store
                .add_schedule(NewSchedule::new("Dentist").at(now + ChronoDuration::hours(3)))
                .unwrap();
            store
                .apply_remote(vec![Schedule::remote(
                    "stale",
                    NewSchedule::new("Stale")
                        .at(now + ChronoDuration::minutes(30))
                        .with_meet_link("https://x/stale"),
                )])
                .unwrap();
        }
        let calendar = StaticCalendar(vec![
            Schedule::remote(
                "evt-1",
                NewSchedule::new("Team")
                    .at(now + ChronoDuration::hours(1))
                    .with_meet_link("https://x/team"),
            ),
            Schedule::remote("evt-2", NewSchedule::new("Offsite")),
        ]);
        let orchestrator = SyncOrchestrator::new(store.clone(), Arc::new(calendar));

        let report = orchestrator.sync().await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.merge.kept_local, 1);
        assert_eq!(report.merge.dropped_remote, 1);
        assert_eq!(report.pending_timers, 1);

        let store = store.lock().await;
        assert_eq!(titles(&store.schedules()), vec!["Team", "Dentist", "Offsite"]);
        assert_eq!(store.persistence().load_schedules().len(), 3);

        let status = orchestrator.status();
        assert_eq!(status.state, SyncState::Synced);
        assert_eq!(status.last_synced_at, Some(now));
    }

    #[tokio::test(start_paused = true)]
    async fn sync_without_token_needs_auth() {
        let clock = Arc::new(ManualClock::default());
        let store = open_store(&clock);
        let orchestrator = SyncOrchestrator::new(store.clone(), Arc::new(DemoCalendar::new(clock)));

        assert!(matches!(orchestrator.sync().await, Err(Error::AuthRequired)));

        assert_eq!(orchestrator.status().state, SyncState::NeedsAuth);
        assert!(store.lock().await.schedules().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_leaves_store_untouched() {
        let clock = Arc::new(ManualClock::default());
        let store = open_store(&clock);
        let existing = {
            let mut store = store.lock().await;
            store.set_auth_token(Some("token")).unwrap();
            store
                .apply_remote(vec![Schedule::remote("evt-1", NewSchedule::new("Kept"))])
                .unwrap();
            store.schedules()
        };
        let orchestrator = SyncOrchestrator::new(store.clone(), Arc::new(FailingCalendar));

        let error = orchestrator.sync().await.unwrap_err();

        assert!(matches!(error, Error::RemoteFetch(ref message) if message.contains("offline")));
        assert_eq!(titles(&store.lock().await.schedules()), titles(&existing));
        let status = orchestrator.status();
        assert_eq!(status.state, SyncState::Error);
        assert!(status.error_message().unwrap().contains("provider offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_sync_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        let store = open_store(&clock);
        store.lock().await.set_auth_token(Some("token")).unwrap();
        let calendar = DemoCalendar::new(clock).with_latency(Duration::from_millis(1500));
        let orchestrator = Arc::new(SyncOrchestrator::new(store.clone(), Arc::new(calendar)));

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.sync().await }
        });
        tokio::task::yield_now().await;

        assert!(orchestrator.status().is_loading());
        assert!(matches!(orchestrator.sync().await, Err(Error::SyncInProgress)));

        let report = first.await.unwrap().unwrap();
        assert_eq!(report.fetched, 3);
        assert_eq!(store.lock().await.schedules().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn store_stays_usable_while_fetch_is_pending() {
        let clock = Arc::new(ManualClock::default());
        let store = open_store(&clock);
        store.lock().await.set_auth_token(Some("token")).unwrap();
        let calendar = DemoCalendar::new(clock).with_latency(Duration::from_secs(5));
        let orchestrator = Arc::new(SyncOrchestrator::new(store.clone(), Arc::new(calendar)));

        let sync = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.sync().await }
        });
        tokio::task::yield_now().await;

        store.lock().await.add_note("written during sync").unwrap();

        sync.await.unwrap().unwrap();
        let store = store.lock().await;
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.schedules().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn sync_after_failure_recovers() {
        let clock = Arc::new(ManualClock::default());
        let store = open_store(&clock);
        store.lock().await.set_auth_token(Some("token")).unwrap();

        let failing = SyncOrchestrator::new(store.clone(), Arc::new(FailingCalendar));
        assert!(failing.sync().await.is_err());

        let working = SyncOrchestrator::new(store.clone(), Arc::new(DemoCalendar::new(clock)));
        working.sync().await.unwrap();
        let status = working.status();
        assert_eq!(status.state, SyncState::Synced);
        assert_eq!(status.last_error, None);
    }
}
