//! One-shot meeting-link timers, at most one per schedule.
//!
//! A schedule with an active meeting link and a start time strictly in the
//! future gets a tokio task that sleeps until the start time, then opens the
//! link. Every armed task is recorded in a timer table keyed by schedule id
//! together with a generation token. Firing and cancelling both go through
//! that table under one lock: a firing task must still find its own token
//! there to claim the entry, so a cancel (or re-arm) that wins the race
//! silently disarms it, and a fire that wins makes the later cancel a no-op.
//!
//! The firing task only carries the schedule id. It reads the schedule's
//! current state from the [`ScheduleBook`] at fire time.
//!
//! The scheduler keeps no memory across restarts. Callers rebuild it with
//! [`TimerScheduler::reschedule_all`] after loading; anything whose start time
//! passed while the process was down never fires.

mod book;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::actions::{ActionSink, LogActions};
use crate::clock::{Clock, SystemClock};
use crate::models::{Schedule, ScheduleId};

pub use book::ScheduleBook;

/// How fired timers reach the outside world.
#[derive(Clone)]
pub struct SchedulerConfig {
    actions: Arc<dyn ActionSink>,
    clock: Arc<dyn Clock>,
    notify_on_fire: bool,
}

impl SchedulerConfig {
    pub fn new(actions: Arc<dyn ActionSink>) -> Self {
        Self {
            actions,
            clock: Arc::new(SystemClock),
            notify_on_fire: true,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn notify_on_fire(mut self, enabled: bool) -> Self {
        self.notify_on_fire = enabled;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(Arc::new(LogActions))
    }
}

impl std::fmt::Debug for SchedulerConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SchedulerConfig")
            .field("notify_on_fire", &self.notify_on_fire)
            .finish_non_exhaustive()
    }
}

/// Snapshot of one armed timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub schedule_id: ScheduleId,
    pub due_at: DateTime<Utc>,
    /// Delay the timer was armed with
    pub delay: Duration,
}

struct ArmedTimer {
    token: u64,
    due_at: DateTime<Utc>,
    delay: Duration,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerTable {
    next_token: u64,
    armed: HashMap<ScheduleId, ArmedTimer>,
    shut_down: bool,
}

impl TimerTable {
    fn cancel(&mut self, id: &ScheduleId) -> bool {
        match self.armed.remove(id) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    fn cancel_all(&mut self) -> usize {
        let count = self.armed.len();
        for (_, timer) in self.armed.drain() {
            timer.handle.abort();
        }
        count
    }
}

struct Shared {
    table: Mutex<TimerTable>,
    book: ScheduleBook,
    config: SchedulerConfig,
}

impl Shared {
    fn table(&self) -> MutexGuard<'_, TimerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take ownership of the firing transition for `id`, if `token` still
    /// names the armed timer.
    fn claim(&self, id: &ScheduleId, token: u64) -> bool {
        let mut table = self.table();
        if table.armed.get(id).is_some_and(|timer| timer.token == token) {
            table.armed.remove(id);
            true
        } else {
            false
        }
    }

    fn fire(&self, id: &ScheduleId) {
        let Some(schedule) = self.book.get(id) else {
            tracing::debug!("Schedule {} was removed before its timer fired", id);
            return;
        };
        let Some(link) = schedule.active_meet_link() else {
            tracing::debug!("Schedule {} no longer has a meeting link", id);
            return;
        };

        tracing::info!("Time for '{}': opening {}", schedule.title, link);
        self.config.actions.open_url(link);
        if self.config.notify_on_fire {
            self.config
                .actions
                .notify(&format!("Starting now: {}", schedule.title), link);
        }
    }
}

/// Owner of every pending meeting-link timer.
///
/// Must be used from within a Tokio runtime: arming spawns a task.
pub struct TimerScheduler {
    shared: Arc<Shared>,
}

impl TimerScheduler {
    pub fn new(book: ScheduleBook, config: SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(TimerTable::default()),
                book,
                config,
            }),
        }
    }

    /// Current wall-clock time as seen by the scheduler.
    pub fn now(&self) -> DateTime<Utc> {
        self.shared.config.clock.now()
    }

    /// (Re)arm the timer for one schedule.
    ///
    /// Any existing timer for the id is cancelled first. Returns whether a new
    /// timer was armed.
    pub fn schedule_for(&self, schedule: &Schedule) -> bool {
        let now = self.now();
        let mut table = self.shared.table();
        self.arm(&mut table, schedule, now)
    }

    /// Cancel the pending timer for `id`. Returns whether one existed.
    pub fn cancel(&self, id: &ScheduleId) -> bool {
        let cancelled = self.shared.table().cancel(id);
        if cancelled {
            tracing::debug!("Cancelled meeting-link timer for {}", id);
        }
        cancelled
    }

    /// Cancel every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let count = self.shared.table().cancel_all();
        tracing::debug!("Cancelled {} meeting-link timers", count);
        count
    }

    /// Drop all timers and rebuild them from `schedules`.
    ///
    /// Returns the number of timers armed.
    pub fn reschedule_all(&self, schedules: &[Schedule]) -> usize {
        let now = self.now();
        let mut table = self.shared.table();
        let cancelled = table.cancel_all();
        let armed = schedules
            .iter()
            .filter(|schedule| self.arm(&mut table, schedule, now))
            .count();
        tracing::info!(
            "Rescheduled meeting-link timers: {} cancelled, {} armed",
            cancelled,
            armed
        );
        armed
    }

    /// Cancel everything and refuse to arm new timers from now on.
    pub fn shutdown(&self) {
        let mut table = self.shared.table();
        table.shut_down = true;
        let cancelled = table.cancel_all();
        tracing::info!("Timer scheduler shut down ({} timers cancelled)", cancelled);
    }

    /// Armed timers ordered by due time.
    pub fn pending(&self) -> Vec<PendingTimer> {
        let table = self.shared.table();
        let mut pending = table
            .armed
            .iter()
            .map(|(id, timer)| PendingTimer {
                schedule_id: *id,
                due_at: timer.due_at,
                delay: timer.delay,
            })
            .collect::<Vec<_>>();
        pending.sort_by(|a, b| {
            a.due_at
                .cmp(&b.due_at)
                .then_with(|| a.schedule_id.cmp(&b.schedule_id))
        });
        pending
    }

    pub fn pending_count(&self) -> usize {
        self.shared.table().armed.len()
    }

    pub fn is_pending(&self, id: &ScheduleId) -> bool {
        self.shared.table().armed.contains_key(id)
    }

    fn arm(&self, table: &mut TimerTable, schedule: &Schedule, now: DateTime<Utc>) -> bool {
        table.cancel(&schedule.id);

        if table.shut_down {
            tracing::debug!("Scheduler is shut down; not arming {}", schedule.id);
            return false;
        }
        let Some(due_at) = schedule.timer_due_at(now) else {
            return false;
        };
        let Ok(delay) = (due_at - now).to_std() else {
            return false;
        };

        table.next_token = table.next_token.wrapping_add(1);
        let token = table.next_token;
        let id = schedule.id;
        let shared = Arc::downgrade(&self.shared);
        let handle = tokio::spawn(run_timer(shared, id, token, delay));

        tracing::info!(
            "Armed meeting-link timer for '{}' ({}) in {}s",
            schedule.title,
            id,
            delay.as_secs()
        );
        table.armed.insert(
            id,
            ArmedTimer {
                token,
                due_at,
                delay,
                handle,
            },
        );
        true
    }
}

async fn run_timer(shared: Weak<Shared>, id: ScheduleId, token: u64, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(shared) = shared.upgrade() else {
        return;
    };
    if shared.claim(&id, token) {
        shared.fire(&id);
    }
}
