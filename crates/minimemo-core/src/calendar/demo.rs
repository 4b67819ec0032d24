//! Built-in sample calendar, used when no feed is configured.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveTime};

use super::{CalendarGateway, CalendarResult};
use crate::clock::{Clock, SystemClock};
use crate::models::{NewSchedule, Schedule};

/// Three sample events positioned relative to the current time:
/// a team meeting in one hour, a client demo tomorrow (both with links), and
/// an all-day entry at today's midnight (UTC) without a link.
pub struct DemoCalendar {
    clock: Arc<dyn Clock>,
    latency: Duration,
}

impl DemoCalendar {
    /// Token handed out by `auth login` when no real credential is given.
    pub const DEMO_TOKEN: &'static str = "demo-access-token";

    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            latency: Duration::ZERO,
        }
    }

    /// Simulated network delay before events are returned.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn events(&self) -> Vec<Schedule> {
        let now = self.clock.now();
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        vec![
            Schedule::remote(
                "demo-team-meeting",
                NewSchedule::new("Team meeting")
                    .at(now + ChronoDuration::hours(1))
                    .with_meet_link("https://meet.google.com/demo-abc-def"),
            ),
            Schedule::remote(
                "demo-client-demo",
                NewSchedule::new("Client demo")
                    .at(now + ChronoDuration::days(1))
                    .with_meet_link("https://meet.google.com/demo-xyz-uvw"),
            ),
            Schedule::remote(
                "demo-all-day",
                NewSchedule::new("All-day event").at(midnight),
            ),
        ]
    }
}

impl Default for DemoCalendar {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl CalendarGateway for DemoCalendar {
    async fn fetch_schedules(&self) -> CalendarResult<Vec<Schedule>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let events = self.events();
        tracing::debug!("Demo calendar returned {} events", events.len());
        Ok(events)
    }
}
