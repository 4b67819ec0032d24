//! Picks the calendar provider from configuration.

use minimemo_core::calendar::{CalendarGateway, CalendarResult, DemoCalendar, FeedCalendar};
use minimemo_core::Schedule;

use crate::config::CliConfig;
use crate::error::CliError;

pub enum CliCalendar {
    Demo(DemoCalendar),
    Feed(FeedCalendar),
}

impl CliCalendar {
    /// Use the configured feed, or the demo calendar when none is set.
    ///
    /// A feed's bearer token comes from config first, then from the token
    /// stored by `auth login`.
    pub fn from_config(config: &CliConfig, stored_token: Option<String>) -> Result<Self, CliError> {
        match config.calendar_feed.as_deref() {
            Some(location) => {
                let token = config.calendar_token.clone().or(stored_token);
                Ok(Self::Feed(FeedCalendar::new(location)?.with_token(token)))
            }
            None => Ok(Self::Demo(DemoCalendar::default())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Demo(_) => "demo calendar".to_string(),
            Self::Feed(feed) => format!("feed {}", feed.source()),
        }
    }
}

impl CalendarGateway for CliCalendar {
    async fn fetch_schedules(&self) -> CalendarResult<Vec<Schedule>> {
        match self {
            Self::Demo(calendar) => calendar.fetch_schedules().await,
            Self::Feed(calendar) => calendar.fetch_schedules().await,
        }
    }
}
