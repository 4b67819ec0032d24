//! Calendar providers that feed remote schedules into the store.

mod demo;
mod feed;

use std::future::Future;

use thiserror::Error;

use crate::models::Schedule;

pub use demo::DemoCalendar;
pub use feed::{FeedCalendar, FeedSource};

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid calendar configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Calendar unavailable: {0}")]
    Unavailable(String),
    #[error("Calendar HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Calendar API error: {0}")]
    Api(String),
    #[error("Failed to read calendar feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid calendar payload: {0}")]
    InvalidPayload(String),
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Source of remote schedules.
///
/// Every returned schedule must carry a remote origin.
pub trait CalendarGateway: Send + Sync + 'static {
    fn fetch_schedules(&self) -> impl Future<Output = CalendarResult<Vec<Schedule>>> + Send;
}
