//! JSON calendar feed read from a local file or an HTTP endpoint.
//!
//! The payload is either a bare list of events or an object with an `events`
//! list. Each event looks like:
//!
//! ```json
//! { "id": "evt-1", "title": "Standup", "start": "2026-01-05T10:00:00Z",
//!   "meet_link": "https://meet.example.com/abc", "notes": "daily" }
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{CalendarError, CalendarGateway, CalendarResult};
use crate::models::{NewSchedule, Schedule};
use crate::util::{excerpt, is_web_url, non_blank, non_blank_owned};

const UNTITLED_EVENT: &str = "Untitled event";

/// Where a feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    File(PathBuf),
    Http(String),
}

impl FeedSource {
    /// Interpret a configured location: http(s) URLs are fetched, anything
    /// else is a file path.
    pub fn parse(location: &str) -> CalendarResult<Self> {
        let location = non_blank(location).ok_or_else(|| {
            CalendarError::InvalidConfiguration("feed location must not be empty".to_string())
        })?;
        if is_web_url(&location) {
            Ok(Self::Http(location.trim_end_matches('/').to_string()))
        } else {
            Ok(Self::File(PathBuf::from(location)))
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}

#[derive(Clone)]
pub struct FeedCalendar {
    source: FeedSource,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for FeedCalendar {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FeedCalendar")
            .field("source", &self.source)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl FeedCalendar {
    pub fn new(location: &str) -> CalendarResult<Self> {
        Ok(Self {
            source: FeedSource::parse(location)?,
            token: None,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Bearer token sent with HTTP requests.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = non_blank_owned(token);
        self
    }

    pub const fn source(&self) -> &FeedSource {
        &self.source
    }

    async fn read_raw(&self) -> CalendarResult<String> {
        match &self.source {
            FeedSource::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            FeedSource::Http(url) => {
                let mut request = self.client.get(url).header("Accept", "application/json");
                if let Some(token) = &self.token {
                    request = request.bearer_auth(token);
                }
                let response = request.send().await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(CalendarError::Api(parse_api_error(status, &body)));
                }
                Ok(response.text().await?)
            }
        }
    }
}

impl CalendarGateway for FeedCalendar {
    async fn fetch_schedules(&self) -> CalendarResult<Vec<Schedule>> {
        let raw = self.read_raw().await?;
        let schedules = parse_feed(&raw)?;
        tracing::debug!("Read {} events from {}", schedules.len(), self.source);
        Ok(schedules)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    List(Vec<FeedEvent>),
    Wrapped { events: Vec<FeedEvent> },
}

#[derive(Debug, Deserialize)]
struct FeedEvent {
    #[serde(alias = "remote_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "date")]
    start: Option<DateTime<Utc>>,
    #[serde(default, alias = "meetLink")]
    meet_link: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<FeedEvent> for Schedule {
    type Error = CalendarError;

    fn try_from(event: FeedEvent) -> CalendarResult<Self> {
        let remote_id = non_blank(&event.id).ok_or_else(|| {
            CalendarError::InvalidPayload("event is missing an id".to_string())
        })?;
        let title =
            non_blank_owned(event.title).unwrap_or_else(|| UNTITLED_EVENT.to_string());

        let mut new = NewSchedule::new(title);
        new.date = event.start;
        new.meet_link = event.meet_link;
        new.notes = event.notes;
        Ok(Self::remote(remote_id, new))
    }
}

fn parse_feed(raw: &str) -> CalendarResult<Vec<Schedule>> {
    let payload: FeedPayload = serde_json::from_str(raw).map_err(|error| {
        CalendarError::InvalidPayload(format!("{error}: {}", excerpt(raw)))
    })?;
    let events = match payload {
        FeedPayload::List(events) | FeedPayload::Wrapped { events } => events,
    };
    events.into_iter().map(Schedule::try_from).collect()
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
