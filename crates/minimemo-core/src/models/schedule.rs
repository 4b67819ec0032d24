//! Schedule model

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::non_blank_owned;

/// A unique identifier for a schedule, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleId(Uuid);

impl ScheduleId {
    /// Create a new unique schedule ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScheduleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a schedule came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    /// Created by the user on this machine
    #[default]
    Local,
    /// Fetched from the calendar provider
    Remote {
        /// Identifier of the event in the external calendar
        remote_id: String,
    },
}

impl Origin {
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    #[must_use]
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Self::Local => None,
            Self::Remote { remote_id } => Some(remote_id),
        }
    }
}

/// A titled, optionally timed, optionally link-bearing calendar entry.
///
/// Two schedules are equal when they share an id, whatever their fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique identifier
    pub id: ScheduleId,
    pub title: String,
    /// Start time; `None` sorts after every dated schedule
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Meeting URL opened when `date` arrives
    #[serde(default)]
    pub meet_link: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub origin: Origin,
}

/// Fields supplied when the user creates a schedule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSchedule {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub meet_link: Option<String>,
    pub notes: Option<String>,
}

impl NewSchedule {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn at(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn with_meet_link(mut self, link: impl Into<String>) -> Self {
        self.meet_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Schedule {
    /// Build a user-created schedule with a fresh id
    #[must_use]
    pub fn local(new: NewSchedule) -> Self {
        Self {
            id: ScheduleId::new(),
            title: new.title,
            date: new.date,
            meet_link: non_blank_owned(new.meet_link),
            notes: non_blank_owned(new.notes),
            origin: Origin::Local,
        }
    }

    /// Build a schedule mirrored from the calendar provider
    #[must_use]
    pub fn remote(remote_id: impl Into<String>, new: NewSchedule) -> Self {
        Self {
            origin: Origin::Remote {
                remote_id: remote_id.into(),
            },
            ..Self::local(new)
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.origin.is_remote()
    }

    /// The meeting link, if one is set and not blank
    #[must_use]
    pub fn active_meet_link(&self) -> Option<&str> {
        self.meet_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }

    /// When a timer should fire for this schedule, evaluated at `now`.
    ///
    /// Returns `None` unless the schedule has a meeting link and a date
    /// strictly after `now`.
    #[must_use]
    pub fn timer_due_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.active_meet_link()?;
        self.date.filter(|date| *date > now)
    }

    /// Field-by-field comparison, unlike `==` which only looks at the id.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.date == other.date
            && self.meet_link == other.meet_link
            && self.notes == other.notes
            && self.origin == other.origin
    }
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schedule {}

impl Hash for Schedule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn local_normalizes_blank_optional_fields() {
        let schedule = Schedule::local(NewSchedule {
            title: "Standup".to_string(),
            date: None,
            meet_link: Some("   ".to_string()),
            notes: Some(String::new()),
        });
        assert_eq!(schedule.meet_link, None);
        assert_eq!(schedule.notes, None);
        assert_eq!(schedule.origin, Origin::Local);
    }

    #[test]
    fn remote_carries_remote_id() {
        let schedule = Schedule::remote("evt-1", NewSchedule::new("Demo"));
        assert!(schedule.is_remote());
        assert_eq!(schedule.origin.remote_id(), Some("evt-1"));
    }

    #[test]
    fn timer_due_requires_link_and_future_date() {
        let now = Utc::now();
        let future = now + Duration::hours(1);

        let armed = Schedule::local(
            NewSchedule::new("Standup")
                .at(future)
                .with_meet_link("https://meet.example.com/abc"),
        );
        assert_eq!(armed.timer_due_at(now), Some(future));

        let no_link = Schedule::local(NewSchedule::new("Notes only").at(future));
        assert_eq!(no_link.timer_due_at(now), None);

        let undated =
            Schedule::local(NewSchedule::new("Someday").with_meet_link("https://x/y"));
        assert_eq!(undated.timer_due_at(now), None);

        let past = Schedule::local(
            NewSchedule::new("Done")
                .at(now - Duration::minutes(1))
                .with_meet_link("https://x/y"),
        );
        assert_eq!(past.timer_due_at(now), None);
    }

    #[test]
    fn timer_due_treats_now_as_past() {
        let now = Utc::now();
        let schedule =
            Schedule::local(NewSchedule::new("Now").at(now).with_meet_link("https://x/y"));
        assert_eq!(schedule.timer_due_at(now), None);
    }

    #[test]
    fn blank_link_set_after_construction_is_inactive() {
        let mut schedule = Schedule::local(NewSchedule::new("Standup"));
        schedule.meet_link = Some("  ".to_string());
        assert_eq!(schedule.active_meet_link(), None);
    }

    #[test]
    fn equality_is_by_id() {
        let schedule = Schedule::local(NewSchedule::new("One"));
        let mut renamed = schedule.clone();
        renamed.title = "Two".to_string();
        assert_eq!(schedule, renamed);
    }

    #[test]
    fn origin_serializes_with_kind_tag() {
        let schedule = Schedule::remote("evt-9", NewSchedule::new("Sync"));
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["origin"]["kind"], "remote");
        assert_eq!(json["origin"]["remote_id"], "evt-9");

        let decoded: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.origin.remote_id(), Some("evt-9"));
    }
}
