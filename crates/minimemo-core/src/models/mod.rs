//! Data models for minimemo

mod note;
mod schedule;

pub use note::{Note, NoteId};
pub use schedule::{NewSchedule, Origin, Schedule, ScheduleId};
