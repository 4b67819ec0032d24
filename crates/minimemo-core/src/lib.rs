//! minimemo-core - Core library for minimemo
//!
//! Notes and schedules with write-through persistence, one-shot timers that
//! open a schedule's meeting link when it starts, and calendar sync that folds
//! remote events into the local list.

pub mod actions;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod merge;
pub mod models;
pub mod persistence;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{NewSchedule, Note, NoteId, Origin, Schedule, ScheduleId};
pub use state::{SyncState, SyncStatus};
pub use store::Store;
pub use sync::{SyncOrchestrator, SyncReport};
