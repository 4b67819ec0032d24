//! Reconciling fetched calendar events with the local schedule list.
//!
//! Remote data is replaced wholesale on every merge: local entries are kept
//! untouched and in order, every previously fetched entry is dropped, and the
//! fresh batch is appended. Local edits made to a remote entry do not survive.

use crate::models::{Origin, Schedule};

/// Counts describing one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub kept_local: usize,
    pub dropped_remote: usize,
    pub added_remote: usize,
}

/// Merge `incoming` remote schedules into `current`.
///
/// Entries in `incoming` that are not tagged as remote are re-tagged, using
/// their id as the remote id. The result is not sorted.
#[must_use]
pub fn merge(current: Vec<Schedule>, incoming: Vec<Schedule>) -> (Vec<Schedule>, MergeReport) {
    let (local, remote): (Vec<_>, Vec<_>) =
        current.into_iter().partition(|schedule| !schedule.is_remote());

    let report = MergeReport {
        kept_local: local.len(),
        dropped_remote: remote.len(),
        added_remote: incoming.len(),
    };

    let mut merged = local;
    merged.reserve(incoming.len());
    merged.extend(incoming.into_iter().map(tag_remote));
    (merged, report)
}

fn tag_remote(mut schedule: Schedule) -> Schedule {
    if !schedule.is_remote() {
        schedule.origin = Origin::Remote {
            remote_id: schedule.id.to_string(),
        };
    }
    schedule
}
