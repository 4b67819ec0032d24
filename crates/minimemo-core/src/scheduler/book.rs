//! Shared, lock-protected list of schedules.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{Schedule, ScheduleId};

/// The authoritative schedule list, shared between the store (writer) and
/// firing timers (readers looking up the current state of their entry).
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    inner: Arc<RwLock<Vec<Schedule>>>,
}

impl ScheduleBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of one schedule, if it still exists.
    #[must_use]
    pub fn get(&self, id: &ScheduleId) -> Option<Schedule> {
        self.read().iter().find(|schedule| schedule.id == *id).cloned()
    }

    /// Copy of the whole list in its current order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Schedule> {
        self.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<Schedule>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<Schedule>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
