//! Calendar sync status shared with front ends.

use chrono::{DateTime, Utc};

/// Where the last calendar sync stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Synced,
    NeedsAuth,
    Error,
}

impl SyncState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Synced => "synced",
            Self::NeedsAuth => "needs auth",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncStatus {
    pub fn is_loading(&self) -> bool {
        self.state == SyncState::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
