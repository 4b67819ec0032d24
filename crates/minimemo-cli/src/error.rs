use std::io;

use minimemo_core::calendar::CalendarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] minimemo_core::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Schedule title cannot be empty")]
    EmptyTitle,
    #[error("ID cannot be empty")]
    EmptyId,
    #[error("{kind} not found for id/prefix: {query}")]
    NotFound { kind: &'static str, query: String },
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Could not understand time '{0}'. Use RFC 3339, \"YYYY-MM-DD HH:MM\", or +30m/+2h/+1d")]
    InvalidTime(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Refusing to {0} without --yes")]
    ConfirmationRequired(&'static str),
    #[error("A feed calendar is configured; pass its access token to `minimemo auth login`")]
    MissingToken,
    #[error("Calendar is not connected. Run `minimemo auth login` first.")]
    NotAuthenticated,
}
