//! Persistence gateway for notes, schedules, and the calendar credential.
//!
//! The store writes whole collections through [`PersistenceGateway`] after
//! every mutation. Loads never fail: a missing or corrupt blob reads back as an
//! empty collection so a damaged file cannot keep the app from starting.

mod backend;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Note, Schedule};
use crate::util::{non_blank, non_blank_owned};

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};

pub const SCHEDULES_KEY: &str = "schedules";
pub const NOTES_KEY: &str = "notes";
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Storage operations the store relies on.
pub trait PersistenceGateway: Send + 'static {
    fn load_schedules(&self) -> Vec<Schedule>;
    fn save_schedules(&self, schedules: &[Schedule]) -> Result<()>;
    fn load_notes(&self) -> Vec<Note>;
    fn save_notes(&self, notes: &[Note]) -> Result<()>;
    fn load_auth_token(&self) -> Option<String>;
    fn save_auth_token(&self, token: Option<&str>) -> Result<()>;
    /// Remove persisted notes and schedules. The auth token is kept.
    fn clear(&self) -> Result<()>;
}

/// JSON-encoded collections stored in a [`KeyValueBackend`].
#[derive(Debug)]
pub struct KeyValuePersistence<B: KeyValueBackend> {
    backend: B,
}

impl KeyValuePersistence<MemoryBackend> {
    /// Ephemeral persistence (primarily for tests).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl KeyValuePersistence<FileBackend> {
    /// File-backed persistence rooted at `dir`.
    pub fn open_dir(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self::new(FileBackend::open(dir)?))
    }
}

impl<B: KeyValueBackend> KeyValuePersistence<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read persisted {}: {}", key, error);
                return Vec::new();
            }
        };

        match decode_collection(key, &raw) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!("{}; starting with an empty collection", error);
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let encoded = serde_json::to_string(items)?;
        self.backend.set(key, &encoded)
    }
}

fn decode_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>> {
    serde_json::from_str(raw).map_err(|error| Error::PersistenceDecode {
        key: key.to_string(),
        message: error.to_string(),
    })
}

impl<B: KeyValueBackend> PersistenceGateway for KeyValuePersistence<B> {
    fn load_schedules(&self) -> Vec<Schedule> {
        self.load_collection(SCHEDULES_KEY)
    }

    fn save_schedules(&self, schedules: &[Schedule]) -> Result<()> {
        self.save_collection(SCHEDULES_KEY, schedules)
    }

    fn load_notes(&self) -> Vec<Note> {
        self.load_collection(NOTES_KEY)
    }

    fn save_notes(&self, notes: &[Note]) -> Result<()> {
        self.save_collection(NOTES_KEY, notes)
    }

    fn load_auth_token(&self) -> Option<String> {
        let raw = match self.backend.get(AUTH_TOKEN_KEY) {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!("Failed to read persisted auth token: {}", error);
                return None;
            }
        };
        match serde_json::from_str::<Option<String>>(&raw) {
            Ok(token) => non_blank_owned(token),
            Err(error) => {
                tracing::warn!("Failed to decode persisted auth token: {}", error);
                None
            }
        }
    }

    fn save_auth_token(&self, token: Option<&str>) -> Result<()> {
        match token.and_then(non_blank) {
            Some(token) => self
                .backend
                .set(AUTH_TOKEN_KEY, &serde_json::to_string(&token)?),
            None => self.backend.remove(AUTH_TOKEN_KEY),
        }
    }

    fn clear(&self) -> Result<()> {
        self.backend.remove(SCHEDULES_KEY)?;
        self.backend.remove(NOTES_KEY)
    }
}
