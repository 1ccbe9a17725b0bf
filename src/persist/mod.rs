//! Local persistence helper
//!
//! A thin get/set JSON wrapper over a data directory, one file per fixed
//! key name (`clubs`, `users`). The store and the user directory mirror
//! their state through it when a data directory is configured; without
//! one the process runs purely in memory and state is discarded on
//! restart. Login attempt counters are deliberately not mirrored.
//!
//! Reads are forgiving: a missing or unparseable file yields `None` and a
//! log line, never an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Fixed key for the club list
pub const CLUBS_KEY: &str = "clubs";
/// Fixed key for the user directory
pub const USERS_KEY: &str = "users";

/// Keyed JSON file store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read and deserialize the value stored under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring corrupt entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Serialize and write `value` under `key`, replacing any prior value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.path_for(key), json)
    }
}
