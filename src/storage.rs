//! Persisted application state.
//!
//! State is kept as four named entries, each holding JSON text:
//! `isAuthenticated`, `isSetupComplete`, `courseInfo` and `students`.
//! A missing entry means "use the default"; so does one that no longer
//! parses, after a warning.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::roster::Roster;
use crate::session::AppState;

pub const KEY_AUTHENTICATED: &str = "isAuthenticated";
pub const KEY_SETUP_COMPLETE: &str = "isSetupComplete";
pub const KEY_COURSE_INFO: &str = "courseInfo";
pub const KEY_STUDENTS: &str = "students";

pub const KEYS: [&str; 4] = [KEY_AUTHENTICATED, KEY_SETUP_COMPLETE, KEY_COURSE_INFO, KEY_STUDENTS];

/// String key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Remove every entry
    fn clear(&mut self) -> Result<()>;
}

/// One `<key>.json` file per entry inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for key in KEYS {
            match fs::remove_file(self.entry_path(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!("Cleared stored state in {}", self.dir.display());
        Ok(())
    }
}

/// Storage that lives as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

fn load_entry<T: DeserializeOwned>(storage: &dyn Storage, key: &str, default: T) -> T {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            warn!("Could not read stored {}: {}; using default", key, e);
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored {} is corrupt ({}); using default", key, e);
            default
        }
    }
}

fn save_entry<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

/// Restore state entry by entry, taking anything missing from `defaults`
pub fn load_state(storage: &dyn Storage, defaults: AppState) -> AppState {
    AppState {
        authenticated: load_entry(storage, KEY_AUTHENTICATED, defaults.authenticated),
        setup_complete: load_entry(storage, KEY_SETUP_COMPLETE, defaults.setup_complete),
        course: load_entry(storage, KEY_COURSE_INFO, defaults.course),
        roster: load_roster(storage, defaults.roster),
    }
}

/// Matric numbers must stay unique, so a stored roster that repeats one is
/// treated like a corrupt entry.
fn load_roster(storage: &dyn Storage, default: Roster) -> Roster {
    let roster = load_entry(storage, KEY_STUDENTS, default.clone());
    match roster.duplicate_matric() {
        Some(matric) => {
            warn!("Stored {} repeats matric {}; using default", KEY_STUDENTS, matric);
            default
        }
        None => roster,
    }
}

pub fn save_state(storage: &mut dyn Storage, state: &AppState) -> Result<()> {
    save_entry(storage, KEY_AUTHENTICATED, &state.authenticated)?;
    save_entry(storage, KEY_SETUP_COMPLETE, &state.setup_complete)?;
    save_entry(storage, KEY_COURSE_INFO, &state.course)?;
    save_entry(storage, KEY_STUDENTS, &state.roster)?;
    Ok(())
}
