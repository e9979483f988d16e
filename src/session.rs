//! One-time greeting per session and the store that remembers it.
//!
//! A "session" is one terminal tab: [`FileSession`] keys its flag file by an
//! identifier that stays stable for the lifetime of the tab and changes when
//! a new one is opened.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

pub const GREETED_KEY: &str = "mzu_greeted";
pub const GREETING: &str = "Hi 👋 I'm the MZU Assistant.";
pub const DEFAULT_GREETING_DELAY: Duration = Duration::from_millis(700);

/// Flag files untouched for this long belong to tabs that are long gone.
pub const STALE_SESSION_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Session-scoped key/value storage.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Default)]
struct SessionFile {
    values: HashMap<String, String>,
}

/// Flag file under the temp directory, one per session id.
///
/// Every new tab leaves one small file behind. [`FileSession::prune_stale`]
/// sweeps the ones nobody has written to in a while.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(dir: &Path, session_id: &str) -> Self {
        let safe: String = session_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        Self {
            path: dir.join(format!("session-{safe}.json")),
        }
    }

    /// Store for the current terminal session under the system temp dir.
    pub fn for_current(session_override: Option<&str>) -> Self {
        let id = session_override
            .map(str::to_string)
            .unwrap_or_else(current_session_id);
        Self::new(&std::env::temp_dir().join("mzu-chat"), &id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete sibling `session-*.json` files last modified more than
    /// `max_age` ago. This store's own file is never removed. Returns how
    /// many files went.
    pub fn prune_stale(&self, max_age: Duration) -> usize {
        let Some(dir) = self.path.parent() else {
            return 0;
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path == self.path || !is_session_file(&path) {
                continue;
            }
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            if age.is_some_and(|age| age > max_age) {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "could not prune session file");
                    }
                }
            }
        }
        removed
    }

    fn read(&self) -> Result<SessionFile, SessionError> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl SessionStore for FileSession {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read()?.values.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut file = self.read().unwrap_or_default();
        file.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(&file)?)?;
        Ok(())
    }
}

fn is_session_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("session-") && n.ends_with(".json"))
}

/// Best identifier for "this terminal tab".
pub fn current_session_id() -> String {
    if let Ok(id) = std::env::var("TERM_SESSION_ID") {
        if !id.is_empty() {
            return id;
        }
    }
    fallback_session_id()
}

#[cfg(unix)]
fn fallback_session_id() -> String {
    // The shell that launched us lives as long as the tab does
    format!("ppid-{}", std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn fallback_session_id() -> String {
    "default".to_string()
}

/// Decides whether the welcome message is still owed this session.
pub struct Greeter {
    store: Box<dyn SessionStore>,
    delay: Duration,
}

impl Greeter {
    pub fn new(store: Box<dyn SessionStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True until [`Greeter::mark_greeted`] has run in this session.
    pub fn is_pending(&self) -> bool {
        match self.store.get(GREETED_KEY) {
            Ok(value) => value.is_none(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read session flag, treating as not greeted");
                true
            }
        }
    }

    pub fn mark_greeted(&mut self) {
        if let Err(e) = self.store.set(GREETED_KEY, "1") {
            tracing::warn!(error = %e, "could not persist session flag");
        }
    }
}
