//! Session token storage.
//!
//! A [`SessionStore`] persists exactly one token. The [`Session`] wraps a store with an
//! explicit lifecycle: it reads the store once when loaded, writes through on
//! [`Session::begin`] and clears on [`Session::end`]. API calls and the route guard only ever
//! look at the `Session`.
//!
//! There is no expiry tracking; a token is trusted until the backend rejects it.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to determine config directory")]
    NoConfigDir,
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse session file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Failed to serialize session: {0}")]
    Serialize(String),
}

pub trait SessionStore: Send + Sync {
    fn get_token(&self) -> Result<Option<String>, SessionError>;
    fn set_token(&self, token: &str) -> Result<(), SessionError>;
    fn clear_token(&self) -> Result<(), SessionError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_token(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// On-disk layout of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    token: Option<String>,
}

/// Stores the token in a TOML file, by default `$XDG_CONFIG_HOME/roster/session.toml`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform config location.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        let project_dirs =
            ProjectDirs::from("com", "roster", "roster").ok_or(SessionError::NoConfigDir)?;
        Ok(project_dirs.config_dir().join("session.toml"))
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get_token(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let file: SessionFile = toml::from_str(&content).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = toml::to_string_pretty(&SessionFile {
            token: Some(token.to_owned()),
        })
        .map_err(|e| SessionError::Serialize(e.to_string()))?;

        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// The authentication context handed to API calls and route guards.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    token: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Initialize from whatever the store holds right now.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let token = store.get_token()?;
        info!(
            "Session: loaded, {}",
            if token.is_some() {
                "token present"
            } else {
                "no token"
            }
        );
        Ok(Self { store, token })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemorySessionStore::new()),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Persist a freshly issued token and start using it.
    pub fn begin(&mut self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        self.store.set_token(&token)?;
        self.token = Some(token);
        info!("Session: started");
        Ok(())
    }

    /// Forget the token, both in memory and in the store.
    pub fn end(&mut self) -> Result<(), SessionError> {
        self.token = None;
        self.store.clear_token()?;
        info!("Session: ended");
        Ok(())
    }
}
