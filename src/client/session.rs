use crate::api::schemas::auth::{Profile, TokenPair};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Client-side authentication state.
///
/// Tokens are only ever written as a pair, so an access token never exists without a refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<Profile>,
}

impl Session {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Shared holder of the current session.
///
/// Reads return a snapshot; every mutation replaces the affected fields atomically so no reader
/// observes a half-written token pair.
pub trait SessionStore: Send + Sync + fmt::Debug {
    fn session(&self) -> Session;
    fn set_tokens(&self, tokens: TokenPair);
    fn set_user(&self, user: Profile);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { inner: RwLock::new(session) }
    }
}

impl SessionStore for MemorySessionStore {
    fn session(&self) -> Session {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_tokens(&self, tokens: TokenPair) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        session.access_token = Some(tokens.access_token);
        session.refresh_token = Some(tokens.refresh_token);
    }

    fn set_user(&self, user: Profile) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
    }
}

/// Session store persisted as JSON so a session survives restarts.
///
/// Writes go to a sibling temp file that is renamed over the target. Persistence failures are
/// logged and the in-memory session stays authoritative.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    inner: RwLock<Session>,
}

impl FileSessionStore {
    /// Opens the store at `path`, loading any session saved there.
    ///
    /// A missing or unreadable file starts an empty session.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = Self::load(&path);
        Self { path, inner: RwLock::new(session) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Session {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Session::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read session file");
                return Session::default();
            }
        };

        match serde_json::from_slice::<Session>(&bytes) {
            // A persisted access token without its refresh token is not a usable session.
            Ok(session) if session.access_token.is_some() && session.refresh_token.is_none() => Session::default(),
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt session file");
                Session::default()
            }
        }
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.write_atomically(session) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist session");
        }
    }

    fn write_atomically(&self, session: &Session) -> std::io::Result<()> {
        let bytes = serde_json::to_vec_pretty(session).map_err(std::io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)
    }

    fn update(&self, apply: impl FnOnce(&mut Session)) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut session);
        self.persist(&session);
    }
}

impl SessionStore for FileSessionStore {
    fn session(&self) -> Session {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_tokens(&self, tokens: TokenPair) {
        self.update(|session| {
            session.access_token = Some(tokens.access_token);
            session.refresh_token = Some(tokens.refresh_token);
        });
    }

    fn set_user(&self, user: Profile) {
        self.update(|session| session.user = Some(user));
    }

    fn clear(&self) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *session = Session::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session file"),
        }
    }
}
