//! Server-side sessions keyed by a cookie
//!
//! The cookie only carries an opaque session id. Everything else (logged-in
//! user, language, currency, the "remember me" identifier and the one-shot
//! login error) lives in the [`SessionStore`].

use crate::core::error::{AppError, StorageError};
use crate::core::locale::{Currency, Language};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "nursery_session";

/// Lifetime of the cookie when "remember me" is ticked
const REMEMBER_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store lock poisoned")]
    LockPoisoned,

    #[error("invalid session cookie value: {0}")]
    InvalidCookie(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::LockPoisoned => AppError::Storage(StorageError::LockPoisoned {
                store: "session".to_string(),
            }),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Values stored for one browser session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub language: Option<Language>,
    pub currency: Option<Currency>,
    pub remembered_identifier: Option<String>,
    pub remember_me_checked: bool,

    /// Shown once on the next login page render
    pub login_error: Option<String>,
}

impl SessionData {
    /// Record a successful login
    pub fn log_in(
        &mut self,
        user_id: Uuid,
        user_name: &str,
        currency: Currency,
        identifier: &str,
        remember: bool,
    ) {
        self.user_id = Some(user_id);
        self.user_name = Some(user_name.to_string());
        self.currency = Some(currency);
        self.login_error = None;
        self.remember_me_checked = remember;
        self.remembered_identifier = remember.then(|| identifier.to_string());
    }

    /// Forget the user; language and the remembered identifier survive
    pub fn log_out(&mut self) {
        self.user_id = None;
        self.user_name = None;
        self.currency = None;
        self.login_error = None;
    }

    /// Nothing worth keeping a session for
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Default idle time after which a session is forgotten
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(REMEMBER_MAX_AGE_SECS);

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    last_seen: Instant,
}

impl Entry {
    fn new(data: SessionData) -> Self {
        Self {
            data,
            last_seen: Instant::now(),
        }
    }
}

/// In-memory session store
///
/// Sessions untouched for longer than the idle timeout read as absent and
/// are dropped by [`SessionStore::evict_idle`].
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn is_live(&self, entry: &Entry) -> bool {
        entry.last_seen.elapsed() < self.idle_timeout
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Entry>>, SessionError> {
        self.sessions.read().map_err(|_| SessionError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Entry>>, SessionError> {
        self.sessions.write().map_err(|_| SessionError::LockPoisoned)
    }

    /// Start an empty session and return its id
    pub fn create(&self) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        self.write()?.insert(id, Entry::new(SessionData::default()));
        Ok(id)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.read()?;
        Ok(sessions
            .get(id)
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.data.clone()))
    }

    pub fn contains(&self, id: &Uuid) -> Result<bool, SessionError> {
        Ok(self.get(id)?.is_some())
    }

    /// Mark a live session as used and return its data
    ///
    /// An idle session is dropped and reads as `None`.
    pub fn touch(&self, id: &Uuid) -> Result<Option<SessionData>, SessionError> {
        let mut sessions = self.write()?;
        match sessions.get_mut(id) {
            Some(entry) if self.is_live(entry) => {
                entry.last_seen = Instant::now();
                Ok(Some(entry.data.clone()))
            }
            Some(_) => {
                sessions.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Mutate a session, starting from empty data if it is missing or idle
    pub fn update<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut SessionData) -> R,
    ) -> Result<R, SessionError> {
        let mut sessions = self.write()?;
        let entry = sessions
            .entry(*id)
            .or_insert_with(|| Entry::new(SessionData::default()));
        if !self.is_live(entry) {
            entry.data = SessionData::default();
        }
        entry.last_seen = Instant::now();
        Ok(f(&mut entry.data))
    }

    /// Move a session's data to a fresh id and forget the old one
    ///
    /// A missing or idle session becomes an empty one under the new id.
    pub fn rotate(&self, id: &Uuid) -> Result<Uuid, SessionError> {
        let mut sessions = self.write()?;
        let data = sessions
            .remove(id)
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.data)
            .unwrap_or_default();
        let fresh = Uuid::new_v4();
        sessions.insert(fresh, Entry::new(data));
        Ok(fresh)
    }

    /// Forget a session; returns whether it existed
    pub fn remove(&self, id: &Uuid) -> Result<bool, SessionError> {
        Ok(self.write()?.remove(id).is_some())
    }

    /// Drop every idle session and return how many were dropped
    pub fn evict_idle(&self) -> Result<usize, SessionError> {
        let mut sessions = self.write()?;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);
        Ok(before - sessions.len())
    }

    /// Remove and return the flashed login error
    pub fn take_login_error(&self, id: &Uuid) -> Result<Option<String>, SessionError> {
        self.update(id, |data| data.login_error.take())
    }

    /// Number of stored sessions, idle ones included until evicted
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `headers` already set the session cookie
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&format!("{}=", SESSION_COOKIE)))
}

/// Session id carried by the request's `Cookie` headers, if any
///
/// Malformed ids are ignored.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value that stores `id` in the browser
///
/// Persistent cookies outlive the browser session.
pub fn session_cookie(id: &Uuid, persistent: bool) -> Result<HeaderValue, SessionError> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    if persistent {
        cookie.push_str(&format!("; Max-Age={}", REMEMBER_MAX_AGE_SECS));
    }
    HeaderValue::from_str(&cookie).map_err(|_| SessionError::InvalidCookie(cookie))
}

/// Append a session cookie to response headers
pub fn attach_cookie(headers: &mut HeaderMap, id: &Uuid, persistent: bool) -> Result<(), SessionError> {
    headers.append(SET_COOKIE, session_cookie(id, persistent)?);
    Ok(())
}
