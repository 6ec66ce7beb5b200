//! Authentication primitives
//!
//! Provides:
//! - [`Identity`]: who is making a request (a logged-in user or anonymous)
//! - [`RequestContext`]: the immutable per-request view of identity,
//!   language and display currency handed to every handler
//! - [`PasswordHasher`]: password hashing collaborator and its Argon2
//!   implementation

use crate::core::locale::{Currency, Language};
use anyhow::{Result, anyhow};
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use uuid::Uuid;

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Logged-in user
    User { user_id: Uuid, username: String },

    /// No session or an expired one
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User { user_id, .. } => Some(*user_id),
            Identity::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::User { username, .. } => Some(username),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User { .. })
    }
}

/// Everything a handler needs to know about the caller
///
/// Built once per request from the session and the query string; handlers
/// never read or write session state directly.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: Identity,
    pub language: Language,
    pub currency: Currency,
    pub session_id: Option<Uuid>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            language: Language::default(),
            currency: Currency::default(),
            session_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }
}

/// Password hashing collaborator
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain-text password into a self-describing string
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plain-text password against a stored hash
    fn verify(&self, password: &str, stored: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$m=...`)
///
/// Verification reads the parameters from the stored hash, so changing
/// the cost only affects newly hashed passwords.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Hasher with a custom memory cost (KiB) and pass count
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| anyhow!("Invalid argon2 parameters: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| anyhow!("Failed to encode salt: {}", e))?;
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| anyhow!("Unrecognized password hash format: {}", e))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Failed to verify password: {}", e)),
        }
    }
}
