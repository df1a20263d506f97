//! Cosmetic login gate.
//!
//! # Responsibility
//! - Accept any non-empty username/password pair and open a session.
//! - Remember or forget the username for the next login form.
//!
//! # Invariants
//! - This is not an access-control mechanism: no credential is checked or
//!   stored, and every store operation stays reachable without a session.
//! - The password never reaches logs or storage.

use crate::store::{read_text, KeyValueStore, StoreError, StoreKey};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo123";

/// Login form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Persist the username for the next login form.
    pub remember: bool,
}

impl LoginRequest {
    /// Demo credentials offered by the login form.
    pub fn demo() -> Self {
        Self {
            username: DEMO_USERNAME.to_string(),
            password: DEMO_PASSWORD.to_string(),
            remember: false,
        }
    }
}

/// Per-process session opened by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: Uuid,
    pub username: String,
}

#[derive(Debug)]
pub enum SessionError {
    MissingCredentials,
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "Provide both username and password."),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingCredentials => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Login gate over the shared store.
pub struct SessionGate<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Username to prefill on the login form, if one was remembered.
    pub fn remembered_user(&self) -> Option<String> {
        read_text(&self.store, StoreKey::RememberedUser).filter(|value| !value.is_empty())
    }

    /// Opens a session for any non-empty (trimmed) username and password.
    ///
    /// A failed remember-me write is logged and does not block the login.
    pub fn login(&self, request: &LoginRequest) -> Result<Session, SessionError> {
        let username = request.username.trim();
        let password = request.password.trim();
        if username.is_empty() || password.is_empty() {
            info!("event=login module=session status=rejected reason=missing_credentials");
            return Err(SessionError::MissingCredentials);
        }

        let remember_result = if request.remember {
            self.store.set(StoreKey::RememberedUser, username)
        } else {
            self.store.remove(StoreKey::RememberedUser)
        };
        if let Err(err) = remember_result {
            warn!("event=login module=session status=degraded reason=remember_failed error={err}");
        }

        let session = Session {
            session_id: Uuid::new_v4(),
            username: username.to_string(),
        };
        info!(
            "event=login module=session status=ok session_id={} remember={}",
            session.session_id, request.remember
        );
        Ok(session)
    }

    /// Forgets the remembered username.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(StoreKey::RememberedUser)?;
        info!("event=logout module=session status=ok");
        Ok(())
    }
}
