//! Admin session: the credential, where it is persisted, and who may read it.
//!
//! A `SessionContext` is created once at startup and handed to the guard and
//! the sync client. Nothing reaches into the credential store directly.

pub mod guard;
pub mod store;

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::session::store::{CredentialStore, StoreError, CREDENTIAL_KEY};

/// Opaque bearer token proving admin identity to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.chars().count())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Credential),
}

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    /// Starts unauthenticated regardless of what the store holds. See [`SessionContext::restore`].
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    /// Loads whatever the store holds under `adminToken`.
    ///
    /// The raw value is taken as-is, including corrupted ones such as `"null"`;
    /// the guard decides whether it is usable.
    pub fn restore(store: Arc<dyn CredentialStore>) -> Result<Self, StoreError> {
        let state = match store.get(CREDENTIAL_KEY)? {
            Some(raw) => {
                debug!("Restored stored credential");
                SessionState::Authenticated(Credential::new(raw))
            }
            None => SessionState::Unauthenticated,
        };
        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    pub fn state(&self) -> SessionState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        match self.state() {
            SessionState::Authenticated(credential) => Some(credential),
            SessionState::Unauthenticated => None,
        }
    }

    /// Persists `token` and moves to `Authenticated`.
    ///
    /// Called only after the backend accepted a login.
    pub fn establish(&self, token: &str) -> Result<Credential, StoreError> {
        self.store.set(CREDENTIAL_KEY, token)?;
        let credential = Credential::new(token);
        self.replace_state(SessionState::Authenticated(credential.clone()));
        info!("Admin session established");
        Ok(credential)
    }

    /// Clears the stored credential and returns to `Unauthenticated`.
    pub fn end(&self) -> Result<(), StoreError> {
        self.store.remove(CREDENTIAL_KEY)?;
        self.replace_state(SessionState::Unauthenticated);
        info!("Admin session ended");
        Ok(())
    }

    fn replace_state(&self, next: SessionState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => {
                warn!("Session state lock was poisoned; overwriting");
                *poisoned.into_inner() = next;
            }
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
