use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};

use super::identity::Identity;
use super::storage::TokenStore;
use super::token::{decode_token, DecodeError};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Rejected(#[from] ApiError),

    #[error("Server returned an unusable token: {0}")]
    InvalidToken(#[from] DecodeError),
}

/// Who is logged in.
///
/// Constructed once at startup and passed by reference to whatever needs
/// identity. The token slot behind it is written only from here.
pub struct SessionStore {
    store: Box<dyn TokenStore>,
    token: Option<String>,
    identity: Option<Identity>,
    expires_at: Option<DateTime<Utc>>,
    loading: bool,
}

impl SessionStore {
    /// Create a store that has not read the slot yet (`is_loading()` is true)
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            token: None,
            identity: None,
            expires_at: None,
            loading: true,
        }
    }

    /// Restore the session from the persisted token, if any.
    ///
    /// A token that cannot be read or decoded is removed from the slot and the
    /// user is treated as logged out. Never fails.
    pub fn initialize(&mut self) {
        let persisted = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Unreadable persisted token, clearing slot");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to remove persisted token");
                }
                None
            }
        };

        match persisted {
            Some(token) => match decode_token(&token) {
                Ok(decoded) => {
                    debug!(user_id = decoded.identity.id, role = %decoded.identity.role, "Session restored");
                    self.token = Some(token);
                    self.identity = Some(decoded.identity);
                    self.expires_at = decoded.expires_at;
                }
                Err(e) => {
                    warn!(error = %e, "Discarding persisted token");
                    self.reset();
                    if let Err(e) = self.store.clear() {
                        warn!(error = %e, "Failed to remove persisted token");
                    }
                }
            },
            None => {
                debug!("No persisted token");
                self.reset();
            }
        }

        self.loading = false;
    }

    /// Authenticate against the API and start a session.
    ///
    /// On failure the error is returned and the current session, if any, is
    /// left exactly as it was.
    pub async fn login(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<(), LoginError> {
        let token = client.obtain_token(username, password).await?;
        let decoded = decode_token(&token)?;

        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "Failed to persist token, session will not survive restart");
        }

        info!(user_id = decoded.identity.id, role = %decoded.identity.role, "Logged in");
        self.token = Some(token);
        self.identity = Some(decoded.identity);
        self.expires_at = decoded.expires_at;
        Ok(())
    }

    /// End the session. Safe to call when already logged out.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove persisted token");
        }
        if self.identity.is_some() {
            info!("Logged out");
        }
        self.reset();
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True until `initialize()` has run
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bearer token for API requests
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Expiry carried by the token. Informational only.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn reset(&mut self) {
        self.token = None;
        self.identity = None;
        self.expires_at = None;
    }
}
