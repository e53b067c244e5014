//! Session management for the logged-in user
//!
//! A single [`UserSession`] is persisted through a [`SessionStore`]. All
//! consumers go through a shared [`SessionContext`], which never returns an
//! error: storage failures are logged and degrade to "nobody is logged in".

mod store;

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

pub use store::*;

/// The authenticated identity and its bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// The username used to log in
    pub username: String,

    /// The bearer token sent with API calls
    pub access_token: String,

    /// The refresh token, when the server issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

impl UserSession {
    /// Create a new session
    pub fn new(username: &str, access_token: &str) -> Self {
        Self {
            username: username.to_string(),
            access_token: access_token.to_string(),
            refresh_token: None,
        }
    }

    /// Attach a refresh token
    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// Expiry of the access token as a unix timestamp.
    ///
    /// Only available when the token is a JWT carrying an `exp` claim. The
    /// signature is not checked; the server remains the authority.
    pub fn expires_at(&self) -> Option<i64> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(&self.access_token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .and_then(|data| data.claims.exp)
    }

    /// Check if the access token has expired. Opaque tokens never expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::from_secs(0))
                    .as_secs() as i64;
                now >= expires_at
            }
            None => false,
        }
    }
}

/// Shared handle to the single current session.
///
/// Cloning is cheap; clones observe the same store and notify the same
/// subscribers.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    tx: Arc<watch::Sender<Option<UserSession>>>,
}

impl SessionContext {
    /// Create a context over `store`
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    /// Create a context with an in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Subscribe to session changes (login, logout, token refresh)
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }

    /// Persist a session for `username`, overwriting any previous one
    pub async fn login(&self, username: &str, access_token: &str) -> UserSession {
        self.login_with_refresh(username, access_token, None).await
    }

    /// Persist a session including a refresh token
    pub async fn login_with_refresh(
        &self,
        username: &str,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> UserSession {
        let session = UserSession::new(username, access_token).with_refresh_token(refresh_token);

        if let Err(err) = self.store.save(&session).await {
            log::error!("Failed to persist session for '{}': {}", username, err);
        }
        self.publish(Some(session.clone()));
        log::info!("User '{}' logged in", username);

        session
    }

    /// Swap the access token of the current session, keeping everything else
    pub async fn replace_access_token(&self, access_token: &str) -> Option<UserSession> {
        let mut session = self.current().await?;
        session.access_token = access_token.to_string();

        if let Err(err) = self.store.save(&session).await {
            log::error!("Failed to persist refreshed session: {}", err);
        }
        self.publish(Some(session.clone()));

        Some(session)
    }

    /// The current session, or `None` if nobody is logged in.
    ///
    /// A record that cannot be parsed is removed.
    pub async fn current(&self) -> Option<UserSession> {
        let session = match self.store.load().await {
            Ok(session) => session,
            Err(crate::error::Error::Json(err)) => {
                log::error!("Failed to parse stored session, discarding it: {}", err);
                if let Err(err) = self.store.clear().await {
                    log::error!("Failed to remove corrupt session: {}", err);
                }
                None
            }
            Err(err) => {
                log::debug!("No session available: {}", err);
                None
            }
        };

        self.publish(session.clone());
        session
    }

    /// Whether someone is logged in
    pub async fn is_logged_in(&self) -> bool {
        self.current().await.is_some()
    }

    /// Clear the current session
    pub async fn logout(&self) {
        let previous = self.current().await;

        if let Err(err) = self.store.clear().await {
            log::error!("Failed to clear session: {}", err);
        }
        self.publish(None);

        if let Some(previous) = previous {
            log::info!("User '{}' logged out", previous.username);
        }
    }

    /// Clear the session if it belongs to `username`.
    ///
    /// Returns whether a session was removed.
    pub async fn forget(&self, username: &str) -> bool {
        match self.current().await {
            Some(session) if session.username == username => {
                if let Err(err) = self.store.clear().await {
                    log::error!("Failed to forget user '{}': {}", username, err);
                    return false;
                }
                self.publish(None);
                log::info!("Forgot user '{}' and removed their data", username);
                true
            }
            _ => false,
        }
    }

    fn publish(&self, session: Option<UserSession>) {
        self.tx.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let username = self.tx.borrow().as_ref().map(|session| session.username.clone());
        f.debug_struct("SessionContext")
            .field("username", &username)
            .finish_non_exhaustive()
    }
}
