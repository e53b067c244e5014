//! Types for authentication and user management

use serde::{Deserialize, Serialize};

/// Credentials posted to the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    /// The username
    pub username: String,

    /// The password
    pub password: String,
}

/// Payload of the registration endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Email address
    pub email: String,

    /// The username
    pub username: String,

    /// The password
    pub password: String,
}

/// Token endpoint response.
///
/// Depending on the backend configuration the access token arrives as
/// `access` or `token`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    #[serde(default)]
    pub access: Option<String>,

    /// Alternative field name for the access token
    #[serde(default)]
    pub token: Option<String>,

    /// Refresh token
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenPair {
    /// The access token, whichever field carried it
    pub fn access_token(&self) -> Option<&str> {
        [self.access.as_deref(), self.token.as_deref()]
            .into_iter()
            .flatten()
            .find(|token| !token.is_empty())
    }
}

/// Body of the token refresh request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Registration response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Confirmation message from the server
    #[serde(default)]
    pub message: Option<String>,
}

/// The authenticated user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user ID
    pub id: i64,

    /// The username
    pub username: String,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,
}
