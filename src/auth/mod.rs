//! Authentication and user management for Zyvia

mod types;

use reqwest::Client;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::session::{SessionContext, UserSession};

pub use types::*;

/// Client for authentication endpoints
#[derive(Clone)]
pub struct Auth {
    /// Client options
    options: ClientOptions,

    /// HTTP client used for requests
    client: Client,

    /// The shared session
    session: SessionContext,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(options: ClientOptions, client: Client, session: SessionContext) -> Self {
        Self {
            options,
            client,
            session,
        }
    }

    /// Exchange credentials for a token pair without touching the session
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenPair, Error> {
        let url = self.options.api_url("/token/");

        let credentials = LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        Fetch::post(&self.client, &url)
            .json(&credentials)?
            .execute::<TokenPair>()
            .await
    }

    /// Sign in and persist the resulting session
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<UserSession, Error> {
        let tokens = self.obtain_token(username, password).await?;

        let access_token = tokens
            .access_token()
            .ok_or_else(|| Error::invalid_response("Response did not include an access token"))?;

        Ok(self
            .session
            .login_with_refresh(username, access_token, tokens.refresh.clone())
            .await)
    }

    /// Register a new account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<RegisterResponse, Error> {
        let url = self.options.api_url("/register/");

        let registration = Registration {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };

        let value = Fetch::post(&self.client, &url)
            .json(&registration)?
            .execute_value()
            .await?;

        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Trade the stored refresh token for a new access token
    pub async fn refresh(&self) -> Result<UserSession, Error> {
        let session = self.session.current().await.ok_or(Error::NotLoggedIn)?;
        let refresh = session.refresh_token.as_deref().ok_or_else(|| {
            Error::validation("The current session has no refresh token")
        })?;

        let url = self.options.api_url("/token/refresh/");

        let tokens = Fetch::post(&self.client, &url)
            .json(&RefreshRequest { refresh })?
            .execute::<TokenPair>()
            .await?;

        let access_token = tokens
            .access_token()
            .ok_or_else(|| Error::invalid_response("Response did not include an access token"))?;

        log::debug!("Refreshed access token for '{}'", session.username);
        self.session
            .replace_access_token(access_token)
            .await
            .ok_or(Error::NotLoggedIn)
    }

    /// Get the profile of the logged-in user
    pub async fn profile(&self) -> Result<UserProfile, Error> {
        let url = self.options.api_url("/user/");
        let token = self.access_token().await?;

        Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute::<UserProfile>()
            .await
    }

    /// Sign out locally. The backend keeps no server-side session.
    pub async fn sign_out(&self) {
        self.session.logout().await;
    }

    /// The bearer token for the current session.
    ///
    /// An expired JWT is refreshed first when a refresh token is available;
    /// a failed refresh falls back to the stored token and lets the server
    /// decide.
    pub async fn access_token(&self) -> Result<String, Error> {
        let session = self.session.current().await.ok_or(Error::NotLoggedIn)?;

        if session.is_expired() && session.refresh_token.is_some() {
            match self.refresh().await {
                Ok(refreshed) => return Ok(refreshed.access_token),
                Err(err) => log::warn!("Token refresh failed: {}", err),
            }
        }

        Ok(session.access_token)
    }

    /// The shared session
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(server: &MockServer) -> Auth {
        let options = ClientOptions::default().with_base_url(&server.uri());
        Auth::new(options, Client::new(), SessionContext::in_memory())
    }

    #[tokio::test]
    async fn test_sign_in_stores_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .and(body_json(json!({ "username": "ana", "password": "x" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access": "tok123", "refresh": "ref456" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = setup(&server);
        let session = auth.sign_in("ana", "x").await.unwrap();

        assert_eq!(session.access_token, "tok123");
        assert_eq!(session.refresh_token.as_deref(), Some("ref456"));
        assert_eq!(auth.session().current().await, Some(session));
    }

    #[tokio::test]
    async fn test_sign_in_failure_keeps_session_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({ "detail": "No active account found with the given credentials" }),
            ))
            .mount(&server)
            .await;

        let auth = setup(&server);
        let err = auth.sign_in("ana", "wrong").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.user_message("fallback"),
            "No active account found with the given credentials"
        );
        assert!(auth.session().current().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_without_token_in_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .mount(&server)
            .await;

        let auth = setup(&server);
        let err = auth.sign_in("ana", "x").await.unwrap_err();

        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(auth.session().current().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .and(body_json(json!({ "refresh": "ref456" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "tok789" })))
            .mount(&server)
            .await;

        let auth = setup(&server);
        auth.session()
            .login_with_refresh("ana", "tok123", Some("ref456".to_string()))
            .await;

        let session = auth.refresh().await.unwrap();
        assert_eq!(session.access_token, "tok789");
        assert_eq!(session.refresh_token.as_deref(), Some("ref456"));
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let server = MockServer::start().await;
        let auth = setup(&server);

        assert!(matches!(auth.profile().await, Err(Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_profile() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user/"))
            .and(header("Authorization", "Bearer tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "id": 7, "username": "ana", "email": "ana@example.com" }),
            ))
            .mount(&server)
            .await;

        let auth = setup(&server);
        auth.session().login("ana", "tok123").await;

        let profile = auth.profile().await.unwrap();
        assert_eq!(profile.id, 7);
        assert_eq!(profile.email.as_deref(), Some("ana@example.com"));
    }
}
