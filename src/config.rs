//! Configuration options for the Zyvia client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "ZYVIA_API_URL";

/// Environment variable overriding the session file location
pub const ENV_SESSION_PATH: &str = "ZYVIA_SESSION_PATH";

/// Environment variable overriding the request timeout, in seconds
pub const ENV_TIMEOUT_SECS: &str = "ZYVIA_TIMEOUT_SECS";

/// Configuration options for the Zyvia client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The base URL of the backend, without the `/api` suffix
    pub base_url: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Where the session is persisted. `None` means the default location.
    pub session_path: Option<PathBuf>,

    /// The User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            session_path: None,
            user_agent: format!("zyvia-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Build options from the environment, falling back to defaults.
    ///
    /// An unparsable timeout is ignored with a warning.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                options = options.with_base_url(&url);
            }
        }

        if let Ok(path) = env::var(ENV_SESSION_PATH) {
            if !path.trim().is_empty() {
                options = options.with_session_path(path);
            }
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(0) => options = options.with_request_timeout(None),
                Ok(secs) => {
                    options = options.with_request_timeout(Some(Duration::from_secs(secs)))
                }
                Err(_) => log::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT_SECS, secs),
            }
        }

        options
    }

    /// Set the base URL. A trailing slash is stripped.
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the session file location
    pub fn with_session_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.session_path = Some(value.into());
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, value: &str) -> Self {
        self.user_agent = value.to_string();
        self
    }

    /// Build an absolute API URL for `path` (e.g. `/clothing/`)
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// The session file to use: the configured one, or the per-user default.
    ///
    /// Returns `None` when no configuration directory can be determined.
    pub fn resolved_session_path(&self) -> Option<PathBuf> {
        self.session_path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("zyvia").join("session.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.api_url("/token/"), "http://127.0.0.1:8000/api/token/");
    }

    #[test]
    fn test_builder() {
        let options = ClientOptions::default()
            .with_base_url("http://192.168.31.169:8000/")
            .with_session_path("/tmp/zyvia.json")
            .with_request_timeout(None);

        assert_eq!(options.base_url, "http://192.168.31.169:8000");
        assert_eq!(
            options.api_url("/clothing/"),
            "http://192.168.31.169:8000/api/clothing/"
        );
        assert_eq!(
            options.resolved_session_path(),
            Some(PathBuf::from("/tmp/zyvia.json"))
        );
        assert!(options.request_timeout.is_none());
    }
}
