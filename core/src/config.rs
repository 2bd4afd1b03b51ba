//! Client configuration, resolved once at process start and injected into
//! `ApiClient::new`. Nothing on the request path reads the environment.

use std::time::Duration;

/// Environment variable holding the API origin.
pub const BASE_URL_ENV: &str = "SHOPDESK_API_BASE";

/// Origin used when `SHOPDESK_API_BASE` is unset or blank.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Time allowed for the server to answer before the request is aborted.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Trailing slashes on `base_url` are stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with the variable lookup supplied by the caller.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(BASE_URL_ENV) {
            Some(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("https://api.example.com///");
        assert_eq!(config.base_url(), "https://api.example.com");
    }

    #[test]
    fn default_timeout_is_fifteen_seconds() {
        assert_eq!(ClientConfig::default().timeout(), Duration::from_secs(15));
    }

    #[test]
    fn lookup_uses_env_value() {
        let config = ClientConfig::from_lookup(|key| {
            assert_eq!(key, BASE_URL_ENV);
            Some("https://shop.example.com/".to_string())
        });
        assert_eq!(config.base_url(), "https://shop.example.com");
    }

    #[test]
    fn lookup_falls_back_when_absent_or_blank() {
        assert_eq!(ClientConfig::from_lookup(|_| None).base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            ClientConfig::from_lookup(|_| Some("   ".to_string())).base_url(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn with_timeout_overrides_default() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }
}
