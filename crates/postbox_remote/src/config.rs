//! Client configuration.

use std::time::Duration;

use crate::error::{RemoteError, RemoteResult};

pub const DEFAULT_REQUEST_HOST: &str = "api.postmarkapp.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for a server client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server API token, sent with every request
    pub server_token: String,
    /// Host name, or a full base URL when a scheme is included
    pub request_host: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            request_host: DEFAULT_REQUEST_HOST.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the request host. Empty values keep the default.
    pub fn request_host(mut self, host: Option<impl Into<String>>) -> Self {
        if let Some(host) = host.map(Into::into).filter(|h: &String| !h.trim().is_empty()) {
            self.request_host = host;
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> RemoteResult<()> {
        if self.server_token.trim().is_empty() {
            return Err(RemoteError::InvalidConfig(
                "server token must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL for API requests, without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.request_host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host() {
        let config = ClientConfig::new("token");
        assert_eq!(config.base_url(), "https://api.postmarkapp.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_host_override() {
        let config = ClientConfig::new("token").request_host(Some("http://localhost:8080/"));
        assert_eq!(config.base_url(), "http://localhost:8080");

        let config = ClientConfig::new("token").request_host(Some(""));
        assert_eq!(config.request_host, DEFAULT_REQUEST_HOST);
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = ClientConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, RemoteError::InvalidConfig(_)));
    }
}
