//! Connection settings for the portal API. Values come from the command line
//! or the environment (see `cli::commands`); none of them are secret. The
//! session file they may point at is.

use super::errors::ApiError;
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub api_base_url: Url,
    pub timeout: Duration,
    /// Where the cookie jar is kept between runs; `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
}

impl PortalConfig {
    /// Builds a config from a raw base URL and a timeout in seconds.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the URL is empty, unparsable, not http(s),
    /// or the timeout is zero.
    pub fn new(api_base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let raw = normalize_base_url(api_base_url)
            .ok_or_else(|| ApiError::Config("API base URL is required.".to_string()))?;

        let url = Url::parse(&raw)
            .map_err(|err| ApiError::Config(format!("Invalid API base URL {raw}: {err}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported API URL scheme: {}",
                url.scheme()
            )));
        }

        if timeout_seconds == 0 {
            return Err(ApiError::Config(
                "Request timeout must be at least one second.".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: url,
            timeout: Duration::from_secs(timeout_seconds),
            session_file: None,
        })
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}

fn normalize_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_trims_and_rejects_empty() {
        assert_eq!(normalize_base_url(""), None);
        assert_eq!(normalize_base_url("   "), None);
        assert_eq!(normalize_base_url(" / "), None);
        assert_eq!(
            normalize_base_url("  https://api.taxportal.dev/ "),
            Some("https://api.taxportal.dev".to_string())
        );
    }

    #[test]
    fn new_accepts_http_and_https() {
        let config = PortalConfig::new("https://api.taxportal.dev/api/", 5).unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://api.taxportal.dev/api");
        assert_eq!(config.timeout, Duration::from_secs(5));

        assert!(PortalConfig::new("http://localhost:5000", 1).is_ok());
    }

    #[test]
    fn session_file_is_opt_in() {
        let config = PortalConfig::new("http://localhost:5000", 1).unwrap();
        assert!(config.session_file.is_none());

        let config = config.with_session_file("/tmp/taxportal/session.json");
        assert_eq!(
            config.session_file.as_deref(),
            Some(std::path::Path::new("/tmp/taxportal/session.json"))
        );
    }

    #[test]
    fn new_rejects_bad_input() {
        assert!(matches!(
            PortalConfig::new("", 10),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            PortalConfig::new("not a url", 10),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            PortalConfig::new("ftp://files.taxportal.dev", 10),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            PortalConfig::new("http://localhost:5000", 0),
            Err(ApiError::Config(_))
        ));
    }
}
