use std::time::Duration;

use boxwise_core::code_format::CodeClassifier;
use boxwise_core::error::CoreError;

/// Default GraphQL endpoint for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5005/graphql";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint URL.
    pub api_url: String,
    /// Bearer token sent as `Authorization`, if any.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds. A timeout is an ordinary transport
    /// error.
    pub request_timeout_secs: u64,
    /// Only label URLs starting with this prefix are treated as application
    /// codes. `None` accepts any host.
    pub qr_url_prefix: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            qr_url_prefix: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables (and `.env`, if
    /// present) with defaults.
    ///
    /// | Env Var                        | Default                          |
    /// |--------------------------------|----------------------------------|
    /// | `BOXWISE_API_URL`              | `http://localhost:5005/graphql`  |
    /// | `BOXWISE_ACCESS_TOKEN`         | unset                            |
    /// | `BOXWISE_REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `BOXWISE_QR_URL_PREFIX`        | unset                            |
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = non_empty("BOXWISE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(CoreError::Validation(format!(
                "BOXWISE_API_URL must be an http(s) URL, got '{api_url}'"
            )));
        }

        let request_timeout_secs = match non_empty("BOXWISE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                CoreError::Validation(format!(
                    "BOXWISE_REQUEST_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            access_token: non_empty("BOXWISE_ACCESS_TOKEN"),
            request_timeout_secs,
            qr_url_prefix: non_empty("BOXWISE_QR_URL_PREFIX"),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Scan classifier honouring `qr_url_prefix`.
    pub fn code_classifier(&self) -> CodeClassifier {
        match &self.qr_url_prefix {
            Some(prefix) => CodeClassifier::with_url_prefix(prefix.clone()),
            None => CodeClassifier::new(),
        }
    }
}
