use std::time::Duration;

/// Per-dispatch timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Construction-time misuse. Unlike the runtime failures carried in the
/// response envelope, these abort eagerly: a client built against a
/// malformed base URL is a caller bug, not a recoverable condition.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where the user collection lives and how long a dispatch may take.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read configuration from the environment (a local `.env` file is
    /// honored). `ROSTER_API_URL` is required; `ROSTER_TIMEOUT_MS`
    /// defaults to 2000.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url =
            std::env::var("ROSTER_API_URL").map_err(|_| ConfigError::MissingVar("ROSTER_API_URL"))?;
        let timeout_ms: u64 = std::env::var("ROSTER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT.as_millis() as u64);

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
