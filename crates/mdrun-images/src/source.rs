//! Network retrieval of image payloads.

use std::time::Duration;

use ureq::Agent;
use url::Url;

use crate::consts::{DEFAULT_BODY_LIMIT, DEFAULT_USER_AGENT};
use crate::error::FetchError;

/// Blocking retrieval of raw image bytes by URL.
///
/// Called from a blocking worker thread, never from an async task directly.
pub trait ImageSource: Send + Sync + 'static {
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// [`ImageSource`] backed by a pooled HTTP agent.
pub struct HttpSource {
    agent: Agent,
    user_agent: String,
    body_limit: u64,
}

impl HttpSource {
    /// Create a source with the given global request timeout.
    ///
    /// `None` leaves the transport's defaults in place.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            agent: create_agent(timeout),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Reject response bodies larger than `limit` bytes.
    #[must_use]
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Create HTTP agent, reused for connection pooling across fetches.
fn create_agent(timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build()
        .into()
}

impl ImageSource for HttpSource {
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", &self.user_agent)
            .header("Accept", "image/*")
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        response
            .into_body()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
            .map_err(|e| FetchError::Http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_settings() {
        let source = HttpSource::new(Some(Duration::from_secs(5)))
            .with_user_agent("test-agent")
            .with_body_limit(1024);
        assert_eq!(source.user_agent, "test-agent");
        assert_eq!(source.body_limit, 1024);
    }

    #[test]
    fn test_default_user_agent() {
        let source = HttpSource::default();
        assert!(source.user_agent.starts_with("mdrun/"));
        assert_eq!(source.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn test_unreachable_host_fails() {
        // Port 9 on localhost is the discard service and is normally closed.
        let source = HttpSource::new(Some(Duration::from_secs(2)));
        let url = Url::parse("http://127.0.0.1:9/missing.png").unwrap();
        assert!(matches!(source.get(&url), Err(FetchError::Http(_))));
    }
}
