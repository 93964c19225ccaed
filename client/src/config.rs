//! Session configuration.
//!
//! The library never reads the environment; hosts build a `SessionConfig` in
//! code or deserialize one from their own config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shitposts_core::{ShitpostClient, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Service root every operation path is appended to.
    pub endpoint: String,
    pub user_agent: String,
    /// Whole-request timeout in milliseconds, applied to transports the
    /// session creates itself. Borrowed transports keep their own settings.
    /// `0` means no timeout.
    pub timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: None,
        }
    }
}

impl SessionConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sub-millisecond remainders round up, so a non-zero timeout never
    /// becomes zero. `Duration::ZERO` clears the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX)).filter(|&ms| ms > 0);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
    }

    pub(crate) fn client(&self) -> ShitpostClient {
        ShitpostClient::new(&self.endpoint).with_user_agent(self.user_agent.clone())
    }
}
