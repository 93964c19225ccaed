//! Stateless HTTP request builder and response parser for the shitposts API.
//!
//! # Design
//! `ShitpostClient` holds only a base URL and a user agent and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. Every `parse_*` classifies the status line first, so a
//! failed response body is never decoded.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::encode_edit;
use crate::types::{Command, EditJob, UserStats};

/// Root of the hosted service.
pub const DEFAULT_ENDPOINT: &str = "https://shitposts.local.regulad.xyz/v1/";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("shitposts/", env!("CARGO_PKG_VERSION"));

/// Synchronous, stateless client for the shitposts API.
#[derive(Debug, Clone)]
pub struct ShitpostClient {
    base_url: String,
    user_agent: String,
}

impl Default for ShitpostClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ShitpostClient {
    /// `base_url` gets exactly one trailing slash; paths are appended to it.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{path}", self.base_url),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("user-agent".to_string(), self.user_agent.clone()),
            ],
            body: None,
        }
    }

    pub fn build_edit(&self, media: &[u8], media_type: &str, job: &EditJob) -> Result<HttpRequest> {
        let (content_type, body) = encode_edit(media, media_type, job)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}edit", self.base_url),
            headers: vec![
                ("content-type".to_string(), content_type),
                ("user-agent".to_string(), self.user_agent.clone()),
            ],
            body: Some(body),
        })
    }

    pub fn build_user(&self) -> HttpRequest {
        self.get("user")
    }

    pub fn build_commands(&self) -> HttpRequest {
        self.get("commands")
    }

    /// `name` is percent-encoded so it always stays a single path segment.
    pub fn build_get_command(&self, name: &str) -> HttpRequest {
        self.get(&format!("commands/{}", urlencoding::encode(name)))
    }

    /// The edited media, byte for byte.
    pub fn parse_edit(&self, response: HttpResponse) -> Result<Vec<u8>> {
        classify(&response)?;
        Ok(response.body)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<UserStats> {
        classify(&response)?;
        serde_json::from_slice(&response.body).map_err(ApiError::Decode)
    }

    pub fn parse_commands(&self, response: HttpResponse) -> Result<Vec<Command>> {
        classify(&response)?;
        let mut payload: Value = serde_json::from_slice(&response.body).map_err(ApiError::Decode)?;
        let Some(commands) = payload.get_mut("commands").map(Value::take) else {
            return Err(ApiError::UnrecognizedPayload {
                missing: "commands",
                response,
            });
        };
        serde_json::from_value(commands).map_err(ApiError::Decode)
    }

    pub fn parse_get_command(&self, response: HttpResponse) -> Result<Command> {
        classify(&response)?;
        serde_json::from_slice(&response.body).map_err(ApiError::Decode)
    }
}

/// Map a response status to success or the matching `ApiError`.
///
/// 2xx passes, 429 is `RateLimited`, anything else is `RemoteFailure`.
pub fn classify(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }

    let reason = response.reason().unwrap_or_default().to_string();
    if response.status == 429 {
        let retry_after = response
            .header("retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(std::time::Duration::from_secs);
        warn!(?retry_after, "rate limited by the API");
        return Err(ApiError::RateLimited {
            status: 429,
            reason,
            retry_after,
            response: response.clone(),
        });
    }

    debug!(status = response.status, %reason, "API returned an error status");
    Err(ApiError::RemoteFailure {
        status: response.status,
        reason,
        body: response.text(),
    })
}
