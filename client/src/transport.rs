//! Transport seams and the two shipped backends.
//!
//! A transport executes one plain-data `HttpRequest` and hands back the
//! status, headers and full body. It never interprets the status; that is
//! left to `shitposts_core::classify`, so both backends classify identically.
//!
//! - `reqwest::Client` implements [`AsyncTransport`] for the concurrent mode.
//! - `ureq::Agent` implements [`BlockingTransport`] for the sequential mode.

use async_trait::async_trait;
use shitposts_core::{HttpMethod, HttpRequest, HttpResponse, TransportError};

use crate::config::SessionConfig;

/// How a session creates and destroys a transport it owns.
pub trait Connect: Sized {
    fn connect(config: &SessionConfig) -> Result<Self, TransportError>;

    /// Release the transport. Only ever called for transports the session
    /// created itself.
    fn close(self) -> Result<(), TransportError> {
        drop(self);
        Ok(())
    }
}

/// Non-blocking transport; suspends only while sending and receiving.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport that blocks the calling thread for the whole round-trip.
pub trait BlockingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

fn collect_headers(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// reqwest
// ---------------------------------------------------------------------------

impl Connect for reqwest::Client {
    fn connect(config: &SessionConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl AsyncTransport for reqwest::Client {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.get(request.url.as_str()),
            HttpMethod::Post => self.post(request.url.as_str()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}

// ---------------------------------------------------------------------------
// ureq
// ---------------------------------------------------------------------------

impl Connect for ureq::Agent {
    fn connect(config: &SessionConfig) -> Result<Self, TransportError> {
        Ok(ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .build()
            .new_agent())
    }
}

impl BlockingTransport for ureq::Agent {
    /// Status-as-error is switched off per request, so borrowed agents with
    /// the ureq default still return 4xx/5xx responses as data.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.config().http_status_as_error(false).build().call()?
            }
            HttpMethod::Post => {
                let mut builder = self.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
                    .config()
                    .http_status_as_error(false)
                    .build()
                    .send(request.body.as_deref().unwrap_or_default())?
            }
        };

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

        Ok(HttpResponse { status, headers, body })
    }
}
