//! I/O-free core of the shitposts media-editing API client.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The `shitposts` crate wraps
//! this core with session lifecycle management and two transports.
//!
//! # Design
//! - `ShitpostClient` is stateless; it holds only the base URL and user agent.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and both transports share one implementation of
//!   status classification and decoding.
//! - The edit upload is encoded as `multipart/form-data` by `multipart`.

pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod types;

pub use client::{classify, ShitpostClient, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
pub use error::{ApiError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Command, EditDirective, EditJob, ParameterDescriptor, UserStats};
