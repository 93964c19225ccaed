//! Client library for the shitposts media-editing API.
//!
//! # Overview
//! Four operations (`edit`, `user`, `commands`, `get_command`) in two calling
//! conventions: [`ShitpostingSession`] (async, `reqwest`) and
//! [`BlockingShitpostingSession`] (blocking, `ureq`). Both are thin shells
//! around the I/O-free `shitposts-core` crate, which builds requests,
//! classifies responses and decodes bodies.
//!
//! # Sessions
//! A session must be entered before use and exited afterwards; `open()`
//! returns a [`Scope`] guard that does both. A session created with `new` or
//! `owned` makes its own transport on enter and closes it on exit. One
//! created with `with_transport` borrows the caller's transport and never
//! closes it. Calling an operation outside enter/exit yields
//! [`ApiError::SessionNotReady`] without touching the network.
//!
//! There is no retry logic; back off on [`ApiError::RateLimited`] yourself.

pub mod blocking;
pub mod config;
pub mod lifecycle;
pub mod session;
pub mod transport;

pub use blocking::BlockingShitpostingSession;
pub use config::SessionConfig;
pub use lifecycle::{Async, Blocking, Scope, Scoped, Session};
pub use session::ShitpostingSession;
pub use transport::{AsyncTransport, BlockingTransport, Connect};

pub use shitposts_core::{
    ApiError, Command, EditDirective, EditJob, HttpMethod, HttpRequest, HttpResponse, ParameterDescriptor, Result,
    TransportError, UserStats, DEFAULT_ENDPOINT,
};
