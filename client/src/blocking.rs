//! Sequential (blocking) session over a [`BlockingTransport`].
//!
//! Same contract as [`crate::ShitpostingSession`]; each operation blocks the
//! calling thread for the duration of the request.

use shitposts_core::{ApiError, Command, EditJob, HttpRequest, HttpResponse, Result, UserStats};
use tracing::debug;

use crate::config::SessionConfig;
use crate::lifecycle::{Blocking, Session};
use crate::transport::{BlockingTransport, Connect};

/// Blocking client session for the shitposts API.
///
/// ```no_run
/// use shitposts::{BlockingShitpostingSession, SessionConfig};
///
/// let mut session = BlockingShitpostingSession::new(SessionConfig::default());
/// let scope = session.open()?;
/// for command in scope.commands()? {
///     println!("{}", command.name);
/// }
/// # Ok::<(), shitposts::ApiError>(())
/// ```
pub type BlockingShitpostingSession<'t, T = ureq::Agent> = Session<'t, T, Blocking>;

impl BlockingShitpostingSession<'static, ureq::Agent> {
    /// A session that creates its own `ureq::Agent` on enter.
    pub fn new(config: SessionConfig) -> Self {
        Self::owned(config)
    }
}

impl<T: BlockingTransport + Connect> BlockingShitpostingSession<'_, T> {
    pub fn edit(&self, media: &[u8], media_type: &str, job: &EditJob) -> Result<Vec<u8>> {
        let transport = self.transport.get()?;
        let request = self.client.build_edit(media, media_type, job)?;
        self.client.parse_edit(send(transport, request)?)
    }

    pub fn edit_with<I, N, P, K, V>(&self, media: &[u8], media_type: &str, edits: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.edit(media, media_type, &EditJob::from_named(edits))
    }

    pub fn user(&self) -> Result<UserStats> {
        let transport = self.transport.get()?;
        self.client.parse_user(send(transport, self.client.build_user())?)
    }

    pub fn commands(&self) -> Result<Vec<Command>> {
        let transport = self.transport.get()?;
        self.client.parse_commands(send(transport, self.client.build_commands())?)
    }

    pub fn get_command(&self, name: &str) -> Result<Command> {
        let transport = self.transport.get()?;
        self.client
            .parse_get_command(send(transport, self.client.build_get_command(name))?)
    }
}

fn send<T: BlockingTransport>(transport: &T, request: HttpRequest) -> Result<HttpResponse> {
    debug!(method = request.method.as_str(), url = %request.url, "sending request");
    transport.execute(request).map_err(ApiError::Transport)
}
