//! Concurrent (async) session over an [`AsyncTransport`].
//!
//! Operations suspend only while the transport sends and receives. Each
//! session has a single owner: lifecycle changes take `&mut self`, so they
//! cannot race with operations, which take `&self`.

use shitposts_core::{ApiError, Command, EditJob, HttpRequest, HttpResponse, Result, UserStats};
use tracing::debug;

use crate::config::SessionConfig;
use crate::lifecycle::{Async, Session};
use crate::transport::{AsyncTransport, Connect};

/// Async client session for the shitposts API.
///
/// ```no_run
/// # async fn run() -> shitposts::Result<()> {
/// use shitposts::{EditJob, SessionConfig, ShitpostingSession};
///
/// let mut session = ShitpostingSession::new(SessionConfig::default());
/// let scope = session.open()?;
/// let job = EditJob::new().with("caption", [("text", "when the")]);
/// let edited = scope.edit(b"GIF89a...", "image/gif", &job).await?;
/// # Ok(())
/// # }
/// ```
pub type ShitpostingSession<'t, T = reqwest::Client> = Session<'t, T, Async>;

impl ShitpostingSession<'static, reqwest::Client> {
    /// A session that creates its own `reqwest::Client` on enter.
    pub fn new(config: SessionConfig) -> Self {
        Self::owned(config)
    }
}

impl<T: AsyncTransport + Connect> ShitpostingSession<'_, T> {
    /// Upload `media` and apply `job` to it. Returns the edited media bytes.
    ///
    /// `media_type` must be a valid MIME type; it is not checked locally.
    pub async fn edit(&self, media: &[u8], media_type: &str, job: &EditJob) -> Result<Vec<u8>> {
        let transport = self.transport.get()?;
        let request = self.client.build_edit(media, media_type, job)?;
        self.client.parse_edit(send(transport, request).await?)
    }

    /// [`edit`](Self::edit) with named directives, each name paired with its
    /// parameters.
    pub async fn edit_with<I, N, P, K, V>(&self, media: &[u8], media_type: &str, edits: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.edit(media, media_type, &EditJob::from_named(edits)).await
    }

    pub async fn user(&self) -> Result<UserStats> {
        let transport = self.transport.get()?;
        self.client.parse_user(send(transport, self.client.build_user()).await?)
    }

    /// Commands the server can execute.
    pub async fn commands(&self) -> Result<Vec<Command>> {
        let transport = self.transport.get()?;
        self.client.parse_commands(send(transport, self.client.build_commands()).await?)
    }

    pub async fn get_command(&self, name: &str) -> Result<Command> {
        let transport = self.transport.get()?;
        self.client
            .parse_get_command(send(transport, self.client.build_get_command(name)).await?)
    }
}

async fn send<T: AsyncTransport>(transport: &T, request: HttpRequest) -> Result<HttpResponse> {
    debug!(method = request.method.as_str(), url = %request.url, "sending request");
    transport.execute(request).await.map_err(ApiError::Transport)
}
