//! Transport ownership and scoped acquisition shared by both session kinds.
//!
//! A session either owns its transport (created on enter, closed on exit) or
//! borrows one from the caller (never closed). Ownership is decided at
//! construction and does not change. Whichever it is, operations are only
//! allowed between enter and exit.

use std::marker::PhantomData;
use std::ops::Deref;

use shitposts_core::{ApiError, Result, ShitpostClient};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::transport::Connect;

enum Slot<'t, T> {
    Borrowed { transport: &'t T, active: bool },
    Owned(Option<T>),
}

pub(crate) struct TransportSlot<'t, T> {
    slot: Slot<'t, T>,
}

impl<'t, T: Connect> TransportSlot<'t, T> {
    pub(crate) fn owned() -> Self {
        Self { slot: Slot::Owned(None) }
    }

    pub(crate) fn borrowed(transport: &'t T) -> Self {
        Self {
            slot: Slot::Borrowed {
                transport,
                active: false,
            },
        }
    }

    pub(crate) fn is_borrowed(&self) -> bool {
        matches!(self.slot, Slot::Borrowed { .. })
    }

    /// Create the transport if owned and absent; activate it if borrowed.
    /// Calling it again while entered changes nothing.
    pub(crate) fn acquire(&mut self, config: &SessionConfig) -> Result<()> {
        match &mut self.slot {
            Slot::Borrowed { active, .. } => *active = true,
            Slot::Owned(transport) => {
                if transport.is_none() {
                    *transport = Some(T::connect(config).map_err(ApiError::Transport)?);
                    debug!(endpoint = %config.endpoint, "created session transport");
                }
            }
        }
        Ok(())
    }

    /// Close an owned transport, or just deactivate a borrowed one.
    ///
    /// Never fails: a close error is logged and dropped.
    pub(crate) fn release(&mut self) {
        match &mut self.slot {
            Slot::Borrowed { active, .. } => *active = false,
            Slot::Owned(transport) => {
                if let Some(transport) = transport.take() {
                    match transport.close() {
                        Ok(()) => debug!("closed session transport"),
                        Err(error) => warn!(%error, "failed to close session transport"),
                    }
                }
            }
        }
    }

    /// The live transport, or `SessionNotReady`.
    pub(crate) fn get(&self) -> Result<&T> {
        match &self.slot {
            Slot::Borrowed { transport, active: true } => Ok(*transport),
            Slot::Owned(Some(transport)) => Ok(transport),
            _ => Err(ApiError::SessionNotReady),
        }
    }
}

/// Calling convention of a [`Session`]: operations are `async fn`s.
pub enum Async {}

/// Calling convention of a [`Session`]: operations block the calling thread.
pub enum Blocking {}

/// Session state shared by both calling conventions. Use it through
/// [`crate::ShitpostingSession`] or [`crate::BlockingShitpostingSession`];
/// `M` only selects which set of operations is available.
pub struct Session<'t, T, M> {
    pub(crate) config: SessionConfig,
    pub(crate) client: ShitpostClient,
    pub(crate) transport: TransportSlot<'t, T>,
    mode: PhantomData<M>,
}

impl<'t, T: Connect, M> Session<'t, T, M> {
    /// A session that creates and closes its own transport.
    pub fn owned(config: SessionConfig) -> Self {
        Self::with_slot(config, TransportSlot::owned())
    }

    /// A session over a caller-provided transport. The session never closes
    /// it; the caller keeps using it after the session ends.
    pub fn with_transport(config: SessionConfig, transport: &'t T) -> Self {
        Self::with_slot(config, TransportSlot::borrowed(transport))
    }

    fn with_slot(config: SessionConfig, transport: TransportSlot<'t, T>) -> Self {
        Self {
            client: config.client(),
            config,
            transport,
            mode: PhantomData,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_borrowed(&self) -> bool {
        self.transport.is_borrowed()
    }

    pub fn is_ready(&self) -> bool {
        self.transport.get().is_ok()
    }

    /// Make the session usable. Re-entering an entered session is a no-op;
    /// entering after `exit` starts over with a fresh owned transport.
    pub fn enter(&mut self) -> Result<&mut Self> {
        self.transport.acquire(&self.config)?;
        Ok(self)
    }

    /// End the session. Owned transports are closed, borrowed ones left as is.
    pub fn exit(&mut self) {
        self.transport.release();
    }

    /// Enter and return a guard that exits when dropped.
    pub fn open(&mut self) -> Result<Scope<'_, Self>> {
        self.enter()?;
        Ok(Scope::new(self))
    }
}

impl<T: Connect, M> Scoped for Session<'_, T, M> {
    fn exit(&mut self) {
        Session::exit(self);
    }
}

/// Implemented by sessions so a [`Scope`] can end them.
pub trait Scoped {
    fn exit(&mut self);
}

/// Guard returned by `open()`. Derefs to the session and exits it when
/// dropped, including on early return, panic, or a cancelled future.
pub struct Scope<'s, S: Scoped> {
    session: &'s mut S,
}

impl<'s, S: Scoped> Scope<'s, S> {
    pub(crate) fn new(session: &'s mut S) -> Self {
        Self { session }
    }
}

impl<S: Scoped> Deref for Scope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.session
    }
}

impl<S: Scoped> Drop for Scope<'_, S> {
    fn drop(&mut self) {
        self.session.exit();
    }
}
