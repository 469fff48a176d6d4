//! Interface to the remote timer authority.

use std::future::Future;

use crate::types::{TickReport, TimerState};

/// Failures talking to the authority.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// Connection, timeout, or non-JSON HTTP failure
    #[error("通信エラー: {0}")]
    Transport(String),

    /// The authority answered with `status = "error"`
    #[error("{0}")]
    Rejected(String),

    /// The body did not match the expected shape
    #[error("不正なレスポンス: {0}")]
    Protocol(String),
}

impl AuthorityError {
    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Source of truth for the timer.
///
/// The authority owns the countdown; it only advances when ticked.
/// Implementations must be shareable with the spawned tick loop.
pub trait TimerAuthority: Send + Sync + 'static {
    /// Reads the current timer state.
    fn read(&self) -> impl Future<Output = Result<TimerState, AuthorityError>> + Send;

    /// Switches the timer to running. Returns the authority's message.
    fn start(&self) -> impl Future<Output = Result<String, AuthorityError>> + Send;

    /// Advances the timer by one second.
    fn tick(&self) -> impl Future<Output = Result<TickReport, AuthorityError>> + Send;

    /// Stops the timer and rewinds the current mode. Returns the authority's message.
    fn reset(&self) -> impl Future<Output = Result<String, AuthorityError>> + Send;
}
