//! Channel error types.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to run a command at all.
///
/// A command that runs and exits nonzero is *not* a channel error; that is
/// reported through [`CommandOutput::exit_code`](super::CommandOutput).
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The command did not finish within its timeout and was terminated.
    #[error("command timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The shell process could not be started.
    #[error("failed to spawn shell: {0}")]
    Spawn(#[from] io::Error),

    /// The script could not be delivered to the shell.
    #[error("channel closed: {0}")]
    Closed(String),
}

impl ChannelError {
    /// Create a Closed error.
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Channel result type.
pub type ChannelResult<T> = Result<T, ChannelError>;
