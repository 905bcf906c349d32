//! Command execution channel.
//!
//! The editor never touches a filesystem directly. Every operation is
//! compiled to shell text and handed to a [`CommandChannel`], which runs it
//! somewhere (a local shell, a container, a remote sandbox) and returns the
//! combined output and exit status.
//!
//! - [`CommandChannel`] - the transport trait, injected into the editor
//! - [`CommandOutput`] - output text + exit code, with not-found classification
//! - [`ShellChannel`] - `sh -s` locally or through `docker exec`

mod error;
mod shell;

use std::time::Duration;

use async_trait::async_trait;

pub use error::{ChannelError, ChannelResult};
pub use shell::ShellChannel;

/// Filesystem diagnostics that mean "the path does not exist", whatever the exit code.
pub const NOT_FOUND_MARKERS: &[&str] = &["No such file or directory", "cannot open"];

/// Transport that runs a shell command in the target environment.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Run `command` and wait at most `timeout` for it to finish.
    ///
    /// Implementations must merge stderr into the returned output closely
    /// enough that not-found diagnostics are visible, and must terminate
    /// the command when the timeout elapses.
    async fn execute(&self, command: &str, timeout: Duration) -> ChannelResult<CommandOutput>;
}

/// How a finished command should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputClass {
    /// Exit 0 and no not-found marker.
    Success,
    /// Output carried a not-found marker.
    NotFound,
    /// Nonzero exit without a not-found marker.
    Failed,
}

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr.
    pub output: String,
    /// Exit status (0 = success).
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    /// Successful command with the given output.
    pub fn success(output: impl Into<String>) -> Self {
        Self::new(output, 0)
    }

    /// True if the output contains any not-found marker.
    pub fn is_not_found(&self) -> bool {
        NOT_FOUND_MARKERS
            .iter()
            .any(|marker| self.output.contains(marker))
    }

    /// Classify the result. The not-found check takes priority over the exit code.
    pub fn classify(&self) -> OutputClass {
        if self.is_not_found() {
            OutputClass::NotFound
        } else if self.exit_code != 0 {
            OutputClass::Failed
        } else {
            OutputClass::Success
        }
    }
}
