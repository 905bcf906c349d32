//! Editor error types.

use thiserror::Error;

use crate::channel::ChannelError;

/// Which kind of file operation produced a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FileAction {
    Reading,
    Writing,
    Editing,
}

/// Editor error type.
#[derive(Debug, Error)]
pub enum FileOpError {
    /// Target path does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A command exited nonzero; `output` is the raw diagnostic text.
    #[error("Error {action} file: {output}")]
    CommandFailed { action: FileAction, output: String },

    /// Substitution left the file unchanged.
    #[error("No matches found in {path}")]
    NoMatch { path: String },

    /// Edit parameters were rejected before any command ran.
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    /// One edit of a multi-edit batch failed; `index` is 1-based.
    #[error("Error on edit {index}: {source}")]
    BatchFailed {
        index: usize,
        #[source]
        source: Box<FileOpError>,
    },

    /// The channel could not run a command (spawn failure, timeout).
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl FileOpError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a CommandFailed error.
    pub fn command_failed(action: FileAction, output: impl Into<String>) -> Self {
        Self::CommandFailed {
            action,
            output: output.into(),
        }
    }

    /// Create an InvalidEdit error.
    pub fn invalid_edit(msg: impl Into<String>) -> Self {
        Self::InvalidEdit(msg.into())
    }

    /// True for errors a multi-edit batch tolerates and continues past.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }

    /// True if the target path was missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::BatchFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Editor result type.
pub type FileOpResult<T> = Result<T, FileOpError>;
