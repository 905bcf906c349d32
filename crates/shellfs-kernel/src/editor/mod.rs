//! Remote file editing over a command channel.
//!
//! [`RemoteFileEditor`] turns read / write / edit / multi-edit / metadata
//! requests into shell commands and interprets their output. It holds no
//! state beyond the injected channel, its config, and a per-path lock table.
//!
//! ## Command protocol
//!
//! - **read** - `nl -ba`, windowed with `tail -n +N` / `head -n N`
//! - **write** - `mkdir -p` of the parent, then base64 piped through `base64 -d`
//! - **edit** - backup to `<path>.bak`, `sed -i`, then remove or restore the backup
//! - **metadata** - `stat` (GNU, then BSD format) plus `file -b`

mod edit;
mod error;
mod locks;
mod metadata;
pub mod shell;

use std::sync::Arc;

use crate::channel::{ChannelResult, CommandChannel, CommandOutput, OutputClass};
use crate::config::EditorConfig;

pub use edit::{EditPhase, EditSpec};
pub use error::{FileAction, FileOpError, FileOpResult};
pub use locks::PathLocks;
pub use metadata::{FileMetadata, MetadataEntry, parse_metadata_output};

/// Reads, writes, and edits files through a [`CommandChannel`].
pub struct RemoteFileEditor {
    channel: Arc<dyn CommandChannel>,
    config: EditorConfig,
    locks: PathLocks,
}

impl std::fmt::Debug for RemoteFileEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFileEditor")
            .field("config", &self.config)
            .field("locked_paths", &self.locks.len())
            .finish()
    }
}

impl RemoteFileEditor {
    /// Create an editor with the default config.
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self::with_config(channel, EditorConfig::default())
    }

    pub fn with_config(channel: Arc<dyn CommandChannel>, config: EditorConfig) -> Self {
        Self {
            channel,
            config,
            locks: PathLocks::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Run one command with the configured timeout.
    async fn run(&self, command: &str) -> ChannelResult<CommandOutput> {
        tracing::trace!(command, "remote command");
        self.channel
            .execute(command, self.config.command_timeout())
            .await
    }

    /// Read a file with 1-based line numbers.
    ///
    /// With `offset` and/or `limit` only the window `[offset, offset + limit)`
    /// is returned, numbered from `offset`.
    #[tracing::instrument(skip(self), name = "editor.read")]
    pub async fn read(
        &self,
        path: &str,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> FileOpResult<String> {
        let out = self.run(&shell::read_command(path, offset, limit)).await?;

        match out.classify() {
            OutputClass::NotFound => Err(FileOpError::not_found(path)),
            OutputClass::Failed if !out.output.is_empty() => {
                Err(FileOpError::command_failed(FileAction::Reading, out.output))
            }
            _ => Ok(out.output),
        }
    }

    /// Create or overwrite a file, creating parent directories as needed.
    #[tracing::instrument(skip(self, content), name = "editor.write", fields(bytes = content.len()))]
    pub async fn write(&self, path: &str, content: &str) -> FileOpResult<String> {
        let _guard = self.locks.lock(path).await;

        // A failed mkdir surfaces through the write itself.
        if let Some(dir) = shell::parent_dir(path) {
            match self.run(&shell::mkdir_command(dir)).await {
                Ok(out) if out.exit_code != 0 => {
                    tracing::debug!(dir, output = %out.output.trim(), "mkdir failed");
                }
                Err(e) => tracing::debug!(dir, error = %e, "mkdir failed"),
                Ok(_) => {}
            }
        }

        let out = self.run(&shell::write_command(path, content)).await?;
        if out.exit_code != 0 {
            return Err(FileOpError::command_failed(FileAction::Writing, out.output));
        }

        Ok(format!("Successfully wrote to {}", path))
    }

    /// Probe metadata for up to `metadata_path_limit` paths.
    ///
    /// Never fails as a whole: missing paths and unparseable output become
    /// per-path entries.
    #[tracing::instrument(skip(self, paths), name = "editor.metadata", fields(requested = paths.len()))]
    pub async fn metadata<S: AsRef<str>>(&self, paths: &[S]) -> Vec<MetadataEntry> {
        let limit = self.config.metadata_path_limit;
        if paths.len() > limit {
            tracing::debug!(limit, ignored = paths.len() - limit, "metadata path limit reached");
        }

        let mut entries = Vec::with_capacity(paths.len().min(limit));
        for path in paths.iter().take(limit) {
            let path = path.as_ref();
            let entry = match self.run(&shell::metadata_command(path)).await {
                Ok(out) => parse_metadata_output(path, &out),
                Err(e) => MetadataEntry::unavailable(path, e.to_string()),
            };
            entries.push(entry);
        }
        entries
    }

    /// [`metadata`](Self::metadata) rendered as text blocks separated by blank lines.
    pub async fn metadata_report<S: AsRef<str>>(&self, paths: &[S]) -> String {
        self.metadata(paths)
            .await
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
