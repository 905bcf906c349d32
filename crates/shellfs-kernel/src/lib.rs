//! # shellfs-kernel
//!
//! File editing for environments reachable only through a shell.
//!
//! A container or sandbox that exposes nothing but "run this command" can
//! still be edited like a filesystem. The kernel compiles file operations
//! into shell text and interprets what comes back:
//! - Reads are numbered with `nl` and windowed with `tail`/`head`
//! - Writes travel as base64 so any text survives the command line
//! - Edits are literal `sed` substitutions guarded by a `.bak` copy
//! - Metadata comes from GNU or BSD `stat` plus `file`
//!
//! ```no_run
//! use std::sync::Arc;
//! use shellfs_kernel::{RemoteFileEditor, ShellChannel};
//!
//! # async fn demo() -> Result<(), shellfs_kernel::FileOpError> {
//! let editor = RemoteFileEditor::new(Arc::new(ShellChannel::docker_exec("sandbox")));
//! editor.write("/work/hello.txt", "hello\n").await?;
//! editor.edit("/work/hello.txt", "hello", "goodbye", false).await?;
//! println!("{}", editor.read("/work/hello.txt", None, None).await?);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod editor;
pub mod file_tools;
pub mod tools;

pub use channel::{
    ChannelError, ChannelResult, CommandChannel, CommandOutput, OutputClass, ShellChannel,
};
pub use config::{ChannelConfig, ConfigError, EditorConfig};
pub use editor::{
    EditPhase, EditSpec, FileAction, FileMetadata, FileOpError, FileOpResult, MetadataEntry,
    RemoteFileEditor,
};
pub use file_tools::{
    EditEngine, MetadataEngine, MultiEditEngine, ReadEngine, WriteEngine, register_file_tools,
};
pub use tools::{ExecResult, ExecutionEngine, ToolInfo, ToolRegistry};
