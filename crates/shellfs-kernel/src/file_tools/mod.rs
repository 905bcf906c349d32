//! File-level tools backed by the remote editor.
//!
//! Provides read, write, edit, multi_edit, and file_metadata tools that
//! take JSON parameters and run through a shared [`RemoteFileEditor`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Model / Agent runtime           │
//! └────────────────────┬────────────────────┘
//!                      │ Tool calls (JSON params)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         File Tool Engines               │
//! │ (read, write, edit, multi_edit, meta)   │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         RemoteFileEditor                │
//! │  quoting · sed escaping · backups       │
//! └────────────────────┬────────────────────┘
//!                      │ shell text + timeout
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │  CommandChannel (sh -s / docker exec)   │
//! └─────────────────────────────────────────┘
//! ```

pub mod edit;
pub mod metadata;
pub mod read;
pub mod write;

use std::sync::Arc;

pub use edit::{EditEngine, MultiEditEngine};
pub use metadata::MetadataEngine;
pub use read::ReadEngine;
pub use write::WriteEngine;

use crate::editor::RemoteFileEditor;
use crate::tools::ToolRegistry;

/// Registry category for the file tools.
pub const FILE_TOOL_CATEGORY: &str = "file";

/// Register all file tools against one shared editor.
pub fn register_file_tools(registry: &mut ToolRegistry, editor: Arc<RemoteFileEditor>) {
    registry.register_engine(FILE_TOOL_CATEGORY, Arc::new(ReadEngine::new(editor.clone())));
    registry.register_engine(FILE_TOOL_CATEGORY, Arc::new(WriteEngine::new(editor.clone())));
    registry.register_engine(FILE_TOOL_CATEGORY, Arc::new(EditEngine::new(editor.clone())));
    registry.register_engine(FILE_TOOL_CATEGORY, Arc::new(MultiEditEngine::new(editor.clone())));
    registry.register_engine(FILE_TOOL_CATEGORY, Arc::new(MetadataEngine::new(editor)));
}
