//! EditEngine and MultiEditEngine: literal string replacement.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::editor::{EditSpec, RemoteFileEditor};
use crate::tools::{ExecResult, ExecutionEngine};

/// Engine for editing files via literal string replacement.
pub struct EditEngine {
    editor: Arc<RemoteFileEditor>,
}

impl EditEngine {
    pub fn new(editor: Arc<RemoteFileEditor>) -> Self {
        Self { editor }
    }
}

#[derive(Deserialize)]
struct EditParams {
    path: String,
    old_string: String,
    new_string: String,
    #[serde(default)]
    replace_all: bool,
}

#[async_trait]
impl ExecutionEngine for EditEngine {
    fn name(&self) -> &str {
        "edit"
    }

    fn description(&self) -> &str {
        "Edit a file by literal string replacement"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path to edit"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to find (regex characters are literal)"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences (default: false, first occurrence only)",
                    "default": false
                }
            },
            "required": ["path", "old_string", "new_string"]
        }))
    }

    #[tracing::instrument(skip(self, params), name = "engine.edit")]
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: EditParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(1, format!("Invalid params: {}", e))),
        };

        Ok(self
            .editor
            .edit(&p.path, &p.old_string, &p.new_string, p.replace_all)
            .await
            .into())
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Engine applying an ordered batch of replacements to one file.
pub struct MultiEditEngine {
    editor: Arc<RemoteFileEditor>,
}

impl MultiEditEngine {
    pub fn new(editor: Arc<RemoteFileEditor>) -> Self {
        Self { editor }
    }
}

#[derive(Deserialize)]
struct MultiEditParams {
    path: String,
    edits: Vec<EditSpec>,
}

#[async_trait]
impl ExecutionEngine for MultiEditEngine {
    fn name(&self) -> &str {
        "multi_edit"
    }

    fn description(&self) -> &str {
        "Apply several literal replacements to one file, in order"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path to edit"
                },
                "edits": {
                    "type": "array",
                    "description": "Replacements applied in order; each sees the result of the previous one",
                    "items": {
                        "type": "object",
                        "properties": {
                            "old_string": { "type": "string" },
                            "new_string": { "type": "string" },
                            "replace_all": { "type": "boolean", "default": false }
                        },
                        "required": ["old_string", "new_string"]
                    }
                }
            },
            "required": ["path", "edits"]
        }))
    }

    #[tracing::instrument(skip(self, params), name = "engine.multi_edit")]
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: MultiEditParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(1, format!("Invalid params: {}", e))),
        };

        Ok(self.editor.multi_edit(&p.path, &p.edits).await.into())
    }

    async fn is_available(&self) -> bool {
        true
    }
}
