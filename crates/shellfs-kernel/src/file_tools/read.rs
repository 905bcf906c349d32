//! ReadEngine: numbered file reads with optional windowing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::editor::RemoteFileEditor;
use crate::tools::{ExecResult, ExecutionEngine};

/// Engine for reading remote files.
pub struct ReadEngine {
    editor: Arc<RemoteFileEditor>,
}

impl ReadEngine {
    pub fn new(editor: Arc<RemoteFileEditor>) -> Self {
        Self { editor }
    }
}

#[derive(Deserialize)]
struct ReadParams {
    path: String,
    offset: Option<usize>,
    limit: Option<usize>,
}

#[async_trait]
impl ExecutionEngine for ReadEngine {
    fn name(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        "Read file content with line numbers and optional line window"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "First line to return (1-based). Omit to read from the beginning."
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return. Omit for all lines."
                }
            },
            "required": ["path"]
        }))
    }

    #[tracing::instrument(skip(self, params), name = "engine.read")]
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: ReadParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(1, format!("Invalid params: {}", e))),
        };

        Ok(self.editor.read(&p.path, p.offset, p.limit).await.into())
    }

    async fn is_available(&self) -> bool {
        true
    }
}
