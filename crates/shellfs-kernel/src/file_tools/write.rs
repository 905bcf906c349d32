//! WriteEngine: create or overwrite a remote file.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::editor::RemoteFileEditor;
use crate::tools::{ExecResult, ExecutionEngine};

/// Engine for writing/creating files.
pub struct WriteEngine {
    editor: Arc<RemoteFileEditor>,
}

impl WriteEngine {
    pub fn new(editor: Arc<RemoteFileEditor>) -> Self {
        Self { editor }
    }
}

#[derive(Deserialize)]
struct WriteParams {
    path: String,
    content: String,
}

#[async_trait]
impl ExecutionEngine for WriteEngine {
    fn name(&self) -> &str {
        "write"
    }

    fn description(&self) -> &str {
        "Write or create a file with the given content"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path to write; parent directories are created"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content to write"
                }
            },
            "required": ["path", "content"]
        }))
    }

    #[tracing::instrument(skip(self, params), name = "engine.write")]
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: WriteParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(1, format!("Invalid params: {}", e))),
        };

        Ok(self.editor.write(&p.path, &p.content).await.into())
    }

    async fn is_available(&self) -> bool {
        true
    }
}
