//! MetadataEngine: size, owner, permissions, and type of several paths.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::editor::RemoteFileEditor;
use crate::tools::{ExecResult, ExecutionEngine};

/// Engine for probing file metadata.
pub struct MetadataEngine {
    editor: Arc<RemoteFileEditor>,
}

impl MetadataEngine {
    pub fn new(editor: Arc<RemoteFileEditor>) -> Self {
        Self { editor }
    }
}

#[derive(Deserialize)]
struct MetadataParams {
    paths: Vec<String>,
    /// Return JSON entries instead of the text report.
    #[serde(default)]
    json: bool,
}

#[async_trait]
impl ExecutionEngine for MetadataEngine {
    fn name(&self) -> &str {
        "file_metadata"
    }

    fn description(&self) -> &str {
        "Show size, owner, permissions, and type for up to 10 paths"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "paths": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Paths to inspect; only the first 10 are probed"
                },
                "json": {
                    "type": "boolean",
                    "description": "Return structured JSON instead of text (default: false)",
                    "default": false
                }
            },
            "required": ["paths"]
        }))
    }

    #[tracing::instrument(skip(self, params), name = "engine.file_metadata")]
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: MetadataParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(1, format!("Invalid params: {}", e))),
        };

        if p.json {
            let entries = self.editor.metadata(&p.paths).await;
            return Ok(ExecResult::success(serde_json::to_string_pretty(&entries)?));
        }

        Ok(ExecResult::success(self.editor.metadata_report(&p.paths).await))
    }

    async fn is_available(&self) -> bool {
        true
    }
}
