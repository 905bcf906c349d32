//! Tool registry and execution engines.
//!
//! Engines expose editor operations as named tools taking JSON parameters,
//! so an agent runtime can call `read`, `write`, `edit`, `multi_edit`, and
//! `file_metadata` without linking against the editor API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::editor::FileOpResult;

// ============================================================================
// Tool Info
// ============================================================================

/// Information about a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Tool category (e.g., "file").
    pub category: String,
}

impl ToolInfo {
    /// Create a new tool info.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Result of running a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code (0 = success).
    pub exit_code: i32,
    /// Whether execution succeeded.
    pub success: bool,
}

impl ExecResult {
    /// Create a successful result.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
            success: false,
        }
    }

    /// The text a caller should see: stdout on success, stderr otherwise.
    pub fn message(&self) -> &str {
        if self.success { &self.stdout } else { &self.stderr }
    }

    /// `(text, is_error)` pair.
    pub fn into_report(self) -> (String, bool) {
        if self.success {
            (self.stdout, false)
        } else {
            (self.stderr, true)
        }
    }
}

impl From<FileOpResult<String>> for ExecResult {
    fn from(result: FileOpResult<String>) -> Self {
        match result {
            Ok(text) => Self::success(text),
            Err(e) => Self::failure(1, e.to_string()),
        }
    }
}

/// Trait for execution engines.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Get the engine name.
    fn name(&self) -> &str;

    /// Get the engine description.
    fn description(&self) -> &str;

    /// Execute with JSON parameters and return the result.
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult>;

    /// Check if this engine is available/ready.
    async fn is_available(&self) -> bool;

    /// Get the JSON Schema for tool input parameters.
    fn schema(&self) -> Option<serde_json::Value> {
        None // Default: no schema
    }
}

/// Registry of tools and execution engines.
#[derive(Default)]
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolInfo>,
    /// Execution engines by tool name.
    engines: HashMap<String, Arc<dyn ExecutionEngine>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools)
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with an execution engine.
    pub fn register_with_engine(&mut self, info: ToolInfo, engine: Arc<dyn ExecutionEngine>) {
        let name = info.name.clone();
        self.tools.insert(name.clone(), info);
        self.engines.insert(name, engine);
    }

    /// Register an engine under its own name and description.
    pub fn register_engine(&mut self, category: &str, engine: Arc<dyn ExecutionEngine>) {
        let info = ToolInfo::new(engine.name(), engine.description(), category);
        self.register_with_engine(info, engine);
    }

    /// Get a tool's info.
    pub fn get(&self, name: &str) -> Option<&ToolInfo> {
        self.tools.get(name)
    }

    /// Get an engine for a tool (returns it if registered).
    pub fn get_engine(&self, name: &str) -> Option<Arc<dyn ExecutionEngine>> {
        self.engines.get(name).cloned()
    }

    /// List all available tools.
    pub fn list(&self) -> Vec<&ToolInfo> {
        self.tools.values().collect()
    }

    /// Schemas of every registered engine, keyed by tool name.
    pub fn schemas(&self) -> serde_json::Map<String, serde_json::Value> {
        self.engines
            .iter()
            .filter_map(|(name, engine)| engine.schema().map(|s| (name.clone(), s)))
            .collect()
    }

    /// Execute a tool by name.
    pub async fn call(&self, name: &str, params: &str) -> anyhow::Result<ExecResult> {
        match self.get_engine(name) {
            Some(engine) => engine.execute(params).await,
            None => Ok(ExecResult::failure(1, format!("unknown tool: {}", name))),
        }
    }
}
