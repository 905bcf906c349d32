//! Editor and channel configuration.
//!
//! Both structs deserialize from TOML with every field optional:
//!
//! ```toml
//! command_timeout_secs = 30
//! metadata_path_limit = 10
//! backup_suffix = ".bak"
//! restore_on_failure = true
//! detect_no_match = false
//!
//! [channel]
//! program = "sh"
//! args = ["-s"]
//! # container = "sandbox"   # run through `docker exec -i sandbox sh -s`
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default per-command timeout.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Default number of paths probed by one metadata call.
pub const DEFAULT_METADATA_PATH_LIMIT: usize = 10;

/// Default suffix for the transient edit backup.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Behaviour knobs for [`RemoteFileEditor`](crate::RemoteFileEditor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Timeout applied to every remote command.
    pub command_timeout_secs: u64,

    /// Paths beyond this count are ignored by metadata queries.
    pub metadata_path_limit: usize,

    /// Suffix appended to the target path for the edit backup.
    pub backup_suffix: String,

    /// Move the backup back over the target when a substitution fails.
    pub restore_on_failure: bool,

    /// Compare against the backup after substituting and report a no-match
    /// error when nothing changed.
    pub detect_no_match: bool,

    /// Transport used by [`ShellChannel::from_config`](crate::ShellChannel::from_config).
    pub channel: ChannelConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            metadata_path_limit: DEFAULT_METADATA_PATH_LIMIT,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            restore_on_failure: true,
            detect_no_match: false,
            channel: ChannelConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded editor config");
        Ok(config)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_metadata_path_limit(mut self, limit: usize) -> Self {
        self.metadata_path_limit = limit;
        self
    }

    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    pub fn with_restore_on_failure(mut self, restore: bool) -> Self {
        self.restore_on_failure = restore;
        self
    }

    pub fn with_detect_no_match(mut self, detect: bool) -> Self {
        self.detect_no_match = detect;
        self
    }
}

/// Which shell the channel spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Shell program.
    pub program: String,

    /// Arguments placed before the command text.
    pub args: Vec<String>,

    /// Run inside this container via `docker exec` instead of `program`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-s".to_string()],
            container: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.metadata_path_limit, 10);
        assert_eq!(config.backup_suffix, ".bak");
        assert!(config.restore_on_failure);
        assert!(!config.detect_no_match);
        assert_eq!(config.channel.program, "sh");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = EditorConfig::from_toml_str(
            r#"
            command_timeout_secs = 5
            restore_on_failure = false

            [channel]
            container = "sandbox"
            "#,
        )
        .unwrap();
        assert_eq!(config.command_timeout_secs, 5);
        assert!(!config.restore_on_failure);
        assert_eq!(config.metadata_path_limit, 10);
        assert_eq!(config.channel.container.as_deref(), Some("sandbox"));
        assert_eq!(config.channel.program, "sh");
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("command_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shellfs.toml");
        std::fs::write(&path, "backup_suffix = \".orig\"\n").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.backup_suffix, ".orig");
    }

    #[test]
    fn test_builders() {
        let config = EditorConfig::default()
            .with_command_timeout(Duration::from_secs(3))
            .with_metadata_path_limit(2)
            .with_detect_no_match(true);
        assert_eq!(config.command_timeout_secs, 3);
        assert_eq!(config.metadata_path_limit, 2);
        assert!(config.detect_no_match);
    }
}
