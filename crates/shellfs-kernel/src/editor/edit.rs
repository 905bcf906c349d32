//! Literal substring replacement with a transient backup.
//!
//! One edit walks these phases:
//!
//! ```text
//! Probing ──▶ BackedUp ──▶ Substituting ──▶ CleaningUp ──▶ Done
//!    │                          │                │
//!    ▼                          ▼                ▼
//! NotFound                  Restoring ──────▶ Failed
//! ```
//!
//! The probe copies the file to `<path>.bak`, which doubles as the
//! existence check. A failed substitution moves the backup back over the
//! file when `restore_on_failure` is set; otherwise the backup is removed.

use serde::{Deserialize, Serialize};

use super::error::{FileAction, FileOpError, FileOpResult};
use super::shell;
use super::RemoteFileEditor;
use crate::channel::OutputClass;

/// One replacement instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSpec {
    /// Literal text to find. Must not be empty or span lines.
    pub old_string: String,
    /// Literal replacement text.
    pub new_string: String,
    /// Replace every occurrence instead of the first.
    #[serde(default)]
    pub replace_all: bool,
}

impl EditSpec {
    pub fn new(old_string: impl Into<String>, new_string: impl Into<String>) -> Self {
        Self {
            old_string: old_string.into(),
            new_string: new_string.into(),
            replace_all: false,
        }
    }

    pub fn replace_all(mut self) -> Self {
        self.replace_all = true;
        self
    }

    fn validate(&self) -> FileOpResult<()> {
        if self.old_string.is_empty() {
            return Err(FileOpError::invalid_edit("old_string must not be empty"));
        }
        // sed reads one line at a time, so a pattern spanning lines never matches.
        if self.old_string.contains('\n') {
            return Err(FileOpError::invalid_edit("old_string must not contain a newline"));
        }
        Ok(())
    }

    fn target(&self) -> &'static str {
        if self.replace_all {
            "all occurrences"
        } else {
            "first occurrence"
        }
    }
}

/// Phase of a single edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EditPhase {
    Probing,
    BackedUp,
    Substituting,
    Restoring,
    CleaningUp,
    Done,
    Failed,
}

impl RemoteFileEditor {
    /// Replace `old_string` with `new_string` in `path`.
    ///
    /// Both strings are literal text. Without `replace_all` only the first
    /// occurrence in the file changes. A replacement that matches nothing
    /// succeeds unless `detect_no_match` is configured.
    #[tracing::instrument(skip(self, old_string, new_string), name = "editor.edit")]
    pub async fn edit(
        &self,
        path: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
    ) -> FileOpResult<String> {
        let spec = EditSpec {
            old_string: old_string.to_string(),
            new_string: new_string.to_string(),
            replace_all,
        };
        spec.validate()?;

        let _guard = self.locks.lock(path).await;
        self.apply_edit(path, &spec).await
    }

    /// Apply `edits` in order, each against the result of the previous one.
    ///
    /// Returns one `Edit <n>: ...` line per edit. No-match failures are
    /// recorded and skipped; any other failure stops the batch with
    /// [`FileOpError::BatchFailed`] carrying the 1-based index. Edits applied
    /// before the failure stay applied.
    #[tracing::instrument(skip(self, edits), name = "editor.multi_edit", fields(edits = edits.len()))]
    pub async fn multi_edit(&self, path: &str, edits: &[EditSpec]) -> FileOpResult<String> {
        if edits.is_empty() {
            return Err(FileOpError::invalid_edit("no edits given"));
        }
        for (i, spec) in edits.iter().enumerate() {
            spec.validate().map_err(|e| FileOpError::BatchFailed {
                index: i + 1,
                source: Box::new(e),
            })?;
        }

        let _guard = self.locks.lock(path).await;

        let mut results = Vec::with_capacity(edits.len());
        for (i, spec) in edits.iter().enumerate() {
            let index = i + 1;
            match self.apply_edit(path, spec).await {
                Ok(msg) => results.push(format!("Edit {}: {}", index, msg)),
                Err(e) if e.is_no_match() => {
                    tracing::debug!(index, "edit matched nothing, continuing");
                    results.push(format!("Edit {}: {}", index, e));
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "multi-edit aborted");
                    return Err(FileOpError::BatchFailed {
                        index,
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(results.join("\n"))
    }

    /// Run the edit phases. Caller holds the path lock.
    async fn apply_edit(&self, path: &str, spec: &EditSpec) -> FileOpResult<String> {
        let backup = format!("{}{}", path, self.config.backup_suffix);
        let mut failure: Option<FileOpError> = None;
        let mut phase = EditPhase::Probing;

        loop {
            tracing::trace!(%phase, path, "edit phase");
            phase = match phase {
                EditPhase::Probing => {
                    let out = self.run(&shell::copy_command(path, &backup)).await?;
                    if out.classify() != OutputClass::Success {
                        return Err(FileOpError::not_found(path));
                    }
                    EditPhase::BackedUp
                }
                EditPhase::BackedUp => {
                    // Refresh the backup in case the file changed since the probe.
                    if let Err(e) = self.run(&shell::copy_command(path, &backup)).await {
                        tracing::debug!(error = %e, "backup refresh failed");
                    }
                    EditPhase::Substituting
                }
                EditPhase::Substituting => match self.substitute(path, &backup, spec).await {
                    Ok(()) => EditPhase::CleaningUp,
                    Err(e) => {
                        let restore = self.config.restore_on_failure && !e.is_no_match();
                        failure = Some(e);
                        if restore {
                            EditPhase::Restoring
                        } else {
                            EditPhase::CleaningUp
                        }
                    }
                },
                EditPhase::Restoring => {
                    match self.run(&shell::restore_command(&backup, path)).await {
                        Ok(out) if out.exit_code == 0 => {
                            tracing::info!(path, "restored file from backup after failed edit");
                        }
                        Ok(out) => {
                            tracing::warn!(path, backup = %backup, output = %out.output.trim(), "restore from backup failed");
                        }
                        Err(e) => {
                            tracing::warn!(path, backup = %backup, error = %e, "restore from backup failed");
                        }
                    }
                    EditPhase::Failed
                }
                EditPhase::CleaningUp => {
                    if let Err(e) = self.run(&shell::remove_command(&backup)).await {
                        tracing::debug!(error = %e, "backup cleanup failed");
                    }
                    if failure.is_some() {
                        EditPhase::Failed
                    } else {
                        EditPhase::Done
                    }
                }
                EditPhase::Done => {
                    return Ok(format!(
                        "Successfully replaced {} in {}",
                        spec.target(),
                        path
                    ));
                }
                EditPhase::Failed => {
                    return Err(failure.unwrap_or_else(|| {
                        FileOpError::command_failed(FileAction::Editing, "edit failed")
                    }));
                }
            };
        }
    }

    async fn substitute(&self, path: &str, backup: &str, spec: &EditSpec) -> FileOpResult<()> {
        let command =
            shell::substitute_command(path, &spec.old_string, &spec.new_string, spec.replace_all);
        let out = self.run(&command).await?;
        if out.exit_code != 0 {
            return Err(FileOpError::command_failed(FileAction::Editing, out.output));
        }

        if self.config.detect_no_match && spec.old_string != spec.new_string {
            let cmp = self.run(&shell::compare_command(path, backup)).await?;
            match cmp.exit_code {
                0 => {
                    return Err(FileOpError::NoMatch {
                        path: path.to_string(),
                    });
                }
                1 => {}
                _ => return Err(FileOpError::command_failed(FileAction::Editing, cmp.output)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::ScriptedChannel;
    use super::*;
    use crate::config::EditorConfig;

    fn editor(channel: &Arc<ScriptedChannel>) -> RemoteFileEditor {
        RemoteFileEditor::new(channel.clone())
    }

    #[test]
    fn test_edit_spec_from_json() {
        let spec: EditSpec =
            serde_json::from_str(r#"{"old_string": "a", "new_string": "b"}"#).unwrap();
        assert_eq!(spec, EditSpec::new("a", "b"));

        let spec: EditSpec =
            serde_json::from_str(r#"{"old_string": "a", "new_string": "b", "replace_all": true}"#)
                .unwrap();
        assert!(spec.replace_all);
    }

    #[tokio::test]
    async fn test_edit_command_sequence() {
        let channel = Arc::new(ScriptedChannel::new());
        let msg = editor(&channel)
            .edit("/w/a.txt", "foo", "bar", false)
            .await
            .unwrap();
        assert_eq!(msg, "Successfully replaced first occurrence in /w/a.txt");
        assert_eq!(
            channel.commands(),
            [
                "cp '/w/a.txt' '/w/a.txt.bak' 2>&1",
                "cp '/w/a.txt' '/w/a.txt.bak' 2>&1",
                "sed -i '0,/foo/s//bar/' '/w/a.txt' 2>&1",
                "rm -f '/w/a.txt.bak'",
            ]
        );
    }

    #[tokio::test]
    async fn test_edit_replace_all_message() {
        let channel = Arc::new(ScriptedChannel::new());
        let msg = editor(&channel).edit("a.txt", "x", "y", true).await.unwrap();
        assert_eq!(msg, "Successfully replaced all occurrences in a.txt");
        assert!(channel.commands()[2].contains("'s/x/y/g'"));
    }

    #[tokio::test]
    async fn test_edit_missing_file_stops_after_probe() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond("cp: cannot stat '/w/nope': No such file or directory\n", 1);

        let err = editor(&channel)
            .edit("/w/nope", "a", "b", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(channel.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_empty_old_string_runs_nothing() {
        let channel = Arc::new(ScriptedChannel::new());
        let err = editor(&channel).edit("/w/a", "", "b", false).await.unwrap_err();
        assert!(matches!(err, FileOpError::InvalidEdit(_)));
        assert!(channel.commands().is_empty());
    }

    #[tokio::test]
    async fn test_edit_multiline_old_string_runs_nothing() {
        let channel = Arc::new(ScriptedChannel::new());
        let err = editor(&channel).edit("/w/a", "a\nb", "x", false).await.unwrap_err();
        assert!(matches!(err, FileOpError::InvalidEdit(_)));
        assert!(err.to_string().contains("newline"));
        assert!(channel.commands().is_empty());

        let edits = [EditSpec::new("a", "b"), EditSpec::new("c\nd", "e")];
        let err = editor(&channel).multi_edit("/w/a", &edits).await.unwrap_err();
        assert!(matches!(err, FileOpError::BatchFailed { index: 2, .. }));
        assert!(channel.commands().is_empty());
    }

    #[tokio::test]
    async fn test_edit_failure_restores_backup() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond("", 0);
        channel.respond("", 0);
        channel.respond("sed: couldn't open temporary file", 4);

        let err = editor(&channel).edit("/w/a", "x", "y", false).await.unwrap_err();
        assert_eq!(err.to_string(), "Error editing file: sed: couldn't open temporary file");

        let commands = channel.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[3], "mv -f '/w/a.bak' '/w/a' 2>&1");
    }

    #[tokio::test]
    async fn test_edit_failure_without_restore_removes_backup() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond("", 0);
        channel.respond("", 0);
        channel.respond("sed: error", 1);

        let config = EditorConfig::default().with_restore_on_failure(false);
        let editor = RemoteFileEditor::with_config(channel.clone(), config);
        assert!(editor.edit("/w/a", "x", "y", false).await.is_err());
        assert_eq!(channel.commands()[3], "rm -f '/w/a.bak'");
    }

    #[tokio::test]
    async fn test_edit_timeout_during_substitution_restores() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond("", 0);
        channel.respond("", 0);
        channel.timeout();

        let err = editor(&channel).edit("/w/a", "x", "y", true).await.unwrap_err();
        assert!(matches!(err, FileOpError::Channel(_)));
        assert!(channel.commands()[3].starts_with("mv -f"));
    }

    #[tokio::test]
    async fn test_detect_no_match() {
        let channel = Arc::new(ScriptedChannel::new());
        // probe, refresh, sed, cmp (identical), rm
        channel.respond("", 0).respond("", 0).respond("", 0).respond("", 0);

        let config = EditorConfig::default().with_detect_no_match(true);
        let editor = RemoteFileEditor::with_config(channel.clone(), config);
        let err = editor.edit("/w/a", "x", "y", false).await.unwrap_err();
        assert!(err.is_no_match());

        let commands = channel.commands();
        assert_eq!(commands[3], "cmp -s '/w/a' '/w/a.bak'");
        assert_eq!(commands[4], "rm -f '/w/a.bak'");
    }

    #[tokio::test]
    async fn test_detect_no_match_compare_error_fails_edit() {
        let channel = Arc::new(ScriptedChannel::new());
        // probe, refresh, sed, cmp cannot read the backup, restore
        channel.respond("", 0).respond("", 0).respond("", 0);
        channel.respond("cmp: /w/a.bak: No such file or directory\n", 2);

        let config = EditorConfig::default().with_detect_no_match(true);
        let editor = RemoteFileEditor::with_config(channel.clone(), config);
        let err = editor.edit("/w/a", "x", "y", false).await.unwrap_err();
        assert!(!err.is_no_match());
        assert!(matches!(
            err,
            FileOpError::CommandFailed {
                action: FileAction::Editing,
                ..
            }
        ));
        assert_eq!(channel.commands()[4], "mv -f '/w/a.bak' '/w/a' 2>&1");
    }

    #[tokio::test]
    async fn test_multi_edit_success_lines() {
        let channel = Arc::new(ScriptedChannel::new());
        let edits = [EditSpec::new("a", "b"), EditSpec::new("c", "d").replace_all()];

        let report = editor(&channel).multi_edit("/w/f", &edits).await.unwrap();
        assert_eq!(
            report,
            "Edit 1: Successfully replaced first occurrence in /w/f\n\
             Edit 2: Successfully replaced all occurrences in /w/f"
        );
        assert_eq!(channel.commands().len(), 8);
    }

    #[tokio::test]
    async fn test_multi_edit_aborts_with_index() {
        let channel = Arc::new(ScriptedChannel::new());
        // Edit 1 succeeds (4 commands), edit 2 fails in sed.
        for _ in 0..4 {
            channel.respond("", 0);
        }
        channel.respond("", 0).respond("", 0).respond("sed: bad", 1);

        let edits = [
            EditSpec::new("a", "b"),
            EditSpec::new("c", "d"),
            EditSpec::new("e", "f"),
        ];
        let err = editor(&channel).multi_edit("/w/f", &edits).await.unwrap_err();
        let FileOpError::BatchFailed { index, .. } = &err else {
            panic!("expected BatchFailed, got {:?}", err);
        };
        assert_eq!(*index, 2);
        assert_eq!(err.to_string(), "Error on edit 2: Error editing file: sed: bad");
        // Third edit never ran: 4 + probe + refresh + sed + restore.
        assert_eq!(channel.commands().len(), 8);
    }

    #[tokio::test]
    async fn test_multi_edit_continues_past_no_match() {
        let channel = Arc::new(ScriptedChannel::new());
        // Edit 1: probe, refresh, sed, cmp says identical, rm.
        channel.respond("", 0).respond("", 0).respond("", 0).respond("", 0).respond("", 0);
        // Edit 2: probe, refresh, sed, cmp says different, rm.
        channel.respond("", 0).respond("", 0).respond("", 0).respond("", 1).respond("", 0);

        let config = EditorConfig::default().with_detect_no_match(true);
        let editor = RemoteFileEditor::with_config(channel.clone(), config);
        let edits = [EditSpec::new("zzz", "y"), EditSpec::new("a", "b")];

        let report = editor.multi_edit("/w/f", &edits).await.unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Edit 1: No matches found"));
        assert_eq!(lines[1], "Edit 2: Successfully replaced first occurrence in /w/f");
    }

    #[tokio::test]
    async fn test_multi_edit_rejects_invalid_before_running() {
        let channel = Arc::new(ScriptedChannel::new());
        let edits = [EditSpec::new("a", "b"), EditSpec::new("", "x")];

        let err = editor(&channel).multi_edit("/w/f", &edits).await.unwrap_err();
        assert!(matches!(err, FileOpError::BatchFailed { index: 2, .. }));
        assert!(channel.commands().is_empty());

        let err = editor(&channel).multi_edit("/w/f", &[]).await.unwrap_err();
        assert!(matches!(err, FileOpError::InvalidEdit(_)));
    }

    #[tokio::test]
    async fn test_custom_backup_suffix() {
        let channel = Arc::new(ScriptedChannel::new());
        let config = EditorConfig::default().with_backup_suffix(".orig");
        let editor = RemoteFileEditor::with_config(channel.clone(), config);
        editor.edit("/w/a", "x", "y", false).await.unwrap();
        assert_eq!(channel.commands()[0], "cp '/w/a' '/w/a.orig' 2>&1");
    }
}
