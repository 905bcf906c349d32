//! ShellChannel: runs commands through `sh -s`, locally or inside a container.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ChannelConfig;

use super::{ChannelError, ChannelResult, CommandChannel, CommandOutput};

/// Channel that spawns one shell process per command.
///
/// The command is written to the child's stdin rather than argv, so scripts
/// carrying large payloads are not bound by the per-argument size limit.
/// The default `sh -s` runs it in a local shell and
/// `docker exec -i <container> sh -s` runs it inside a container.
#[derive(Debug, Clone)]
pub struct ShellChannel {
    program: String,
    args: Vec<String>,
}

impl ShellChannel {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Local `sh -s`.
    pub fn local() -> Self {
        Self::new("sh", ["-s"])
    }

    /// `docker exec -i <container> sh -s`.
    pub fn docker_exec(container: impl Into<String>) -> Self {
        Self::new(
            "docker",
            ["exec".to_string(), "-i".to_string(), container.into(), "sh".to_string(), "-s".to_string()],
        )
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        match &config.container {
            Some(container) => Self::docker_exec(container.clone()),
            None => Self::new(config.program.clone(), config.args.clone()),
        }
    }

    /// Program and leading arguments, for diagnostics.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl Default for ShellChannel {
    fn default() -> Self {
        Self::local()
    }
}

#[async_trait]
impl CommandChannel for ShellChannel {
    #[tracing::instrument(skip(self, command), name = "channel.shell", fields(program = %self.program))]
    async fn execute(&self, command: &str, timeout: Duration) -> ChannelResult<CommandOutput> {
        // Fold stderr into stdout inside the shell so diagnostics keep their
        // position relative to regular output.
        let script = format!("exec 2>&1\n{}\n", command);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChannelError::closed("shell stdin was not captured"))?;

        // Feed the script while draining output so neither pipe can fill up
        // and stall the other. Closing stdin marks the end of the script.
        let feed = async move {
            let result = stdin.write_all(script.as_bytes()).await;
            drop(stdin);
            result
        };
        let run = async { tokio::join!(feed, child.wait_with_output()) };

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, run).await {
            Ok((fed, result)) => {
                match fed {
                    // The shell may exit before reading the whole script.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        tracing::debug!("shell closed stdin before the script was fully written");
                    }
                    Err(e) => return Err(ChannelError::closed(e.to_string())),
                    Ok(()) => {}
                }
                result?
            }
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs_f64(), "command timed out");
                return Err(ChannelError::Timeout(timeout));
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            text.push_str(&stderr);
        }
        let exit_code = output.status.code().unwrap_or(-1);
        tracing::trace!(exit_code, bytes = text.len(), "command finished");

        Ok(CommandOutput::new(text, exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_echo() {
        let channel = ShellChannel::local();
        let out = channel
            .execute("echo hello", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.output, "hello\n");
        assert_eq!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn test_stderr_is_merged() {
        let channel = ShellChannel::local();
        let out = channel
            .execute("echo out; echo err >&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.output, "out\nerr\n");
        assert_eq!(out.exit_code, 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let channel = ShellChannel::local();
        let err = channel
            .execute("sleep 5", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let channel = ShellChannel::new("/nonexistent/shellfs-shell", ["-s"]);
        let err = channel
            .execute("true", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Spawn(_)));
    }

    #[test]
    fn test_docker_argv() {
        let channel = ShellChannel::docker_exec("sandbox");
        let argv: Vec<_> = channel.argv().collect();
        assert_eq!(argv, ["docker", "exec", "-i", "sandbox", "sh", "-s"]);
    }

    #[tokio::test]
    async fn test_script_larger_than_one_argument() {
        // Linux caps a single argv string at 128 KiB.
        let payload = "y".repeat(256 * 1024);
        let channel = ShellChannel::local();
        let out = channel
            .execute(&format!("printf '%s' '{}' | wc -c", payload), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(out.output.trim(), (256 * 1024).to_string());
        assert_eq!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn test_early_exit_is_not_an_error() {
        let channel = ShellChannel::local();
        let filler = "true\n".repeat(100_000);
        let out = channel
            .execute(&format!("echo early; exit 4\n{}", filler), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(out.output, "early\n");
        assert_eq!(out.exit_code, 4);
    }
}
