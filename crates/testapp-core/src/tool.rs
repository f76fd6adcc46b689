//! External tool invocation
//!
//! Native build tools (CocoaPods, Gradle, MSBuild autolinking) are invoked
//! through a single abstraction that enforces a timeout and returns
//! structured results, so callers make retry/fatal decisions uniformly.

use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for native tool invocations (5 minutes)
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(300);

/// Structured result of a finished child process
#[derive(Debug)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external command to completion, killing it on timeout.
pub async fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    limit: Duration,
) -> Result<CommandOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let child = command
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to start '{}': {}", program, e))?;

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            anyhow::bail!(
                "'{}' timed out after {} seconds",
                program,
                limit.as_secs()
            );
        }
    };

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs an external command and fails with its stderr on non-zero exit.
pub async fn run_command_checked(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    limit: Duration,
) -> Result<CommandOutput> {
    let output = run_command(program, args, cwd, limit).await?;
    if !output.success() {
        anyhow::bail!(
            "'{}' exited with code {}:\n{}",
            program,
            output.exit_code,
            output.stderr.trim_end()
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = run_command("echo", &["hello"], None, DEFAULT_TOOL_TIMEOUT)
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let output = run_command("sh", &["-c", "echo oops >&2; exit 3"], None, DEFAULT_TOOL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stderr.trim(), "oops");

        let err = run_command_checked(
            "sh",
            &["-c", "echo oops >&2; exit 3"],
            None,
            DEFAULT_TOOL_TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let err = run_command("sleep", &["30"], None, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let err = run_command("definitely-not-a-real-tool", &[], None, DEFAULT_TOOL_TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to start"));
    }
}
