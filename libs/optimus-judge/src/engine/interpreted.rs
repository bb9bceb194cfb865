/// Interpreted subprocess runner (Python)
///
/// Writes the harness into a fresh workspace, spawns the interpreter with the
/// encoded arguments as its single command-line argument, and decodes the
/// envelope line from stdout.
use crate::engine::millis;
use crate::error::{JudgeError, Result};
use crate::process::{self, ProcessOutput};
use crate::wire;
use crate::workspace::Workspace;
use optimus_common::config::Config;
use serde_json::Value;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

const PROGRAM_FILE: &str = "main.py";

#[derive(Debug, Clone)]
pub struct InterpretedRunner {
    interpreter: String,
    workspace_root: PathBuf,
}

impl InterpretedRunner {
    pub fn new(interpreter: impl Into<String>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            workspace_root: workspace_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.python_bin.clone(), config.workspace_root.clone())
    }

    /// Run `program` with `args` and return the decoded value
    pub async fn run(&self, program: &str, args: &Value, timeout_ms: u64) -> Result<Value> {
        // Dropped after the child is reaped, on every path out of here
        let workspace = Workspace::create(&self.workspace_root)?;
        let script = workspace.write_file(PROGRAM_FILE, program).await?;

        let mut command = Command::new(&self.interpreter);
        command
            .arg(&script)
            .arg(wire::encode(args))
            .current_dir(workspace.path());

        let output = process::run_with_timeout(command, millis(timeout_ms)).await?;
        debug!(
            execution_ms = output.execution_time_ms,
            timed_out = output.timed_out,
            "Interpreter finished"
        );

        decode(&output)
    }
}

fn decode(output: &ProcessOutput) -> Result<Value> {
    if output.timed_out {
        return Err(JudgeError::TimeoutExceeded);
    }
    if !output.success() {
        return Err(JudgeError::runtime(&output.stderr));
    }
    wire::parse_envelope(&output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use std::time::{Duration, Instant};

    /// `sh` stands in for the interpreter; `$1` is the encoded argument
    fn shell_runner(root: &Path) -> InterpretedRunner {
        InterpretedRunner::new("sh", root)
    }

    fn assert_root_empty(root: &Path) {
        assert_eq!(std::fs::read_dir(root).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_success_passes_args_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let program = r#"echo "{\"ok\":true,\"out\":$1}""#;

        let value = shell_runner(root.path())
            .run(program, &json!([1, [2, 3]]), 2000)
            .await
            .unwrap();

        assert_eq!(value, json!([1, [2, 3]]));
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_guest_error_envelope() {
        let root = tempfile::tempdir().unwrap();
        let program = r#"echo '{"ok":false,"error":"ZeroDivisionError: division by zero"}'"#;

        let err = shell_runner(root.path())
            .run(program, &json!(0), 2000)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            JudgeError::RuntimeError("ZeroDivisionError: division by zero".into())
        );
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_non_zero_exit_uses_stderr() {
        let root = tempfile::tempdir().unwrap();
        let program = "echo 'SyntaxError: invalid syntax' >&2; exit 1";

        let err = shell_runner(root.path())
            .run(program, &json!(null), 2000)
            .await
            .unwrap_err();

        assert_eq!(err, JudgeError::RuntimeError("SyntaxError: invalid syntax".into()));
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_silent_crash_uses_generic_message() {
        let root = tempfile::tempdir().unwrap();

        let err = shell_runner(root.path())
            .run("exit 2", &json!(null), 2000)
            .await
            .unwrap_err();

        assert_eq!(err, JudgeError::RuntimeError("Runtime error".into()));
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_malformed_output() {
        let root = tempfile::tempdir().unwrap();

        let err = shell_runner(root.path())
            .run("echo not-json", &json!(null), 2000)
            .await
            .unwrap_err();

        assert_eq!(err, JudgeError::MalformedOutput);
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_timeout_kills_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let start = Instant::now();

        let err = shell_runner(root.path())
            .run("while :; do :; done", &json!(null), 200)
            .await
            .unwrap_err();

        assert_eq!(err, JudgeError::TimeoutExceeded);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_background_child_cannot_stall_result() {
        let root = tempfile::tempdir().unwrap();
        let start = Instant::now();

        let err = shell_runner(root.path())
            .run("sleep 5 &\necho '{\"ok\":true,\"out\":1}'", &json!(null), 300)
            .await
            .unwrap_err();

        assert_eq!(err, JudgeError::TimeoutExceeded);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_root_empty(root.path());
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let runner = InterpretedRunner::new("optimus-no-such-interpreter", root.path());

        let err = runner.run("", &json!(null), 1000).await.unwrap_err();

        assert!(matches!(err, JudgeError::Io(_)));
        assert_root_empty(root.path());
    }
}
