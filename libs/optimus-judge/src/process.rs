/// Subprocess supervision with a hard wall-clock timeout
///
/// **Guarantees:**
/// - stdin is closed, stdout/stderr are captured concurrently
/// - exit and both pipe drains share one deadline, so descendants holding
///   the pipes open cannot stall the caller
/// - on unix the child leads its own process group; on timeout the whole
///   group is killed and the child reaped before returning
/// - output of a killed child is discarded
use crate::error::{JudgeError, Result};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Captured result of one supervised process
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed on timeout
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
    pub execution_time_ms: u64,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.map(|s| s.success()).unwrap_or(false)
    }

    /// Diagnostic text: stderr when present, otherwise stdout
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Run `command` to completion or until `timeout` elapses
pub async fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<ProcessOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let start_time = Instant::now();
    let mut child = command.spawn()?;
    // With process_group(0) the group id equals the child's pid
    let group = if cfg!(unix) { child.id() } else { None };

    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| JudgeError::Io("child stdout was not captured".to_string()))?;
    let stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| JudgeError::Io("child stderr was not captured".to_string()))?;

    let mut stdout_task = collect(stdout_pipe);
    let mut stderr_task = collect(stderr_pipe);

    let finished = tokio::time::timeout(timeout, async {
        let status = child.wait().await?;
        let stdout = (&mut stdout_task).await.unwrap_or_default();
        let stderr = (&mut stderr_task).await.unwrap_or_default();
        Ok::<_, std::io::Error>((status, stdout, stderr))
    })
    .await;

    match finished {
        Ok(collected) => {
            let (status, stdout, stderr) = collected?;
            let execution_time_ms = start_time.elapsed().as_millis() as u64;

            debug!(
                exit_code = ?status.code(),
                execution_ms = execution_time_ms,
                "Process exited"
            );

            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                status: Some(status),
                timed_out: false,
                execution_time_ms,
            })
        }
        Err(_) => {
            if let Some(group) = group {
                kill_group(group);
            }
            // kill() also waits, so the child is reaped here even when it
            // already exited and only descendants were holding the pipes
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Child already gone at timeout");
            }
            stdout_task.abort();
            stderr_task.abort();

            let execution_time_ms = start_time.elapsed().as_millis() as u64;
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                execution_ms = execution_time_ms,
                "Process timed out and was killed"
            );

            Ok(ProcessOutput {
                stdout: String::new(),
                stderr: String::new(),
                status: None,
                timed_out: true,
                execution_time_ms,
            })
        }
    }
}

#[cfg(unix)]
fn kill_group(group: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(group as i32), Signal::SIGKILL) {
        debug!(process_group = group, error = %e, "Process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_group(_group: u32) {}

fn collect<R>(mut pipe: R) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buffer).await {
            debug!(error = %e, "Pipe read ended with error");
        }
        buffer
    })
}
