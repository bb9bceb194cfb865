/// In-process scripted sandbox (JavaScript via `boa_engine`)
///
/// Every test case gets a fresh `Context` on its own named OS thread. The
/// caller races the thread's completion against the timeout; on expiry the
/// thread is abandoned and the call resolves with `TimeoutExceeded`. The
/// engine's loop and recursion limits bound the work an abandoned script can
/// still do before its thread releases.
use crate::error::{JudgeError, Result};
use crate::wire;
use boa_engine::{Context, Source};
use optimus_common::config::Config;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Deep recursion in candidate code needs more than the default 2MB
const SCRIPT_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ScriptSandbox {
    loop_limit: u64,
    recursion_limit: usize,
}

impl ScriptSandbox {
    pub fn new(loop_limit: u64, recursion_limit: usize) -> Self {
        Self {
            loop_limit,
            recursion_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.script_loop_limit, config.script_recursion_limit)
    }

    /// Evaluate a scripted harness program and decode its envelope
    pub async fn run(&self, program: String, timeout: Duration) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        let loop_limit = self.loop_limit;
        let recursion_limit = self.recursion_limit;
        let start_time = Instant::now();

        thread::Builder::new()
            .name("optimus-script".to_string())
            .stack_size(SCRIPT_STACK_SIZE)
            .spawn(move || {
                let envelope = evaluate(&program, loop_limit, recursion_limit);
                // The receiver is gone when the caller already timed out
                let _ = tx.send(envelope);
            })?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(envelope)) => {
                debug!(
                    execution_ms = start_time.elapsed().as_millis() as u64,
                    "Script finished"
                );
                wire::parse_envelope(&envelope?)
            }
            Ok(Err(_)) => Err(JudgeError::runtime("Script engine stopped unexpectedly")),
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Script timed out; abandoning engine thread"
                );
                Err(JudgeError::TimeoutExceeded)
            }
        }
    }
}

/// Runs on the engine thread. Returns the envelope text the harness produced.
fn evaluate(program: &str, loop_limit: u64, recursion_limit: usize) -> Result<String> {
    let mut context = Context::default();
    context.runtime_limits_mut().set_loop_iteration_limit(loop_limit);
    context.runtime_limits_mut().set_recursion_limit(recursion_limit);

    // Errors escaping the harness are syntax errors or exhausted limits
    let value = context
        .eval(Source::from_bytes(program.as_bytes()))
        .map_err(|e| JudgeError::runtime(&e.to_string()))?;

    value
        .as_string()
        .map(|s| s.to_std_string_escaped())
        .ok_or(JudgeError::MalformedOutput)
}
