/// Compiled-then-executed subprocess runner (Java)
///
/// **Compile-once model:**
/// 1. Compile the candidate and the serializer once, under the compile wall
///    clock. A failure here is the candidate's own and ends the request
/// 2. Compile a runner holding every test case's call against those classes
/// 3. Execute the runner once per test case, selecting the case by index
///
/// When javac rejects the shared runner, one argument literal did not fit the
/// entry point's signature. Each case then gets a runner of its own, so the
/// mismatch only fails the case it belongs to.
///
/// The workspace lives inside the returned [`CompiledArtifact`], so it is
/// removed when the artifact drops, whether compilation succeeded or not.
use crate::engine::millis;
use crate::entry_point::{self, EntryPoint};
use crate::error::{JudgeError, Result};
use crate::harness::{self, COMPILED_RUNNER_CLASS, COMPILED_SERIALIZER_CLASS};
use crate::process;
use crate::wire;
use crate::workspace::Workspace;
use optimus_common::config::Config;
use serde_json::Value;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CompiledRunner {
    compiler: String,
    runtime: String,
    workspace_root: PathBuf,
}

/// Compiled candidate classes, ready to link runners against
pub struct CompiledArtifact {
    workspace: Workspace,
    compiler: String,
    runtime: String,
    class: String,
}

impl CompiledRunner {
    pub fn new(
        compiler: impl Into<String>,
        runtime: impl Into<String>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            compiler: compiler.into(),
            runtime: runtime.into(),
            workspace_root: workspace_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.javac_bin.clone(),
            config.java_bin.clone(),
            config.workspace_root.clone(),
        )
    }

    /// Compile the candidate together with the serializer.
    ///
    /// A non-zero compiler exit is `CompileError` with the compiler
    /// diagnostics; running out of `timeout_ms` is `TimeoutExceeded`.
    pub async fn compile(&self, source: &str, timeout_ms: u64) -> Result<CompiledArtifact> {
        let workspace = Workspace::create(&self.workspace_root)?;

        let source_file = entry_point::source_file_name(source);
        let serializer_file = format!("{}.java", COMPILED_SERIALIZER_CLASS);

        workspace.write_file(&source_file, source).await?;
        workspace
            .write_file(&serializer_file, harness::compiled_serializer())
            .await?;

        let artifact = CompiledArtifact {
            workspace,
            compiler: self.compiler.clone(),
            runtime: self.runtime.clone(),
            class: entry_point::declaring_class(source),
        };
        let compilation_ms = artifact
            .javac(&[source_file.as_str(), serializer_file.as_str()], timeout_ms)
            .await?;

        info!(compilation_ms = compilation_ms, "Compilation succeeded");
        Ok(artifact)
    }
}

impl CompiledArtifact {
    /// Class the entry point is invoked on
    pub fn declaring_class(&self) -> &str {
        &self.class
    }

    /// Generate and compile runner class `runner` against the candidate.
    /// `calls[i]` is the marshalled argument list of test case `i`; `None`
    /// leaves that case without a branch.
    pub async fn link(
        &self,
        runner: &str,
        entry: &EntryPoint,
        calls: &[Option<String>],
        timeout_ms: u64,
    ) -> Result<()> {
        let runner_file = format!("{}.java", runner);
        let source = harness::compiled_runner(runner, &self.class, entry, calls);
        self.workspace.write_file(&runner_file, &source).await?;

        let linking_ms = self.javac(&[runner_file.as_str()], timeout_ms).await?;
        debug!(runner = runner, linking_ms = linking_ms, "Runner compiled");
        Ok(())
    }

    /// Execute the branch for test case `index` of a linked runner
    pub async fn run_case(&self, runner: &str, index: usize, timeout_ms: u64) -> Result<Value> {
        let mut command = Command::new(&self.runtime);
        command
            .args(["-cp", "."])
            .arg(runner)
            .arg(index.to_string())
            .current_dir(self.workspace.path());

        let output = process::run_with_timeout(command, millis(timeout_ms)).await?;
        debug!(
            test_index = index,
            execution_ms = output.execution_time_ms,
            timed_out = output.timed_out,
            "Runner finished"
        );

        if output.timed_out {
            return Err(JudgeError::TimeoutExceeded);
        }
        if !output.success() {
            return Err(JudgeError::runtime(&output.stderr));
        }
        wire::parse_value(&output.stdout)
    }

    /// Link and run every case, isolating literal mismatches per case.
    ///
    /// `calls[i]` is test case `i`'s marshalled argument list, or the error
    /// that marshalling it produced; that error becomes the case's result.
    pub async fn run_all(
        &self,
        entry: &EntryPoint,
        calls: &[Result<String>],
        compile_timeout_ms: u64,
        timeout_ms: u64,
    ) -> Vec<Result<Value>> {
        let branches: Vec<Option<String>> = calls.iter().map(|c| c.as_ref().ok().cloned()).collect();
        let shared = self
            .link(COMPILED_RUNNER_CLASS, entry, &branches, compile_timeout_ms)
            .await;

        let isolate = match shared {
            Ok(()) => false,
            Err(JudgeError::CompileError(diagnostics)) => {
                warn!(
                    error_preview = diagnostics.lines().next().unwrap_or(""),
                    "Shared runner rejected, linking test cases individually"
                );
                true
            }
            Err(e) => return calls.iter().map(|_| Err(e.clone())).collect(),
        };

        let mut results = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            let arguments = match call {
                Ok(arguments) => arguments,
                Err(e) => {
                    results.push(Err(e.clone()));
                    continue;
                }
            };

            debug!(test_index = index, "Running compiled test case");
            let result = if isolate {
                let runner = format!("{}{}", COMPILED_RUNNER_CLASS, index);
                let single = [Some(arguments.clone())];
                match self.link(&runner, entry, &single, compile_timeout_ms).await {
                    Ok(()) => self.run_case(&runner, 0, timeout_ms).await,
                    Err(e) => Err(e),
                }
            } else {
                self.run_case(COMPILED_RUNNER_CLASS, index, timeout_ms).await
            };
            results.push(result);
        }

        results
    }

    /// Run javac over `files` in the workspace, with compiled classes on the
    /// classpath. Returns the compile time in milliseconds.
    async fn javac(&self, files: &[&str], timeout_ms: u64) -> Result<u64> {
        let mut command = Command::new(&self.compiler);
        command
            .args(["-encoding", "UTF-8", "-cp", ".", "-d", "."])
            .args(files)
            .current_dir(self.workspace.path());

        let output = process::run_with_timeout(command, millis(timeout_ms)).await?;

        if output.timed_out {
            warn!(timeout_ms = timeout_ms, "Compilation timed out");
            return Err(JudgeError::TimeoutExceeded);
        }
        if !output.success() {
            let diagnostics = output.diagnostics().trim().to_string();
            warn!(
                compilation_ms = output.execution_time_ms,
                error_preview = diagnostics.lines().next().unwrap_or(""),
                "Compilation failed"
            );
            return Err(JudgeError::CompileError(diagnostics));
        }

        Ok(output.execution_time_ms)
    }
}
