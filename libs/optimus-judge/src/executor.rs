/// Execution Dispatcher - High-Level Orchestration
///
/// **Responsibility:**
/// Resolve the language and entry point once per request, run every test
/// case through the language's guest runner, and compare each result.
///
/// **Architecture:**
/// 1. Request-level validation (language, timeout, entry point)
/// 2. Guest runner per execution model (engine/)
/// 3. Comparator per test case (evaluator.rs)
///
/// Test cases run **sequentially** and outcomes come back in submission
/// order. Only request-level errors are returned as `Err`; everything that
/// goes wrong inside a test case becomes that case's outcome.
use crate::engine::{millis, CompiledRunner, InterpretedRunner, ScriptSandbox};
use crate::entry_point::{self, EntryPoint};
use crate::error::{JudgeError, Result};
use crate::evaluator;
use crate::harness;
use optimus_common::config::Config;
use optimus_common::types::{
    ExecutionModel, ExecutionOutcome, ExecutionRequest, Language, TestCase,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// The polyglot judge. Stateless between calls; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Judge {
    config: Config,
    sandbox: ScriptSandbox,
    interpreted: InterpretedRunner,
    compiled: CompiledRunner,
}

impl Judge {
    pub fn new(config: Config) -> Self {
        Self {
            sandbox: ScriptSandbox::from_config(&config),
            interpreted: InterpretedRunner::from_config(&config),
            compiled: CompiledRunner::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `source_code` against `test_cases`.
    ///
    /// `language` may be a language name or an execution model name;
    /// `timeout_ms` defaults to the configured per-test-case timeout.
    pub async fn execute(
        &self,
        language: &str,
        source_code: &str,
        test_cases: &[TestCase],
        timeout_ms: Option<u64>,
    ) -> Result<Vec<ExecutionOutcome>> {
        let language = Language::from_str(language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(language.to_string()))?;
        let timeout_ms = timeout_ms.unwrap_or(self.config.default_timeout_ms);

        let request = ExecutionRequest::new(language, source_code, test_cases.to_vec(), timeout_ms);
        self.execute_request(&request).await
    }

    /// Run a validated request.
    ///
    /// `timeout_ms` bounds each test case's execution. Compiling a compiled
    /// language submission runs under `max(timeout_ms, COMPILE_TIMEOUT_MS)`
    /// instead, so a short per-case limit does not starve the compiler.
    #[instrument(
        skip(self, request),
        fields(
            request_id = %request.id,
            language = %request.language,
            test_count = request.test_cases.len()
        )
    )]
    pub async fn execute_request(&self, request: &ExecutionRequest) -> Result<Vec<ExecutionOutcome>> {
        if request.timeout_ms == 0 {
            return Err(JudgeError::InvalidTimeout);
        }

        let entry = entry_point::resolve(&request.source_code, request.language)?;
        let model = request.language.execution_model();
        let start_time = Instant::now();

        info!(
            entry_point = %entry.name,
            execution_model = %model,
            timeout_ms = request.timeout_ms,
            "Starting execution"
        );

        if request.test_cases.is_empty() {
            return Ok(Vec::new());
        }

        let results = match model {
            ExecutionModel::Scripted => self.run_scripted(request, &entry).await,
            ExecutionModel::Interpreted => self.run_interpreted(request, &entry).await,
            ExecutionModel::Compiled => self.run_compiled(request, &entry).await,
        };

        let outcomes: Vec<ExecutionOutcome> = request
            .test_cases
            .iter()
            .zip(results)
            .enumerate()
            .map(|(index, (test_case, result))| {
                if let Err(e) = &result {
                    warn!(test_index = index, error = %e, "Test case failed to produce a value");
                }
                evaluator::evaluate_test(test_case, result)
            })
            .collect();

        let summary = evaluator::summarize(&outcomes);
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            execution_ms = start_time.elapsed().as_millis() as u64,
            "Execution complete"
        );

        Ok(outcomes)
    }

    async fn run_scripted(&self, request: &ExecutionRequest, entry: &EntryPoint) -> Vec<Result<Value>> {
        let mut results = Vec::with_capacity(request.test_cases.len());

        for (index, test_case) in request.test_cases.iter().enumerate() {
            debug!(test_index = index, "Running scripted test case");
            let program = harness::scripted_program(&entry.name, &request.source_code, test_case);
            results.push(self.sandbox.run(program, millis(request.timeout_ms)).await);
        }

        results
    }

    async fn run_interpreted(&self, request: &ExecutionRequest, entry: &EntryPoint) -> Vec<Result<Value>> {
        let mut results = Vec::with_capacity(request.test_cases.len());

        for (index, test_case) in request.test_cases.iter().enumerate() {
            debug!(test_index = index, "Running interpreted test case");
            let program = harness::interpreted_program(&entry.name, &request.source_code, test_case);
            results.push(
                self.interpreted
                    .run(&program, &test_case.args, request.timeout_ms)
                    .await,
            );
        }

        results
    }

    /// Compile once, then run each test case against the same artifact
    async fn run_compiled(&self, request: &ExecutionRequest, entry: &EntryPoint) -> Vec<Result<Value>> {
        let calls: Vec<Result<String>> = request
            .test_cases
            .iter()
            .map(harness::compiled_call_arguments)
            .collect();

        let compile_timeout_ms = request.timeout_ms.max(self.config.compile_timeout_ms);
        let artifact = match self
            .compiled
            .compile(&request.source_code, compile_timeout_ms)
            .await
        {
            Ok(artifact) => artifact,
            // Every test case reports the compile failure; nothing is executed
            Err(e) => return calls.iter().map(|_| Err(e.clone())).collect(),
        };

        artifact
            .run_all(entry, &calls, compile_timeout_ms, request.timeout_ms)
            .await
    }
}
