/// Guest Runners - one strategy per execution model
///
/// **Core Responsibility:**
/// Run one synthesized guest program to completion or timeout and hand back
/// the decoded return value.
///
/// **Critical Architectural Boundary:**
/// - Runners know HOW to execute (embedded engine, interpreter, compiler)
/// - Runners do NOT compare against expected values
/// - Every failure is a `JudgeError` scoped to one test case
///
/// Shared invariants: the timeout is wall-clock and hard, workspaces are
/// removed on every exit path, and unparseable output is `MalformedOutput`.
pub mod compiled;
pub mod interpreted;
pub mod sandbox;

pub use compiled::{CompiledArtifact, CompiledRunner};
pub use interpreted::InterpretedRunner;
pub use sandbox::ScriptSandbox;

use std::time::Duration;

pub(crate) fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
