//! Polyglot execution core.
//!
//! Control flow for one request:
//! executor (dispatch) → entry_point (once) → per test case:
//! harness → engine runner → evaluator → aggregate.

pub mod engine;
pub mod entry_point;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod harness;
pub mod marshal;
pub mod process;
pub mod wire;
pub mod workspace;

pub use entry_point::EntryPoint;
pub use error::{JudgeError, Result};
pub use executor::Judge;
