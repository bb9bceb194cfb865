pub mod types;
pub mod config;

// Re-export commonly used types for convenience
pub use types::{ExecutionModel, ExecutionOutcome, ExecutionRequest, Language, TestCase};
pub use config::Config;
