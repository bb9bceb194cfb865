use thiserror::Error;

/// Failure taxonomy of the judge.
///
/// `UnsupportedLanguage`, `InvalidTimeout` and `EntryPointNotFound` are
/// request-level: they abort the whole call before any test case runs. Every
/// other variant is scoped to one test case and ends up as the `error` text of
/// its outcome, so the `Display` strings here are part of the response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgeError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Timeout must be a positive number of milliseconds")]
    InvalidTimeout,

    #[error("No {0} entry point found in submitted code")]
    EntryPointNotFound(String),

    #[error("Compilation failed:\n{0}")]
    CompileError(String),

    #[error("Time limit exceeded")]
    TimeoutExceeded,

    #[error("{0}")]
    RuntimeError(String),

    #[error("Output not JSON")]
    MalformedOutput,

    #[error("Cannot marshal argument: {0}")]
    MarshalError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl JudgeError {
    /// True for errors that abort the request instead of a single test case
    pub fn is_request_level(&self) -> bool {
        matches!(
            self,
            JudgeError::UnsupportedLanguage(_)
                | JudgeError::InvalidTimeout
                | JudgeError::EntryPointNotFound(_)
        )
    }

    /// Runtime error from captured diagnostics, with a generic fallback
    pub fn runtime(diagnostics: &str) -> Self {
        let trimmed = diagnostics.trim();
        if trimmed.is_empty() {
            JudgeError::RuntimeError("Runtime error".to_string())
        } else {
            JudgeError::RuntimeError(trimmed.to_string())
        }
    }
}

impl From<std::io::Error> for JudgeError {
    fn from(e: std::io::Error) -> Self {
        JudgeError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JudgeError>;
