use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Guest languages a submission may be written in.
///
/// Each language is bound to exactly one execution model. The model names
/// (`scripted`, `interpreted`, `compiled`) are accepted as aliases on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "js", alias = "scripted")]
    Javascript,
    #[serde(alias = "py", alias = "interpreted")]
    Python,
    #[serde(alias = "compiled")]
    Java,
}

/// How a guest language is run by the judge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionModel {
    /// In-process embedded interpreter, no subprocess
    Scripted,
    /// Interpreter subprocess, arguments passed on the command line
    Interpreted,
    /// Compile, then execute the produced artifact as a subprocess
    Compiled,
}

impl Language {
    /// Returns all language variants
    /// This is the single source of truth for available languages
    pub fn all_variants() -> &'static [Language] {
        &[Language::Javascript, Language::Python, Language::Java]
    }

    /// Parse a language from string (case-insensitive).
    /// Execution model names resolve to the language bound to that model.
    pub fn from_str(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" | "scripted" => Some(Language::Javascript),
            "python" | "py" | "interpreted" => Some(Language::Python),
            "java" | "compiled" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn execution_model(&self) -> ExecutionModel {
        match self {
            Language::Javascript => ExecutionModel::Scripted,
            Language::Python => ExecutionModel::Interpreted,
            Language::Java => ExecutionModel::Compiled,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Javascript => write!(f, "javascript"),
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
        }
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionModel::Scripted => write!(f, "scripted"),
            ExecutionModel::Interpreted => write!(f, "interpreted"),
            ExecutionModel::Compiled => write!(f, "compiled"),
        }
    }
}

/// Test Case Definition (Immutable Input)
///
/// `args` is either a single value (passed as the sole parameter) or a JSON
/// array (spread as positional parameters). Any extra fields supplied by the
/// caller are carried through untouched, in their original order, into the
/// matching [`ExecutionOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub expected: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestCase {
    pub fn new(args: Value, expected: Value) -> Self {
        Self {
            args,
            expected,
            extra: Map::new(),
        }
    }

    /// True when `args` must be spread as positional parameters
    pub fn spreads_args(&self) -> bool {
        self.args.is_array()
    }
}

/// Execution Input (Immutable)
///
/// Created once per call and owned by the dispatcher for its duration.
/// Test cases execute **sequentially**, in order, with `timeout_ms` applied
/// to each test case independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub id: Uuid,
    pub language: Language,
    pub source_code: String,
    pub test_cases: Vec<TestCase>,
    pub timeout_ms: u64,
}

impl ExecutionRequest {
    pub fn new(
        language: Language,
        source_code: impl Into<String>,
        test_cases: Vec<TestCase>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            source_code: source_code.into(),
            test_cases,
            timeout_ms,
        }
    }
}

/// Per-test-case outcome returned to the caller.
///
/// `error` is `None` exactly when the test case ran to completion; `result`
/// is only meaningful in that case and holds the comparison of `output`
/// against `expected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(flatten)]
    pub test_case: TestCase,
    pub output: Option<Value>,
    pub result: bool,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn completed(test_case: TestCase, output: Value, result: bool) -> Self {
        Self {
            test_case,
            output: Some(output),
            result,
            error: None,
        }
    }

    pub fn errored(test_case: TestCase, error: impl Into<String>) -> Self {
        Self {
            test_case,
            output: None,
            result: false,
            error: Some(error.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_serialization() {
        let lang = Language::Python;
        let json = serde_json::to_string(&lang).unwrap();
        assert_eq!(json, "\"python\"");

        let deserialized: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Language::Python);
    }

    #[test]
    fn test_language_model_aliases() {
        let scripted: Language = serde_json::from_str("\"scripted\"").unwrap();
        let interpreted: Language = serde_json::from_str("\"interpreted\"").unwrap();
        let compiled: Language = serde_json::from_str("\"compiled\"").unwrap();

        assert_eq!(scripted, Language::Javascript);
        assert_eq!(interpreted, Language::Python);
        assert_eq!(compiled, Language::Java);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("python"), Some(Language::Python));
        assert_eq!(Language::from_str("Python"), Some(Language::Python));
        assert_eq!(Language::from_str("JS"), Some(Language::Javascript));
        assert_eq!(Language::from_str("compiled"), Some(Language::Java));

        assert_eq!(Language::from_str("rust"), None);
        assert_eq!(Language::from_str(""), None);
    }

    #[test]
    fn test_execution_models() {
        assert_eq!(Language::Javascript.execution_model(), ExecutionModel::Scripted);
        assert_eq!(Language::Python.execution_model(), ExecutionModel::Interpreted);
        assert_eq!(Language::Java.execution_model(), ExecutionModel::Compiled);
        assert_eq!(Language::all_variants().len(), 3);
    }

    #[test]
    fn test_test_case_keeps_extra_fields_in_order() {
        let raw = r#"{"id":7,"args":[1,2],"hidden":true,"expected":3}"#;
        let test_case: TestCase = serde_json::from_str(raw).unwrap();

        assert!(test_case.spreads_args());
        assert_eq!(test_case.expected, json!(3));
        let keys: Vec<&String> = test_case.extra.keys().collect();
        assert_eq!(keys, vec!["id", "hidden"]);
    }

    #[test]
    fn test_single_argument_is_not_spread() {
        let test_case = TestCase::new(json!("abc"), json!(3));
        assert!(!test_case.spreads_args());
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let outcome = ExecutionOutcome::completed(TestCase::new(json!(2), json!(4)), json!(4), true);
        let text = serde_json::to_string(&outcome).unwrap();
        assert_eq!(
            text,
            r#"{"args":2,"expected":4,"output":4,"result":true,"error":null}"#
        );
    }

    #[test]
    fn test_errored_outcome() {
        let outcome = ExecutionOutcome::errored(TestCase::new(json!(1), json!(1)), "Time limit exceeded");
        assert_eq!(outcome.output, None);
        assert!(!outcome.result);
        assert!(!outcome.passed());

        let text = serde_json::to_string(&outcome).unwrap();
        assert!(text.contains(r#""output":null"#));
        assert!(text.contains(r#""error":"Time limit exceeded""#));
    }
}
