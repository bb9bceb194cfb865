/// Result Comparator - Language-Agnostic Verdicts
///
/// **Core Responsibility:**
/// Turn what a guest runner produced for one test case into the
/// `ExecutionOutcome` returned to the caller.
///
/// **Critical Properties:**
/// - Knows nothing about language runtimes or subprocesses
/// - Pure function: (test case, runner result) → outcome
///
/// **Comparison Law:**
/// `output` equals `expected` iff their canonical wire text is identical
/// (see [`crate::wire`]). Map key order and array order are significant;
/// integral floats compare equal to integers. There is no float tolerance.
use crate::error::Result;
use crate::wire;
use optimus_common::types::{ExecutionOutcome, TestCase};
use serde_json::Value;

/// Evaluate a single test case
pub fn evaluate_test(test_case: &TestCase, result: Result<Value>) -> ExecutionOutcome {
    match result {
        Ok(output) => {
            let matched = wire::values_equal(&output, &test_case.expected);
            ExecutionOutcome::completed(test_case.clone(), output, matched)
        }
        Err(e) => ExecutionOutcome::errored(test_case.clone(), e.to_string()),
    }
}

/// Tally of a batch of outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    pub fn all_passed(&self) -> bool {
        self.total() > 0 && self.passed == self.total()
    }
}

/// Count passed, mismatched and errored outcomes
pub fn summarize(outcomes: &[ExecutionOutcome]) -> Summary {
    outcomes.iter().fold(Summary::default(), |mut summary, outcome| {
        if outcome.error.is_some() {
            summary.errored += 1;
        } else if outcome.result {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        summary
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JudgeError;
    use serde_json::json;

    fn make_test_case(args: Value, expected: Value) -> TestCase {
        TestCase::new(args, expected)
    }

    #[test]
    fn test_evaluate_exact_match() {
        let test_case = make_test_case(json!(2), json!(4));
        let outcome = evaluate_test(&test_case, Ok(json!(4)));

        assert!(outcome.result);
        assert!(outcome.passed());
        assert_eq!(outcome.output, Some(json!(4)));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_evaluate_mismatch_keeps_output() {
        let test_case = make_test_case(json!(3), json!(5));
        let outcome = evaluate_test(&test_case, Ok(json!(6)));

        assert!(!outcome.result);
        assert_eq!(outcome.output, Some(json!(6)));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_integral_float_matches_integer() {
        let test_case = make_test_case(json!([1, 3]), json!(4));
        assert!(evaluate_test(&test_case, Ok(json!(4.0))).result);
    }

    #[test]
    fn test_map_order_matters() {
        let expected: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let reordered: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        let test_case = make_test_case(json!(null), expected.clone());

        assert!(evaluate_test(&test_case, Ok(expected)).result);
        assert!(!evaluate_test(&test_case, Ok(reordered)).result);
    }

    #[test]
    fn test_case_sensitivity() {
        let test_case = make_test_case(json!(null), json!("Hello"));
        assert!(!evaluate_test(&test_case, Ok(json!("hello"))).result);
    }

    #[test]
    fn test_timeout_outcome() {
        let test_case = make_test_case(json!(1), json!(1));
        let outcome = evaluate_test(&test_case, Err(JudgeError::TimeoutExceeded));

        assert_eq!(outcome.output, None);
        assert!(!outcome.result);
        assert_eq!(outcome.error.as_deref(), Some("Time limit exceeded"));
    }

    #[test]
    fn test_runtime_error_outcome() {
        let test_case = make_test_case(json!(0), json!(0));
        let outcome = evaluate_test(
            &test_case,
            Err(JudgeError::RuntimeError("ZeroDivisionError: division by zero".into())),
        );

        assert_eq!(
            outcome.error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
        assert!(!outcome.passed());
    }

    #[test]
    fn test_extra_fields_carried_through() {
        let test_case: TestCase =
            serde_json::from_str(r#"{"name":"small","args":2,"expected":4}"#).unwrap();
        let outcome = evaluate_test(&test_case, Ok(json!(4)));

        let rendered = serde_json::to_string(&outcome).unwrap();
        assert_eq!(
            rendered,
            r#"{"args":2,"expected":4,"name":"small","output":4,"result":true,"error":null}"#
        );
    }

    #[test]
    fn test_summarize_mixed_statuses() {
        let outcomes = vec![
            evaluate_test(&make_test_case(json!(1), json!(1)), Ok(json!(1))),
            evaluate_test(&make_test_case(json!(2), json!(2)), Ok(json!(3))),
            evaluate_test(
                &make_test_case(json!(3), json!(3)),
                Err(JudgeError::TimeoutExceeded),
            ),
            evaluate_test(&make_test_case(json!(4), json!(4)), Err(JudgeError::MalformedOutput)),
        ];

        let summary = summarize(&outcomes);

        assert_eq!(
            summary,
            Summary {
                passed: 1,
                failed: 1,
                errored: 2
            }
        );
        assert_eq!(summary.total(), 4);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total(), 0);
        assert!(!summary.all_passed());
    }
}
