// CLI commands for judging code locally
use anyhow::{bail, Context, Result};
use optimus_common::config::Config;
use optimus_common::types::{ExecutionOutcome, Language, TestCase};
use optimus_judge::{entry_point, evaluator, marshal, wire, Judge};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Widest cell printed in the outcome table
const CELL_WIDTH: usize = 24;

/// Load a JSON array of test cases
fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse test cases in {}", path.display()))
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_language(name: &str) -> Result<Language> {
    match Language::from_str(name) {
        Some(language) => Ok(language),
        None => bail!("Unsupported language: {}", name),
    }
}

/// Judge a source file; returns whether every test case passed
pub async fn run(
    language: &str,
    source: &Path,
    tests: &Path,
    timeout_ms: Option<u64>,
    as_json: bool,
) -> Result<bool> {
    let code = read_source(source)?;
    let test_cases = load_test_cases(tests)?;
    let judge = Judge::new(Config::from_env());

    let outcomes = judge
        .execute(language, &code, &test_cases, timeout_ms)
        .await
        .context("Submission rejected")?;
    let summary = evaluator::summarize(&outcomes);

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcomes).context("Failed to serialize outcomes")?
        );
    } else {
        print!("{}", render_table(&outcomes));
        println!();
        if summary.all_passed() {
            println!("✅ Passed {}/{}", summary.passed, summary.total());
        } else {
            println!(
                "❌ Passed {}/{} ({} mismatched, {} errored)",
                summary.passed,
                summary.total(),
                summary.failed,
                summary.errored
            );
        }
    }

    Ok(summary.all_passed() || outcomes.is_empty())
}

/// Print the resolved entry point
pub fn resolve(language: &str, source: &Path) -> Result<()> {
    let language = parse_language(language)?;
    let code = read_source(source)?;
    let entry = entry_point::resolve(&code, language)?;

    println!("{}", entry.name);
    if language == Language::Java {
        println!("  class: {}", entry_point::declaring_class(&code));
        println!("  file:  {}", entry_point::source_file_name(&code));
        if entry.returns_void {
            println!("  returns: void (reported as null)");
        }
    }
    Ok(())
}

/// Print the guest-language literal for a JSON value
pub fn marshal(value: &str, language: &str) -> Result<()> {
    let language = parse_language(language)?;
    let value: Value = serde_json::from_str(value).context("Value is not valid JSON")?;
    println!("{}", marshal::to_guest_literal(&value, language)?);
    Ok(())
}

pub fn languages() {
    println!("📋 Supported Languages:\n");
    print!("{}", render_languages());
}

fn render_languages() -> String {
    let mut out = format!("{:<12} {:<12}\n", "LANGUAGE", "MODEL");
    out.push_str(&format!("{}\n", "─".repeat(25)));
    for language in Language::all_variants() {
        out.push_str(&format!(
            "{:<12} {:<12}\n",
            language.to_string(),
            language.execution_model().to_string()
        ));
    }
    out
}

fn render_table(outcomes: &[ExecutionOutcome]) -> String {
    let mut out = format!(
        "{:<4} {:<6} {:<w$} {:<w$} {}\n",
        "#",
        "RESULT",
        "OUTPUT",
        "EXPECTED",
        "ERROR",
        w = CELL_WIDTH
    );
    out.push_str(&format!("{}\n", "─".repeat(12 + 2 * CELL_WIDTH + 12)));

    for (index, outcome) in outcomes.iter().enumerate() {
        let verdict = if outcome.error.is_some() {
            "ERROR"
        } else if outcome.result {
            "PASS"
        } else {
            "FAIL"
        };
        let output = outcome
            .output
            .as_ref()
            .map(wire::canonical_text)
            .unwrap_or_else(|| "-".to_string());
        let error = outcome
            .error
            .as_deref()
            .and_then(|e| e.lines().next())
            .unwrap_or("");

        out.push_str(&format!(
            "{:<4} {:<6} {:<w$} {:<w$} {}\n",
            index + 1,
            verdict,
            truncate(&output),
            truncate(&wire::canonical_text(&outcome.test_case.expected)),
            error,
            w = CELL_WIDTH
        ));
    }
    out
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= CELL_WIDTH {
        text.to_string()
    } else {
        let kept: String = text.chars().take(CELL_WIDTH - 1).collect();
        format!("{}…", kept)
    }
}
