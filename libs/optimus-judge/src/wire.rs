/// Wire Format - Normalized Value Text
///
/// Values travel between the judge and guest programs as compact JSON. The
/// same text form doubles as the comparison law: two values are equal iff
/// their canonical text is identical, character for character.
///
/// **Canonical Rules:**
/// - Maps keep insertion order (key order is significant)
/// - Finite numbers with no fractional part below 1e21 print as integers
///   (`4.0` → `4`, `-0.0` → `0`), matching the scripted guest
/// - Everything else prints as compact `serde_json` text
use crate::error::{JudgeError, Result};
use serde::Deserialize;
use serde_json::{Number, Value};

/// Largest magnitude printed as a plain integer
const INTEGRAL_LIMIT: f64 = 1e21;

/// Envelope emitted by the scripted and interpreted harnesses
#[derive(Debug, Deserialize)]
struct GuestEnvelope {
    ok: bool,
    #[serde(default)]
    out: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Encode a value as compact wire text
pub fn encode(value: &Value) -> String {
    value.to_string()
}

/// Canonical text used for equality
pub fn canonical_text(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

/// Strict equality over canonical text
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    canonical_text(actual) == canonical_text(expected)
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(out, item);
            }
            out.push('}');
        }
        // null, booleans and strings already have a single compact form
        other => out.push_str(&other.to_string()),
    }
}

fn canonical_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < INTEGRAL_LIMIT => {
            format!("{}", f as i128)
        }
        _ => n.to_string(),
    }
}

/// Parse the envelope printed by a harness.
///
/// The envelope is the last non-empty stdout line; module-level prints in the
/// candidate may precede it. Anything that is not a well-formed envelope is
/// `MalformedOutput`, and a guest-reported failure becomes a `RuntimeError`
/// carrying its message.
pub fn parse_envelope(stdout: &str) -> Result<Value> {
    let text = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(JudgeError::MalformedOutput)?;

    let envelope: GuestEnvelope =
        serde_json::from_str(text).map_err(|_| JudgeError::MalformedOutput)?;

    if envelope.ok {
        Ok(envelope.out)
    } else {
        Err(JudgeError::runtime(envelope.error.as_deref().unwrap_or_default()))
    }
}

/// Parse a bare value printed by the compiled runner
pub fn parse_value(stdout: &str) -> Result<Value> {
    let text = stdout.trim();
    if text.is_empty() {
        return Err(JudgeError::MalformedOutput);
    }
    serde_json::from_str(text).map_err(|_| JudgeError::MalformedOutput)
}
