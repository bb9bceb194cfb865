/// Value Marshaller - JSON values to compiled-language literals
///
/// The compiled guest receives its arguments embedded in generated source, so
/// every argument has to become a Java expression of the most specific type
/// the value admits. Rules are tried in order and the first match wins:
///
/// 1. `null` → `null`
/// 2. rectangular matrix of numbers → `new int[][]{...}` (or `long[][]`)
/// 3. rectangular matrix of single-character strings → `new char[][]{...}`
/// 4. rectangular matrix of strings → `new String[][]{...}`
/// 5. rectangular matrix of booleans → `new boolean[][]{...}`
/// 6. any other sequence of sequences → `new Object[]{...}`, recursing
/// 7. flat sequence → `int[]`/`long[]`, `char[]`, `String[]`, `boolean[]`,
///    otherwise `new Object[]{...}`, recursing
/// 8. scalars → integer, boolean or quoted string literal
///
/// Numbers are truncated toward zero; numeric test data is assumed integral.
/// Maps have no literal form and fail with `MarshalError`.
///
/// Scripted and interpreted guests accept JSON-shaped literals, so their
/// forms are direct transliterations.
use crate::error::{JudgeError, Result};
use optimus_common::types::Language;
use serde_json::Value;

/// Element kinds a homogeneous sequence can hold, in rule order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Number,
    Char,
    Str,
    Bool,
}

const KINDS: [ElementKind; 4] = [
    ElementKind::Number,
    ElementKind::Char,
    ElementKind::Str,
    ElementKind::Bool,
];

impl ElementKind {
    fn admits(self, value: &Value) -> bool {
        match self {
            ElementKind::Number => value.is_number(),
            ElementKind::Char => value.as_str().map(is_single_char).unwrap_or(false),
            ElementKind::Str => value.is_string(),
            ElementKind::Bool => value.is_boolean(),
        }
    }

    /// Java element type for a sequence of these values
    fn java_type(self, items: &[&Value]) -> &'static str {
        match self {
            ElementKind::Number if items.iter().all(|v| fits_int(v)) => "int",
            ElementKind::Number => "long",
            ElementKind::Char => "char",
            ElementKind::Str => "String",
            ElementKind::Bool => "boolean",
        }
    }

    fn literal(self, value: &Value) -> Result<String> {
        match self {
            ElementKind::Char => Ok(char_literal(value.as_str().unwrap_or_default())),
            _ => scalar_literal(value),
        }
    }
}

/// Convert a value to a source expression in `language`
pub fn to_guest_literal(value: &Value, language: Language) -> Result<String> {
    match language {
        Language::Java => to_java_literal(value),
        Language::Javascript => Ok(value.to_string()),
        Language::Python => Ok(python_literal(value)),
    }
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Array(items) => {
            let elements: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", elements.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        // JSON number and string syntax is valid Python
        other => other.to_string(),
    }
}

/// Convert a value to a Java source expression
pub fn to_java_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Array(items) => sequence_literal(items),
        Value::Object(_) => Err(JudgeError::MarshalError(
            "maps have no compiled-language literal form".to_string(),
        )),
        scalar => scalar_literal(scalar),
    }
}

fn sequence_literal(items: &[Value]) -> Result<String> {
    let rows: Option<Vec<&Vec<Value>>> = items.iter().map(Value::as_array).collect();

    match rows {
        Some(rows) if !rows.is_empty() => matrix_literal(&rows, items),
        _ => flat_literal(items),
    }
}

fn matrix_literal(rows: &[&Vec<Value>], items: &[Value]) -> Result<String> {
    let width = rows[0].len();
    let rectangular = rows.iter().all(|row| row.len() == width);

    if rectangular {
        let cells: Vec<&Value> = rows.iter().flat_map(|row| row.iter()).collect();
        if let Some(kind) = KINDS.iter().copied().find(|k| cells.iter().all(|v| k.admits(v))) {
            let element = kind.java_type(&cells);
            let body = rows
                .iter()
                .map(|row| typed_elements(kind, row).map(|inner| format!("{{{}}}", inner)))
                .collect::<Result<Vec<_>>>()?
                .join(", ");
            return Ok(format!("new {}[][]{{{}}}", element, body));
        }
    }

    boxed_literal(items)
}

fn flat_literal(items: &[Value]) -> Result<String> {
    let refs: Vec<&Value> = items.iter().collect();

    match KINDS.iter().copied().find(|k| refs.iter().all(|v| k.admits(v))) {
        Some(kind) => {
            let element = kind.java_type(&refs);
            Ok(format!("new {}[]{{{}}}", element, typed_elements(kind, items)?))
        }
        None => boxed_literal(items),
    }
}

fn typed_elements(kind: ElementKind, items: &[Value]) -> Result<String> {
    Ok(items
        .iter()
        .map(|v| kind.literal(v))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

fn boxed_literal(items: &[Value]) -> Result<String> {
    let elements = items
        .iter()
        .map(to_java_literal)
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(format!("new Object[]{{{}}}", elements))
}

fn scalar_literal(value: &Value) -> Result<String> {
    match value {
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(_) => {
            let n = truncated(value);
            if fits_int(value) {
                Ok(n.to_string())
            } else {
                Ok(format!("{}L", n))
            }
        }
        Value::String(s) => Ok(string_literal(s)),
        Value::Null => Ok("null".to_string()),
        other => to_java_literal(other),
    }
}

/// Truncate toward zero; out-of-range floats saturate
fn truncated(value: &Value) -> i64 {
    if let Some(i) = value.as_i64() {
        i
    } else if value.as_u64().is_some() {
        i64::MAX
    } else {
        value.as_f64().map(|f| f.trunc() as i64).unwrap_or_default()
    }
}

fn fits_int(value: &Value) -> bool {
    let n = truncated(value);
    n >= i32::MIN as i64 && n <= i32::MAX as i64
}

/// One UTF-16 code unit, i.e. representable as a Java `char`
fn is_single_char(s: &str) -> bool {
    s.encode_utf16().count() == 1
}

pub fn string_literal(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

pub fn char_literal(s: &str) -> String {
    format!("'{}'", escape(s))
}

/// Escape for Java string and char literals.
/// Control characters use octal escapes: Java rewrites `\uXXXX` before
/// lexing, so a unicode-escaped newline would break the literal.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 32 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
