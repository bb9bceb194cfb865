/// Entry-Point Resolver
///
/// Locates the single callable the harness must invoke. This is a narrow
/// convention match, not a parser: the **first** qualifying declaration wins,
/// and submissions with several candidates are resolved to that first one.
///
/// | Language   | Qualifying declaration                      |
/// |------------|---------------------------------------------|
/// | JavaScript | `function name(`                            |
/// | Python     | top-level (column 0) `def name(`            |
/// | Java       | `public static [modifiers] Type name(`      |
use crate::error::{JudgeError, Result};
use lazy_static::lazy_static;
use optimus_common::types::Language;
use regex::Regex;

/// Class name assumed for compiled submissions that declare none
pub const DEFAULT_CLASS: &str = "Solution";

lazy_static! {
    static ref JAVASCRIPT_FUNCTION: Regex =
        Regex::new(r"\bfunction\s+(?P<name>[A-Za-z_$][\w$]*)\s*\(").expect("valid regex");
    static ref PYTHON_DEF: Regex =
        Regex::new(r"(?m)^def\s+(?P<name>[A-Za-z_]\w*)\s*\(").expect("valid regex");
    static ref JAVA_STATIC_METHOD: Regex = Regex::new(
        r"\bpublic\s+static\s+(?:(?:final|synchronized|strictfp)\s+)*(?:<[^>]*>\s*)?(?P<returns>[\w$.<>\[\],?\s]+?)\s+(?P<name>[A-Za-z_$][\w$]*)\s*\("
    )
    .expect("valid regex");
    static ref JAVA_CLASS: Regex =
        Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").expect("valid regex");
    static ref JAVA_PUBLIC_CLASS: Regex =
        Regex::new(r"\bpublic\s+(?:(?:final|abstract)\s+)*class\s+([A-Za-z_$][\w$]*)")
            .expect("valid regex");
}

/// The resolved callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    /// Declared `void`; only compiled languages declare a return type
    pub returns_void: bool,
}

/// Resolve the entry point of `source` for `language`
pub fn resolve(source: &str, language: Language) -> Result<EntryPoint> {
    let pattern: &Regex = match language {
        Language::Javascript => &JAVASCRIPT_FUNCTION,
        Language::Python => &PYTHON_DEF,
        Language::Java => &JAVA_STATIC_METHOD,
    };

    pattern
        .captures(source)
        .and_then(|caps| {
            let name = caps.name("name")?;
            let returns_void = caps
                .name("returns")
                .map(|returns| returns.as_str().trim() == "void")
                .unwrap_or(false);
            Some(EntryPoint {
                name: name.as_str().to_string(),
                returns_void,
            })
        })
        .ok_or_else(|| JudgeError::EntryPointNotFound(language.to_string()))
}

/// Class the compiled entry point is called on.
///
/// Every class whose body encloses the first qualifying method contributes to
/// the qualified name (`Outer.Inner`), so helper classes declared before the
/// solution are skipped. Without a qualifying method the public class, then
/// [`DEFAULT_CLASS`], is used. Braces are counted literally; braces inside
/// string literals or comments can mislead it.
pub fn declaring_class(source: &str) -> String {
    let enclosing: Vec<&str> = match JAVA_STATIC_METHOD.find(source) {
        Some(method) => JAVA_CLASS
            .captures_iter(source)
            .filter_map(|caps| {
                let declaration = caps.get(0)?;
                let name = caps.get(1)?;
                if declaration.start() >= method.start() {
                    return None;
                }
                let (open, close) = body_span(source, declaration.end())?;
                (open < method.start() && method.start() < close).then(|| name.as_str())
            })
            .collect(),
        None => Vec::new(),
    };

    if !enclosing.is_empty() {
        return enclosing.join(".");
    }

    JAVA_PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_CLASS.to_string())
}

/// Byte offsets of the first `{` at or after `from` and its matching `}`.
/// An unbalanced body extends to the end of the source.
fn body_span(source: &str, from: usize) -> Option<(usize, usize)> {
    let open = from + source[from..].find('{')?;
    let mut depth = 0usize;
    for (offset, c) in source[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + offset));
                }
            }
            _ => {}
        }
    }
    Some((open, source.len()))
}

/// File name the compiled candidate must be stored under.
/// Java requires a public class to live in a file of the same name.
pub fn source_file_name(source: &str) -> String {
    let class = JAVA_PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str())
        .unwrap_or(DEFAULT_CLASS);
    format!("{}.java", class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_function() {
        let source = "// doubles\nfunction double(x) {\n  return x * 2;\n}\n";
        assert_eq!(resolve(source, Language::Javascript).unwrap().name, "double");
    }

    #[test]
    fn test_javascript_first_declaration_wins() {
        let source = "function helper(a) { return a; }\nfunction solve(a) { return helper(a); }";
        assert_eq!(resolve(source, Language::Javascript).unwrap().name, "helper");
    }

    #[test]
    fn test_python_top_level_def() {
        let source = "class Helper:\n    def method(self):\n        pass\n\ndef two_sum(nums, target):\n    return []\n";
        assert_eq!(resolve(source, Language::Python).unwrap().name, "two_sum");
    }

    #[test]
    fn test_python_ignores_nested_def() {
        let source = "import math\n    def indented(x):\n        return x\n";
        assert_eq!(
            resolve(source, Language::Python),
            Err(JudgeError::EntryPointNotFound("python".to_string()))
        );
    }

    #[test]
    fn test_java_public_static_method() {
        let source = r#"
class Solution {
    private static int helper(int x) { return x; }
    public static int[] twoSum(int[] nums, int target) {
        return new int[]{0, 1};
    }
}
"#;
        assert_eq!(resolve(source, Language::Java).unwrap().name, "twoSum");
    }

    #[test]
    fn test_java_void_method() {
        let source = "public class Solution {\n  public static void touch(int[] xs) { xs[0] = 1; }\n}";
        let entry = resolve(source, Language::Java).unwrap();
        assert_eq!(entry.name, "touch");
        assert!(entry.returns_void);

        let typed = resolve("class S { public static int f(int x) { return x; } }", Language::Java).unwrap();
        assert!(!typed.returns_void);
    }

    #[test]
    fn test_java_generic_return_type() {
        let source = "public class Solution {\n  public static List<List<Integer>> groups(int n) { return null; }\n}";
        assert_eq!(resolve(source, Language::Java).unwrap().name, "groups");
    }

    #[test]
    fn test_java_static_nested_class_is_not_a_method() {
        let source = "public class Solution {\n  public static class Node { int v; }\n  public static int depth(Node n) { return 0; }\n}";
        assert_eq!(resolve(source, Language::Java).unwrap().name, "depth");
    }

    #[test]
    fn test_missing_entry_point() {
        for language in Language::all_variants() {
            let err = resolve("let x = 1;\nx = x + 1", *language).unwrap_err();
            assert_eq!(err, JudgeError::EntryPointNotFound(language.to_string()));
        }
    }

    #[test]
    fn test_declaring_class_fallbacks() {
        assert_eq!(declaring_class("class Solution {}"), "Solution");
        assert_eq!(declaring_class("public final class Calc { }"), "Calc");
        assert_eq!(declaring_class("interface Nothing {}"), DEFAULT_CLASS);
    }

    #[test]
    fn test_declaring_class_skips_leading_helper_class() {
        let source = "class Node { int v; }\npublic class Solution {\n  public static int f(int x) { return x; }\n}";
        assert_eq!(declaring_class(source), "Solution");
    }

    #[test]
    fn test_declaring_class_skips_closed_nested_class() {
        let source = "public class Solution {\n  public static class Node { int v; }\n  public static int depth(Node n) { return 0; }\n}";
        assert_eq!(declaring_class(source), "Solution");
    }

    #[test]
    fn test_declaring_class_qualifies_nested_owner() {
        let source = "public class Outer {\n  static class Inner {\n    public static int f(int x) { return x; }\n  }\n}";
        assert_eq!(declaring_class(source), "Outer.Inner");
    }

    #[test]
    fn test_declaring_class_with_trailing_helper() {
        let source = "class Solution {\n  public static int f(int x) { return x; }\n}\nclass Helper { }";
        assert_eq!(declaring_class(source), "Solution");
    }

    #[test]
    fn test_source_file_name() {
        assert_eq!(source_file_name("public class Calc {}"), "Calc.java");
        assert_eq!(source_file_name("class Calc {}"), "Solution.java");
    }
}
