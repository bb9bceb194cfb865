use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Judge configuration
/// Provides defaults with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-test-case wall clock used when a request omits its timeout
    pub default_timeout_ms: u64,
    /// Lower bound on the wall clock granted to the compile phase
    pub compile_timeout_ms: u64,
    pub python_bin: String,
    pub javac_bin: String,
    pub java_bin: String,
    /// Parent directory for per-invocation workspaces
    pub workspace_root: PathBuf,
    pub script_loop_limit: u64,
    pub script_recursion_limit: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::defaults();

        Self {
            default_timeout_ms: parsed(&lookup, "DEFAULT_TIMEOUT_MS")
                .filter(|ms: &u64| *ms > 0)
                .unwrap_or(defaults.default_timeout_ms),
            compile_timeout_ms: parsed(&lookup, "COMPILE_TIMEOUT_MS")
                .unwrap_or(defaults.compile_timeout_ms),
            python_bin: lookup("PYTHON_BIN").unwrap_or(defaults.python_bin),
            javac_bin: lookup("JAVAC_BIN").unwrap_or(defaults.javac_bin),
            java_bin: lookup("JAVA_BIN").unwrap_or(defaults.java_bin),
            workspace_root: lookup("WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            script_loop_limit: parsed(&lookup, "SCRIPT_LOOP_LIMIT")
                .unwrap_or(defaults.script_loop_limit),
            script_recursion_limit: parsed(&lookup, "SCRIPT_RECURSION_LIMIT")
                .unwrap_or(defaults.script_recursion_limit),
        }
    }

    /// Built-in defaults, ignoring the environment
    pub fn defaults() -> Self {
        let python_bin = if cfg!(windows) { "python" } else { "python3" };

        Self {
            default_timeout_ms: 1000,
            compile_timeout_ms: 10_000,
            python_bin: python_bin.to_string(),
            javac_bin: "javac".to_string(),
            java_bin: "java".to_string(),
            workspace_root: env::temp_dir(),
            script_loop_limit: 100_000_000,
            script_recursion_limit: 10_000,
        }
    }

    pub fn new() -> Self {
        Self::from_env()
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.default_timeout_ms, 1000);
        assert_eq!(config.compile_timeout_ms, 10_000);
        assert_eq!(config.javac_bin, "javac");
        assert_eq!(config.java_bin, "java");
        assert_eq!(config.workspace_root, env::temp_dir());
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DEFAULT_TIMEOUT_MS", "2500"),
            ("PYTHON_BIN", "/opt/python/bin/python3.12"),
            ("JAVA_BIN", "/usr/lib/jvm/bin/java"),
            ("WORKSPACE_ROOT", "/var/tmp/optimus"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.default_timeout_ms, 2500);
        assert_eq!(config.python_bin, "/opt/python/bin/python3.12");
        assert_eq!(config.java_bin, "/usr/lib/jvm/bin/java");
        assert_eq!(config.javac_bin, "javac");
        assert_eq!(config.workspace_root, PathBuf::from("/var/tmp/optimus"));
    }

    #[test]
    fn test_config_ignores_invalid_numbers() {
        let config = Config::from_lookup(|key| match key {
            "DEFAULT_TIMEOUT_MS" => Some("0".to_string()),
            "COMPILE_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config.default_timeout_ms, 1000);
        assert_eq!(config.compile_timeout_ms, 10_000);
    }
}
