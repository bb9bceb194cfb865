/// Harness Synthesizer
///
/// Wraps candidate source in a self-contained guest program that calls the
/// resolved entry point and reports the return value in wire format.
///
/// - Scripted (JavaScript): arguments are embedded as a JSON literal; the
///   program evaluates to the envelope string.
/// - Interpreted (Python): arguments arrive as JSON in `argv[1]`; the program
///   prints the envelope as a single stdout line.
/// - Compiled (Java): a runner embeds test cases' marshalled arguments behind
///   a `switch` on the test-case index, and prints the bare serialized value.
///   A companion serializer walks the return value. A `void` entry point
///   reports `null`.
///
/// Candidate writes to stdout are redirected to stderr by the interpreted and
/// compiled harnesses so the result line stays intact.
use crate::entry_point::EntryPoint;
use crate::error::Result;
use crate::marshal;
use crate::wire;
use optimus_common::types::TestCase;
use serde_json::Value;

/// Class name of the generated compiled runner
pub const COMPILED_RUNNER_CLASS: &str = "OptimusRunner";
/// Class name of the generated compiled serializer
pub const COMPILED_SERIALIZER_CLASS: &str = "OptimusSerializer";

/// Build the in-process JavaScript program for one test case
pub fn scripted_program(entry: &str, source: &str, test_case: &TestCase) -> String {
    let call = if test_case.spreads_args() {
        format!("{}(...__optimusArgs)", entry)
    } else {
        format!("{}(__optimusArgs)", entry)
    };

    format!(
        r#"var console = {{ log: function () {{}}, error: function () {{}}, warn: function () {{}}, info: function () {{}} }};
{source}
;(function () {{
  try {{
    var __optimusArgs = {args};
    var __optimusResult = {call};
    return JSON.stringify({{ ok: true, out: __optimusResult === undefined ? null : __optimusResult }});
  }} catch (err) {{
    return JSON.stringify({{ ok: false, error: String(err) }});
  }}
}})();
"#,
        source = source,
        args = wire::encode(&test_case.args),
        call = call,
    )
}

/// Build the Python program for one test case.
/// The arguments themselves are supplied on the command line.
pub fn interpreted_program(entry: &str, source: &str, test_case: &TestCase) -> String {
    let call = if test_case.spreads_args() {
        format!("{}(*__optimus_args)", entry)
    } else {
        format!("{}(__optimus_args)", entry)
    };

    format!(
        r#"{source}


import json as __optimus_json
import sys as __optimus_sys


def __optimus_main():
    real_stdout = __optimus_sys.stdout
    __optimus_sys.stdout = __optimus_sys.stderr
    try:
        __optimus_args = __optimus_json.loads(__optimus_sys.argv[1])
        __optimus_result = {call}
        payload = __optimus_json.dumps({{"ok": True, "out": __optimus_result}}, separators=(",", ":"), allow_nan=False)
    except Exception as exc:
        payload = __optimus_json.dumps({{"ok": False, "error": "%s: %s" % (type(exc).__name__, exc)}})
    finally:
        __optimus_sys.stdout = real_stdout
    real_stdout.write(payload + "\n")
    real_stdout.flush()


__optimus_main()
"#,
        source = source,
        call = call,
    )
}

/// Java argument list for one test case, using source-embedded literals
pub fn compiled_call_arguments(test_case: &TestCase) -> Result<String> {
    match &test_case.args {
        Value::Array(items) if test_case.spreads_args() => Ok(items
            .iter()
            .map(marshal::to_java_literal)
            .collect::<Result<Vec<_>>>()?
            .join(", ")),
        single => marshal::to_java_literal(single),
    }
}

/// Build the Java runner class `runner`. `calls[i]` is the argument list for
/// test case `i`, or `None` when that case has no branch.
pub fn compiled_runner(
    runner: &str,
    class: &str,
    entry: &EntryPoint,
    calls: &[Option<String>],
) -> String {
    let mut branches = String::new();
    for (index, call) in calls.iter().enumerate() {
        if let Some(arguments) = call {
            let invocation = if entry.returns_void {
                format!(
                    "{class}.{name}({arguments});\n                return null;",
                    name = entry.name
                )
            } else {
                format!("return {class}.{name}({arguments});", name = entry.name)
            };
            branches.push_str(&format!(
                "            case {index}:\n                {invocation}\n"
            ));
        }
    }

    format!(
        r#"import java.io.PrintStream;

public class {runner} {{
    private static Object invoke(int testIndex) throws Throwable {{
        switch (testIndex) {{
{branches}            default:
                throw new IllegalArgumentException("Unknown test case: " + testIndex);
        }}
    }}

    public static void main(String[] args) throws Throwable {{
        PrintStream stdout = System.out;
        System.setOut(System.err);
        Object result = invoke(Integer.parseInt(args[0]));
        stdout.print({serializer}.serialize(result));
        stdout.flush();
    }}
}}
"#,
        runner = runner,
        serializer = COMPILED_SERIALIZER_CLASS,
        branches = branches,
    )
}

/// Java serializer: a visitor over runtime type tags that prints any return
/// value (scalars, strings, primitive and object arrays, collections, maps) as
/// compact JSON.
pub fn compiled_serializer() -> &'static str {
    COMPILED_SERIALIZER_SOURCE
}

const COMPILED_SERIALIZER_SOURCE: &str = r#"import java.util.Map;

final class OptimusSerializer {
    private OptimusSerializer() {
    }

    static String serialize(Object value) {
        StringBuilder out = new StringBuilder();
        write(out, value);
        return out.toString();
    }

    private static void write(StringBuilder out, Object value) {
        if (value == null) {
            out.append("null");
        } else if (value instanceof String) {
            quote(out, (String) value);
        } else if (value instanceof Character) {
            quote(out, String.valueOf(((Character) value).charValue()));
        } else if (value instanceof Boolean) {
            out.append(((Boolean) value).booleanValue());
        } else if (value instanceof Float) {
            number(out, Double.parseDouble(value.toString()));
        } else if (value instanceof Double) {
            number(out, ((Double) value).doubleValue());
        } else if (value instanceof Number) {
            out.append(value.toString());
        } else if (value instanceof int[]) {
            int[] items = (int[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                out.append(items[i]);
            }
            out.append(']');
        } else if (value instanceof long[]) {
            long[] items = (long[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                out.append(items[i]);
            }
            out.append(']');
        } else if (value instanceof short[]) {
            short[] items = (short[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                out.append(items[i]);
            }
            out.append(']');
        } else if (value instanceof byte[]) {
            byte[] items = (byte[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                out.append(items[i]);
            }
            out.append(']');
        } else if (value instanceof double[]) {
            double[] items = (double[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                number(out, items[i]);
            }
            out.append(']');
        } else if (value instanceof float[]) {
            float[] items = (float[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                number(out, Double.parseDouble(Float.toString(items[i])));
            }
            out.append(']');
        } else if (value instanceof boolean[]) {
            boolean[] items = (boolean[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                out.append(items[i]);
            }
            out.append(']');
        } else if (value instanceof char[]) {
            char[] items = (char[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                quote(out, String.valueOf(items[i]));
            }
            out.append(']');
        } else if (value instanceof Object[]) {
            Object[] items = (Object[]) value;
            out.append('[');
            for (int i = 0; i < items.length; i++) {
                if (i > 0) out.append(',');
                write(out, items[i]);
            }
            out.append(']');
        } else if (value instanceof Map) {
            out.append('{');
            boolean first = true;
            for (Map.Entry<?, ?> entry : ((Map<?, ?>) value).entrySet()) {
                if (!first) out.append(',');
                first = false;
                quote(out, String.valueOf(entry.getKey()));
                out.append(':');
                write(out, entry.getValue());
            }
            out.append('}');
        } else if (value instanceof Iterable) {
            out.append('[');
            boolean first = true;
            for (Object item : (Iterable<?>) value) {
                if (!first) out.append(',');
                first = false;
                write(out, item);
            }
            out.append(']');
        } else {
            quote(out, value.toString());
        }
    }

    private static void number(StringBuilder out, double d) {
        if (Double.isNaN(d) || Double.isInfinite(d)) {
            out.append("null");
        } else if (d == Math.rint(d) && Math.abs(d) < 1e15) {
            out.append((long) d);
        } else {
            out.append(Double.toString(d));
        }
    }

    private static void quote(StringBuilder out, String s) {
        out.append('"');
        for (int i = 0; i < s.length(); i++) {
            char c = s.charAt(i);
            switch (c) {
                case '\\': out.append("\\\\"); break;
                case '"': out.append("\\\""); break;
                case '\b': out.append("\\b"); break;
                case '\f': out.append("\\f"); break;
                case '\n': out.append("\\n"); break;
                case '\r': out.append("\\r"); break;
                case '\t': out.append("\\t"); break;
                default:
                    if (c < 32) {
                        out.append(String.format("\\u%04x", (int) c));
                    } else {
                        out.append(c);
                    }
            }
        }
        out.append('"');
    }
}
"#;
