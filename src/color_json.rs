//! Purpose: Render a coerced value tree as pretty JSON, optionally ANSI-colored.
//! Exports: colorize_value.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: Without color, output equals serde_json::to_string_pretty of `json::to_json_with`.
//! Invariants: ANSI escapes appear only when explicitly enabled.
//! Notes: Nulls that stand in for undefined markers get their own dim color.
use query_coerce::Value;
use query_coerce::json::{UndefinedMode, is_omitted_entry, number_to_json};

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_UNDEFINED: &str = "90";
const COLOR_PUNCT: &str = "39";

/// Callers rejecting undefined markers must check with `to_json_with` first;
/// here they fall back to `null`.
pub fn colorize_value(value: &Value, mode: UndefinedMode, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, mode, 0, use_color, &mut out);
    out
}

fn write_value(
    value: &Value,
    mode: UndefinedMode,
    indent: usize,
    use_color: bool,
    out: &mut String,
) {
    match value {
        Value::Null => push_colored("null", COLOR_NULL, use_color, out),
        Value::Undefined | Value::Opaque(_) => {
            push_colored("null", COLOR_UNDEFINED, use_color, out)
        }
        Value::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Number(num) => {
            let rendered = number_to_json(*num);
            let color = if rendered.is_null() {
                COLOR_NULL
            } else {
                COLOR_NUMBER
            };
            push_colored(&rendered.to_string(), color, use_color, out);
        }
        Value::String(text) => {
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Value::Sequence(items) => write_sequence(items, mode, indent, use_color, out),
        Value::Mapping(map) => {
            let entries = map
                .iter()
                .filter(|(_, item)| !is_omitted_entry(item, mode))
                .collect::<Vec<_>>();
            write_mapping(&entries, mode, indent, use_color, out);
        }
    }
}

fn write_sequence(
    items: &[Value],
    mode: UndefinedMode,
    indent: usize,
    use_color: bool,
    out: &mut String,
) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, mode, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_mapping(
    entries: &[(&str, &Value)],
    mode: UndefinedMode,
    indent: usize,
    use_color: bool,
    out: &mut String,
) {
    if entries.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, (key, item)) in entries.iter().enumerate() {
        push_indent(indent + 1, out);
        let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
        push_colored(&encoded, COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(item, mode, indent + 1, use_color, out);
        if idx + 1 < entries.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::colorize_value;
    use query_coerce::json::{UndefinedMode, to_json_with};
    use query_coerce::{Mapping, Value};

    fn sample() -> Value {
        let mut nested = Mapping::new();
        nested.insert("x", Value::from("y"));
        nested.insert("gone", Value::Undefined);
        let mut map = Mapping::new();
        map.insert("zeta", Value::Number(1.0));
        map.insert(
            "arr",
            Value::Sequence(vec![
                Value::Number(2.5),
                Value::Bool(true),
                Value::Null,
                Value::Undefined,
                Value::Number(f64::INFINITY),
            ]),
        );
        map.insert("nested", Value::Mapping(nested));
        map.insert("empty", Value::Mapping(Mapping::new()));
        Value::Mapping(map)
    }

    #[test]
    fn plain_output_matches_pretty_json_in_every_mode() {
        let value = sample();
        for mode in [UndefinedMode::Stringify, UndefinedMode::Null] {
            let plain = colorize_value(&value, mode, false);
            let json = to_json_with(&value, mode).expect("render");
            let pretty = serde_json::to_string_pretty(&json).expect("pretty");
            assert_eq!(plain, pretty);
        }
    }

    #[test]
    fn colored_output_marks_each_token_kind() {
        let mut map = Mapping::new();
        map.insert("k", Value::from("v"));
        map.insert("n", Value::Number(1.0));
        map.insert("b", Value::Bool(true));
        map.insert("z", Value::Null);
        map.insert("u", Value::Sequence(vec![Value::Undefined]));
        let colored = colorize_value(&Value::Mapping(map), UndefinedMode::Stringify, true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[90mnull\u{1b}[0m"));
    }
}
