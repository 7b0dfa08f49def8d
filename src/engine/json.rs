//! Width-aware JSON formatting.
//!
//! Containers stay on one line when they fit within the configured width at the
//! column where they start (counting a trailing comma); otherwise every member is
//! placed on its own line, one indent level deeper.

use super::{Diagnostic, EngineError, EngineOptions, FormatEngine};
use serde_json::{Map, Value};

/// Formats generated JSON sources.
#[derive(Debug, Clone, Default)]
pub struct JsonEngine {
    options: EngineOptions,
}

impl JsonEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    fn write_value(
        &self,
        out: &mut String,
        value: &Value,
        level: usize,
        column: usize,
        trailing: usize,
    ) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                let flat = inline(value);
                if column + width(&flat) + trailing <= self.options.max_width {
                    out.push_str(&flat);
                } else {
                    self.write_object(out, map, level);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                let flat = inline(value);
                if column + width(&flat) + trailing <= self.options.max_width {
                    out.push_str(&flat);
                } else {
                    self.write_array(out, items, level);
                }
            }
            _ => write_inline(out, value),
        }
    }

    fn write_object(&self, out: &mut String, map: &Map<String, Value>, level: usize) {
        let child_indent = (level + 1) * self.options.indent;
        out.push_str("{\n");
        for (i, (key, value)) in map.iter().enumerate() {
            let last = i + 1 == map.len();
            push_indent(out, child_indent);
            let key = string_literal(key);
            out.push_str(&key);
            out.push_str(": ");
            let column = child_indent + width(&key) + 2;
            self.write_value(out, value, level + 1, column, usize::from(!last));
            if !last {
                out.push(',');
            }
            out.push('\n');
        }
        push_indent(out, level * self.options.indent);
        out.push('}');
    }

    fn write_array(&self, out: &mut String, items: &[Value], level: usize) {
        let child_indent = (level + 1) * self.options.indent;
        out.push_str("[\n");
        for (i, item) in items.iter().enumerate() {
            let last = i + 1 == items.len();
            push_indent(out, child_indent);
            self.write_value(out, item, level + 1, child_indent, usize::from(!last));
            if !last {
                out.push(',');
            }
            out.push('\n');
        }
        push_indent(out, level * self.options.indent);
        out.push(']');
    }
}

impl FormatEngine for JsonEngine {
    fn format(&self, source: &str) -> Result<String, EngineError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| EngineError::Diagnostics(vec![diagnostic_from(&e)]))?;

        let mut out = String::with_capacity(source.len() + source.len() / 4);
        self.write_value(&mut out, &value, 0, 0, 0);
        out.push('\n');
        Ok(out)
    }
}

/// Convert a serde_json error into a positioned diagnostic.
///
/// serde_json appends ` at line L column C` to its messages; the position is kept in
/// the diagnostic fields instead. Its column is the offending character's own
/// 1-indexed column, one less than a [`Diagnostic`] column.
fn diagnostic_from(err: &serde_json::Error) -> Diagnostic {
    let full = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    let message = full.strip_suffix(&suffix).unwrap_or(&full);
    Diagnostic::new(err.line(), err.column().saturating_add(1), message)
}

/// Single-line rendering with `", "` and `": "` separators.
fn inline(value: &Value) -> String {
    let mut out = String::new();
    write_inline(&mut out, value);
    out
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&string_literal(key));
                out.push_str(": ");
                write_inline(out, value);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn string_literal(s: &str) -> String {
    Value::from(s).to_string()
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn push_indent(out: &mut String, spaces: usize) {
    out.extend(std::iter::repeat_n(' ', spaces));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn format(source: &str) -> String {
        JsonEngine::default().format(source).unwrap()
    }

    fn diagnostics(source: &str) -> Vec<Diagnostic> {
        match JsonEngine::default().format(source) {
            Err(EngineError::Diagnostics(d)) => d,
            other => panic!("Expected diagnostics, got {:?}", other),
        }
    }

    #[test]
    fn test_short_object_stays_inline() {
        assert_eq!(format("{\"a\":1,\"b\":[true,null]}"), "{\"a\": 1, \"b\": [true, null]}\n");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(format("{ }"), "{}\n");
        assert_eq!(format("[\n]"), "[]\n");
        assert_eq!(format("{\"a\":{},\"b\":[]}"), "{\"a\": {}, \"b\": []}\n");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(format("  42 "), "42\n");
        assert_eq!(format("\"hi\""), "\"hi\"\n");
        assert_eq!(format("null"), "null\n");
    }

    #[test]
    fn test_long_member_wraps_onto_own_line() {
        let literal = "x".repeat(90);
        let source = format!("{{\"greeting\":\"{}\"}}", literal);
        let expected = format!("{{\n  \"greeting\": \"{}\"\n}}\n", literal);
        assert_eq!(format(&source), expected);
    }

    #[test]
    fn test_nested_wrapping_keeps_short_children_inline() {
        let long = "y".repeat(80);
        let source = format!("{{\"outer\":{{\"text\":\"{}\",\"n\":[1,2]}},\"ok\":true}}", long);
        let expected = format!(
            "{{\n  \"outer\": {{\n    \"text\": \"{}\",\n    \"n\": [1, 2]\n  }},\n  \"ok\": true\n}}\n",
            long
        );
        assert_eq!(format(&source), expected);
    }

    #[test]
    fn test_trailing_comma_counts_against_width() {
        let engine = JsonEngine::new(EngineOptions {
            max_width: 20,
            indent: 2,
        });
        // `  "k": [1, 2, 3, 4],` is exactly 20 columns wide with its comma.
        let fits = engine.format("{\"k\":[1,2,3,4],\"z\":0}").unwrap();
        assert_eq!(fits, "{\n  \"k\": [1, 2, 3, 4],\n  \"z\": 0\n}\n");

        // One more element pushes it to 23 columns.
        let wraps = engine.format("{\"k\":[1,2,3,4,5],\"z\":0}").unwrap();
        assert_eq!(
            wraps,
            "{\n  \"k\": [\n    1,\n    2,\n    3,\n    4,\n    5\n  ],\n  \"z\": 0\n}\n"
        );
    }

    #[test]
    fn test_custom_indent() {
        let engine = JsonEngine::new(EngineOptions {
            max_width: 20,
            indent: 4,
        });
        let out = engine
            .format("{\"name\":\"abcdefghijklmnop\"}")
            .unwrap();
        assert_eq!(out, "{\n    \"name\": \"abcdefghijklmnop\"\n}\n");
    }

    #[test]
    fn test_member_order_preserved() {
        assert_eq!(format("{\"z\":1,\"a\":2,\"m\":3}"), "{\"z\": 1, \"a\": 2, \"m\": 3}\n");
    }

    #[test]
    fn test_numbers_kept_verbatim() {
        assert_eq!(format("[1.50,1e3,-0.0]"), "[1.50, 1e3, -0.0]\n");
    }

    #[test]
    fn test_missing_colon_diagnostic() {
        let d = diagnostics("{\"a\" 1}");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, 1);
        // `1` is the sixth character.
        assert_eq!(d[0].column, 7);
        assert_eq!(d[0].message, "expected `:`");
    }

    #[test]
    fn test_diagnostic_on_later_line() {
        let d = diagnostics("{\n  \"a\": 1,\n  \"b\": oops\n}");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, 3);
        assert_eq!(d[0].message, "expected value");
        assert!(!d[0].message.contains("at line"));
    }

    #[test]
    fn test_trailing_comma_diagnostic() {
        let d = diagnostics("[1,2,]");
        assert_eq!(d[0].message, "trailing comma");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _\\-\"\\\\]{0,40}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,12}", inner), 0..8)
                    .prop_map(|members| Value::Object(members.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_formatting_is_idempotent(value in arb_json()) {
            let engine = JsonEngine::default();
            let once = engine.format(&value.to_string()).unwrap();
            let twice = engine.format(&once).unwrap();
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn prop_formatting_preserves_value(value in arb_json()) {
            let formatted = JsonEngine::default().format(&value.to_string()).unwrap();
            let reparsed: Value = serde_json::from_str(&formatted).unwrap();
            prop_assert_eq!(reparsed, value);
        }

        #[test]
        fn prop_breaks_only_when_too_wide(value in arb_json()) {
            let engine = JsonEngine::new(EngineOptions { max_width: 40, indent: 2 });
            let formatted = engine.format(&value.to_string()).unwrap();
            let flat = inline(&value);
            if width(&flat) <= 40 {
                prop_assert_eq!(formatted.trim_end(), flat.as_str());
            }
        }
    }
}
