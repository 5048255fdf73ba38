//! CLI output formatting utilities.
//!
//! Tables are built with `tabled` in the command modules. This module holds
//! the shared pieces: colored JSON and label truncation.

use std::fmt::Write;

use colored::Colorize;
use serde_json::Value;

/// Indentation used for nested JSON.
const INDENT: &str = "  ";

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
/// - Brackets/Braces: White (bold)
pub fn print_highlighted_json(value: &Value) { println!("{}", highlight_json(value)); }

/// Renders `value` as pretty-printed, colored JSON.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => push(out, "null".magenta()),
        Value::Bool(b) => push(out, b.to_string().magenta()),
        Value::Number(n) => push(out, n.to_string().yellow()),
        Value::String(s) => push(out, quote(s).green()),
        Value::Array(items) if items.is_empty() => push(out, "[]".white().bold()),
        Value::Object(map) if map.is_empty() => push(out, "{}".white().bold()),
        Value::Array(items) => {
            push(out, "[".white().bold());
            for (i, item) in items.iter().enumerate() {
                open_entry(out, i, depth + 1);
                write_value(out, item, depth + 1);
            }
            close(out, "]", depth);
        }
        Value::Object(map) => {
            push(out, "{".white().bold());
            for (i, (key, item)) in map.iter().enumerate() {
                open_entry(out, i, depth + 1);
                push(out, quote(key).cyan());
                push(out, ": ".white());
                write_value(out, item, depth + 1);
            }
            close(out, "}", depth);
        }
    }
}

fn open_entry(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        push(out, ",".white());
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close(out: &mut String, bracket: &str, depth: usize) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    push(out, bracket.white().bold());
}

fn push(out: &mut String, token: colored::ColoredString) { let _ = write!(out, "{token}"); }

fn quote(s: &str) -> String { Value::String(s.to_string()).to_string() }

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}
