//! Human-readable reports for engine diagnostics.
//!
//! Generated code that fails to format usually fails to compile as well, so the
//! report quotes the offending line and points at the column:
//!
//! ```text
//! Failed to format 'com.example.Widget'
//! expected `:`
//! {"name" "widget"}
//!         ^
//! ```

use crate::engine::Diagnostic;

/// Render `diagnostics` against the unformatted `source`.
///
/// Never fails: a diagnostic that cannot be placed (line 0, or past the last line)
/// downgrades the whole report to the label plus the verbatim source.
pub fn render(label: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    try_render(label, source, diagnostics).unwrap_or_else(|| minimal_report(label, source))
}

fn try_render(label: &str, source: &str, diagnostics: &[Diagnostic]) -> Option<String> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut report = format!("Failed to format '{}'\n", label);

    for diagnostic in diagnostics {
        let line = lines.get(diagnostic.line.checked_sub(1)?)?;
        report.push_str(&diagnostic.message);
        report.push('\n');
        report.push_str(line);
        report.push('\n');
        report.push_str(&caret_line(diagnostic.column));
        report.push_str("\n\n");
    }

    Some(report.trim_matches('\n').to_string())
}

/// Caret under a 1-indexed column that already accounts for one leading character.
fn caret_line(column: usize) -> String {
    format!("{}^", " ".repeat(column.saturating_sub(2)))
}

fn minimal_report(label: &str, source: &str) -> String {
    format!("Failed to format '{}':\n{}", label, source)
}
