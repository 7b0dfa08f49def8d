//! In-process formatting.

use crate::engine::{EngineError, EngineOptions, FormatEngine, JsonEngine};
use crate::error::{GenfmtError, Result};
use crate::render::render;
use std::sync::Arc;

/// Runs the engine on the caller's thread.
#[derive(Clone)]
pub struct DirectFormatter {
    engine: Arc<dyn FormatEngine>,
}

impl DirectFormatter {
    /// Use the default JSON engine with `options`.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_engine(Arc::new(JsonEngine::new(options)))
    }

    /// Use a custom engine.
    pub fn with_engine(engine: Arc<dyn FormatEngine>) -> Self {
        Self { engine }
    }

    /// Format `source`, labelling any failure with `identifier`.
    pub fn format(&self, identifier: &str, source: &str) -> Result<String> {
        self.engine.format(source).map_err(|e| match e {
            EngineError::Diagnostics(diagnostics) => {
                GenfmtError::formatting(identifier, render(identifier, source, &diagnostics))
            }
            EngineError::Internal(cause) => GenfmtError::formatting(
                identifier,
                format!("Failed to format '{}': {}", identifier, cause),
            ),
        })
    }
}

impl Default for DirectFormatter {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl std::fmt::Debug for DirectFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectFormatter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEngine;

    impl FormatEngine for FailingEngine {
        fn format(&self, _source: &str) -> std::result::Result<String, EngineError> {
            Err(EngineError::Internal("engine crashed".to_string()))
        }
    }

    #[test]
    fn test_formats_valid_source() {
        let formatter = DirectFormatter::default();
        let out = formatter.format("demo.Config", "{\"a\":1}").unwrap();
        assert_eq!(out, "{\"a\": 1}\n");
    }

    #[test]
    fn test_diagnostics_are_rendered() {
        let formatter = DirectFormatter::default();
        let source = "{\n  \"type\": oops name\n}";
        let err = formatter.format("demo.Broken", source).unwrap_err();
        assert!(err.is_formatting());

        let msg = err.to_string();
        assert!(msg.starts_with("Failed to format 'demo.Broken'"));
        assert!(msg.contains("expected value"));
        assert!(msg.contains("  \"type\": oops name"));
        assert!(msg.lines().any(|l| l.trim_start() == "^"));
    }

    #[test]
    fn test_caret_sits_under_offending_character() {
        let formatter = DirectFormatter::default();
        let cases = [
            ("{\"a\" 1}", "{\"a\" 1}", 5),
            ("[1 2]", "[1 2]", 3),
            ("{\n  \"type\": oops\n}", "  \"type\": oops", 10),
        ];
        for (source, quoted, offset) in cases {
            let msg = formatter.format("demo.Caret", source).unwrap_err().to_string();
            let expected = format!("{}\n{}^", quoted, " ".repeat(offset));
            assert!(msg.contains(&expected), "caret misplaced in:\n{}", msg);
        }
    }

    #[test]
    fn test_internal_engine_failure_is_generic() {
        let formatter = DirectFormatter::with_engine(Arc::new(FailingEngine));
        let err = formatter.format("demo.Any", "{}").unwrap_err();
        assert!(err.is_formatting());
        assert_eq!(err.to_string(), "Failed to format 'demo.Any': engine crashed");
    }

    #[test]
    fn test_reformatting_is_stable() {
        let formatter = DirectFormatter::default();
        let once = formatter
            .format("demo.Stable", "{\"list\":[1,2,3],\"nested\":{\"k\":\"v\"}}")
            .unwrap();
        let twice = formatter.format("demo.Stable", &once).unwrap();
        assert_eq!(once, twice);
    }
}
