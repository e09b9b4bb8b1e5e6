//! Tracing conventions for the search core.
//!
//! The crate emits all spans and events under one target prefix so consumers
//! can filter them (`RUST_LOG=learner_search=debug`) without configuring
//! anything here; consumers bring their own subscriber.

use tracing::Level;

/// Target used by all tracing spans and events in this crate.
pub const TARGET_PREFIX: &str = "learner_search";

/// Standard span names, kept in one place so subscribers, dashboards, and
/// tests can match on them.
pub mod span_names {
    /// Root span for one search page visit.
    pub const SEARCH_SURFACE: &str = "learner_search::surface";
    /// Filter predicate construction.
    pub const FILTER_BUILD: &str = "learner_search::filter_build";
    /// View plan selection.
    pub const VIEW_SELECT: &str = "learner_search::view_select";
    /// One section's query execution.
    pub const SECTION_QUERY: &str = "learner_search::section_query";
    /// Cache read-through (hit or fetch).
    pub const CACHE_FETCH: &str = "learner_search::cache_fetch";
    /// Navigation path normalization.
    pub const ROUTE_NORMALIZE: &str = "learner_search::route_normalize";
}

/// Standard structured field names used in tracing events.
pub mod field_names {
    pub const ENTERPRISE: &str = "enterprise";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const FILTER: &str = "filter";
    pub const HIT_COUNT: &str = "hit_count";
    pub const ATTEMPT: &str = "attempt";
    pub const BACKOFF_MS: &str = "backoff_ms";
    pub const GENERATION: &str = "generation";
    pub const KEY: &str = "key";
    pub const PATH: &str = "path";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Recommended level for the current environment: `LEARNER_SEARCH_LOG_LEVEL`
/// if set and recognized, else the provided default.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("LEARNER_SEARCH_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_span_names_start_with_target_prefix() {
        let all_spans = [
            span_names::SEARCH_SURFACE,
            span_names::FILTER_BUILD,
            span_names::VIEW_SELECT,
            span_names::SECTION_QUERY,
            span_names::CACHE_FETCH,
            span_names::ROUTE_NORMALIZE,
        ];
        for span in all_spans {
            assert!(
                span.starts_with(&format!("{TARGET_PREFIX}::")),
                "span {span:?} must start with \"{TARGET_PREFIX}::\""
            );
        }
    }

    #[test]
    fn field_names_are_non_empty() {
        let all_fields = [
            field_names::ENTERPRISE,
            field_names::CONTENT_TYPE,
            field_names::FILTER,
            field_names::HIT_COUNT,
            field_names::ATTEMPT,
            field_names::BACKOFF_MS,
            field_names::GENERATION,
            field_names::KEY,
            field_names::PATH,
        ];
        for field in all_fields {
            assert!(!field.is_empty());
        }
    }

    #[test]
    fn parse_level_recognizes_valid_levels() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("info"), Some(Level::INFO));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
    }

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level("Info"), Some(Level::INFO));
    }

    #[test]
    fn parse_level_rejects_unknown_values() {
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level(" info "), None);
    }
}
