// src/api/envelope.rs

use serde_json::Value;

/// The one place response-shape guessing is allowed.
///
/// The reports API wraps list responses differently per endpoint (and per
/// deploy vintage). Instead of re-deriving the guesses at every call site,
/// every response body goes through this parser, which accepts, in order:
///
///   1. `{"data": {"reports": [...]}}`
///   2. `{"data": [...]}`
///   3. `{"reports": [...]}`
///   4. `[...]` (top-level array)
///   5. a single report object, treated as a one-element list
///
/// Anything else yields an empty list with a logged warning; shape
/// problems are never an error the UI has to handle.
pub fn parse_reports_envelope(body: &Value) -> Vec<Value> {
    if let Some(data) = body.get("data") {
        if let Some(reports) = data.get("reports").and_then(|v| v.as_array()) {
            return reports.clone();
        }
        if let Some(reports) = data.as_array() {
            return reports.clone();
        }
    }

    if let Some(reports) = body.get("reports").and_then(|v| v.as_array()) {
        return reports.clone();
    }

    if let Some(reports) = body.as_array() {
        return reports.clone();
    }

    if looks_like_report(body) {
        return vec![body.clone()];
    }

    eprintln!("⚠️ Response matched no known reports envelope shape, treating as empty");
    Vec::new()
}

/// Single-report responses get the same treatment: some endpoints wrap
/// the updated report, some return it bare.
pub fn parse_report_object(body: &Value) -> Option<Value> {
    for candidate in [body.get("data"), body.get("report"), Some(body)]
        .into_iter()
        .flatten()
    {
        if looks_like_report(candidate) {
            return Some(candidate.clone());
        }
    }
    None
}

fn looks_like_report(v: &Value) -> bool {
    v.is_object() && (v.get("_id").is_some() || v.get("id").is_some())
}
