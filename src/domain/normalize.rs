// src/domain/normalize.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use crate::db::pause_ledger::PauseLedger;
use crate::domain::report::{Priority, Report, ServerStatus, TimelineEntry, UiStatus};
use crate::domain::status::PAUSE_COMMENT;

pub const DEFAULT_TITLE: &str = "Untitled Report";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_LOCATION: &str = "Unknown location";
pub const DEFAULT_CATEGORY: &str = "general";

/// Builds canonical [`Report`] values out of whatever shape the server
/// sends. Never fails for missing or malformed fields: every field has a
/// stated default, and the one side effect (clearing a stale pause ledger
/// entry) is idempotent.
#[derive(Clone)]
pub struct Normalizer {
    ledger: Arc<dyn PauseLedger>,
    image_base: Url,
}

impl Normalizer {
    pub fn new(ledger: Arc<dyn PauseLedger>, image_base: Url) -> Self {
        Self { ledger, image_base }
    }

    pub fn normalize(&self, raw: &Value) -> Report {
        let id = extract_id(raw);

        let timeline = raw
            .get("timeline")
            .and_then(|v| v.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| self.normalize_timeline_entry(e))
                    .collect::<Vec<TimelineEntry>>()
            })
            .unwrap_or_default();

        let status = self.derive_status(raw, &id, &timeline);

        Report {
            id,
            title: string_field(raw, "title", DEFAULT_TITLE),
            description: string_field(raw, "description", DEFAULT_DESCRIPTION),
            location: flatten_location(raw.get("location").unwrap_or(&Value::Null)),
            priority: raw
                .get("priority")
                .and_then(|v| v.as_str())
                .and_then(Priority::parse)
                .unwrap_or(Priority::Medium),
            status,
            category: string_field(raw, "category", DEFAULT_CATEGORY),
            created_at: first_key(raw, &["createdAt", "created_at"]).and_then(parse_timestamp),
            timeline,
            images: self.resolve_images(raw.get("images")),
            progress_images: self
                .resolve_images(first_key(raw, &["progressImages", "progress_images"])),
        }
    }

    /// Status comes from `raw.status` (underscores to hyphens, lowercased,
    /// server `resolved` shown as `completed`), then the pause override:
    /// an explicit `isPaused` flag, or a ledger entry confirmed by the
    /// timeline's last comment. A ledger entry the timeline contradicts is
    /// stale (the report was resumed from another device) and gets
    /// cleared here so it can never resurface.
    fn derive_status(&self, raw: &Value, id: &str, timeline: &[TimelineEntry]) -> UiStatus {
        let derived = raw
            .get("status")
            .and_then(|v| v.as_str())
            .map(derive_base_status)
            .unwrap_or(UiStatus::Assigned);

        let flagged_paused = first_key(raw, &["isPaused", "is_paused"])
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let last_comment_paused = timeline
            .last()
            .and_then(|e| e.comment.as_deref())
            .map(|c| c.contains(PAUSE_COMMENT))
            .unwrap_or(false);

        if !id.is_empty() && self.ledger.is_paused(id) {
            if last_comment_paused {
                return UiStatus::Paused;
            }
            // Stale entry: the timeline has moved on without us.
            self.ledger.clear_paused(id);
        }

        if flagged_paused {
            return UiStatus::Paused;
        }

        derived
    }

    fn normalize_timeline_entry(&self, raw: &Value) -> TimelineEntry {
        let status = raw
            .get("status")
            .and_then(|v| v.as_str())
            .map(|s| match ServerStatus::parse(s) {
                Some(status) => status,
                None => {
                    eprintln!("⚠️ Unknown timeline status '{s}', treating as in_progress");
                    ServerStatus::InProgress
                }
            })
            .unwrap_or(ServerStatus::InProgress);

        TimelineEntry {
            status,
            timestamp: raw.get("timestamp").and_then(parse_timestamp),
            comment: raw
                .get("comment")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            images: self.resolve_images(raw.get("images")),
        }
    }

    /// Resolve every element, keep order, drop unresolvable refs. No
    /// placeholders at this layer; that is a rendering concern.
    fn resolve_images(&self, raw: Option<&Value>) -> Vec<String> {
        raw.and_then(|v| v.as_array())
            .map(|refs| {
                refs.iter()
                    .filter_map(|r| resolve_image_ref(&self.image_base, r))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// `_id` wins over `id`; either may arrive as a string or a number.
/// A report with no id at all yields an empty string and is skipped by
/// the fetch pipeline.
fn extract_id(raw: &Value) -> String {
    first_key(raw, &["_id", "id"])
        .and_then(value_to_string)
        .unwrap_or_default()
}

fn derive_base_status(raw_status: &str) -> UiStatus {
    let normalized = raw_status.trim().to_lowercase().replace('_', "-");
    match normalized.as_str() {
        "assigned" | "" => UiStatus::Assigned,
        "in-progress" => UiStatus::InProgress,
        // Our own snapshots can round-trip a paused report.
        "paused" => UiStatus::Paused,
        "resolved" | "completed" => UiStatus::Completed,
        other => {
            eprintln!("⚠️ Unknown report status '{other}', treating as assigned");
            UiStatus::Assigned
        }
    }
}

/// Flatten whatever the server sent for a location into one displayable
/// string. Precedence matters: different endpoints put structured address
/// data at different nesting depths and the panels must be insensitive to
/// which one arrived.
pub fn flatten_location(location: &Value) -> String {
    // 1. Plain string location.
    if let Some(s) = location.as_str() {
        if !s.trim().is_empty() {
            return s.trim().to_string();
        }
    }

    if location.is_object() {
        if let Some(address) = location.get("address") {
            // 2. location.address as a preformatted string.
            if let Some(s) = address.as_str() {
                if !s.trim().is_empty() {
                    return s.trim().to_string();
                }
            }
            // 3. location.address as a structured object.
            if address.is_object() {
                let joined = join_address_fields(address);
                if !joined.is_empty() {
                    return joined;
                }
            }
        }

        // 4. Address fields directly on the location object.
        let joined = join_address_fields(location);
        if !joined.is_empty() {
            return joined;
        }
    }

    // 5. Nothing usable arrived.
    DEFAULT_LOCATION.to_string()
}

fn join_address_fields(v: &Value) -> String {
    ["street", "city", "state", "zipCode"]
        .iter()
        .filter_map(|key| v.get(*key).and_then(|f| f.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve one polymorphic image reference (a URL string, an object with
/// a `url`, or an object with an upload `id`) to an absolute URL.
/// Returns `None` instead of panicking for anything unresolvable.
pub fn resolve_image_ref(base: &Url, raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => resolve_url_str(base, s),
        Value::Object(map) => {
            if let Some(u) = map.get("url").and_then(|u| u.as_str()) {
                return resolve_url_str(base, u);
            }
            let id = map
                .get("id")
                .or_else(|| map.get("_id"))
                .and_then(value_to_string)?;
            if id.is_empty() {
                return None;
            }
            base.join(&format!("uploads/{id}")).ok().map(|u| u.to_string())
        }
        _ => None,
    }
}

fn resolve_url_str(base: &Url, s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match Url::parse(s) {
        Ok(absolute) => Some(absolute.to_string()),
        // Relative path: resolve against the API base.
        Err(_) => base.join(s).ok().map(|u| u.to_string()),
    }
}

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_key<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| raw.get(*k))
}

fn string_field(raw: &Value, key: &str, default: &str) -> String {
    match raw.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Timestamps arrive as RFC 3339 strings or unix epochs (seconds or
/// milliseconds, depending on the endpoint).
fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    if let Some(s) = v.as_str() {
        return DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }
    let n = v.as_i64()?;
    if n > 1_000_000_000_000 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}
