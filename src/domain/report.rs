use chrono::{DateTime, Utc};

/// Report priority as shown to users. Anything the server sends outside
/// this set collapses to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Status vocabulary the panels render and accept as transition intents.
/// Deliberately a separate enum from [`ServerStatus`]: `Paused` exists only
/// on the client and must never share representation with the server set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiStatus {
    Assigned,
    InProgress,
    Paused,
    Completed,
}

impl UiStatus {
    /// Accepts both hyphen and underscore spellings, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "assigned" => Some(UiStatus::Assigned),
            "in-progress" => Some(UiStatus::InProgress),
            "paused" => Some(UiStatus::Paused),
            "completed" => Some(UiStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatus::Assigned => "assigned",
            UiStatus::InProgress => "in-progress",
            UiStatus::Paused => "paused",
            UiStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UiStatus::Assigned => "Assigned",
            UiStatus::InProgress => "In Progress",
            UiStatus::Paused => "Paused",
            UiStatus::Completed => "Completed",
        }
    }
}

/// Status vocabulary the server actually stores. Field workers may only
/// ever *set* `in_progress` and `resolved`; `assigned` appears in
/// timelines written by the dispatch side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Assigned,
    InProgress,
    Resolved,
}

impl ServerStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "assigned" => Some(ServerStatus::Assigned),
            "in_progress" => Some(ServerStatus::InProgress),
            "resolved" => Some(ServerStatus::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Assigned => "assigned",
            ServerStatus::InProgress => "in_progress",
            ServerStatus::Resolved => "resolved",
        }
    }
}

/// One entry of a report's server-side status timeline, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub status: ServerStatus,
    pub timestamp: Option<DateTime<Utc>>,
    /// Free text. By server convention carries the encoded sub-state
    /// markers "Task paused" / "Task resumed".
    pub comment: Option<String>,
    pub images: Vec<String>,
}

/// Canonical in-memory report. Built by the normalizer on every fetch;
/// the only partial mutation allowed afterwards is the optimistic status
/// merge applied while a reconciling re-fetch is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Always a flattened human-readable string, never an object.
    pub location: String,
    pub priority: Priority,
    pub status: UiStatus,
    pub category: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Server order preserved verbatim; use [`Report::recent_timeline`]
    /// for a newest-first view.
    pub timeline: Vec<TimelineEntry>,
    /// Citizen-submitted photos, resolved to absolute URLs.
    pub images: Vec<String>,
    /// Field-worker-submitted photos. Kept separate from `images`:
    /// provenance is a first-class distinction the panels must preserve.
    pub progress_images: Vec<String>,
}

impl Report {
    /// The `n` most recent timeline entries, newest first.
    pub fn recent_timeline(&self, n: usize) -> Vec<&TimelineEntry> {
        self.timeline.iter().rev().take(n).collect()
    }
}
