// src/domain/status.rs

use crate::domain::report::{ServerStatus, TimelineEntry, UiStatus};

/// Comment conventions the server side understands. The server has no
/// dedicated paused status, so pause/resume travel as `in_progress`
/// transitions carrying these markers.
pub const PAUSE_COMMENT: &str = "Task paused";
pub const RESUME_COMMENT: &str = "Task resumed";
pub const ASSIGN_COMMENT: &str = "Task assigned";

/// What actually goes upstream for a status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub server_status: ServerStatus,
    /// Synthesized per the comment convention when the caller supplies none.
    pub comment: Option<String>,
}

/// Translate a UI transition intent into the server vocabulary.
///
/// The server accepts only `in_progress` and `resolved`; every other
/// intent is coerced to `in_progress` with a logged warning rather than
/// sent upstream. The transition pair determines the synthesized comment:
/// resuming from `paused` says "Task resumed", picking up an `assigned`
/// report says "Task assigned", pausing always says "Task paused".
pub fn to_server_status(requested: UiStatus, previous: UiStatus) -> StatusUpdate {
    match requested {
        UiStatus::InProgress => StatusUpdate {
            server_status: ServerStatus::InProgress,
            comment: match previous {
                UiStatus::Paused => Some(RESUME_COMMENT.to_string()),
                UiStatus::Assigned => Some(ASSIGN_COMMENT.to_string()),
                _ => None,
            },
        },
        UiStatus::Completed => StatusUpdate {
            server_status: ServerStatus::Resolved,
            comment: None,
        },
        UiStatus::Paused => StatusUpdate {
            server_status: ServerStatus::InProgress,
            comment: Some(PAUSE_COMMENT.to_string()),
        },
        UiStatus::Assigned => {
            // Workers cannot hand a report back to "assigned"; the server
            // would reject it anyway.
            eprintln!("⚠️ Status 'assigned' is not a valid transition target, sending in_progress");
            StatusUpdate {
                server_status: ServerStatus::InProgress,
                comment: None,
            }
        }
    }
}

/// Parse a transition intent arriving as a string (form input). Never
/// fails: out-of-vocabulary input degrades to the safe default so a bad
/// request cannot block the rest of the panel.
pub fn parse_intent(raw: &str) -> UiStatus {
    match UiStatus::parse(raw) {
        Some(status) => status,
        None => {
            eprintln!("⚠️ Unknown status intent '{raw}', treating as in-progress");
            UiStatus::InProgress
        }
    }
}

/// Inverse mapping: recover the UI status a timeline entry represents,
/// honoring the pause comment convention.
pub fn to_ui_status(entry: &TimelineEntry) -> UiStatus {
    let comment_says_paused = entry
        .comment
        .as_deref()
        .map(|c| c.contains(PAUSE_COMMENT))
        .unwrap_or(false);

    match entry.status {
        ServerStatus::InProgress if comment_says_paused => UiStatus::Paused,
        ServerStatus::InProgress => UiStatus::InProgress,
        ServerStatus::Assigned => UiStatus::Assigned,
        ServerStatus::Resolved => UiStatus::Completed,
    }
}
