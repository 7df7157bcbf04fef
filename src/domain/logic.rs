// src/domain/logic.rs

use crate::domain::report::{Report, UiStatus};

/// Per-status totals for the dashboard badge row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub assigned: usize,
    pub in_progress: usize,
    pub paused: usize,
    pub completed: usize,
}

impl StatusCounts {
    /// Reports still needing attention from a field worker.
    pub fn open(&self) -> usize {
        self.assigned + self.in_progress + self.paused
    }

    pub fn total(&self) -> usize {
        self.open() + self.completed
    }
}

pub fn status_counts(reports: &[Report]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for report in reports {
        match report.status {
            UiStatus::Assigned => counts.assigned += 1,
            UiStatus::InProgress => counts.in_progress += 1,
            UiStatus::Paused => counts.paused += 1,
            UiStatus::Completed => counts.completed += 1,
        }
    }
    counts
}
