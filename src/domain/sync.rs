// src/domain/sync.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::report::{Report, UiStatus};

/// The in-memory collection of canonical reports the panels render from,
/// shared across server worker threads.
///
/// Fetches are tagged with a monotonic sequence number when issued;
/// results are installed only if no newer fetch has completed in the
/// meantime. Completion order wins, not issue order, so a slow stale
/// response can never overwrite fresher data.
pub struct WorkingSet {
    seq: AtomicU64,
    inner: Mutex<Inner>,
}

struct Inner {
    last_applied: u64,
    reports: Vec<Report>,
    /// True while the set holds fallback data (snapshots or samples)
    /// because the last fetch failed; the panels show a retry banner.
    degraded: bool,
    ever_loaded: bool,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                last_applied: 0,
                reports: Vec::new(),
                degraded: false,
                ever_loaded: false,
            }),
        }
    }

    /// Issue a sequence number for a fetch about to start.
    pub fn begin_fetch(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install fetch results. Returns false (and discards the data) if a
    /// newer fetch already completed.
    pub fn apply_fetch(&self, seq: u64, reports: Vec<Report>, degraded: bool) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if seq <= inner.last_applied {
            eprintln!(
                "🔁 Discarding stale fetch #{seq} (already applied #{})",
                inner.last_applied
            );
            return false;
        }
        inner.last_applied = seq;
        inner.reports = reports;
        inner.degraded = degraded;
        inner.ever_loaded = true;
        true
    }

    /// Optimistic merge after a locally-initiated status update: the
    /// server call already resolved, so the panel reflects the new status
    /// immediately instead of waiting for the reconciling re-fetch.
    pub fn apply_status_update(&self, report_id: &str, status: UiStatus) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.reports.iter_mut().find(|r| r.id == report_id) {
            Some(report) => {
                report.status = status;
                true
            }
            None => false,
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.inner.lock().unwrap().reports.clone()
    }

    pub fn get(&self, report_id: &str) -> Option<Report> {
        self.inner
            .lock()
            .unwrap()
            .reports
            .iter()
            .find(|r| r.id == report_id)
            .cloned()
    }

    pub fn is_degraded(&self) -> bool {
        self.inner.lock().unwrap().degraded
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().unwrap().ever_loaded
    }
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::Priority;

    fn report(id: &str, status: UiStatus) -> Report {
        Report {
            id: id.into(),
            title: format!("Report {id}"),
            description: "d".into(),
            location: "l".into(),
            priority: Priority::Medium,
            status,
            category: "general".into(),
            created_at: None,
            timeline: vec![],
            images: vec![],
            progress_images: vec![],
        }
    }

    #[test]
    fn later_fetch_completing_first_wins() {
        let set = WorkingSet::new();

        let fetch1 = set.begin_fetch(); // issued first, slow
        let fetch2 = set.begin_fetch(); // issued second, fast

        assert!(set.apply_fetch(fetch2, vec![report("new", UiStatus::InProgress)], false));
        // The slow response arrives late and must be discarded.
        assert!(!set.apply_fetch(fetch1, vec![report("old", UiStatus::Assigned)], false));

        let reports = set.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "new");
    }

    #[test]
    fn sequential_fetches_replace_contents() {
        let set = WorkingSet::new();

        let f1 = set.begin_fetch();
        assert!(set.apply_fetch(f1, vec![report("a", UiStatus::Assigned)], false));

        let f2 = set.begin_fetch();
        assert!(set.apply_fetch(f2, vec![report("b", UiStatus::Completed)], false));

        assert_eq!(set.reports().len(), 1);
        assert_eq!(set.reports()[0].id, "b");
    }

    #[test]
    fn optimistic_merge_updates_only_the_target() {
        let set = WorkingSet::new();
        let f = set.begin_fetch();
        set.apply_fetch(
            f,
            vec![
                report("a", UiStatus::Assigned),
                report("b", UiStatus::Assigned),
            ],
            false,
        );

        assert!(set.apply_status_update("b", UiStatus::Paused));
        assert!(!set.apply_status_update("missing", UiStatus::Paused));

        assert_eq!(set.get("a").unwrap().status, UiStatus::Assigned);
        assert_eq!(set.get("b").unwrap().status, UiStatus::Paused);
    }

    #[test]
    fn degraded_flag_tracks_last_applied_fetch() {
        let set = WorkingSet::new();
        assert!(!set.is_loaded());

        let f1 = set.begin_fetch();
        set.apply_fetch(f1, vec![], true);
        assert!(set.is_degraded());
        assert!(set.is_loaded());

        let f2 = set.begin_fetch();
        set.apply_fetch(f2, vec![], false);
        assert!(!set.is_degraded());
    }
}
