// src/events.rs

use std::sync::Mutex;

use crate::domain::report::UiStatus;

/// Broadcast after every successful status transition so independent
/// panel regions (badge counts, session stats, logs) can react without
/// being wired to the route handler that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStatusChanged {
    pub report_id: String,
    pub status: UiStatus,
}

type Listener = Box<dyn Fn(&ReportStatusChanged) + Send + Sync>;

/// Minimal in-process pub/sub. Listeners registered once at startup;
/// publish walks them in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ReportStatusChanged) + Send + Sync + 'static,
    {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    pub fn publish(&self, event: &ReportStatusChanged) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn all_subscribers_see_each_event() {
        let bus = EventBus::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let c = first.clone();
        bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = second.clone();
        bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&ReportStatusChanged {
            report_id: "r1".into(),
            status: UiStatus::Paused,
        });
        bus.publish(&ReportStatusChanged {
            report_id: "r2".into(),
            status: UiStatus::Completed,
        });

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn events_carry_id_and_status() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        bus.publish(&ReportStatusChanged {
            report_id: "r9".into(),
            status: UiStatus::InProgress,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].report_id, "r9");
        assert_eq!(seen[0].status, UiStatus::InProgress);
    }

    #[test]
    fn publish_with_no_listeners_is_fine() {
        let bus = EventBus::new();
        bus.publish(&ReportStatusChanged {
            report_id: "r1".into(),
            status: UiStatus::Assigned,
        });
    }
}
