// src/tests/status_flow_tests.rs

use crate::db::pause_ledger::PauseLedger;
use crate::domain::report::UiStatus;
use crate::events::ReportStatusChanged;
use crate::router::handle;
use crate::tests::utils::{body_string, make_app, request, seed_with_samples};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

#[test]
fn failed_status_update_stays_on_panel_with_inline_error() {
    let app = make_app("status_fail");
    seed_with_samples(&app);

    let before = app.working.get("sample-1").unwrap().status;

    // The API is unreachable, so the PATCH fails.
    let mut resp = handle(
        request(
            "POST",
            "/worker/reports/sample-1/status",
            "status=paused&comment=",
        ),
        &app,
    )
    .unwrap();

    // Not a crash, not a blank page: the worker panel with a banner.
    assert_eq!(resp.status(), 200);
    let body = body_string(&mut resp);
    assert!(body.contains("Could not update report"));
    assert!(body.contains("Retry"));

    // No optimistic merge happened, and nothing was recorded as paused.
    assert_eq!(app.working.get("sample-1").unwrap().status, before);
    assert!(!app.ledger.is_paused("sample-1"));
}

#[test]
fn failed_update_publishes_no_event() {
    let app = make_app("status_no_event");
    seed_with_samples(&app);

    let seen = Arc::new(Mutex::new(Vec::<ReportStatusChanged>::new()));
    let sink = seen.clone();
    app.events.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    let _ = handle(
        request("POST", "/worker/reports/sample-1/status", "status=completed"),
        &app,
    )
    .unwrap();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(app.transitions.load(Ordering::SeqCst), 0);
}

#[test]
fn bogus_intent_is_coerced_not_rejected() {
    let app = make_app("status_bogus");
    seed_with_samples(&app);

    // Must not 400 or panic; the translator degrades it to in-progress
    // and the PATCH then fails on transport like any other update.
    let resp = handle(
        request("POST", "/worker/reports/sample-1/status", "status=bogus-status"),
        &app,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn optimistic_merge_then_stale_fetch_cannot_regress_status() {
    let app = make_app("optimistic");
    seed_with_samples(&app);

    // A fetch is in flight while the user updates a report.
    let stale_seq = app.working.begin_fetch();
    let stale_reports = app.working.reports(); // sample-1 still assigned

    app.working.apply_status_update("sample-1", UiStatus::InProgress);
    assert_eq!(
        app.working.get("sample-1").unwrap().status,
        UiStatus::InProgress
    );

    // A reconciling fetch completes after the merge...
    let fresh_seq = app.working.begin_fetch();
    let mut fresh_reports = stale_reports.clone();
    for report in &mut fresh_reports {
        if report.id == "sample-1" {
            report.status = UiStatus::InProgress;
        }
    }
    assert!(app.working.apply_fetch(fresh_seq, fresh_reports, false));

    // ...and the slow pre-update fetch must not roll it back.
    assert!(!app.working.apply_fetch(stale_seq, stale_reports, false));
    assert_eq!(
        app.working.get("sample-1").unwrap().status,
        UiStatus::InProgress
    );
}

#[test]
fn pause_marked_locally_survives_refetch_until_server_disagrees() {
    let app = make_app("pause_cycle");

    // The server says in_progress with a pause comment at the end of the
    // timeline; the ledger marks it after a pause was sent.
    let raw = serde_json::json!({
        "_id": "r7",
        "title": "Blocked storm drain",
        "status": "in_progress",
        "timeline": [{"status": "in_progress", "comment": "Task paused"}]
    });

    app.ledger.mark_paused("r7");
    let report = app.normalizer.normalize(&raw);
    assert_eq!(report.status, UiStatus::Paused);

    // Resumed elsewhere: the timeline's last word changes, the ledger
    // heals itself and the paused rendering disappears.
    let resumed = serde_json::json!({
        "_id": "r7",
        "title": "Blocked storm drain",
        "status": "in_progress",
        "timeline": [
            {"status": "in_progress", "comment": "Task paused"},
            {"status": "in_progress", "comment": "Task resumed"}
        ]
    });

    let report = app.normalizer.normalize(&resumed);
    assert_eq!(report.status, UiStatus::InProgress);
    assert!(!app.ledger.is_paused("r7"));
}
