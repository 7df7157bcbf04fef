// src/tests/panel_tests.rs

use crate::router::handle;
use crate::tests::utils::{body_string, make_app, request, seed_with_samples};

#[test]
fn worker_panel_falls_back_to_sample_data_with_banner() {
    let app = make_app("worker_fallback");

    // No API, no snapshots: the panel must still render something usable.
    let mut resp = handle(request("GET", "/worker", ""), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Could not reach the reports service"));
    assert!(body.contains("Pothole on Main St"));
    assert!(body.contains("Retry"));
}

#[test]
fn worker_panel_shows_status_counts() {
    let app = make_app("worker_counts");
    seed_with_samples(&app);

    let mut resp = handle(request("GET", "/worker", ""), &app).unwrap();
    let body = body_string(&mut resp);

    // Samples: one assigned, one in-progress, one resolved.
    assert!(body.contains("Assigned: 1"));
    assert!(body.contains("In Progress: 1"));
    assert!(body.contains("Paused: 0"));
    assert!(body.contains("Completed: 1"));
}

#[test]
fn citizen_panel_renders_reports_and_photo_queue() {
    let app = make_app("citizen_panel");
    seed_with_samples(&app);

    let mut resp = handle(request("GET", "/", ""), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("My Reports"));
    assert!(body.contains("Streetlight out"));
    assert!(body.contains("No photos waiting to be attached"));
}

#[test]
fn detail_page_shows_timeline_newest_first() {
    let app = make_app("detail");
    seed_with_samples(&app);

    let mut resp = handle(request("GET", "/reports/sample-3", ""), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Overflowing trash bin"));

    // The resolution entry must render before the assignment entry.
    let resolved_pos = body.find("Bin emptied").expect("resolution comment missing");
    let assigned_pos = body.find("Task assigned").expect("assignment comment missing");
    assert!(resolved_pos < assigned_pos);
}

#[test]
fn unknown_report_is_not_found() {
    let app = make_app("detail_missing");
    seed_with_samples(&app);

    let err = handle(request("GET", "/reports/nope", ""), &app).unwrap_err();
    assert!(matches!(err, crate::errors::ServerError::NotFound));
}

#[test]
fn map_stub_lists_flattened_locations() {
    let app = make_app("map");
    seed_with_samples(&app);

    let mut resp = handle(request("GET", "/map", ""), &app).unwrap();
    let body = body_string(&mut resp);

    assert!(body.contains("Nearby Issues"));
    // Nested address object, flattened to one string.
    assert!(body.contains("120 Main St, Riverton, CO, 82501"));
    // Plain string location, passed through.
    assert!(body.contains("Corner of 5th Ave and Birch Ln, Riverton"));
}

#[test]
fn export_returns_a_spreadsheet() {
    let app = make_app("export");
    seed_with_samples(&app);

    let resp = handle(request("GET", "/worker/export", ""), &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn captured_photo_is_cached_then_listed() {
    let app = make_app("photos");
    seed_with_samples(&app);

    const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    let resp = handle(
        request("POST", "/photos", &format!("data_url={TINY_PNG}&report_id=sample-1")),
        &app,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);

    let mut resp = handle(request("GET", "/", ""), &app).unwrap();
    let body = body_string(&mut resp);
    assert!(body.contains("→ report sample-1"));
}

#[test]
fn unknown_route_is_not_found() {
    let app = make_app("not_found");
    seed_with_samples(&app);

    let err = handle(request("GET", "/definitely/not/here", ""), &app).unwrap_err();
    assert!(matches!(err, crate::errors::ServerError::NotFound));
}
