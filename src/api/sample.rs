// src/api/sample.rs

use serde_json::{json, Value};

/// Built-in reports shown when both the API and the local snapshot cache
/// come up empty, alongside the retry banner.
///
/// The shapes vary the way real responses do: one nested address object,
/// one flat location string, one flat address fields.
pub fn sample_reports() -> Vec<Value> {
    vec![
        json!({
            "_id": "sample-1",
            "title": "Pothole on Main St",
            "description": "Deep pothole near the crosswalk, growing after rain.",
            "category": "roads",
            "priority": "high",
            "status": "assigned",
            "createdAt": "2026-07-28T09:15:00Z",
            "location": {
                "address": {
                    "street": "120 Main St",
                    "city": "Riverton",
                    "state": "CO",
                    "zipCode": "82501"
                }
            },
            "images": ["uploads/sample-pothole.jpg"],
            "timeline": [
                {"status": "assigned", "timestamp": "2026-07-28T09:20:00Z", "comment": "Report received"}
            ]
        }),
        json!({
            "id": "sample-2",
            "title": "Streetlight out",
            "description": "Light has been flickering for a week, now fully dark.",
            "category": "lighting",
            "priority": "medium",
            "status": "in_progress",
            "createdAt": "2026-07-30T19:40:00Z",
            "location": "Corner of 5th Ave and Birch Ln, Riverton",
            "timeline": [
                {"status": "assigned", "timestamp": "2026-07-30T20:00:00Z"},
                {"status": "in_progress", "timestamp": "2026-07-31T08:05:00Z", "comment": "Task assigned"}
            ]
        }),
        json!({
            "_id": "sample-3",
            "title": "Overflowing trash bin",
            "description": "Bin at the park entrance has not been emptied.",
            "category": "sanitation",
            "priority": "low",
            "status": "resolved",
            "createdAt": "2026-07-25T14:10:00Z",
            "location": {"street": "Lakeside Park", "city": "Riverton"},
            "timeline": [
                {"status": "assigned", "timestamp": "2026-07-25T15:00:00Z"},
                {"status": "in_progress", "timestamp": "2026-07-26T10:30:00Z", "comment": "Task assigned"},
                {"status": "resolved", "timestamp": "2026-07-26T11:45:00Z", "comment": "Bin emptied and liner replaced"}
            ],
            "progressImages": [{"id": "sample-bin-after"}]
        }),
    ]
}
