// src/db/snapshots.rs
use chrono::Utc;
use rusqlite::params;
use serde_json::Value;

use crate::db::connection::Database;
use crate::errors::ServerError;

/// Last-known-good raw report payloads, one row per report id. When the
/// API is unreachable the panels re-normalize these instead of going
/// blank; the raw JSON is kept verbatim so the normalizer stays the only
/// place shape decisions are made.
pub fn save_snapshots(db: &Database, raws: &[Value]) -> Result<(), ServerError> {
    let now = Utc::now().timestamp();

    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        for raw in raws {
            let id = raw
                .get("_id")
                .or_else(|| raw.get("id"))
                .and_then(|v| v.as_str().map(String::from).or_else(|| v.as_i64().map(|n| n.to_string())));

            let Some(id) = id else {
                eprintln!("Skipping snapshot: report has no id");
                continue;
            };

            let raw_json =
                serde_json::to_string(raw).map_err(|e| ServerError::DbError(e.to_string()))?;

            tx.execute(
                r#"
                insert into report_snapshots (report_id, fetched_at, raw_json)
                values (?1, ?2, ?3)
                on conflict(report_id) do update set
                    fetched_at = excluded.fetched_at,
                    raw_json = excluded.raw_json
                "#,
                params![id, now, raw_json],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        }

        tx.commit().map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(())
    })
}

pub fn load_snapshots(db: &Database) -> Result<Vec<Value>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("select raw_json from report_snapshots order by fetched_at desc, report_id")
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let raw_json = row.map_err(|e| ServerError::DbError(e.to_string()))?;
            match serde_json::from_str(&raw_json) {
                Ok(value) => out.push(value),
                // A corrupt row shouldn't take the fallback path down with it.
                Err(e) => eprintln!("⚠️ Dropping unreadable snapshot row: {e}"),
            }
        }
        Ok(out)
    })
}
