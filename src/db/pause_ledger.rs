// src/db/pause_ledger.rs
use std::collections::HashSet;
use std::sync::Mutex;

use rusqlite::params;

use crate::db::connection::Database;

/// Side-table of locally-paused reports. The server has no paused status,
/// so this is the client's only record of it. It is a cache of a
/// derivable fact, never a source of truth: the normalizer cross-checks
/// the report timeline on every read and clears stale entries.
///
/// Injected as a trait object so the normalizer is persistence-agnostic
/// (SQLite in production, in-memory in tests).
pub trait PauseLedger: Send + Sync {
    fn is_paused(&self, report_id: &str) -> bool;
    fn mark_paused(&self, report_id: &str);
    fn clear_paused(&self, report_id: &str);
}

/// Durable ledger backed by the `paused_reports` table.
///
/// All three operations are idempotent single-key writes. A storage error
/// is logged and degrades to "not paused" rather than failing the caller.
#[derive(Clone)]
pub struct SqlitePauseLedger {
    db: Database,
}

impl SqlitePauseLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl PauseLedger for SqlitePauseLedger {
    fn is_paused(&self, report_id: &str) -> bool {
        let result = self.db.with_conn(|conn| {
            conn.query_row(
                "select count(*) from paused_reports where report_id = ?",
                params![report_id],
                |r| r.get::<_, i64>(0),
            )
            .map_err(|e| {
                crate::errors::ServerError::DbError(format!("select paused failed: {e}"))
            })
        });

        match result {
            Ok(count) => count > 0,
            Err(e) => {
                eprintln!("⚠️ Pause ledger read failed for {report_id}: {e}");
                false
            }
        }
    }

    fn mark_paused(&self, report_id: &str) {
        let result = self.db.with_conn(|conn| {
            conn.execute(
                "insert or ignore into paused_reports (report_id, created_at) values (?, ?)",
                params![report_id, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| {
                crate::errors::ServerError::DbError(format!("insert paused failed: {e}"))
            })?;
            Ok(())
        });

        if let Err(e) = result {
            eprintln!("⚠️ Pause ledger write failed for {report_id}: {e}");
        }
    }

    fn clear_paused(&self, report_id: &str) {
        let result = self.db.with_conn(|conn| {
            conn.execute(
                "delete from paused_reports where report_id = ?",
                params![report_id],
            )
            .map_err(|e| {
                crate::errors::ServerError::DbError(format!("delete paused failed: {e}"))
            })?;
            Ok(())
        });

        if let Err(e) = result {
            eprintln!("⚠️ Pause ledger delete failed for {report_id}: {e}");
        }
    }
}

/// In-memory ledger for tests and tools that don't want a database file.
#[derive(Default)]
pub struct MemoryPauseLedger {
    inner: Mutex<HashSet<String>>,
}

impl MemoryPauseLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PauseLedger for MemoryPauseLedger {
    fn is_paused(&self, report_id: &str) -> bool {
        self.inner.lock().unwrap().contains(report_id)
    }

    fn mark_paused(&self, report_id: &str) {
        self.inner.lock().unwrap().insert(report_id.to_string());
    }

    fn clear_paused(&self, report_id: &str) {
        self.inner.lock().unwrap().remove(report_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

    fn make_ledger() -> SqlitePauseLedger {
        let db = Database::new(":memory:");
        db.with_conn(|conn| {
            conn.execute_batch(SCHEMA_SQL)
                .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
        })
        .unwrap();
        SqlitePauseLedger::new(db)
    }

    #[test]
    fn mark_then_read_then_clear() {
        let ledger = make_ledger();

        assert!(!ledger.is_paused("r1"));
        ledger.mark_paused("r1");
        assert!(ledger.is_paused("r1"));
        ledger.clear_paused("r1");
        assert!(!ledger.is_paused("r1"));
    }

    #[test]
    fn mark_and_clear_are_idempotent() {
        let ledger = make_ledger();

        ledger.mark_paused("r2");
        ledger.mark_paused("r2");
        assert!(ledger.is_paused("r2"));

        ledger.clear_paused("r2");
        ledger.clear_paused("r2"); // second delete is a no-op
        assert!(!ledger.is_paused("r2"));
    }

    #[test]
    fn entries_are_per_report() {
        let ledger = make_ledger();

        ledger.mark_paused("a");
        assert!(ledger.is_paused("a"));
        assert!(!ledger.is_paused("b"));
    }

    #[test]
    fn memory_ledger_matches_sqlite_behavior() {
        let ledger = MemoryPauseLedger::new();

        assert!(!ledger.is_paused("r1"));
        ledger.mark_paused("r1");
        ledger.mark_paused("r1");
        assert!(ledger.is_paused("r1"));
        ledger.clear_paused("r1");
        assert!(!ledger.is_paused("r1"));
    }
}
