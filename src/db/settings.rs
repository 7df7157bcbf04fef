// src/db/settings.rs
use rusqlite::{params, OptionalExtension};

use crate::db::connection::Database;
use crate::errors::ServerError;

const AUTH_TOKEN_KEY: &str = "auth_token";

pub fn get_setting(db: &Database, key: &str) -> Result<Option<String>, ServerError> {
    db.with_conn(|conn| {
        conn.query_row(
            "select value from settings where key = ?",
            params![key],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select setting failed: {e}")))
    })
}

pub fn set_setting(db: &Database, key: &str, value: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "insert into settings (key, value) values (?, ?)
             on conflict(key) do update set value = excluded.value",
            params![key, value],
        )
        .map_err(|e| ServerError::DbError(format!("upsert setting failed: {e}")))?;
        Ok(())
    })
}

pub fn delete_setting(db: &Database, key: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute("delete from settings where key = ?", params![key])
            .map_err(|e| ServerError::DbError(format!("delete setting failed: {e}")))?;
        Ok(())
    })
}

/// Bearer token for the reports API. Absent until the user logs in;
/// cleared again when the API answers 401.
pub fn get_auth_token(db: &Database) -> Result<Option<String>, ServerError> {
    get_setting(db, AUTH_TOKEN_KEY)
}

pub fn set_auth_token(db: &Database, token: &str) -> Result<(), ServerError> {
    set_setting(db, AUTH_TOKEN_KEY, token.trim())
}

pub fn clear_auth_token(db: &Database) -> Result<(), ServerError> {
    delete_setting(db, AUTH_TOKEN_KEY)
}
