// src/db/photos.rs
use base64::Engine;
use chrono::Utc;
use rusqlite::params;
use sha2::{Digest, Sha256};

use crate::db::connection::Database;
use crate::errors::ServerError;

/// A captured photo waiting locally until it is attached to a report.
/// Content-addressed: the id is the SHA-256 of the decoded image bytes,
/// so re-adding the same shot is a no-op instead of a duplicate.
#[derive(Debug, Clone)]
pub struct CachedPhoto {
    pub id: String,
    pub report_id: Option<String>,
    pub data_url: String,
    pub created_at: i64,
}

/// Validate and store a captured photo. Accepts `data:image/*;base64,`
/// URLs only; returns the content id.
pub fn add_photo(
    db: &Database,
    report_id: Option<&str>,
    data_url: &str,
) -> Result<String, ServerError> {
    let bytes = decode_image_data_url(data_url)?;
    let id = hex_digest(&bytes);
    let now = Utc::now().timestamp();

    db.with_conn(|conn| {
        conn.execute(
            "insert or ignore into photos (id, report_id, data_url, created_at)
             values (?, ?, ?, ?)",
            params![id, report_id, data_url, now],
        )
        .map_err(|e| ServerError::DbError(format!("insert photo failed: {e}")))?;
        Ok(())
    })?;

    Ok(id)
}

pub fn list_photos(db: &Database) -> Result<Vec<CachedPhoto>, ServerError> {
    query_photos(db, "select id, report_id, data_url, created_at from photos order by created_at", &[])
}

pub fn photos_for_report(db: &Database, report_id: &str) -> Result<Vec<CachedPhoto>, ServerError> {
    query_photos(
        db,
        "select id, report_id, data_url, created_at from photos where report_id = ? order by created_at",
        &[report_id],
    )
}

pub fn remove_photo(db: &Database, id: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute("delete from photos where id = ?", params![id])
            .map_err(|e| ServerError::DbError(format!("delete photo failed: {e}")))?;
        Ok(())
    })
}

fn query_photos(db: &Database, sql: &str, args: &[&str]) -> Result<Vec<CachedPhoto>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(args), |row| {
                Ok(CachedPhoto {
                    id: row.get(0)?,
                    report_id: row.get(1)?,
                    data_url: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

/// `data:image/png;base64,<payload>` -> decoded bytes. Rejects non-image
/// media types and anything that isn't base64-encoded.
fn decode_image_data_url(data_url: &str) -> Result<Vec<u8>, ServerError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ServerError::BadRequest("photo must be a data: URL".into()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ServerError::BadRequest("malformed data URL".into()))?;

    let (media_type, encoding) = meta
        .split_once(';')
        .ok_or_else(|| ServerError::BadRequest("data URL missing encoding".into()))?;

    if encoding != "base64" {
        return Err(ServerError::BadRequest(format!(
            "unsupported data URL encoding '{encoding}'"
        )));
    }

    let mime: mime::Mime = media_type
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("bad media type '{media_type}'")))?;
    if mime.type_() != mime::IMAGE {
        return Err(ServerError::BadRequest(format!(
            "'{mime}' is not an image type"
        )));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ServerError::BadRequest(format!("photo payload is not base64: {e}")))
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
