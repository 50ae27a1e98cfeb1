//! Processed-file bookkeeping.
//!
//! Keyed by file name. A file is due for import when it has no record or
//! its recorded fingerprint differs from the current one.

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::StoreError;

/// Fingerprint recorded for `file_name`, if any.
pub fn processed_digest(
    conn: &Connection,
    file_name: &str,
) -> Result<Option<String>, StoreError> {
    let digest = conn
        .query_row(
            "SELECT file_hash FROM processed_files WHERE file_name = ?1",
            [file_name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(digest)
}

/// Whether `file_name` is unseen or its content changed since it was recorded.
pub fn is_new_or_changed(
    conn: &Connection,
    file_name: &str,
    digest: &str,
) -> Result<bool, StoreError> {
    Ok(processed_digest(conn, file_name)?.as_deref() != Some(digest))
}

/// Record `file_name` as processed with `digest`, replacing any earlier record.
pub fn mark_processed(
    conn: &Connection,
    file_name: &str,
    digest: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO processed_files (file_name, file_hash, processed_at)
         VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(file_name) DO UPDATE SET
             file_hash = excluded.file_hash,
             processed_at = excluded.processed_at",
        params![file_name, digest],
    )?;
    Ok(())
}
