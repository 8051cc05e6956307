//! Persistence for callback requests.
//!
//! Plain functions over a borrowed connection; callers in async code run them
//! on the blocking pool.

use crate::error::IntakeError;
use ringback_types::{CallbackRequest, CallbackStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT id, phone, email, status, created_at FROM callback_requests";

fn row_to_request(row: &Row<'_>) -> rusqlite::Result<CallbackRequest> {
    let status: String = row.get(3)?;
    let status = status
        .parse::<CallbackStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(CallbackRequest {
        id: row.get(0)?,
        phone: row.get(1)?,
        email: row.get(2)?,
        status,
        created_at: row.get(4)?,
    })
}

/// Inserts a new request in the `pending` state.
pub fn insert_request(
    conn: &Connection,
    phone: &str,
    email: &str,
    created_at: &str,
) -> Result<CallbackRequest, IntakeError> {
    let id = conn.query_row(
        "INSERT INTO callback_requests (phone, email, status, created_at)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id",
        params![phone, email, CallbackStatus::Pending.as_str(), created_at],
        |row| row.get(0),
    )?;

    Ok(CallbackRequest {
        id,
        phone: phone.to_string(),
        email: email.to_string(),
        status: CallbackStatus::Pending,
        created_at: created_at.to_string(),
    })
}

pub fn get_request(conn: &Connection, id: i64) -> Result<Option<CallbackRequest>, IntakeError> {
    let request = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            row_to_request,
        )
        .optional()?;
    Ok(request)
}

/// The most recent request filed under `email`.
pub fn latest_for_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<CallbackRequest>, IntakeError> {
    let request = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE email = ?1 ORDER BY created_at DESC, id DESC LIMIT 1"),
            params![email],
            row_to_request,
        )
        .optional()?;
    Ok(request)
}

/// Moves a request to `status`, recording the provider call id when known.
///
/// # Errors
///
/// Returns `IntakeError::NotFound` if no request has this id.
pub fn update_status(
    conn: &Connection,
    id: i64,
    status: CallbackStatus,
    call_id: Option<&str>,
) -> Result<(), IntakeError> {
    let changed = conn.execute(
        "UPDATE callback_requests
         SET status = ?2, call_id = COALESCE(?3, call_id), updated_at = datetime('now')
         WHERE id = ?1",
        params![id, status.as_str(), call_id],
    )?;
    if changed == 0 {
        return Err(IntakeError::NotFound(id));
    }
    Ok(())
}
