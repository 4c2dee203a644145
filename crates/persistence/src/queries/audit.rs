// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity log queries.

use complaint_desk_audit::{Actor, AuditAction, AuditEvent};
use diesel::SqliteConnection;
use diesel::prelude::*;
use std::str::FromStr;

use crate::data_models::parse_timestamp;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Diesel Queryable struct for activity log rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct AuditRow {
    event_id: i64,
    recorded_at: String,
    actor_user_id: Option<i64>,
    actor_name: String,
    action: String,
    details: String,
}

/// Retrieves the most recent activity log entries, newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `limit` - The maximum number of entries, already clamped by the caller
///
/// # Errors
///
/// Returns an error if the query fails or a stored keyword is unknown.
pub fn list_recent(
    conn: &mut SqliteConnection,
    limit: usize,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let limit: i64 = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows: Vec<AuditRow> = audit_log::table
        .order(audit_log::event_id.desc())
        .limit(limit)
        .select(AuditRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let action: AuditAction = AuditAction::from_str(&row.action)
                .map_err(|e| PersistenceError::CorruptRecord(e.to_string()))?;
            Ok(AuditEvent {
                event_id: Some(row.event_id),
                recorded_at: parse_timestamp(&row.recorded_at)?,
                actor: Actor {
                    user_id: row.actor_user_id,
                    display_name: row.actor_name,
                },
                action,
                details: row.details,
            })
        })
        .collect()
}
