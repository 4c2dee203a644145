// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity log persistence.

use complaint_desk_audit::AuditEvent;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::backend::sqlite::last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Persists an activity log entry.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_log::table)
        .values((
            audit_log::recorded_at.eq(format_timestamp(event.recorded_at)?),
            audit_log::actor_user_id.eq(event.actor.user_id),
            audit_log::actor_name.eq(&event.actor.display_name),
            audit_log::action.eq(event.action.as_str()),
            audit_log::details.eq(&event.details),
        ))
        .execute(conn)?;

    let event_id: i64 = last_insert_rowid(conn)?;
    debug!(event_id, action = %event.action, "Audit event persisted");
    Ok(event_id)
}
