// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login throttle queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{LoginAttemptData, parse_optional_timestamp, parse_timestamp};
use crate::diesel_schema::login_attempts;
use crate::error::PersistenceError;

/// Diesel Queryable struct for login attempt rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = login_attempts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct LoginAttemptRow {
    identifier: String,
    failed_count: i32,
    window_started_at: String,
    locked_until: Option<String>,
}

/// Retrieves the failed-login record for an identifier.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_login_attempt(
    conn: &mut SqliteConnection,
    identifier: &str,
) -> Result<Option<LoginAttemptData>, PersistenceError> {
    let row: Option<LoginAttemptRow> = login_attempts::table
        .filter(login_attempts::identifier.eq(identifier))
        .select(LoginAttemptRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        Ok(LoginAttemptData {
            identifier: row.identifier,
            failed_count: u32::try_from(row.failed_count).unwrap_or(0),
            window_started_at: parse_timestamp(&row.window_started_at)?,
            locked_until: parse_optional_timestamp(row.locked_until.as_deref())?,
        })
    })
    .transpose()
}
