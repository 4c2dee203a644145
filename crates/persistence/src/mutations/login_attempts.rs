// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login throttle writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::{LoginAttemptData, format_optional_timestamp, format_timestamp};
use crate::diesel_schema::login_attempts;
use crate::error::PersistenceError;

/// Inserts or replaces the failed-login record for an identifier.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_login_attempt(
    conn: &mut SqliteConnection,
    attempt: &LoginAttemptData,
) -> Result<(), PersistenceError> {
    let failed_count: i32 = i32::try_from(attempt.failed_count).unwrap_or(i32::MAX);
    diesel::replace_into(login_attempts::table)
        .values((
            login_attempts::identifier.eq(&attempt.identifier),
            login_attempts::failed_count.eq(failed_count),
            login_attempts::window_started_at.eq(format_timestamp(attempt.window_started_at)?),
            login_attempts::locked_until.eq(format_optional_timestamp(attempt.locked_until)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Removes the failed-login record for an identifier.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_login_attempt(
    conn: &mut SqliteConnection,
    identifier: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(login_attempts::table)
        .filter(login_attempts::identifier.eq(identifier))
        .execute(conn)?;
    Ok(())
}

/// Removes records that no longer affect throttling.
///
/// A record is stale when its lock has run out, or when it holds no lock
/// and its counting window started at or before `window_cutoff`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_stale_login_attempts(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
    window_cutoff: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let now_text: String = format_timestamp(now)?;
    let cutoff_text: String = format_timestamp(window_cutoff)?;

    let unlocked: usize = diesel::delete(login_attempts::table)
        .filter(login_attempts::locked_until.le(now_text))
        .execute(conn)?;
    let lapsed: usize = diesel::delete(login_attempts::table)
        .filter(
            login_attempts::locked_until
                .is_null()
                .and(login_attempts::window_started_at.le(cutoff_text)),
        )
        .execute(conn)?;

    debug!(unlocked, lapsed, "Deleted stale login attempt records");
    Ok(unlocked + lapsed)
}
