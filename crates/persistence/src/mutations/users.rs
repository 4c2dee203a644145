// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use complaint_desk_domain::User;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::last_insert_rowid;
use crate::data_models::{format_optional_timestamp, format_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Inserts a new user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user` - The user to insert; its `user_id` is ignored
/// * `password_hash` - The bcrypt hash of the initial password
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_user(
    conn: &mut SqliteConnection,
    user: &User,
    password_hash: &str,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating user with username: {}, role: {}",
        user.username, user.role
    );

    diesel::insert_into(users::table)
        .values((
            users::username.eq(user.username.value()),
            users::full_name.eq(user.full_name.trim()),
            users::role.eq(user.role.as_str()),
            users::password_hash.eq(password_hash),
            users::phone_country.eq(user.phone.as_ref().map(|p| p.country().as_str())),
            users::phone_digits.eq(user.phone.as_ref().map(|p| p.digits().to_string())),
            users::email.eq(user.email.as_ref().map(|e| e.value().to_string())),
            users::branch.eq(user.branch.as_deref()),
            users::created_at.eq(format_timestamp(user.created_at)?),
            users::last_login_at.eq(format_optional_timestamp(user.last_login_at)?),
        ))
        .execute(conn)?;

    let user_id: i64 = last_insert_rowid(conn)?;
    info!(user_id, "User created successfully");
    Ok(user_id)
}

/// Overwrites a user's profile fields and role.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    user: &User,
) -> Result<usize, PersistenceError> {
    debug!("Updating user ID: {}", user_id);

    Ok(diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::username.eq(user.username.value()),
            users::full_name.eq(user.full_name.trim()),
            users::role.eq(user.role.as_str()),
            users::phone_country.eq(user.phone.as_ref().map(|p| p.country().as_str())),
            users::phone_digits.eq(user.phone.as_ref().map(|p| p.digits().to_string())),
            users::email.eq(user.email.as_ref().map(|e| e.value().to_string())),
            users::branch.eq(user.branch.as_deref()),
        ))
        .execute(conn)?)
}

/// Deletes a user. Their sessions go with them.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<usize, PersistenceError> {
    info!("Deleting user ID: {}", user_id);

    Ok(diesel::delete(users::table)
        .filter(users::user_id.eq(user_id))
        .execute(conn)?)
}

/// Replaces a user's password hash.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_password_hash(
    conn: &mut SqliteConnection,
    user_id: i64,
    password_hash: &str,
) -> Result<usize, PersistenceError> {
    info!("Updating password for user ID: {}", user_id);

    Ok(diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::password_hash.eq(password_hash))
        .execute(conn)?)
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_last_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for user ID: {}", user_id);

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::last_login_at.eq(Some(format_timestamp(now)?)))
        .execute(conn)?;
    Ok(())
}

/// Creates a new session.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The owning user
/// * `now` - The creation instant
/// * `expires_at` - The fixed expiry instant
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let now_text: String = format_timestamp(now)?;

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(&now_text),
            sessions::last_activity_at.eq(&now_text),
            sessions::expires_at.eq(format_timestamp(expires_at)?),
        ))
        .execute(conn)?;

    let session_id: i64 = last_insert_rowid(conn)?;
    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn touch_session(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(format_timestamp(now)?))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<usize, PersistenceError> {
    debug!("Deleting session by token");

    Ok(diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?)
}

/// Deletes all sessions of a user.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?;

    info!(
        "Deleted {} sessions for user ID: {}",
        rows_affected, user_id
    );
    Ok(rows_affected)
}

/// Deletes every session whose expiry has passed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.le(format_timestamp(now)?))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
