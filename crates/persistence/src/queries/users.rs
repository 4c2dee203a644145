// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session queries.

use complaint_desk_domain::{Country, EmailAddress, PhoneNumber, Role, User, Username};
use diesel::dsl::count;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{SessionData, UserCredentials, parse_optional_timestamp, parse_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserRow {
    user_id: i64,
    username: String,
    full_name: String,
    role: String,
    password_hash: String,
    phone_country: Option<String>,
    phone_digits: Option<String>,
    email: Option<String>,
    branch: Option<String>,
    created_at: String,
    last_login_at: Option<String>,
}

impl UserRow {
    fn into_credentials(self) -> Result<UserCredentials, PersistenceError> {
        let phone: Option<PhoneNumber> = match (self.phone_country, self.phone_digits) {
            (Some(country), Some(digits)) => {
                Some(PhoneNumber::parse(Country::from_str(&country)?, &digits)?)
            }
            _ => None,
        };
        let email: Option<EmailAddress> =
            self.email.as_deref().map(EmailAddress::parse).transpose()?;

        let user: User = User {
            user_id: Some(self.user_id),
            username: Username::parse(&self.username)?,
            full_name: self.full_name,
            role: Role::from_str(&self.role)?,
            phone,
            email,
            branch: self.branch,
            created_at: parse_timestamp(&self.created_at)?,
            last_login_at: parse_optional_timestamp(self.last_login_at.as_deref())?,
        };

        Ok(UserCredentials {
            user,
            password_hash: self.password_hash,
        })
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

/// Retrieves a user and credential by login name.
///
/// The name is normalized to lowercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_credentials_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<UserCredentials>, PersistenceError> {
    let normalized: String = Username::normalize(username);
    debug!("Looking up user by username: {}", normalized);

    users::table
        .filter(users::username.eq(&normalized))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_credentials)
        .transpose()
}

/// Retrieves a user and credential by email address.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has that address.
pub fn get_credentials_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<UserCredentials>, PersistenceError> {
    let normalized: String = email.trim().to_lowercase();
    debug!("Looking up user by email");

    users::table
        .filter(users::email.eq(&normalized))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_credentials)
        .transpose()
}

/// Retrieves a user and credential by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_credentials_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserCredentials>, PersistenceError> {
    users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_credentials)
        .transpose()
}

/// Lists all users ordered by username.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>, PersistenceError> {
    let rows: Vec<UserRow> = users::table
        .order(users::username.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| row.into_credentials().map(|c| c.user))
        .collect()
}

/// Returns whether a username is taken, optionally ignoring one account.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn username_exists(
    conn: &mut SqliteConnection,
    username: &str,
    except_user_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let matches: i64 = users::table
        .filter(users::username.eq(username))
        .filter(users::user_id.ne(except_user_id.unwrap_or(-1)))
        .select(count(users::user_id))
        .first(conn)?;
    Ok(matches > 0)
}

/// Returns whether an email is used, optionally ignoring one account.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn email_exists(
    conn: &mut SqliteConnection,
    email: &str,
    except_user_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let matches: i64 = users::table
        .filter(users::email.eq(email))
        .filter(users::user_id.ne(except_user_id.unwrap_or(-1)))
        .select(count(users::user_id))
        .first(conn)?;
    Ok(matches > 0)
}

/// Counts all user accounts.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(users::table.select(count(users::user_id)).first(conn)?)
}

/// Counts accounts with the ADMIN role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_admins(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    let admins: i64 = users::table
        .filter(users::role.eq(Role::Admin.as_str()))
        .select(count(users::user_id))
        .first(conn)?;

    debug!("Admin accounts: {}", admins);
    Ok(admins)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        Ok(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: parse_timestamp(&row.created_at)?,
            last_activity_at: parse_timestamp(&row.last_activity_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
        })
    })
    .transpose()
}
