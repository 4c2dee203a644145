// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plain data carried across the persistence boundary, and the text
//! encodings used for timestamps and dates in storage.

use complaint_desk_domain::{ComplaintStatus, User};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::error::PersistenceError;

/// A user together with their stored credential.
///
/// Only the authentication path needs the hash; everything else works
/// with plain [`User`] values.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub last_activity_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Failed-login bookkeeping for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttemptData {
    pub identifier: String,
    pub failed_count: u32,
    pub window_started_at: OffsetDateTime,
    pub locked_until: Option<OffsetDateTime>,
}

/// Selection criteria for complaint listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Only complaints in this status.
    pub status: Option<ComplaintStatus>,
    /// Case-insensitive text matched against the ticket number, the
    /// passenger name and the passenger phone digits.
    pub search: Option<String>,
}

/// Formats an instant for storage.
///
/// Instants are stored as UTC RFC 3339 text truncated to whole seconds,
/// so that text order equals time order.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    instant
        .to_offset(UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|e| PersistenceError::TimestampError(e.to_string()))?
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::TimestampError(e.to_string()))
}

/// Parses a stored instant.
///
/// # Errors
///
/// Returns an error if the text is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|e| PersistenceError::TimestampError(format!("'{text}': {e}")))
}

pub(crate) fn parse_optional_timestamp(
    text: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    text.map(parse_timestamp).transpose()
}

pub(crate) fn format_optional_timestamp(
    instant: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    instant.map(format_timestamp).transpose()
}

pub(crate) fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::TimestampError(e.to_string()))
}

pub(crate) fn parse_date(text: &str) -> Result<Date, PersistenceError> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::CorruptRecord(format!("date '{text}': {e}")))
}

pub(crate) fn format_time(value: Time) -> Result<String, PersistenceError> {
    value
        .format(format_description!("[hour]:[minute]"))
        .map_err(|e| PersistenceError::TimestampError(e.to_string()))
}

pub(crate) fn parse_time(text: &str) -> Result<Time, PersistenceError> {
    Time::parse(text, format_description!("[hour]:[minute]"))
        .map_err(|e| PersistenceError::CorruptRecord(format!("time '{text}': {e}")))
}
