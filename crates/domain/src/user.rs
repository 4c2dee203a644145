// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::contact::{EmailAddress, PhoneNumber};
use crate::types::{Role, Username};
use time::OffsetDateTime;

/// A user account.
///
/// Credentials are not part of the domain model; the persistence layer
/// holds the password hash alongside this record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Canonical internal identifier.
    /// Optional to support creation before persistence.
    pub user_id: Option<i64>,
    /// Unique, case-insensitive login name.
    pub username: Username,
    /// Display name.
    pub full_name: String,
    /// Access role.
    pub role: Role,
    /// Contact phone number.
    pub phone: Option<PhoneNumber>,
    /// Contact email, also usable as a login identifier.
    pub email: Option<EmailAddress>,
    /// Branch or office the user works at.
    pub branch: Option<String>,
    /// When the account was created.
    pub created_at: OffsetDateTime,
    /// When the user last logged in successfully.
    pub last_login_at: Option<OffsetDateTime>,
}

impl User {
    /// Creates a new `User` without a persisted `user_id`.
    ///
    /// # Arguments
    ///
    /// * `username` - The validated login name
    /// * `full_name` - The display name
    /// * `role` - The access role
    /// * `now` - The creation instant
    #[must_use]
    pub const fn new(
        username: Username,
        full_name: String,
        role: Role,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            user_id: None,
            username,
            full_name,
            role,
            phone: None,
            email: None,
            branch: None,
            created_at: now,
            last_login_at: None,
        }
    }
}
