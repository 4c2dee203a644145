// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

use complaint_desk_domain::User;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Maximum number of entries returned by one log read.
pub const MAX_LOG_READ: usize = 100;

/// Clamps a requested log read size to `1..=100`.
#[must_use]
pub fn clamp_log_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(MAX_LOG_READ).clamp(1, MAX_LOG_READ)
}

/// Represents the entity performing an action.
///
/// An actor is normally a logged-in user. Entries recorded before any
/// user exists (first-admin bootstrap) carry the system actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The acting user's id, or `None` for the system.
    pub user_id: Option<i64>,
    /// The actor's display name at the time of the action.
    pub display_name: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The acting user's id
    /// * `display_name` - The name recorded in the log
    #[must_use]
    pub const fn new(user_id: i64, display_name: String) -> Self {
        Self {
            user_id: Some(user_id),
            display_name,
        }
    }

    /// The actor used for entries not attributable to a user.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: None,
            display_name: String::from("system"),
        }
    }

    /// Creates the actor for a user record.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.full_name.clone(),
        }
    }
}

/// The action keyword of a log entry.
///
/// The set is closed; keywords are parsed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Successful login.
    Login,
    /// Logout.
    Logout,
    /// User account created.
    UserCreated,
    /// User account profile or role changed.
    UserUpdated,
    /// User account deleted.
    UserDeleted,
    /// Password changed or reset.
    PasswordChanged,
    /// Complaint created.
    ComplaintCreated,
    /// Complaint details replaced.
    ComplaintUpdated,
    /// Complaint deleted.
    ComplaintDeleted,
    /// Complaint status set.
    StatusChanged,
    /// Manager note appended.
    NoteAdded,
    /// Manager note retracted.
    NoteRetracted,
}

impl AuditAction {
    /// Every action keyword.
    pub const ALL: [Self; 12] = [
        Self::Login,
        Self::Logout,
        Self::UserCreated,
        Self::UserUpdated,
        Self::UserDeleted,
        Self::PasswordChanged,
        Self::ComplaintCreated,
        Self::ComplaintUpdated,
        Self::ComplaintDeleted,
        Self::StatusChanged,
        Self::NoteAdded,
        Self::NoteRetracted,
    ];

    /// Converts this action to its keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::UserCreated => "USER_CREATED",
            Self::UserUpdated => "USER_UPDATED",
            Self::UserDeleted => "USER_DELETED",
            Self::PasswordChanged => "PASSWORD_CHANGED",
            Self::ComplaintCreated => "COMPLAINT_CREATED",
            Self::ComplaintUpdated => "COMPLAINT_UPDATED",
            Self::ComplaintDeleted => "COMPLAINT_DELETED",
            Self::StatusChanged => "STATUS_CHANGED",
            Self::NoteAdded => "NOTE_ADDED",
            Self::NoteRetracted => "NOTE_RETRACTED",
        }
    }
}

/// Error returned when a stored action keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAuditAction(pub String);

impl std::fmt::Display for UnknownAuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown audit action: '{}'", self.0)
    }
}

impl std::error::Error for UnknownAuditAction {}

impl FromStr for AuditAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAuditAction(s.to_string()))
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable entry in the activity log.
///
/// Every successful state change produces exactly one audit event,
/// written in the same transaction as the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Store-assigned identifier. `None` until persisted.
    pub event_id: Option<i64>,
    /// When the action happened.
    pub recorded_at: OffsetDateTime,
    /// Who performed the action.
    pub actor: Actor,
    /// What was done.
    pub action: AuditAction,
    /// Free-text detail, e.g. the ticket number involved.
    pub details: String,
}

impl AuditEvent {
    /// Creates a new, unpersisted `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - Who performed the action
    /// * `action` - What was done
    /// * `details` - Free-text detail
    /// * `recorded_at` - When it happened
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: AuditAction,
        details: String,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            event_id: None,
            recorded_at,
            actor,
            action,
            details,
        }
    }
}
