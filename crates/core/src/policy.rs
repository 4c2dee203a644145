// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Who may do what.
//!
//! These predicates are the single source of truth for authorization.
//! They are evaluated at the write boundary before every mutation, and
//! exposed separately as advisory capabilities for clients.

use crate::error::CoreError;
use complaint_desk_audit::Actor;
use complaint_desk_domain::{Role, User};

/// An authenticated user acting on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The acting user's id.
    pub user_id: i64,
    /// The acting user's role.
    pub role: Role,
    /// The acting user's display name.
    pub display_name: String,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(user_id: i64, role: Role, display_name: String) -> Self {
        Self {
            user_id,
            role,
            display_name,
        }
    }

    /// Creates the principal for a persisted user.
    ///
    /// Returns `None` if the user has not been persisted.
    #[must_use]
    pub fn from_user(user: &User) -> Option<Self> {
        user.user_id
            .map(|user_id| Self::new(user_id, user.role, user.full_name.clone()))
    }

    /// Returns the audit actor for this principal.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor::new(self.user_id, self.display_name.clone())
    }
}

/// Whether the actor may delete a complaint created by `owner_id`.
///
/// Managers and admins may delete any complaint; staff only their own.
#[must_use]
pub const fn can_delete_complaint(actor: &Principal, owner_id: i64) -> bool {
    actor.role.is_elevated() || actor.user_id == owner_id
}

/// Whether the actor may edit the details of a complaint created by `owner_id`.
#[must_use]
pub const fn can_modify_complaint(actor: &Principal, owner_id: i64) -> bool {
    can_delete_complaint(actor, owner_id)
}

/// Whether the actor may set statuses and append manager notes.
#[must_use]
pub const fn can_manage_complaints(actor: &Principal) -> bool {
    actor.role.is_elevated()
}

/// Whether the actor may retract a note written by `note_author_id`.
#[must_use]
pub const fn can_retract_note(actor: &Principal, note_author_id: i64) -> bool {
    actor.role.is_elevated() || actor.user_id == note_author_id
}

/// Whether the actor may read the activity log.
#[must_use]
pub const fn can_read_logs(actor: &Principal) -> bool {
    actor.role.is_elevated()
}

/// Whether the actor may delete the account `target_id`.
///
/// Nobody may delete their own account.
#[must_use]
pub const fn can_delete_user(actor: &Principal, target_id: i64) -> bool {
    actor.role.is_elevated() && actor.user_id != target_id
}

/// Whether the actor may create accounts, change roles and reset passwords.
#[must_use]
pub const fn can_manage_users(actor: &Principal) -> bool {
    matches!(actor.role, Role::Admin)
}

/// Whether the actor may edit the profile fields of `target_id`.
///
/// Users may always edit their own profile; roles are covered by
/// [`can_manage_users`].
#[must_use]
pub const fn can_edit_profile(actor: &Principal, target_id: i64) -> bool {
    can_manage_users(actor) || actor.user_id == target_id
}

/// Builds the permission error for an action.
#[must_use]
pub fn denied(action: &str, required: &str) -> CoreError {
    CoreError::PermissionDenied {
        action: action.to_string(),
        required: required.to_string(),
    }
}

/// Rejects a change that would remove the last administrator.
///
/// # Arguments
///
/// * `current_role` - The target account's current role
/// * `next_role` - The role after the change, or `None` if the account is deleted
/// * `admin_count` - The number of administrator accounts before the change
///
/// # Errors
///
/// Returns `CoreError::LastAdmin` if the target is the only administrator
/// and would stop being one.
pub const fn ensure_admin_remains(
    current_role: Role,
    next_role: Option<Role>,
    admin_count: usize,
) -> Result<(), CoreError> {
    let loses_admin: bool = matches!(current_role, Role::Admin)
        && !matches!(next_role, Some(Role::Admin));
    if loses_admin && admin_count <= 1 {
        return Err(CoreError::LastAdmin);
    }
    Ok(())
}
