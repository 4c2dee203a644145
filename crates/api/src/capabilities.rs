// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities tell clients which controls to show. They are advisory
//! only; every write re-checks the same predicates.

use complaint_desk::{
    Principal, can_delete_complaint, can_delete_user, can_edit_profile, can_manage_complaints,
    can_manage_users, can_modify_complaint, can_read_logs, ensure_admin_remains,
};
use complaint_desk_domain::{Complaint, Role, User};

use crate::request_response::{
    Capability, ComplaintCapabilities, GlobalCapabilities, UserCapabilities,
};

/// Computes what a principal may do across the system.
#[must_use]
pub const fn compute_global_capabilities(principal: &Principal) -> GlobalCapabilities {
    GlobalCapabilities {
        can_create_complaints: Capability::Allowed,
        can_manage_complaints: Capability::from_bool(can_manage_complaints(principal)),
        can_create_users: Capability::from_bool(can_manage_users(principal)),
        can_list_users: Capability::from_bool(principal.role.is_elevated()),
        can_read_logs: Capability::from_bool(can_read_logs(principal)),
    }
}

/// Computes what a principal may do to one complaint.
#[must_use]
pub const fn compute_complaint_capabilities(
    principal: &Principal,
    complaint: &Complaint,
) -> ComplaintCapabilities {
    ComplaintCapabilities {
        can_edit: Capability::from_bool(can_modify_complaint(principal, complaint.created_by)),
        can_delete: Capability::from_bool(can_delete_complaint(principal, complaint.created_by)),
        can_change_status: Capability::from_bool(can_manage_complaints(principal)),
        can_add_note: Capability::from_bool(can_manage_complaints(principal)),
    }
}

/// Computes what a principal may do to another user account.
///
/// # Arguments
///
/// * `principal` - The acting user
/// * `target` - The account being acted on
/// * `admin_count` - The number of administrator accounts
///
/// Deleting or demoting the only administrator is never offered.
#[must_use]
pub fn compute_user_capabilities(
    principal: &Principal,
    target: &User,
    admin_count: usize,
) -> UserCapabilities {
    let Some(target_id) = target.user_id else {
        return UserCapabilities {
            can_edit: Capability::Denied,
            can_change_role: Capability::Denied,
            can_reset_password: Capability::Denied,
            can_delete: Capability::Denied,
        };
    };

    let keeps_admin: bool = ensure_admin_remains(target.role, None, admin_count).is_ok();
    let demotable: bool =
        ensure_admin_remains(target.role, Some(Role::Staff), admin_count).is_ok();

    UserCapabilities {
        can_edit: Capability::from_bool(can_edit_profile(principal, target_id)),
        can_change_role: Capability::from_bool(can_manage_users(principal) && demotable),
        can_reset_password: Capability::from_bool(can_manage_users(principal)),
        can_delete: Capability::from_bool(can_delete_user(principal, target_id) && keeps_admin),
    }
}
