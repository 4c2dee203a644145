// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk::Principal;
use complaint_desk_domain::{
    Complaint, ComplaintCategory, ComplaintDetails, Country, Passenger, PhoneNumber, Role, Trip,
    User, Username,
};
use time::macros::date;

use super::helpers::test_now;
use crate::{
    Capability, ComplaintCapabilities, GlobalCapabilities, UserCapabilities,
    compute_complaint_capabilities, compute_global_capabilities, compute_user_capabilities,
};

fn principal(user_id: i64, role: Role) -> Principal {
    Principal::new(user_id, role, format!("User {user_id}"))
}

fn stored_user(user_id: i64, role: Role) -> User {
    let mut user: User = User::new(
        Username::parse(&format!("user{user_id}")).unwrap(),
        format!("User {user_id}"),
        role,
        test_now(),
    );
    user.user_id = Some(user_id);
    user
}

fn complaint_by(owner_id: i64) -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        ComplaintDetails {
            passenger: Passenger {
                name: String::from("Ali Veli"),
                phone: PhoneNumber::parse(Country::TR, "5321112233").unwrap(),
                email: None,
            },
            trip: Trip {
                route: String::from("Bursa - Izmir"),
                trip_date: date!(2025 - 05 - 01),
                departure_time: None,
                pnr: None,
                plate: None,
                ticket_price: None,
                purchase_channel: None,
                application_channel: None,
            },
            category: ComplaintCategory::Timing,
            subcategory: None,
            description: String::from("Bus left late"),
            attachments: Vec::new(),
        },
        owner_id,
        format!("User {owner_id}"),
        test_now(),
    );
    complaint.complaint_id = Some(1);
    complaint
}

#[test]
fn test_capability_serializes_as_bool() {
    assert_eq!(serde_json::to_string(&Capability::Allowed).unwrap(), "true");
    assert_eq!(serde_json::to_string(&Capability::Denied).unwrap(), "false");
    let parsed: Capability = serde_json::from_str("true").unwrap();
    assert!(parsed.is_allowed());
}

#[test]
fn test_staff_global_capabilities() {
    let caps: GlobalCapabilities = compute_global_capabilities(&principal(1, Role::Staff));
    assert_eq!(caps.can_create_complaints, Capability::Allowed);
    assert_eq!(caps.can_manage_complaints, Capability::Denied);
    assert_eq!(caps.can_create_users, Capability::Denied);
    assert_eq!(caps.can_list_users, Capability::Denied);
    assert_eq!(caps.can_read_logs, Capability::Denied);
}

#[test]
fn test_manager_and_admin_global_capabilities() {
    let manager: GlobalCapabilities = compute_global_capabilities(&principal(1, Role::Manager));
    assert_eq!(manager.can_manage_complaints, Capability::Allowed);
    assert_eq!(manager.can_read_logs, Capability::Allowed);
    assert_eq!(manager.can_create_users, Capability::Denied);

    let admin: GlobalCapabilities = compute_global_capabilities(&principal(1, Role::Admin));
    assert_eq!(admin.can_create_users, Capability::Allowed);
}

#[test]
fn test_staff_may_edit_and_delete_only_own_complaint() {
    let staff: Principal = principal(7, Role::Staff);

    let own: ComplaintCapabilities = compute_complaint_capabilities(&staff, &complaint_by(7));
    assert_eq!(own.can_edit, Capability::Allowed);
    assert_eq!(own.can_delete, Capability::Allowed);
    assert_eq!(own.can_change_status, Capability::Denied);
    assert_eq!(own.can_add_note, Capability::Denied);

    let other: ComplaintCapabilities = compute_complaint_capabilities(&staff, &complaint_by(8));
    assert_eq!(other.can_edit, Capability::Denied);
    assert_eq!(other.can_delete, Capability::Denied);
}

#[test]
fn test_manager_may_act_on_any_complaint() {
    let caps: ComplaintCapabilities =
        compute_complaint_capabilities(&principal(2, Role::Manager), &complaint_by(8));
    assert_eq!(caps.can_edit, Capability::Allowed);
    assert_eq!(caps.can_delete, Capability::Allowed);
    assert_eq!(caps.can_change_status, Capability::Allowed);
    assert_eq!(caps.can_add_note, Capability::Allowed);
}

#[test]
fn test_last_admin_cannot_be_deleted_or_demoted() {
    let manager: Principal = principal(2, Role::Manager);
    let admin: Principal = principal(3, Role::Admin);
    let sole_admin: User = stored_user(1, Role::Admin);

    let by_manager: UserCapabilities = compute_user_capabilities(&manager, &sole_admin, 1);
    assert_eq!(by_manager.can_delete, Capability::Denied);
    assert_eq!(by_manager.can_edit, Capability::Denied);

    let by_admin: UserCapabilities = compute_user_capabilities(&admin, &sole_admin, 1);
    assert_eq!(by_admin.can_change_role, Capability::Denied);
    assert_eq!(by_admin.can_reset_password, Capability::Allowed);

    let with_two: UserCapabilities = compute_user_capabilities(&manager, &sole_admin, 2);
    assert_eq!(with_two.can_delete, Capability::Allowed);
}

#[test]
fn test_nobody_may_delete_themselves() {
    let admin: Principal = principal(1, Role::Admin);
    let caps: UserCapabilities = compute_user_capabilities(&admin, &stored_user(1, Role::Admin), 3);
    assert_eq!(caps.can_delete, Capability::Denied);
    assert_eq!(caps.can_edit, Capability::Allowed);
}

#[test]
fn test_staff_may_edit_only_own_profile() {
    let staff: Principal = principal(5, Role::Staff);
    let own: UserCapabilities = compute_user_capabilities(&staff, &stored_user(5, Role::Staff), 1);
    assert_eq!(own.can_edit, Capability::Allowed);
    assert_eq!(own.can_change_role, Capability::Denied);

    let other: UserCapabilities =
        compute_user_capabilities(&staff, &stored_user(6, Role::Staff), 1);
    assert_eq!(other.can_edit, Capability::Denied);
    assert_eq!(other.can_delete, Capability::Denied);
}
