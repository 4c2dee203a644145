// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_audit::{AuditAction, AuditEvent};
use complaint_desk_domain::{Role, User};
use complaint_desk_persistence::Persistence;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use super::helpers::{
    complaint_request, create_test_persistence, istanbul, seed_complaint, seed_user, test_now,
};
use crate::{
    ApiError, AppendNoteRequest, AttachmentPayload, Capability, ComplaintInfo, ComplaintRequest,
    DashboardResponse, DeleteResponse, ListComplaintsQuery, ListComplaintsResponse,
    ListLogsResponse, SetStatusRequest, append_note, create_complaint, dashboard, delete_complaint, get_complaint,
    list_complaints, list_logs, retract_note, set_status, update_complaint,
};

fn note_request(text: &str) -> AppendNoteRequest {
    AppendNoteRequest {
        text: String::from(text),
        action_type: None,
    }
}

fn query(status: Option<&str>, q: Option<&str>) -> ListComplaintsQuery {
    ListComplaintsQuery {
        status: status.map(String::from),
        q: q.map(String::from),
    }
}

fn status_request(status: &str, note: Option<&str>) -> SetStatusRequest {
    SetStatusRequest {
        status: String::from(status),
        note: note.map(str::to_string),
    }
}

// ========================================================================
// Creation and numbering
// ========================================================================

#[test]
fn test_sequential_tickets_within_year() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);

    let first: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    let second: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    let third: ComplaintInfo = seed_complaint(&mut persistence, &staff);

    assert_eq!(first.ticket, "2025/0001");
    assert_eq!(second.ticket, "2025/0002");
    assert_eq!(third.ticket, "2025/0003");
    assert_eq!(first.status, "OPEN");
}

#[test]
fn test_ticket_year_follows_business_time_zone() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let new_years_eve: OffsetDateTime = datetime!(2025-12-31 22:30 UTC);

    let created: ComplaintInfo = create_complaint(
        &mut persistence,
        &staff,
        &complaint_request(),
        istanbul(),
        new_years_eve,
    )
    .unwrap();
    assert_eq!(created.ticket, "2026/0001");
}

#[test]
fn test_create_renders_fields_and_logs_ticket() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);

    let created: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    assert_eq!(created.passenger_phone, "+90 (532) 111 22 33");
    assert_eq!(created.passenger_phone_country, "TR");
    assert_eq!(created.trip_date, "2025-05-09");
    assert_eq!(created.departure_time.as_deref(), Some("23:15"));
    assert_eq!(created.category, "LUGGAGE");
    assert_eq!(created.created_by, staff.user_id.unwrap());
    assert!(created.notes.is_empty());
    assert_eq!(created.capabilities.can_delete, Capability::Allowed);
    assert_eq!(created.capabilities.can_change_status, Capability::Denied);

    let events: Vec<AuditEvent> = persistence.list_audit_events(Some(1)).unwrap();
    assert_eq!(events[0].action, AuditAction::ComplaintCreated);
    assert!(events[0].details.contains("2025/0001"));
}

#[test]
fn test_create_with_attachment() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let mut request: ComplaintRequest = complaint_request();
    request.attachments.push(AttachmentPayload {
        file_name: String::from("bag.png"),
        content_type: String::from("image/png"),
        data_base64: String::from("iVBORw0KGgo="),
    });

    let created: ComplaintInfo =
        create_complaint(&mut persistence, &staff, &request, istanbul(), test_now()).unwrap();
    assert_eq!(created.attachments.len(), 1);
    assert_eq!(created.attachments[0].file_name, "bag.png");
}

#[test]
fn test_create_rejects_invalid_input() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);

    let mut bad_category: ComplaintRequest = complaint_request();
    bad_category.category = String::from("luggage");
    assert!(matches!(
        create_complaint(&mut persistence, &staff, &bad_category, istanbul(), test_now()),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "category"
    ));

    let mut bad_phone: ComplaintRequest = complaint_request();
    bad_phone.passenger_phone = String::from("12345");
    assert!(matches!(
        create_complaint(&mut persistence, &staff, &bad_phone, istanbul(), test_now()),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "phone"
    ));

    let mut bad_date: ComplaintRequest = complaint_request();
    bad_date.trip_date = String::from("09.05.2025");
    assert!(matches!(
        create_complaint(&mut persistence, &staff, &bad_date, istanbul(), test_now()),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "date"
    ));

    let mut blank: ComplaintRequest = complaint_request();
    blank.description = String::from("   ");
    assert!(matches!(
        create_complaint(&mut persistence, &staff, &blank, istanbul(), test_now()),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "description"
    ));

    let mut bad_attachment: ComplaintRequest = complaint_request();
    bad_attachment.attachments.push(AttachmentPayload {
        file_name: String::from("notes.pdf"),
        content_type: String::from("application/pdf"),
        data_base64: String::from("JVBERi0="),
    });
    assert!(matches!(
        create_complaint(&mut persistence, &staff, &bad_attachment, istanbul(), test_now()),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "attachments"
    ));

    // No ticket numbers were consumed by rejected drafts
    assert_eq!(seed_complaint(&mut persistence, &staff).ticket, "2025/0001");
}

// ========================================================================
// Reading
// ========================================================================

#[test]
fn test_list_newest_first_with_status_filter() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);

    let first: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    create_complaint(
        &mut persistence,
        &staff,
        &complaint_request(),
        istanbul(),
        test_now() + Duration::hours(1),
    )
    .unwrap();
    set_status(
        &mut persistence,
        &manager,
        first.complaint_id,
        &status_request("RESOLVED", None),
        test_now() + Duration::hours(2),
    )
    .unwrap();

    let all: ListComplaintsResponse = list_complaints(&mut persistence, &staff, &query(None, None)).unwrap();
    let tickets: Vec<&str> = all.complaints.iter().map(|c| c.ticket.as_str()).collect();
    assert_eq!(tickets, vec!["2025/0002", "2025/0001"]);

    let resolved: ListComplaintsResponse =
        list_complaints(&mut persistence, &staff, &query(Some("RESOLVED"), None)).unwrap();
    assert_eq!(resolved.complaints.len(), 1);
    assert_eq!(resolved.complaints[0].ticket, "2025/0001");

    assert!(matches!(
        list_complaints(&mut persistence, &staff, &query(Some("DONE"), None)),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_list_complaints_searches_ticket_name_and_phone() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    seed_complaint(&mut persistence, &staff);
    let mut request: ComplaintRequest = complaint_request();
    request.passenger_name = String::from("Kemal Arslan");
    request.passenger_phone = String::from("0542 765 43 21");
    create_complaint(
        &mut persistence,
        &staff,
        &request,
        istanbul(),
        test_now() + Duration::hours(1),
    )
    .unwrap();

    let tickets = |persistence: &mut Persistence, q: &str| -> Vec<String> {
        list_complaints(persistence, &staff, &query(None, Some(q)))
            .unwrap()
            .complaints
            .into_iter()
            .map(|c| c.ticket)
            .collect()
    };

    assert_eq!(tickets(&mut persistence, "2025/0001"), vec!["2025/0001"]);
    assert_eq!(tickets(&mut persistence, "kemal"), vec!["2025/0002"]);
    assert_eq!(tickets(&mut persistence, "532 111"), vec!["2025/0001"]);
    assert_eq!(tickets(&mut persistence, "  "), vec!["2025/0002", "2025/0001"]);
    assert!(
        list_complaints(&mut persistence, &staff, &query(Some("RESOLVED"), Some("kemal")))
            .unwrap()
            .complaints
            .is_empty()
    );
}

#[test]
fn test_get_unknown_complaint_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    assert!(matches!(
        get_complaint(&mut persistence, &staff, 42),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

// ========================================================================
// Editing
// ========================================================================

#[test]
fn test_creator_and_manager_may_update_but_not_other_staff() {
    let mut persistence: Persistence = create_test_persistence();
    let creator: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let other: User = seed_user(&mut persistence, "fatma", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    let created: ComplaintInfo = seed_complaint(&mut persistence, &creator);

    let mut request: ComplaintRequest = complaint_request();
    request.description = String::from("Suitcase arrived with a broken handle");
    let updated: ComplaintInfo = update_complaint(
        &mut persistence,
        &creator,
        created.complaint_id,
        &request,
        test_now() + Duration::minutes(5),
    )
    .unwrap();
    assert_eq!(updated.description, "Suitcase arrived with a broken handle");
    assert_eq!(updated.ticket, created.ticket);
    assert_ne!(updated.updated_at, created.updated_at);

    assert!(matches!(
        update_complaint(
            &mut persistence,
            &other,
            created.complaint_id,
            &request,
            test_now()
        ),
        Err(ApiError::Unauthorized { .. })
    ));

    request.route = String::from("Istanbul - Bodrum");
    let by_manager: ComplaintInfo = update_complaint(
        &mut persistence,
        &manager,
        created.complaint_id,
        &request,
        test_now(),
    )
    .unwrap();
    assert_eq!(by_manager.route, "Istanbul - Bodrum");
}

#[test]
fn test_only_managers_set_status() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    let created: ComplaintInfo = seed_complaint(&mut persistence, &staff);

    assert!(matches!(
        set_status(
            &mut persistence,
            &staff,
            created.complaint_id,
            &status_request("RESOLVED", None),
            test_now()
        ),
        Err(ApiError::Unauthorized { .. })
    ));

    let resolved: ComplaintInfo = set_status(
        &mut persistence,
        &manager,
        created.complaint_id,
        &status_request("RESOLVED", Some("Refund issued")),
        test_now(),
    )
    .unwrap();
    assert_eq!(resolved.status, "RESOLVED");
    assert_eq!(resolved.notes.len(), 1);
    assert_eq!(resolved.notes[0].text, "Refund issued");

    // Any status may follow any other, including the same one
    let again: ComplaintInfo = set_status(
        &mut persistence,
        &manager,
        created.complaint_id,
        &status_request("RESOLVED", None),
        test_now(),
    )
    .unwrap();
    assert_eq!(again.status, "RESOLVED");
    let reopened: ComplaintInfo = set_status(
        &mut persistence,
        &manager,
        created.complaint_id,
        &status_request("OPEN", None),
        test_now(),
    )
    .unwrap();
    assert_eq!(reopened.status, "OPEN");

    let events: Vec<AuditEvent> = persistence.list_audit_events(Some(3)).unwrap();
    assert!(events.iter().all(|e| e.action == AuditAction::StatusChanged));
}

#[test]
fn test_notes_append_in_order() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    let created: ComplaintInfo = seed_complaint(&mut persistence, &staff);

    for i in 1..=4 {
        append_note(
            &mut persistence,
            &manager,
            created.complaint_id,
            &note_request(&format!("Step {i}")),
            test_now() + Duration::minutes(i),
        )
        .unwrap();
    }

    let mut refund: AppendNoteRequest = note_request("Ticket refunded");
    refund.action_type = Some(String::from("TICKET_REFUND"));
    let latest: ComplaintInfo = append_note(
        &mut persistence,
        &manager,
        created.complaint_id,
        &refund,
        test_now() + Duration::minutes(10),
    )
    .unwrap();

    let texts: Vec<&str> = latest.notes.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Step 1", "Step 2", "Step 3", "Step 4", "Ticket refunded"]
    );
    assert_eq!(latest.notes[4].action_type.as_deref(), Some("TICKET_REFUND"));
    assert!(latest.notes.iter().all(|n| n.note_id > 0));

    assert!(matches!(
        append_note(
            &mut persistence,
            &staff,
            created.complaint_id,
            &note_request("Not allowed"),
            test_now()
        ),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_retract_note_leaves_tombstone() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let author: User = seed_user(&mut persistence, "manager", Role::Manager);
    let admin: User = seed_user(&mut persistence, "admin", Role::Admin);
    let created: ComplaintInfo = seed_complaint(&mut persistence, &staff);

    let with_note: ComplaintInfo = append_note(
        &mut persistence,
        &author,
        created.complaint_id,
        &note_request("Called the passenger"),
        test_now(),
    )
    .unwrap();
    let note_id: i64 = with_note.notes[0].note_id;

    assert!(matches!(
        retract_note(
            &mut persistence,
            &staff,
            created.complaint_id,
            note_id,
            test_now()
        ),
        Err(ApiError::Unauthorized { .. })
    ));

    let retracted: ComplaintInfo = retract_note(
        &mut persistence,
        &admin,
        created.complaint_id,
        note_id,
        test_now() + Duration::minutes(1),
    )
    .unwrap();
    assert_eq!(retracted.notes.len(), 1);
    assert!(retracted.notes[0].retracted);
    assert_eq!(retracted.notes[0].text, "Called the passenger");
    assert_eq!(
        retracted.notes[0].retracted_by_name.as_deref(),
        Some("admin full name")
    );

    assert!(matches!(
        retract_note(
            &mut persistence,
            &author,
            created.complaint_id,
            note_id,
            test_now()
        ),
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "note_retracted_once"
    ));
    assert!(matches!(
        retract_note(&mut persistence, &author, created.complaint_id, 999, test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

// ========================================================================
// Deletion
// ========================================================================

#[test]
fn test_delete_scenario() {
    let mut persistence: Persistence = create_test_persistence();
    let creator: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let other: User = seed_user(&mut persistence, "fatma", Role::Staff);

    let first: ComplaintInfo = seed_complaint(&mut persistence, &creator);
    let second: ComplaintInfo = seed_complaint(&mut persistence, &creator);
    assert_eq!(first.ticket, "2025/0001");
    assert_eq!(second.ticket, "2025/0002");

    let own: DeleteResponse =
        delete_complaint(&mut persistence, &creator, first.complaint_id, test_now()).unwrap();
    assert!(own.deleted);

    let foreign: DeleteResponse =
        delete_complaint(&mut persistence, &other, second.complaint_id, test_now()).unwrap();
    assert!(!foreign.deleted);
    assert!(get_complaint(&mut persistence, &other, second.complaint_id).is_ok());

    let events: Vec<AuditEvent> = persistence.list_audit_events(Some(1)).unwrap();
    assert_eq!(events[0].action, AuditAction::ComplaintDeleted);
    assert!(events[0].details.contains("2025/0001"));
}

#[test]
fn test_delete_fails_closed_for_missing_complaint() {
    let mut persistence: Persistence = create_test_persistence();
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);

    let response: DeleteResponse =
        delete_complaint(&mut persistence, &manager, 404, test_now()).unwrap();
    assert!(!response.deleted);
}

#[test]
fn test_manager_deletes_any_complaint() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    let created: ComplaintInfo = seed_complaint(&mut persistence, &staff);

    assert!(
        delete_complaint(&mut persistence, &manager, created.complaint_id, test_now())
            .unwrap()
            .deleted
    );
    assert!(matches!(
        get_complaint(&mut persistence, &manager, created.complaint_id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_deleted_ticket_numbers_are_not_reused() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let first: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    delete_complaint(&mut persistence, &staff, first.complaint_id, test_now()).unwrap();

    assert_eq!(seed_complaint(&mut persistence, &staff).ticket, "2025/0002");
}

// ========================================================================
// Dashboard and activity log
// ========================================================================

#[test]
fn test_dashboard_counts() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    let first: ComplaintInfo = seed_complaint(&mut persistence, &staff);
    seed_complaint(&mut persistence, &staff);
    let mut timing: ComplaintRequest = complaint_request();
    timing.category = String::from("TIMING");
    create_complaint(&mut persistence, &staff, &timing, istanbul(), test_now()).unwrap();
    set_status(
        &mut persistence,
        &manager,
        first.complaint_id,
        &status_request("RESOLVED", None),
        test_now(),
    )
    .unwrap();

    let stats: DashboardResponse = dashboard(&mut persistence).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.open, 2);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.by_category.get("LUGGAGE"), Some(&2));
    assert_eq!(stats.by_category.get("TIMING"), Some(&1));
    assert_eq!(stats.by_status.get("RESOLVED"), Some(&1));
}

#[test]
fn test_logs_readable_by_managers_only() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    seed_complaint(&mut persistence, &staff);

    assert!(matches!(
        list_logs(&mut persistence, &staff, None),
        Err(ApiError::Unauthorized { .. })
    ));

    let logs: ListLogsResponse = list_logs(&mut persistence, &manager, Some(2)).unwrap();
    assert_eq!(logs.entries.len(), 2);
    assert_eq!(logs.entries[0].action, "COMPLAINT_CREATED");
    assert_eq!(logs.entries[0].actor_name, "ayse full name");
    assert!(logs.entries[0].event_id > logs.entries[1].event_id);
}

#[test]
fn test_log_limit_is_clamped() {
    let mut persistence: Persistence = create_test_persistence();
    let staff: User = seed_user(&mut persistence, "ayse", Role::Staff);
    let manager: User = seed_user(&mut persistence, "manager", Role::Manager);
    for _ in 0..105 {
        seed_complaint(&mut persistence, &staff);
    }

    let logs: ListLogsResponse = list_logs(&mut persistence, &manager, Some(500)).unwrap();
    assert_eq!(logs.entries.len(), 100);
}
