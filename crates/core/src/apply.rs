// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::ComplaintCommand;
use crate::error::CoreError;
use crate::policy::{
    Principal, can_delete_complaint, can_manage_complaints, can_modify_complaint,
    can_retract_note, denied,
};
use crate::state::{ComplaintChange, ComplaintTransition};
use complaint_desk_audit::{AuditAction, AuditEvent};
use complaint_desk_domain::{
    ActionType, Complaint, ComplaintDetails, ComplaintStatus, ManagerNote, Retraction, TicketNumber,
    validate_complaint_details, validate_note_text,
};
use time::OffsetDateTime;

const MANAGER_OR_ADMIN: &str = "MANAGER or ADMIN";
const OWNER_OR_MANAGER: &str = "the creator, MANAGER or ADMIN";
const AUTHOR_OR_MANAGER: &str = "the author, MANAGER or ADMIN";

/// Prepares a new complaint for insertion.
///
/// Any authenticated user may create a complaint. The ticket number is
/// allocated by the store.
///
/// # Arguments
///
/// * `details` - The complaint details
/// * `principal` - The creating user
/// * `now` - The creation instant
///
/// # Errors
///
/// Returns an error if the details fail validation.
pub fn create_complaint(
    details: ComplaintDetails,
    principal: &Principal,
    now: OffsetDateTime,
) -> Result<Complaint, CoreError> {
    validate_complaint_details(&details)?;
    Ok(Complaint::new(
        details,
        principal.user_id,
        principal.display_name.clone(),
        now,
    ))
}

/// Builds the audit event for a complaint once its ticket is allocated.
#[must_use]
pub fn complaint_created_event(
    principal: &Principal,
    ticket: TicketNumber,
    now: OffsetDateTime,
) -> AuditEvent {
    AuditEvent::new(
        principal.to_actor(),
        AuditAction::ComplaintCreated,
        format!("Created complaint {ticket}"),
        now,
    )
}

/// Decides whether a complaint may be deleted and builds the audit event.
///
/// Returns `None` when the principal may not delete the complaint. Denial
/// is not an error: deletion fails closed.
#[must_use]
pub fn authorize_delete(
    complaint: &Complaint,
    principal: &Principal,
    now: OffsetDateTime,
) -> Option<AuditEvent> {
    if !can_delete_complaint(principal, complaint.created_by) {
        return None;
    }
    Some(AuditEvent::new(
        principal.to_actor(),
        AuditAction::ComplaintDeleted,
        format!("Deleted complaint {}", complaint.ticket_display()),
        now,
    ))
}

/// Applies a command to a complaint, producing the new complaint and an audit event.
///
/// Permissions are re-checked here regardless of what the caller checked.
/// Status transitions are unconstrained; setting the current status again
/// is accepted and logged.
///
/// # Arguments
///
/// * `complaint` - The current complaint (immutable)
/// * `command` - The command to apply
/// * `principal` - The acting user
/// * `now` - The instant of the change
///
/// # Errors
///
/// Returns an error if:
/// - The principal lacks permission for the command
/// - The new details or note text fail validation
/// - The note to retract does not exist or is already retracted
pub fn apply(
    complaint: &Complaint,
    command: ComplaintCommand,
    principal: &Principal,
    now: OffsetDateTime,
) -> Result<ComplaintTransition, CoreError> {
    let ticket: String = complaint.ticket_display();
    let mut next: Complaint = complaint.clone();

    let (change, action, details): (ComplaintChange, AuditAction, String) = match command {
        ComplaintCommand::UpdateDetails { details } => {
            if !can_modify_complaint(principal, complaint.created_by) {
                return Err(denied("update complaint", OWNER_OR_MANAGER));
            }
            validate_complaint_details(&details)?;
            next.details = details;
            (
                ComplaintChange::DetailsReplaced,
                AuditAction::ComplaintUpdated,
                format!("Updated complaint {ticket}"),
            )
        }
        ComplaintCommand::SetStatus { status, note } => {
            if !can_manage_complaints(principal) {
                return Err(denied("change complaint status", MANAGER_OR_ADMIN));
            }
            let note: Option<ManagerNote> = match note.filter(|text| !text.trim().is_empty()) {
                Some(text) => Some(new_note(principal, text, None, now)?),
                None => None,
            };
            let previous: ComplaintStatus = complaint.status;
            next.status = status;
            if let Some(note) = &note {
                next.notes.push(note.clone());
            }
            (
                ComplaintChange::StatusSet { previous, note },
                AuditAction::StatusChanged,
                format!("Complaint {ticket} status {previous} -> {status}"),
            )
        }
        ComplaintCommand::AppendNote { text, action_type } => {
            if !can_manage_complaints(principal) {
                return Err(denied("add a note", MANAGER_OR_ADMIN));
            }
            let note: ManagerNote = new_note(principal, text, action_type, now)?;
            next.notes.push(note.clone());
            let detail: String = action_type.map_or_else(
                || format!("Added note to complaint {ticket}"),
                |a| format!("Added {a} note to complaint {ticket}"),
            );
            (
                ComplaintChange::NoteAppended { note },
                AuditAction::NoteAdded,
                detail,
            )
        }
        ComplaintCommand::RetractNote { note_id } => {
            let note: &mut ManagerNote = next
                .notes
                .iter_mut()
                .find(|n| n.note_id == Some(note_id))
                .ok_or(CoreError::NoteNotFound { note_id })?;
            if !can_retract_note(principal, note.author_id) {
                return Err(denied("retract this note", AUTHOR_OR_MANAGER));
            }
            if note.is_retracted() {
                return Err(CoreError::NoteAlreadyRetracted { note_id });
            }
            let retraction: Retraction = Retraction {
                retracted_by: principal.user_id,
                retracted_by_name: principal.display_name.clone(),
                retracted_at: now,
            };
            note.retraction = Some(retraction.clone());
            (
                ComplaintChange::NoteRetracted {
                    note_id,
                    retraction,
                },
                AuditAction::NoteRetracted,
                format!("Retracted note {note_id} on complaint {ticket}"),
            )
        }
    };

    next.updated_at = now;
    let audit_event: AuditEvent = AuditEvent::new(principal.to_actor(), action, details, now);

    Ok(ComplaintTransition {
        complaint: next,
        change,
        audit_event,
    })
}

fn new_note(
    principal: &Principal,
    text: String,
    action_type: Option<ActionType>,
    now: OffsetDateTime,
) -> Result<ManagerNote, CoreError> {
    validate_note_text(&text)?;
    Ok(ManagerNote {
        note_id: None,
        author_id: principal.user_id,
        author_name: principal.display_name.clone(),
        created_at: now,
        text: text.trim().to_string(),
        action_type,
        retraction: None,
    })
}
