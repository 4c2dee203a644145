// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_audit::AuditEvent;
use complaint_desk_domain::{Complaint, ComplaintStatus, ManagerNote, Retraction};

/// What a transition changed, so the store can write only that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintChange {
    /// The details were replaced wholesale.
    DetailsReplaced,
    /// The status was set, optionally with an accompanying note.
    StatusSet {
        /// The status before the change.
        previous: ComplaintStatus,
        /// The note appended with the change.
        note: Option<ManagerNote>,
    },
    /// A note was appended.
    NoteAppended {
        /// The new note, without an id.
        note: ManagerNote,
    },
    /// A note was retracted.
    NoteRetracted {
        /// The retracted note.
        note_id: i64,
        /// The tombstone.
        retraction: Retraction,
    },
}

/// The result of a successful complaint transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintTransition {
    /// The complaint after the transition.
    pub complaint: Complaint,
    /// What changed.
    pub change: ComplaintChange,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
