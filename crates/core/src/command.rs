// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_domain::{ActionType, ComplaintDetails, ComplaintStatus};

/// A command represents user intent against an existing complaint, as data only.
///
/// Commands are the only way to request complaint state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintCommand {
    /// Replace the creator-supplied details.
    UpdateDetails {
        /// The new details.
        details: ComplaintDetails,
    },
    /// Set the processing status.
    SetStatus {
        /// The new status. Any status may follow any other.
        status: ComplaintStatus,
        /// Optional note recorded in the history with the change.
        note: Option<String>,
    },
    /// Append a manager note.
    AppendNote {
        /// The note text.
        text: String,
        /// The kind of action the note records.
        action_type: Option<ActionType>,
    },
    /// Retract a manager note, leaving a tombstone in history.
    RetractNote {
        /// The note to retract.
        note_id: i64,
    },
}
