// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The actor is not permitted to perform the action.
    PermissionDenied {
        /// The attempted action.
        action: String,
        /// Who may perform it.
        required: String,
    },
    /// The referenced manager note does not exist on the complaint.
    NoteNotFound {
        /// The note id.
        note_id: i64,
    },
    /// The referenced manager note has already been retracted.
    NoteAlreadyRetracted {
        /// The note id.
        note_id: i64,
    },
    /// The change would leave the system without an administrator.
    LastAdmin,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::PermissionDenied { action, required } => {
                write!(f, "Not permitted to {action}: requires {required}")
            }
            Self::NoteNotFound { note_id } => write!(f, "Note {note_id} not found"),
            Self::NoteAlreadyRetracted { note_id } => {
                write!(f, "Note {note_id} has already been retracted")
            }
            Self::LastAdmin => write!(f, "At least one administrator account must remain"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
