// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::contact::{EmailAddress, PhoneNumber};
use crate::error::DomainError;
use crate::ticket::TicketNumber;
use crate::types::{ActionType, ComplaintCategory, ComplaintStatus};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use time::{Date, OffsetDateTime, Time};

/// Maximum number of attachments on one complaint.
pub const MAX_ATTACHMENTS: usize = 5;
/// Maximum decoded size of one attachment in bytes.
pub const MAX_ATTACHMENT_BYTES: usize = 2 * 1024 * 1024;
/// Attachment content types accepted for upload.
pub const ALLOWED_ATTACHMENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// The passenger who raised a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passenger {
    /// Passenger's full name.
    pub name: String,
    /// Contact phone number.
    pub phone: PhoneNumber,
    /// Optional email address.
    pub email: Option<EmailAddress>,
}

/// The journey a complaint refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// Route, e.g. "Istanbul - Ankara".
    pub route: String,
    /// Travel date.
    pub trip_date: Date,
    /// Scheduled departure time, if known.
    pub departure_time: Option<Time>,
    /// Booking reference.
    pub pnr: Option<String>,
    /// Vehicle licence plate.
    pub plate: Option<String>,
    /// Ticket price as written on the ticket.
    pub ticket_price: Option<String>,
    /// Where the ticket was bought.
    pub purchase_channel: Option<String>,
    /// How the complaint reached the company.
    pub application_channel: Option<String>,
}

/// An image attached to a complaint, held inline as base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    content_type: String,
    data_base64: String,
    size_bytes: usize,
}

impl Attachment {
    /// Creates a validated attachment.
    ///
    /// # Arguments
    ///
    /// * `file_name` - The original file name
    /// * `content_type` - The MIME type, which must be an accepted image type
    /// * `data_base64` - The standard base64 encoding of the file
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the content type is not an
    /// accepted image type, the payload is not valid base64, or the decoded
    /// payload exceeds 2 MiB.
    pub fn new(
        file_name: &str,
        content_type: &str,
        data_base64: &str,
    ) -> Result<Self, DomainError> {
        let file_name: String = file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(DomainError::MissingField {
                field: "attachment.file_name",
            });
        }

        let content_type: String = content_type.trim().to_ascii_lowercase();
        if !ALLOWED_ATTACHMENT_TYPES.contains(&content_type.as_str()) {
            return Err(DomainError::InvalidAttachment {
                name: file_name,
                reason: format!("content type '{content_type}' is not an accepted image type"),
            });
        }

        let decoded: Vec<u8> = STANDARD
            .decode(data_base64.trim())
            .map_err(|e| DomainError::InvalidAttachment {
                name: file_name.clone(),
                reason: format!("payload is not valid base64: {e}"),
            })?;
        if decoded.is_empty() {
            return Err(DomainError::InvalidAttachment {
                name: file_name,
                reason: String::from("payload is empty"),
            });
        }
        if decoded.len() > MAX_ATTACHMENT_BYTES {
            return Err(DomainError::InvalidAttachment {
                name: file_name,
                reason: format!("payload exceeds {MAX_ATTACHMENT_BYTES} bytes"),
            });
        }

        Ok(Self {
            file_name,
            content_type,
            data_base64: data_base64.trim().to_string(),
            size_bytes: decoded.len(),
        })
    }

    /// Returns the file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the base64 payload.
    #[must_use]
    pub fn data_base64(&self) -> &str {
        &self.data_base64
    }

    /// Returns the decoded size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

/// Everything about a complaint that its creator supplies and may later edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintDetails {
    /// Who complained.
    pub passenger: Passenger,
    /// Which journey.
    pub trip: Trip,
    /// What about.
    pub category: ComplaintCategory,
    /// Free-form refinement of the category.
    pub subcategory: Option<String>,
    /// The complaint text.
    pub description: String,
    /// Inline images.
    pub attachments: Vec<Attachment>,
}

/// Marks a manager note as withdrawn without removing it from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    /// Who retracted the note.
    pub retracted_by: i64,
    /// Display name of the retracting user at the time.
    pub retracted_by_name: String,
    /// When the note was retracted.
    pub retracted_at: OffsetDateTime,
}

/// One entry in a complaint's manager history.
///
/// Entries are immutable once written, apart from an optional retraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerNote {
    /// Store-assigned identifier. `None` until persisted.
    pub note_id: Option<i64>,
    /// Author's user id.
    pub author_id: i64,
    /// Author's display name at the time of writing.
    pub author_name: String,
    /// When the note was written.
    pub created_at: OffsetDateTime,
    /// The note text.
    pub text: String,
    /// The kind of action the note records, if any.
    pub action_type: Option<ActionType>,
    /// Set once the note has been retracted.
    pub retraction: Option<Retraction>,
}

impl ManagerNote {
    /// Returns whether this note has been retracted.
    #[must_use]
    pub const fn is_retracted(&self) -> bool {
        self.retraction.is_some()
    }
}

/// A passenger complaint and its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    /// Store-assigned identifier. `None` until persisted.
    pub complaint_id: Option<i64>,
    /// Ticket number. `None` until the store allocates one.
    pub ticket: Option<TicketNumber>,
    /// Creator-supplied details.
    pub details: ComplaintDetails,
    /// Current processing status.
    pub status: ComplaintStatus,
    /// User id of the creator.
    pub created_by: i64,
    /// Creator's display name at creation time.
    pub created_by_name: String,
    /// Creation instant.
    pub created_at: OffsetDateTime,
    /// Last modification instant.
    pub updated_at: OffsetDateTime,
    /// Manager history in insertion order.
    pub notes: Vec<ManagerNote>,
}

impl Complaint {
    /// Creates a new, unpersisted complaint in status `OPEN`.
    ///
    /// # Arguments
    ///
    /// * `details` - Validated complaint details
    /// * `created_by` - The creator's user id
    /// * `created_by_name` - The creator's display name
    /// * `now` - The creation instant
    #[must_use]
    pub const fn new(
        details: ComplaintDetails,
        created_by: i64,
        created_by_name: String,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            complaint_id: None,
            ticket: None,
            details,
            status: ComplaintStatus::Open,
            created_by,
            created_by_name,
            created_at: now,
            updated_at: now,
            notes: Vec::new(),
        }
    }

    /// Finds a history entry by id.
    #[must_use]
    pub fn note(&self, note_id: i64) -> Option<&ManagerNote> {
        self.notes.iter().find(|n| n.note_id == Some(note_id))
    }

    /// Returns the ticket number as text, or an empty string if unassigned.
    #[must_use]
    pub fn ticket_display(&self) -> String {
        self.ticket.map(|t| t.to_string()).unwrap_or_default()
    }
}
