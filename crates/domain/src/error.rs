// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Username is empty, too long, or contains forbidden characters.
    InvalidUsername(String),
    /// Full name is empty or invalid.
    InvalidFullName(String),
    /// Role code is not one of the known roles.
    InvalidRole(String),
    /// Complaint status code is not one of the known statuses.
    InvalidStatus(String),
    /// Complaint category code is not one of the known categories.
    InvalidCategory(String),
    /// Manager action type code is not one of the known action types.
    InvalidActionType(String),
    /// Country code has no known dialing rules.
    UnknownCountry(String),
    /// Phone number does not fit the country's number mask.
    InvalidPhoneNumber {
        /// The country the number was validated against.
        country: String,
        /// Description of the validation error.
        reason: String,
    },
    /// Email address is malformed.
    InvalidEmail(String),
    /// Ticket number text could not be parsed.
    InvalidTicketNumber(String),
    /// Ticket year is outside the supported calendar range.
    InvalidTicketYear(i32),
    /// A required complaint field is missing or empty.
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },
    /// A free-text field exceeds its maximum length.
    FieldTooLong {
        /// The name of the field.
        field: &'static str,
        /// The maximum permitted length in characters.
        max: usize,
    },
    /// Attachment failed validation.
    InvalidAttachment {
        /// The attachment file name.
        name: String,
        /// Description of the validation error.
        reason: String,
    },
    /// Too many attachments on one complaint.
    TooManyAttachments {
        /// The maximum permitted number of attachments.
        max: usize,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// The time zone name is not a known IANA zone.
    UnknownTimeZone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidFullName(msg) => write!(f, "Invalid full name: {msg}"),
            Self::InvalidRole(value) => write!(f, "Invalid role: '{value}'"),
            Self::InvalidStatus(value) => write!(f, "Invalid complaint status: '{value}'"),
            Self::InvalidCategory(value) => write!(f, "Invalid complaint category: '{value}'"),
            Self::InvalidActionType(value) => write!(f, "Invalid action type: '{value}'"),
            Self::UnknownCountry(code) => write!(f, "Unknown country code: '{code}'"),
            Self::InvalidPhoneNumber { country, reason } => {
                write!(f, "Invalid phone number for {country}: {reason}")
            }
            Self::InvalidEmail(value) => write!(f, "Invalid email address: '{value}'"),
            Self::InvalidTicketNumber(value) => write!(f, "Invalid ticket number: '{value}'"),
            Self::InvalidTicketYear(year) => {
                write!(f, "Ticket year must be between 2000 and 9999, got {year}")
            }
            Self::MissingField { field } => write!(f, "Field '{field}' is required"),
            Self::FieldTooLong { field, max } => {
                write!(f, "Field '{field}' must be at most {max} characters")
            }
            Self::InvalidAttachment { name, reason } => {
                write!(f, "Invalid attachment '{name}': {reason}")
            }
            Self::TooManyAttachments { max } => {
                write!(f, "A complaint may carry at most {max} attachments")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::UnknownTimeZone(name) => write!(f, "Unknown time zone: '{name}'"),
        }
    }
}

impl std::error::Error for DomainError {}
