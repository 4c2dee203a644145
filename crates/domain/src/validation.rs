// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::complaint::{ComplaintDetails, MAX_ATTACHMENTS};
use crate::error::DomainError;
use crate::user::User;

/// Maximum length of a person's name.
pub const MAX_NAME_LENGTH: usize = 120;
/// Maximum length of a complaint description or note.
pub const MAX_TEXT_LENGTH: usize = 5000;
/// Maximum length of short free-text fields (route, PNR, channels).
pub const MAX_SHORT_FIELD_LENGTH: usize = 200;

/// Validates a display name.
///
/// # Errors
///
/// Returns an error if the name is blank or longer than 120 characters.
pub fn validate_full_name(name: &str) -> Result<(), DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidFullName(String::from(
            "Full name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidFullName(format!(
            "Full name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates that a user's basic field constraints are met.
///
/// Username format is guaranteed by [`crate::Username`]. This does NOT
/// check uniqueness (that requires the store).
///
/// # Errors
///
/// Returns an error if the full name or branch is invalid.
pub fn validate_user_fields(user: &User) -> Result<(), DomainError> {
    validate_full_name(&user.full_name)?;
    if let Some(branch) = &user.branch {
        check_length("branch", branch, MAX_SHORT_FIELD_LENGTH)?;
    }
    Ok(())
}

/// Validates free text for a manager note.
///
/// # Errors
///
/// Returns an error if the text is blank or too long.
pub fn validate_note_text(text: &str) -> Result<(), DomainError> {
    require("note", text)?;
    check_length("note", text, MAX_TEXT_LENGTH)
}

/// Validates complaint details before they are stored.
///
/// # Errors
///
/// Returns an error if:
/// - The passenger name, route or description is blank
/// - Any free-text field exceeds its maximum length
/// - More than five attachments are supplied
pub fn validate_complaint_details(details: &ComplaintDetails) -> Result<(), DomainError> {
    require("passenger_name", &details.passenger.name)?;
    check_length("passenger_name", &details.passenger.name, MAX_NAME_LENGTH)?;

    require("route", &details.trip.route)?;
    check_length("route", &details.trip.route, MAX_SHORT_FIELD_LENGTH)?;

    require("description", &details.description)?;
    check_length("description", &details.description, MAX_TEXT_LENGTH)?;

    let optional_fields: [(&'static str, &Option<String>); 6] = [
        ("subcategory", &details.subcategory),
        ("pnr", &details.trip.pnr),
        ("plate", &details.trip.plate),
        ("ticket_price", &details.trip.ticket_price),
        ("purchase_channel", &details.trip.purchase_channel),
        ("application_channel", &details.trip.application_channel),
    ];
    for (field, value) in optional_fields {
        if let Some(value) = value {
            check_length(field, value, MAX_SHORT_FIELD_LENGTH)?;
        }
    }

    if details.attachments.len() > MAX_ATTACHMENTS {
        return Err(DomainError::TooManyAttachments {
            max: MAX_ATTACHMENTS,
        });
    }

    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    Ok(())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::FieldTooLong { field, max });
    }
    Ok(())
}
