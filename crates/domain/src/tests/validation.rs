// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_attachment, create_test_details, test_now};
use crate::{
    ComplaintDetails, DomainError, Role, User, Username, validate_complaint_details,
    validate_full_name, validate_note_text, validate_user_fields,
};

#[test]
fn test_validate_complaint_details_accepts_valid_details() {
    let details: ComplaintDetails = create_test_details();
    assert!(validate_complaint_details(&details).is_ok());
}

#[test]
fn test_validate_complaint_details_requires_description() {
    let mut details: ComplaintDetails = create_test_details();
    details.description = String::from("   ");
    assert_eq!(
        validate_complaint_details(&details),
        Err(DomainError::MissingField {
            field: "description"
        })
    );
}

#[test]
fn test_validate_complaint_details_requires_passenger_name_and_route() {
    let mut details: ComplaintDetails = create_test_details();
    details.passenger.name = String::new();
    assert!(matches!(
        validate_complaint_details(&details),
        Err(DomainError::MissingField {
            field: "passenger_name"
        })
    ));

    let mut details: ComplaintDetails = create_test_details();
    details.trip.route = String::new();
    assert!(matches!(
        validate_complaint_details(&details),
        Err(DomainError::MissingField { field: "route" })
    ));
}

#[test]
fn test_validate_complaint_details_rejects_long_optional_field() {
    let mut details: ComplaintDetails = create_test_details();
    details.trip.plate = Some("X".repeat(201));
    assert!(matches!(
        validate_complaint_details(&details),
        Err(DomainError::FieldTooLong { field: "plate", .. })
    ));
}

#[test]
fn test_validate_complaint_details_limits_attachment_count() {
    let mut details: ComplaintDetails = create_test_details();
    details.attachments = vec![create_test_attachment(); 5];
    assert!(validate_complaint_details(&details).is_ok());

    details.attachments.push(create_test_attachment());
    assert_eq!(
        validate_complaint_details(&details),
        Err(DomainError::TooManyAttachments { max: 5 })
    );
}

#[test]
fn test_validate_full_name() {
    assert!(validate_full_name("Ayse Yilmaz").is_ok());
    assert!(matches!(
        validate_full_name(" "),
        Err(DomainError::InvalidFullName(_))
    ));
    assert!(validate_full_name(&"a".repeat(121)).is_err());
}

#[test]
fn test_validate_user_fields_checks_name() {
    let mut user: User = User::new(
        Username::parse("ayse").unwrap(),
        String::from("Ayse"),
        Role::Staff,
        test_now(),
    );
    assert!(validate_user_fields(&user).is_ok());
    user.full_name = String::new();
    assert!(validate_user_fields(&user).is_err());
}

#[test]
fn test_validate_note_text() {
    assert!(validate_note_text("Called the passenger").is_ok());
    assert!(validate_note_text("").is_err());
    assert!(validate_note_text(&"x".repeat(5001)).is_err());
}
