// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{PNG_SIGNATURE_B64, create_test_complaint};
use crate::{Attachment, ComplaintStatus, DomainError, MAX_ATTACHMENT_BYTES};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[test]
fn test_new_complaint_starts_open_without_ticket() {
    let complaint = create_test_complaint(7);
    assert_eq!(complaint.status, ComplaintStatus::Open);
    assert_eq!(complaint.created_by, 7);
    assert!(complaint.ticket.is_none());
    assert!(complaint.notes.is_empty());
    assert_eq!(complaint.ticket_display(), "");
    assert_eq!(complaint.created_at, complaint.updated_at);
}

#[test]
fn test_attachment_accepts_image() {
    let attachment: Attachment = Attachment::new("photo.PNG", "Image/PNG", PNG_SIGNATURE_B64).unwrap();
    assert_eq!(attachment.content_type(), "image/png");
    assert_eq!(attachment.size_bytes(), 8);
    assert_eq!(attachment.file_name(), "photo.PNG");
}

#[test]
fn test_attachment_rejects_non_image_type() {
    let result: Result<Attachment, DomainError> =
        Attachment::new("report.pdf", "application/pdf", PNG_SIGNATURE_B64);
    assert!(matches!(result, Err(DomainError::InvalidAttachment { .. })));
}

#[test]
fn test_attachment_rejects_invalid_base64() {
    let result: Result<Attachment, DomainError> =
        Attachment::new("photo.png", "image/png", "not base64!");
    assert!(matches!(result, Err(DomainError::InvalidAttachment { .. })));
}

#[test]
fn test_attachment_rejects_oversized_payload() {
    let payload: String = STANDARD.encode(vec![0_u8; MAX_ATTACHMENT_BYTES + 1]);
    let result: Result<Attachment, DomainError> = Attachment::new("big.jpg", "image/jpeg", &payload);
    assert!(matches!(result, Err(DomainError::InvalidAttachment { .. })));

    let payload: String = STANDARD.encode(vec![0_u8; MAX_ATTACHMENT_BYTES]);
    assert!(Attachment::new("max.jpg", "image/jpeg", &payload).is_ok());
}

#[test]
fn test_attachment_requires_file_name() {
    let result: Result<Attachment, DomainError> = Attachment::new("  ", "image/png", PNG_SIGNATURE_B64);
    assert!(matches!(result, Err(DomainError::MissingField { .. })));
}
