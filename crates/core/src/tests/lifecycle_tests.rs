// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_stored_complaint, later, manager};
use crate::{ComplaintCommand, apply};
use complaint_desk_domain::{Complaint, ComplaintStatus};

#[test]
fn test_appended_notes_keep_insertion_order() {
    let mut complaint: Complaint = create_stored_complaint();
    for i in 0..6 {
        complaint = apply(
            &complaint,
            ComplaintCommand::AppendNote {
                text: format!("note {i}"),
                action_type: None,
            },
            &manager(),
            later(),
        )
        .unwrap()
        .complaint;
    }

    assert_eq!(complaint.notes.len(), 6);
    for (i, note) in complaint.notes.iter().enumerate() {
        assert_eq!(note.text, format!("note {i}"));
    }
}

#[test]
fn test_input_complaint_unchanged_after_apply() {
    let complaint: Complaint = create_stored_complaint();
    let before: Complaint = complaint.clone();
    let _ = apply(
        &complaint,
        ComplaintCommand::SetStatus {
            status: ComplaintStatus::Cancelled,
            note: Some(String::from("Passenger withdrew the complaint")),
        },
        &manager(),
        later(),
    )
    .unwrap();
    assert_eq!(complaint, before);
}
