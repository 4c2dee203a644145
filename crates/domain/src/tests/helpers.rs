// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Attachment, Complaint, ComplaintCategory, ComplaintDetails, Country, Passenger, PhoneNumber,
    Trip,
};
use time::OffsetDateTime;
use time::macros::{date, datetime};

/// Base64 of the eight-byte PNG signature.
pub const PNG_SIGNATURE_B64: &str = "iVBORw0KGgo=";

pub fn create_test_details() -> ComplaintDetails {
    ComplaintDetails {
        passenger: Passenger {
            name: String::from("Ayse Yilmaz"),
            phone: PhoneNumber::parse(Country::TR, "555 123 45 67").unwrap(),
            email: None,
        },
        trip: Trip {
            route: String::from("Istanbul - Ankara"),
            trip_date: date!(2025 - 03 - 01),
            departure_time: None,
            pnr: Some(String::from("PNR123")),
            plate: None,
            ticket_price: None,
            purchase_channel: None,
            application_channel: None,
        },
        category: ComplaintCategory::Luggage,
        subcategory: None,
        description: String::from("Suitcase arrived with a broken handle"),
        attachments: Vec::new(),
    }
}

pub fn create_test_attachment() -> Attachment {
    Attachment::new("photo.png", "image/png", PNG_SIGNATURE_B64).unwrap()
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2025-03-02 09:00 UTC)
}

pub fn create_test_complaint(created_by: i64) -> Complaint {
    Complaint::new(
        create_test_details(),
        created_by,
        String::from("Staff Member"),
        test_now(),
    )
}
