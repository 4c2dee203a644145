// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Principal;
use complaint_desk_domain::{
    Complaint, ComplaintCategory, ComplaintDetails, Country, Passenger, PhoneNumber, Role,
    TicketNumber, Trip,
};
use time::OffsetDateTime;
use time::macros::{date, datetime};

pub const STAFF_ID: i64 = 10;
pub const OTHER_STAFF_ID: i64 = 11;
pub const MANAGER_ID: i64 = 20;
pub const ADMIN_ID: i64 = 30;

pub fn staff() -> Principal {
    Principal::new(STAFF_ID, Role::Staff, String::from("Staff One"))
}

pub fn other_staff() -> Principal {
    Principal::new(OTHER_STAFF_ID, Role::Staff, String::from("Staff Two"))
}

pub fn manager() -> Principal {
    Principal::new(MANAGER_ID, Role::Manager, String::from("Manager"))
}

pub fn admin() -> Principal {
    Principal::new(ADMIN_ID, Role::Admin, String::from("Admin"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2025-04-01 12:00 UTC)
}

pub fn later() -> OffsetDateTime {
    datetime!(2025-04-02 08:30 UTC)
}

pub fn create_test_details() -> ComplaintDetails {
    ComplaintDetails {
        passenger: Passenger {
            name: String::from("Mehmet Kaya"),
            phone: PhoneNumber::parse(Country::TR, "5321112233").unwrap(),
            email: None,
        },
        trip: Trip {
            route: String::from("Izmir - Bursa"),
            trip_date: date!(2025 - 03 - 30),
            departure_time: None,
            pnr: None,
            plate: Some(String::from("35 ABC 123")),
            ticket_price: None,
            purchase_channel: None,
            application_channel: None,
        },
        category: ComplaintCategory::Timing,
        subcategory: None,
        description: String::from("Bus left forty minutes late"),
        attachments: Vec::new(),
    }
}

/// A persisted-looking complaint owned by the staff principal.
pub fn create_stored_complaint() -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        create_test_details(),
        STAFF_ID,
        String::from("Staff One"),
        test_now(),
    );
    complaint.complaint_id = Some(1);
    complaint.ticket = Some(TicketNumber::new(2025, 1).unwrap());
    complaint
}
