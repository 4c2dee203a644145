// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod session_tests;
mod user_tests;

use crate::Persistence;
use complaint_desk::Principal;
use complaint_desk_audit::{Actor, AuditAction, AuditEvent};
use complaint_desk_domain::{
    Complaint, ComplaintCategory, ComplaintDetails, Country, Passenger, PhoneNumber, Role, Trip,
    User, Username,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

pub const TEST_PASSWORD: &str = "Secret123";

/// An in-memory store with the cheapest bcrypt cost.
pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory()
        .expect("Failed to create in-memory persistence")
        .with_password_cost(4)
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2025-05-10 10:00 UTC)
}

pub fn create_test_user(username: &str, role: Role) -> User {
    User::new(
        Username::parse(username).unwrap(),
        format!("{username} full name"),
        role,
        test_now(),
    )
}

pub fn system_event(action: AuditAction, details: &str) -> AuditEvent {
    AuditEvent::new(Actor::system(), action, details.to_string(), test_now())
}

/// Creates and stores a user with the test password.
pub fn seed_user(persistence: &mut Persistence, username: &str, role: Role) -> User {
    persistence
        .create_user(
            &create_test_user(username, role),
            TEST_PASSWORD,
            &system_event(AuditAction::UserCreated, username),
        )
        .unwrap()
}

pub fn principal_for(user: &User) -> Principal {
    Principal::from_user(user).expect("seeded users have ids")
}

pub fn create_test_details() -> ComplaintDetails {
    ComplaintDetails {
        passenger: Passenger {
            name: String::from("Zeynep Demir"),
            phone: PhoneNumber::parse(Country::TR, "05061234567").unwrap(),
            email: None,
        },
        trip: Trip {
            route: String::from("Ankara - Antalya"),
            trip_date: date!(2025 - 05 - 08),
            departure_time: Some(time!(22:30)),
            pnr: Some(String::from("K7Q2LM")),
            plate: None,
            ticket_price: Some(String::from("850 TL")),
            purchase_channel: Some(String::from("Web")),
            application_channel: None,
        },
        category: ComplaintCategory::Personnel,
        subcategory: Some(String::from("Driver")),
        description: String::from("Driver was rude at the Konya stop"),
        attachments: Vec::new(),
    }
}

/// Stores a complaint created by a user at the given instant.
pub fn seed_complaint(
    persistence: &mut Persistence,
    creator: &User,
    created_at: OffsetDateTime,
) -> Complaint {
    let principal: Principal = principal_for(creator);
    let draft: Complaint =
        complaint_desk::create_complaint(create_test_details(), &principal, created_at).unwrap();
    persistence
        .create_complaint(&draft, &principal, created_at.year())
        .unwrap()
}
