// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use complaint_desk_audit::{Actor, AuditAction, AuditEvent};
use complaint_desk_domain::{Role, Tz, User, Username, parse_time_zone};
use complaint_desk_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{ComplaintInfo, ComplaintRequest, create_complaint};

pub const TEST_PASSWORD: &str = "Secret123";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory()
        .expect("Failed to create in-memory persistence")
        .with_password_cost(4)
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2025-05-10 10:00 UTC)
}

pub fn istanbul() -> Tz {
    parse_time_zone("Europe/Istanbul").unwrap()
}

/// Stores a user with the test password.
pub fn seed_user(persistence: &mut Persistence, username: &str, role: Role) -> User {
    let user: User = User::new(
        Username::parse(username).unwrap(),
        format!("{username} full name"),
        role,
        test_now(),
    );
    let event: AuditEvent = AuditEvent::new(
        Actor::system(),
        AuditAction::UserCreated,
        format!("Seeded {username}"),
        test_now(),
    );
    persistence
        .create_user(&user, TEST_PASSWORD, &event)
        .unwrap()
}

pub fn complaint_request() -> ComplaintRequest {
    ComplaintRequest {
        passenger_name: String::from("Ayşe Yılmaz"),
        passenger_phone_country: None,
        passenger_phone: String::from("0 (532) 111 22 33"),
        passenger_email: Some(String::from("ayse@example.com")),
        route: String::from("Istanbul - Izmir"),
        trip_date: String::from("2025-05-09"),
        departure_time: Some(String::from("23:15")),
        pnr: Some(String::from("PNR42X")),
        plate: Some(String::from("34 ABC 123")),
        ticket_price: None,
        purchase_channel: Some(String::from("Mobile")),
        application_channel: Some(String::from("Call center")),
        category: String::from("LUGGAGE"),
        subcategory: None,
        description: String::from("Suitcase arrived damaged"),
        attachments: Vec::new(),
    }
}

/// Creates a complaint through the handler.
pub fn seed_complaint(persistence: &mut Persistence, creator: &User) -> ComplaintInfo {
    create_complaint(
        persistence,
        creator,
        &complaint_request(),
        istanbul(),
        test_now(),
    )
    .unwrap()
}
