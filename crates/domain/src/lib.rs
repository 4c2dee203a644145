// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod complaint;
mod contact;
mod dashboard;
mod error;
mod ticket;
mod types;
mod user;
mod validation;

#[cfg(test)]
mod tests;

pub use complaint::{
    ALLOWED_ATTACHMENT_TYPES, Attachment, Complaint, ComplaintDetails, MAX_ATTACHMENT_BYTES,
    MAX_ATTACHMENTS, ManagerNote, Passenger, Retraction, Trip,
};
pub use contact::{Country, EmailAddress, PhoneNumber};
pub use dashboard::{DashboardStats, summarize};
pub use error::DomainError;
pub use ticket::{
    DEFAULT_TIME_ZONE, MAX_TICKET_YEAR, MIN_TICKET_YEAR, TicketNumber, parse_time_zone,
    ticket_year,
};
pub use types::{ActionType, ComplaintCategory, ComplaintStatus, Role, Username};
pub use user::User;
pub use validation::{
    MAX_NAME_LENGTH, MAX_SHORT_FIELD_LENGTH, MAX_TEXT_LENGTH, validate_complaint_details,
    validate_full_name, validate_note_text, validate_user_fields,
};

// Re-exported so downstream crates name the same zone type.
pub use chrono_tz::Tz;
