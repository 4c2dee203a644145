// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role assigned to every user account.
///
/// Roles control delete and management authority. Codes are parsed
/// exactly; there is no case-insensitive fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Front-line staff: logs complaints, may delete only their own.
    Staff,
    /// Manager: triages complaints, annotates history, may delete any complaint
    /// and other users' accounts.
    Manager,
    /// Administrator: everything a manager can do, plus user management.
    Admin,
}

impl Role {
    /// Converts this role to its canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "STAFF",
            Self::Manager => "MANAGER",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns whether this role carries management rights
    /// (complaint triage, deletion of others' records).
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STAFF" => Ok(Self::Staff),
            "MANAGER" => Ok(Self::Manager),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing status of a complaint.
///
/// No transition graph is enforced between statuses: any status may be
/// set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Newly logged, not yet looked at.
    Open,
    /// Under investigation.
    Investigating,
    /// Resolved in the passenger's favour or otherwise closed with an outcome.
    Resolved,
    /// Judged unfounded.
    Rejected,
    /// Parked.
    Pending,
    /// Waiting for more information from the passenger.
    WaitingForInfo,
    /// Escalated to senior management.
    Escalated,
    /// Partially resolved.
    PartiallyResolved,
    /// In legal process.
    LegalProcess,
    /// Reopened after having been closed.
    Reopened,
    /// Cancelled.
    Cancelled,
}

impl ComplaintStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 11] = [
        Self::Open,
        Self::Investigating,
        Self::Resolved,
        Self::Rejected,
        Self::Pending,
        Self::WaitingForInfo,
        Self::Escalated,
        Self::PartiallyResolved,
        Self::LegalProcess,
        Self::Reopened,
        Self::Cancelled,
    ];

    /// Converts this status to its canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Investigating => "INVESTIGATING",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
            Self::Pending => "PENDING",
            Self::WaitingForInfo => "WAITING_FOR_INFO",
            Self::Escalated => "ESCALATED",
            Self::PartiallyResolved => "PARTIALLY_RESOLVED",
            Self::LegalProcess => "LEGAL_PROCESS",
            Self::Reopened => "REOPENED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label used in reports and exports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Investigating => "Investigating",
            Self::Resolved => "Resolved",
            Self::Rejected => "Unfounded",
            Self::Pending => "Pending",
            Self::WaitingForInfo => "Waiting for passenger information",
            Self::Escalated => "Escalated to management",
            Self::PartiallyResolved => "Partially resolved",
            Self::LegalProcess => "In legal process",
            Self::Reopened => "Reopened",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a complaint is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintCategory {
    /// Quality of on-board or station service.
    Service,
    /// Departure time or delay.
    Timing,
    /// Condition of the vehicle.
    Vehicle,
    /// Damaged luggage.
    Luggage,
    /// Luggage mixed up with another passenger's.
    LuggageMix,
    /// Item left behind on the vehicle.
    LostItem,
    /// Consigned parcel.
    Deposit,
    /// Wrong charge or refund problem.
    PaymentError,
    /// Staff behaviour.
    Personnel,
    /// Anything else.
    Other,
}

impl ComplaintCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 10] = [
        Self::Service,
        Self::Timing,
        Self::Vehicle,
        Self::Luggage,
        Self::LuggageMix,
        Self::LostItem,
        Self::Deposit,
        Self::PaymentError,
        Self::Personnel,
        Self::Other,
    ];

    /// Converts this category to its canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "SERVICE",
            Self::Timing => "TIMING",
            Self::Vehicle => "VEHICLE",
            Self::Luggage => "LUGGAGE",
            Self::LuggageMix => "LUGGAGE_MIX",
            Self::LostItem => "LOST_ITEM",
            Self::Deposit => "DEPOSIT",
            Self::PaymentError => "PAYMENT_ERROR",
            Self::Personnel => "PERSONNEL",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable label used in reports and exports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Service => "Service quality",
            Self::Timing => "Departure time / delay",
            Self::Vehicle => "Vehicle condition",
            Self::Luggage => "Luggage damage",
            Self::LuggageMix => "Luggage mix-up",
            Self::LostItem => "Lost item",
            Self::Deposit => "Consigned parcel",
            Self::PaymentError => "Wrong charge / refund",
            Self::Personnel => "Staff behaviour",
            Self::Other => "Other",
        }
    }
}

impl FromStr for ComplaintCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| DomainError::InvalidCategory(s.to_string()))
    }
}

impl std::fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed category of a manager action recorded in a complaint's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Phone call with the staff member involved.
    StaffPhoneCall,
    /// Face-to-face meeting with the staff member involved.
    StaffFaceToFace,
    /// Phone call with the passenger.
    PassengerPhoneCall,
    /// Face-to-face meeting with the passenger.
    PassengerFaceToFace,
    /// Ticket refunded.
    TicketRefund,
    /// Compensation processed.
    Compensation,
    /// Information or apology message sent.
    InfoOrApology,
}

impl ActionType {
    /// Every action type, in display order.
    pub const ALL: [Self; 7] = [
        Self::StaffPhoneCall,
        Self::StaffFaceToFace,
        Self::PassengerPhoneCall,
        Self::PassengerFaceToFace,
        Self::TicketRefund,
        Self::Compensation,
        Self::InfoOrApology,
    ];

    /// Converts this action type to its canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StaffPhoneCall => "STAFF_PHONE_CALL",
            Self::StaffFaceToFace => "STAFF_FACE_TO_FACE",
            Self::PassengerPhoneCall => "PASSENGER_PHONE_CALL",
            Self::PassengerFaceToFace => "PASSENGER_FACE_TO_FACE",
            Self::TicketRefund => "TICKET_REFUND",
            Self::Compensation => "COMPENSATION",
            Self::InfoOrApology => "INFO_OR_APOLOGY",
        }
    }

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StaffPhoneCall => "Phone call with staff",
            Self::StaffFaceToFace => "Meeting with staff",
            Self::PassengerPhoneCall => "Phone call with passenger",
            Self::PassengerFaceToFace => "Meeting with passenger",
            Self::TicketRefund => "Ticket refund",
            Self::Compensation => "Compensation",
            Self::InfoOrApology => "Information or apology message",
        }
    }
}

impl FromStr for ActionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| DomainError::InvalidActionType(s.to_string()))
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A login name.
///
/// Usernames are normalized to lowercase so that uniqueness and lookup
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username {
    value: String,
}

impl Username {
    /// Minimum username length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum username length.
    pub const MAX_LENGTH: usize = 20;

    /// Creates a validated, normalized username.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is shorter than 3 or longer than 20
    /// characters, or contains anything other than ASCII letters, digits
    /// and underscores.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        let length: usize = trimmed.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(DomainError::InvalidUsername(format!(
                "must be at least {} characters",
                Self::MIN_LENGTH
            )));
        }
        if length > Self::MAX_LENGTH {
            return Err(DomainError::InvalidUsername(format!(
                "must be at most {} characters",
                Self::MAX_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::InvalidUsername(String::from(
                "may only contain letters, digits and underscores",
            )));
        }
        Ok(Self {
            value: trimmed.to_lowercase(),
        })
    }

    /// Normalizes a lookup key without validating it.
    ///
    /// Used on the login path, where a malformed name must fail the same
    /// way an unknown one does.
    #[must_use]
    pub fn normalize(value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// Returns the normalized username.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
