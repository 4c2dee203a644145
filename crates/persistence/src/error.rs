// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored row could not be converted back into a domain value.
    CorruptRecord(String),
    /// A timestamp could not be formatted or parsed.
    TimestampError(String),
    /// Password hashing or verification failed.
    PasswordHashError(String),
    /// The username is already taken.
    DuplicateUsername(String),
    /// The email address is already used by another account.
    DuplicateEmail(String),
    /// The first administrator can only be created while no users exist.
    AlreadyBootstrapped,
    /// The requested user was not found.
    UserNotFound(i64),
    /// The requested complaint was not found.
    ComplaintNotFound(i64),
    /// The year's ticket sequence cannot grow any further.
    TicketSequenceExhausted(i32),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::CorruptRecord(msg) => write!(f, "Corrupt record: {msg}"),
            Self::TimestampError(msg) => write!(f, "Timestamp error: {msg}"),
            Self::PasswordHashError(msg) => write!(f, "Password hashing failed: {msg}"),
            Self::DuplicateUsername(name) => write!(f, "Username '{name}' is already taken"),
            Self::DuplicateEmail(email) => {
                write!(f, "Email address '{email}' is already in use")
            }
            Self::AlreadyBootstrapped => write!(f, "Users already exist"),
            Self::UserNotFound(id) => write!(f, "User {id} not found"),
            Self::ComplaintNotFound(id) => write!(f, "Complaint {id} not found"),
            Self::TicketSequenceExhausted(year) => {
                write!(f, "Ticket sequence for {year} is exhausted")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<complaint_desk_domain::DomainError> for PersistenceError {
    fn from(err: complaint_desk_domain::DomainError) -> Self {
        Self::CorruptRecord(err.to_string())
    }
}
