// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use crate::throttle::ThrottleError;
use complaint_desk::CoreError;
use complaint_desk_domain::DomainError;
use complaint_desk_persistence::PersistenceError;
use tracing::error;

/// Message returned for every failed credential check.
///
/// Unknown identifiers and wrong passwords must be indistinguishable.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Message returned when the store is unavailable.
const RETRY_LATER: &str = "The service is temporarily unavailable, please try again";

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Too many failed attempts; the identifier is locked.
    RateLimited {
        /// Seconds until the lock expires. Always at least 1.
        retry_after_seconds: i64,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The credential or session store failed.
    StoreUnavailable {
        /// The underlying failure.
        message: String,
    },
    /// The session lifetime cannot be applied to the current time.
    SessionExpiryOutOfRange,
}

impl AuthError {
    /// The uniform failure for a bad identifier or password.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationFailed {
            reason: String::from(INVALID_CREDENTIALS),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::RateLimited {
                retry_after_seconds,
            } => {
                write!(
                    f,
                    "Too many failed login attempts, try again in {retry_after_seconds} seconds"
                )
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::StoreUnavailable { message } => write!(f, "Store unavailable: {message}"),
            Self::SessionExpiryOutOfRange => write!(f, "Session expiry is out of range"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<PersistenceError> for AuthError {
    fn from(err: PersistenceError) -> Self {
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<ThrottleError> for AuthError {
    fn from(err: ThrottleError) -> Self {
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Login is temporarily locked.
    RateLimited {
        /// Seconds until another attempt is accepted.
        retry_after_seconds: i64,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl ApiError {
    pub(crate) fn not_found(resource_type: &str, message: String) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::RateLimited {
                retry_after_seconds,
            } => {
                write!(
                    f,
                    "Too many failed login attempts, try again in {retry_after_seconds} seconds"
                )
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::RateLimited {
                retry_after_seconds,
            } => Self::RateLimited {
                retry_after_seconds,
            },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::StoreUnavailable { message } => {
                error!("Credential store failure: {}", message);
                Self::Internal {
                    message: String::from(RETRY_LATER),
                }
            }
            AuthError::SessionExpiryOutOfRange => {
                error!("Session lifetime overflows the current time");
                Self::Internal {
                    message: String::from("Session expiry is out of range"),
                }
            }
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidUsername(_) => ApiError::invalid("username", message),
        DomainError::InvalidFullName(_) => ApiError::invalid("full_name", message),
        DomainError::InvalidRole(_) => ApiError::invalid("role", message),
        DomainError::InvalidStatus(_) => ApiError::invalid("status", message),
        DomainError::InvalidCategory(_) => ApiError::invalid("category", message),
        DomainError::InvalidActionType(_) => ApiError::invalid("action_type", message),
        DomainError::UnknownCountry(_) | DomainError::InvalidPhoneNumber { .. } => {
            ApiError::invalid("phone", message)
        }
        DomainError::InvalidEmail(_) => ApiError::invalid("email", message),
        DomainError::InvalidTicketNumber(_) | DomainError::InvalidTicketYear(_) => {
            ApiError::invalid("ticket", message)
        }
        DomainError::MissingField { field } | DomainError::FieldTooLong { field, .. } => {
            ApiError::invalid(field, message)
        }
        DomainError::InvalidAttachment { .. } | DomainError::TooManyAttachments { .. } => {
            ApiError::invalid("attachments", message)
        }
        DomainError::DateParseError { .. } => ApiError::invalid("date", message),
        DomainError::UnknownTimeZone(_) => ApiError::invalid("timezone", message),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::PermissionDenied { action, required } => ApiError::Unauthorized {
            action,
            required_role: required,
        },
        CoreError::NoteNotFound { note_id } => {
            ApiError::not_found("Note", format!("Note {note_id} does not exist"))
        }
        CoreError::NoteAlreadyRetracted { note_id } => ApiError::DomainRuleViolation {
            rule: String::from("note_retracted_once"),
            message: format!("Note {note_id} has already been retracted"),
        },
        CoreError::LastAdmin => ApiError::DomainRuleViolation {
            rule: String::from("last_admin"),
            message: String::from("At least one ADMIN account must remain"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Store failures are logged and reported with a generic message.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::DuplicateUsername(name) => ApiError::DomainRuleViolation {
            rule: String::from("unique_username"),
            message: format!("Username '{name}' is already taken"),
        },
        PersistenceError::DuplicateEmail(email) => ApiError::DomainRuleViolation {
            rule: String::from("unique_email"),
            message: format!("Email address '{email}' is already in use"),
        },
        PersistenceError::AlreadyBootstrapped => ApiError::DomainRuleViolation {
            rule: String::from("bootstrap_once"),
            message: String::from("The first administrator has already been created"),
        },
        PersistenceError::UserNotFound(id) => {
            ApiError::not_found("User", format!("User {id} does not exist"))
        }
        PersistenceError::ComplaintNotFound(id) => {
            ApiError::not_found("Complaint", format!("Complaint {id} does not exist"))
        }
        other => {
            error!("Store failure: {}", other);
            ApiError::Internal {
                message: String::from(RETRY_LATER),
            }
        }
    }
}
