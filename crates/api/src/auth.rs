// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and session services.

use complaint_desk_audit::{Actor, AuditAction, AuditEvent};
use complaint_desk_domain::User;
use complaint_desk_persistence::{Persistence, SessionData, UserCredentials};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::throttle::{AttemptStore, ThrottlePolicy, normalize_identifier};

/// Authentication settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthConfig {
    /// How long a session stays valid after login.
    pub session_ttl: Duration,
    /// Failed-login limits.
    pub throttle: ThrottlePolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            throttle: ThrottlePolicy::default(),
        }
    }
}

/// The result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The opaque session token.
    pub session_token: String,
    /// The authenticated user.
    pub user: User,
    /// When the session expires.
    pub expires_at: OffsetDateTime,
}

/// Generates a 256-bit session token as lowercase hex.
fn generate_session_token() -> String {
    (0..4)
        .map(|_| format!("{:016x}", rand::random::<u64>()))
        .collect()
}

/// Authentication service for credential checks and session management.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Checks a login identifier and password.
    ///
    /// The identifier is a username, or an email address when it contains
    /// `@`. Unknown identifiers and wrong passwords fail identically, and a
    /// throwaway hash is verified for unknown identifiers so the response
    /// time does not reveal whether the account exists.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `attempts` - The failed-login store
    /// * `policy` - The throttle limits
    /// * `identifier` - The username or email address
    /// * `password` - The password
    /// * `now` - The current instant
    ///
    /// # Errors
    ///
    /// Returns `RateLimited` while the identifier is locked,
    /// `AuthenticationFailed` for bad credentials, or `StoreUnavailable`
    /// if a store fails.
    pub fn authenticate(
        persistence: &mut Persistence,
        attempts: &mut dyn AttemptStore,
        policy: &ThrottlePolicy,
        identifier: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<User, AuthError> {
        let key: String = normalize_identifier(identifier);
        policy.check(attempts, &key, now)?;

        let Some(credentials) = persistence.find_credentials(&key)? else {
            persistence.dummy_verify(password);
            policy.record_failure(attempts, &key, now)?;
            warn!("Login failed for unknown identifier");
            return Err(AuthError::invalid_credentials());
        };

        let UserCredentials {
            user,
            password_hash,
        } = credentials;

        if !persistence.verify_password(password, &password_hash)? {
            policy.record_failure(attempts, &key, now)?;
            warn!(user_id = ?user.user_id, "Login failed: wrong password");
            return Err(AuthError::invalid_credentials());
        }

        ThrottlePolicy::record_success(attempts, &key)?;
        Ok(user)
    }

    /// Authenticates and opens a session.
    ///
    /// The session, the last-login stamp and the `LOGIN` log entry are
    /// written together.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the session lifetime
    /// overflows `now`, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        attempts: &mut dyn AttemptStore,
        config: &AuthConfig,
        identifier: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<LoginOutcome, AuthError> {
        let mut user: User = Self::authenticate(
            persistence,
            attempts,
            &config.throttle,
            identifier,
            password,
            now,
        )?;
        let user_id: i64 = user.user_id.ok_or_else(AuthError::invalid_credentials)?;

        let session_token: String = generate_session_token();
        let expires_at: OffsetDateTime = now
            .checked_add(config.session_ttl)
            .ok_or(AuthError::SessionExpiryOutOfRange)?;
        let event: AuditEvent = AuditEvent::new(
            Actor::for_user(&user),
            AuditAction::Login,
            format!("{} logged in", user.username.value()),
            now,
        );

        persistence.start_session(&session_token, user_id, now, expires_at, &event)?;
        user.last_login_at = Some(now);

        info!(user_id, "Session started");
        Ok(LoginOutcome {
            session_token,
            user,
            expires_at,
        })
    }

    /// Resolves a session token to its user.
    ///
    /// An expired session is deleted. A live session has its activity
    /// stamp refreshed.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the token is unknown or expired,
    /// or the user no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<User, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if now >= session.expires_at {
            persistence.delete_session(session_token)?;
            debug!(session_id = session.session_id, "Expired session removed");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: User = persistence.get_user(session.user_id)?.ok_or_else(|| {
            AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            }
        })?;

        persistence.touch_session(session.session_id, now)?;
        Ok(user)
    }

    /// Ends a session and records the `LOGOUT` entry.
    ///
    /// Logging out of a session that no longer exists is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn logout(
        persistence: &mut Persistence,
        user: &User,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(), AuthError> {
        let event: AuditEvent = AuditEvent::new(
            Actor::for_user(user),
            AuditAction::Logout,
            format!("{} logged out", user.username.value()),
            now,
        );
        if persistence.end_session(session_token, &event)? {
            info!(user_id = ?user.user_id, "Session ended");
        }
        Ok(())
    }
}
