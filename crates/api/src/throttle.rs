// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Failed-login throttling.
//!
//! Failures are counted per normalized identifier inside a sliding window
//! that starts with the first failure. The failure that reaches the
//! threshold locks the identifier. While locked, every attempt is
//! rejected, even with a correct password. An expired lock discards the
//! record, so counting starts afresh.

use complaint_desk_persistence::{LoginAttemptData, Persistence};
use std::collections::HashMap;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::error::AuthError;

/// Attempt store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// The backing store failed.
    #[error("Login attempt store failed: {0}")]
    Store(String),
}

/// Storage for failed-login records.
///
/// The in-memory store suits tests and single-instance deployments; the
/// database store is shared across instances and restarts.
pub trait AttemptStore: Send {
    /// Loads the record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load(&mut self, identifier: &str) -> Result<Option<LoginAttemptData>, ThrottleError>;

    /// Inserts or replaces a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn save(&mut self, attempt: &LoginAttemptData) -> Result<(), ThrottleError>;

    /// Removes the record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn clear(&mut self, identifier: &str) -> Result<(), ThrottleError>;

    /// Removes every record whose lock has run out, or that holds no lock
    /// and whose window started at or before `window_cutoff`.
    ///
    /// Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn purge_expired(
        &mut self,
        now: OffsetDateTime,
        window_cutoff: OffsetDateTime,
    ) -> Result<usize, ThrottleError>;
}

/// Attempt store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    records: HashMap<String, LoginAttemptData>,
}

impl InMemoryAttemptStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn load(&mut self, identifier: &str) -> Result<Option<LoginAttemptData>, ThrottleError> {
        Ok(self.records.get(identifier).cloned())
    }

    fn save(&mut self, attempt: &LoginAttemptData) -> Result<(), ThrottleError> {
        self.records
            .insert(attempt.identifier.clone(), attempt.clone());
        Ok(())
    }

    fn clear(&mut self, identifier: &str) -> Result<(), ThrottleError> {
        self.records.remove(identifier);
        Ok(())
    }

    fn purge_expired(
        &mut self,
        now: OffsetDateTime,
        window_cutoff: OffsetDateTime,
    ) -> Result<usize, ThrottleError> {
        let before: usize = self.records.len();
        self.records.retain(|_, record| match record.locked_until {
            Some(locked_until) => locked_until > now,
            None => record.window_started_at > window_cutoff,
        });
        Ok(before - self.records.len())
    }
}

impl AttemptStore for Persistence {
    fn load(&mut self, identifier: &str) -> Result<Option<LoginAttemptData>, ThrottleError> {
        self.get_login_attempt(identifier)
            .map_err(|e| ThrottleError::Store(e.to_string()))
    }

    fn save(&mut self, attempt: &LoginAttemptData) -> Result<(), ThrottleError> {
        self.save_login_attempt(attempt)
            .map_err(|e| ThrottleError::Store(e.to_string()))
    }

    fn clear(&mut self, identifier: &str) -> Result<(), ThrottleError> {
        self.delete_login_attempt(identifier)
            .map_err(|e| ThrottleError::Store(e.to_string()))
    }

    fn purge_expired(
        &mut self,
        now: OffsetDateTime,
        window_cutoff: OffsetDateTime,
    ) -> Result<usize, ThrottleError> {
        self.delete_stale_login_attempts(now, window_cutoff)
            .map_err(|e| ThrottleError::Store(e.to_string()))
    }
}

/// Limits for failed logins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Failures within the window that trigger a lock.
    pub max_attempts: u32,
    /// How long failures are counted together.
    pub window: Duration,
    /// How long a lock lasts.
    pub lockout: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::minutes(15),
            lockout: Duration::minutes(5),
        }
    }
}

/// Normalizes a login identifier for throttling.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

impl ThrottlePolicy {
    /// Rejects the attempt if the identifier is locked.
    ///
    /// A record whose lock or window has run out is discarded.
    ///
    /// # Errors
    ///
    /// Returns `RateLimited` while locked, or `StoreUnavailable` if the
    /// store fails.
    pub fn check(
        &self,
        store: &mut dyn AttemptStore,
        identifier: &str,
        now: OffsetDateTime,
    ) -> Result<(), AuthError> {
        let Some(record) = store.load(identifier)? else {
            return Ok(());
        };

        match record.locked_until {
            Some(locked_until) if locked_until > now => {
                let remaining: Duration = locked_until - now;
                let mut retry_after_seconds: i64 = remaining.whole_seconds();
                if remaining.subsec_nanoseconds() > 0 {
                    retry_after_seconds += 1;
                }
                warn!(retry_after_seconds, "Login attempt rejected while locked");
                Err(AuthError::RateLimited {
                    retry_after_seconds: retry_after_seconds.max(1),
                })
            }
            Some(_) => {
                debug!("Login lock expired");
                store.clear(identifier)?;
                Ok(())
            }
            None if now - record.window_started_at >= self.window => {
                store.clear(identifier)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Counts a failed attempt, locking the identifier on the last allowed one.
    ///
    /// # Returns
    ///
    /// The lock expiry if this failure set a lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn record_failure(
        &self,
        store: &mut dyn AttemptStore,
        identifier: &str,
        now: OffsetDateTime,
    ) -> Result<Option<OffsetDateTime>, ThrottleError> {
        let previous: Option<LoginAttemptData> = store.load(identifier)?;

        let mut record: LoginAttemptData = match previous {
            Some(record)
                if record.locked_until.is_none()
                    && now - record.window_started_at < self.window =>
            {
                record
            }
            _ => LoginAttemptData {
                identifier: identifier.to_string(),
                failed_count: 0,
                window_started_at: now,
                locked_until: None,
            },
        };

        record.failed_count += 1;
        if record.failed_count >= self.max_attempts {
            record.locked_until = Some(now + self.lockout);
            warn!(
                failed_count = record.failed_count,
                "Login identifier locked after repeated failures"
            );
        }

        store.save(&record)?;
        Ok(record.locked_until)
    }

    /// Forgets all failures after a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn record_success(
        store: &mut dyn AttemptStore,
        identifier: &str,
    ) -> Result<(), ThrottleError> {
        store.clear(identifier)
    }

    /// Drops records that can no longer lock anyone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn purge_expired(
        &self,
        store: &mut dyn AttemptStore,
        now: OffsetDateTime,
    ) -> Result<usize, ThrottleError> {
        let removed: usize = store.purge_expired(now, now - self.window)?;
        if removed > 0 {
            debug!(removed, "Purged stale login attempt records");
        }
        Ok(removed)
    }
}
