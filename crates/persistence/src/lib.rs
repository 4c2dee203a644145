// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Complaint Desk.
//!
//! This crate stores users, sessions, complaints with their attachments
//! and manager history, per-year ticket counters, the activity log and
//! failed-login records. It is built on Diesel over `SQLite`.
//!
//! ## Transactions
//!
//! Every mutation that the activity log records is written together with
//! its audit event in one transaction. Complaint creation uses an
//! immediate transaction so that concurrent creators serialize on the
//! year's ticket counter.
//!
//! ## Testing
//!
//! - `Persistence::new_in_memory()` gives every caller its own database
//! - `Persistence::with_password_cost` lowers the bcrypt cost for fast tests
//! - File-backed databases run in WAL mode with a busy timeout, so several
//!   connections may share one file

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

use complaint_desk::{ComplaintChange, ComplaintTransition, Principal, complaint_created_event};
use complaint_desk_audit::{AuditEvent, clamp_log_limit};
use complaint_desk_domain::{Complaint, DashboardStats, TicketNumber, User};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::{self, DatabaseLocation};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    ComplaintFilter, LoginAttemptData, SessionData, UserCredentials, format_timestamp,
    parse_timestamp,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Password used to build the hash for unknown-account verification.
const DUMMY_PASSWORD: &str = "complaint-desk-dummy-credential";

/// Persistence adapter for the complaint desk store.
pub struct Persistence {
    conn: SqliteConnection,
    password_cost: u32,
    dummy_hash: OnceLock<String>,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let conn: SqliteConnection = sqlite::open(&DatabaseLocation::Memory(db_id))?;
        Ok(Self::from_connection(conn))
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection = sqlite::open(&DatabaseLocation::File(path_str.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    const fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn,
            password_cost: bcrypt::DEFAULT_COST,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Sets the bcrypt cost used for new password hashes.
    #[must_use]
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self.dummy_hash = OnceLock::new();
        self
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::require_foreign_keys(&mut self.conn)
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    fn hash_password(&self, password: &str) -> Result<String, PersistenceError> {
        bcrypt::hash(password, self.password_cost)
            .map_err(|e| PersistenceError::PasswordHashError(e.to_string()))
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Arguments
    ///
    /// * `password` - The plain text password to verify
    /// * `password_hash` - The stored bcrypt hash
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        bcrypt::verify(password, password_hash)
            .map_err(|e| PersistenceError::PasswordHashError(e.to_string()))
    }

    /// Runs a bcrypt verification against a throwaway hash.
    ///
    /// Used when the login identifier matches no account, so that the
    /// response takes as long as a real password check.
    pub fn dummy_verify(&self, password: &str) {
        let hash: &String = self.dummy_hash.get_or_init(|| {
            bcrypt::hash(DUMMY_PASSWORD, self.password_cost).unwrap_or_default()
        });
        if bcrypt::verify(password, hash).is_err() {
            debug!("Dummy credential hash unavailable");
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user and records the audit event.
    ///
    /// # Arguments
    ///
    /// * `user` - The user to create
    /// * `password` - The initial password (will be hashed)
    /// * `event` - The audit event recording the creation
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email is taken, or the insert fails.
    pub fn create_user(
        &mut self,
        user: &User,
        password: &str,
        event: &AuditEvent,
    ) -> Result<User, PersistenceError> {
        let password_hash: String = self.hash_password(password)?;

        let user_id: i64 = self
            .conn
            .transaction::<_, PersistenceError, _>(|conn| {
                ensure_unique(conn, user, None)?;
                let user_id: i64 = mutations::users::insert_user(conn, user, &password_hash)?;
                mutations::audit::persist_audit_event(conn, event)?;
                Ok(user_id)
            })?;

        Ok(User {
            user_id: Some(user_id),
            ..user.clone()
        })
    }

    /// Creates the first administrator.
    ///
    /// Only succeeds while no user accounts exist.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyBootstrapped` if any user exists, or an error if the
    /// insert fails.
    pub fn create_first_admin(
        &mut self,
        user: &User,
        password: &str,
        event: &AuditEvent,
    ) -> Result<User, PersistenceError> {
        let password_hash: String = self.hash_password(password)?;

        let user_id: i64 = self
            .conn
            .immediate_transaction::<_, PersistenceError, _>(|conn| {
                if queries::users::count_users(conn)? > 0 {
                    return Err(PersistenceError::AlreadyBootstrapped);
                }
                let user_id: i64 = mutations::users::insert_user(conn, user, &password_hash)?;
                mutations::audit::persist_audit_event(conn, event)?;
                Ok(user_id)
            })?;

        info!(user_id, "First administrator created");
        Ok(User {
            user_id: Some(user_id),
            ..user.clone()
        })
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        Ok(queries::users::get_credentials_by_id(&mut self.conn, user_id)?.map(|c| c.user))
    }

    /// Retrieves a user and stored credential by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_credentials(
        &mut self,
        user_id: i64,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        queries::users::get_credentials_by_id(&mut self.conn, user_id)
    }

    /// Looks up credentials by login identifier.
    ///
    /// An identifier containing `@` is treated as an email address;
    /// anything else as a username. Both are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_credentials(
        &mut self,
        identifier: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        if identifier.contains('@') {
            queries::users::get_credentials_by_email(&mut self.conn, identifier)
        } else {
            queries::users::get_credentials_by_username(&mut self.conn, identifier)
        }
    }

    /// Lists all users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Counts all user accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Counts accounts with the ADMIN role.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_admins(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_admins(&mut self.conn)
    }

    /// Overwrites a user's profile and role and records the audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the new username or
    /// email is taken by another account, or the update fails.
    pub fn update_user(
        &mut self,
        user_id: i64,
        user: &User,
        event: &AuditEvent,
    ) -> Result<User, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            ensure_unique(conn, user, Some(user_id))?;
            if mutations::users::update_user(conn, user_id, user)? == 0 {
                return Err(PersistenceError::UserNotFound(user_id));
            }
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(())
        })?;

        Ok(User {
            user_id: Some(user_id),
            ..user.clone()
        })
    }

    /// Deletes a user and records the audit event.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no such user exists, or an error if the
    /// delete fails.
    pub fn delete_user(&mut self, user_id: i64, event: &AuditEvent) -> Result<(), PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            if mutations::users::delete_user(conn, user_id)? == 0 {
                return Err(PersistenceError::UserNotFound(user_id));
            }
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(())
        })
    }

    /// Replaces a user's password, revokes all their sessions, and records
    /// the audit event.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no such user exists, or an error if the
    /// hash or any write fails.
    pub fn set_password(
        &mut self,
        user_id: i64,
        new_password: &str,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let password_hash: String = self.hash_password(new_password)?;

        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            if mutations::users::set_password_hash(conn, user_id, &password_hash)? == 0 {
                return Err(PersistenceError::UserNotFound(user_id));
            }
            mutations::users::delete_sessions_for_user(conn, user_id)?;
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(())
        })
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Opens a session after a successful login.
    ///
    /// The session row, the last-login stamp and the `LOGIN` audit event
    /// are written together.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn start_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        now: OffsetDateTime,
        expires_at: OffsetDateTime,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            let session_id: i64 =
                mutations::users::create_session(conn, session_token, user_id, now, expires_at)?;
            mutations::users::set_last_login(conn, user_id, now)?;
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(session_id)
        })
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn touch_session(
        &mut self,
        session_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::touch_session(&mut self.conn, session_id, now)
    }

    /// Deletes a session without logging. Used when a session is found expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<bool, PersistenceError> {
        Ok(mutations::users::delete_session(&mut self.conn, session_token)? > 0)
    }

    /// Ends a session on logout and records the audit event.
    ///
    /// Returns whether a session was removed. Nothing is logged when the
    /// token matched no session.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn end_session(
        &mut self,
        session_token: &str,
        event: &AuditEvent,
    ) -> Result<bool, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            if mutations::users::delete_session(conn, session_token)? == 0 {
                return Ok(false);
            }
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(true)
        })
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: OffsetDateTime) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Complaints
    // ========================================================================

    /// Stores a new complaint under the next ticket number of a year.
    ///
    /// The counter read-modify-write, the complaint insert and the
    /// `COMPLAINT_CREATED` audit event share one immediate transaction.
    ///
    /// # Arguments
    ///
    /// * `complaint` - The validated, unpersisted complaint
    /// * `principal` - The creating user
    /// * `ticket_year` - The year the ticket is numbered in
    ///
    /// # Errors
    ///
    /// Returns an error if allocation or any write fails.
    pub fn create_complaint(
        &mut self,
        complaint: &Complaint,
        principal: &Principal,
        ticket_year: i32,
    ) -> Result<Complaint, PersistenceError> {
        let complaint_id: i64 =
            self.conn
                .immediate_transaction::<_, PersistenceError, _>(|conn| {
                    let ticket: TicketNumber =
                        mutations::complaints::allocate_ticket(conn, ticket_year)?;
                    let complaint_id: i64 =
                        mutations::complaints::insert_complaint(conn, complaint, ticket)?;
                    let event: AuditEvent =
                        complaint_created_event(principal, ticket, complaint.created_at);
                    mutations::audit::persist_audit_event(conn, &event)?;
                    Ok(complaint_id)
                })?;

        self.load_complaint(complaint_id)
    }

    /// Retrieves a complaint with attachments and history.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_complaint(&mut self, complaint_id: i64) -> Result<Option<Complaint>, PersistenceError> {
        queries::complaints::get_complaint(&mut self.conn, complaint_id)
    }

    /// Lists complaints, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_complaints(
        &mut self,
        filter: ComplaintFilter,
    ) -> Result<Vec<Complaint>, PersistenceError> {
        queries::complaints::list_complaints(&mut self.conn, filter)
    }

    /// Writes a complaint transition and its audit event.
    ///
    /// Returns the complaint as stored afterwards, with new notes carrying
    /// their assigned ids.
    ///
    /// # Errors
    ///
    /// Returns `ComplaintNotFound` if the complaint vanished, or an error if
    /// any write fails.
    pub fn persist_transition(
        &mut self,
        complaint_id: i64,
        transition: &ComplaintTransition,
    ) -> Result<Complaint, PersistenceError> {
        let updated: &Complaint = &transition.complaint;

        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            let rows_affected: usize = match &transition.change {
                ComplaintChange::DetailsReplaced => mutations::complaints::update_details(
                    conn,
                    complaint_id,
                    &updated.details,
                    updated.updated_at,
                )?,
                ComplaintChange::StatusSet { note, .. } => {
                    let rows_affected: usize = mutations::complaints::set_status(
                        conn,
                        complaint_id,
                        updated.status,
                        updated.updated_at,
                    )?;
                    if rows_affected > 0
                        && let Some(note) = note
                    {
                        mutations::complaints::insert_note(conn, complaint_id, note)?;
                    }
                    rows_affected
                }
                ComplaintChange::NoteAppended { note } => {
                    let rows_affected: usize = mutations::complaints::touch_complaint(
                        conn,
                        complaint_id,
                        updated.updated_at,
                    )?;
                    if rows_affected > 0 {
                        mutations::complaints::insert_note(conn, complaint_id, note)?;
                    }
                    rows_affected
                }
                ComplaintChange::NoteRetracted {
                    note_id,
                    retraction,
                } => {
                    let retracted: usize = mutations::complaints::retract_note(
                        conn,
                        complaint_id,
                        *note_id,
                        retraction,
                    )?;
                    if retracted > 0 {
                        mutations::complaints::touch_complaint(
                            conn,
                            complaint_id,
                            updated.updated_at,
                        )?;
                    }
                    retracted
                }
            };

            if rows_affected == 0 {
                return Err(PersistenceError::ComplaintNotFound(complaint_id));
            }
            mutations::audit::persist_audit_event(conn, &transition.audit_event)?;
            Ok(())
        })?;

        debug!(complaint_id, action = %transition.audit_event.action, "Transition persisted");
        self.load_complaint(complaint_id)
    }

    /// Deletes a complaint and records the audit event.
    ///
    /// Returns `false` if the complaint did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn delete_complaint(
        &mut self,
        complaint_id: i64,
        event: &AuditEvent,
    ) -> Result<bool, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            if mutations::complaints::delete_complaint(conn, complaint_id)? == 0 {
                return Ok(false);
            }
            mutations::audit::persist_audit_event(conn, event)?;
            Ok(true)
        })
    }

    /// Computes dashboard statistics over all complaints.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn dashboard_stats(&mut self) -> Result<DashboardStats, PersistenceError> {
        queries::complaints::dashboard_stats(&mut self.conn)
    }

    fn load_complaint(&mut self, complaint_id: i64) -> Result<Complaint, PersistenceError> {
        queries::complaints::get_complaint(&mut self.conn, complaint_id)?
            .ok_or(PersistenceError::ComplaintNotFound(complaint_id))
    }

    // ========================================================================
    // Activity log
    // ========================================================================

    /// Appends an audit event on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event)
    }

    /// Reads the most recent audit events, newest first.
    ///
    /// The limit is clamped to `1..=100`; `None` reads 100.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_audit_events(
        &mut self,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_recent(&mut self.conn, clamp_log_limit(limit))
    }

    // ========================================================================
    // Login throttle
    // ========================================================================

    /// Retrieves the failed-login record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_login_attempt(
        &mut self,
        identifier: &str,
    ) -> Result<Option<LoginAttemptData>, PersistenceError> {
        queries::login_attempts::get_login_attempt(&mut self.conn, identifier)
    }

    /// Inserts or replaces the failed-login record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_login_attempt(&mut self, attempt: &LoginAttemptData) -> Result<(), PersistenceError> {
        mutations::login_attempts::save_login_attempt(&mut self.conn, attempt)
    }

    /// Removes the failed-login record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_login_attempt(&mut self, identifier: &str) -> Result<(), PersistenceError> {
        mutations::login_attempts::delete_login_attempt(&mut self.conn, identifier)
    }

    /// Removes failed-login records whose lock has run out, or whose
    /// window started at or before `window_cutoff` without a lock.
    ///
    /// Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_stale_login_attempts(
        &mut self,
        now: OffsetDateTime,
        window_cutoff: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            mutations::login_attempts::delete_stale_login_attempts(conn, now, window_cutoff)
        })
    }
}

fn ensure_unique(
    conn: &mut SqliteConnection,
    user: &User,
    except_user_id: Option<i64>,
) -> Result<(), PersistenceError> {
    let username: &str = user.username.value();
    if queries::users::username_exists(conn, username, except_user_id)? {
        return Err(PersistenceError::DuplicateUsername(username.to_string()));
    }
    if let Some(email) = &user.email
        && queries::users::email_exists(conn, email.value(), except_user_id)?
    {
        return Err(PersistenceError::DuplicateEmail(email.value().to_string()));
    }
    Ok(())
}
