// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection setup.
//!
//! Every connection enforces foreign keys and waits for write locks held
//! by other connections instead of failing at once. Database files also
//! switch to write-ahead logging, so the session sweeper can read while a
//! request handler holds the write lock on another connection.

use diesel::connection::SimpleConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Embedded schema migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database.
pub const BUSY_TIMEOUT_MS: i32 = 5000;

/// Where a complaint desk database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A shared-cache in-memory database private to one numbered owner.
    ///
    /// Other connections opened with the same number see the same data.
    Memory(u64),
    /// A database file, created on first open.
    File(String),
}

impl DatabaseLocation {
    fn connection_url(&self) -> String {
        match self {
            Self::Memory(id) => format!("file:complaint_desk_mem_{id}?mode=memory&cache=shared"),
            Self::File(path) => path.clone(),
        }
    }

    const fn wants_wal(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Connection settings as reported back by `SQLite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPragmas {
    pub foreign_keys: bool,
    pub busy_timeout_ms: i32,
    /// Lowercase journal mode, `wal` for files and `memory` otherwise.
    pub journal_mode: String,
}

// Diesel has no PRAGMA DSL; these rows read back the raw statements below.

#[derive(QueryableByName)]
struct ForeignKeysRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[derive(QueryableByName)]
struct BusyTimeoutRow {
    #[diesel(sql_type = Integer)]
    timeout: i32,
}

#[derive(QueryableByName)]
struct JournalModeRow {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}

/// Opens a connection, applies the connection pragmas and migrates the
/// schema.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, a pragma cannot be
/// applied, a migration fails, or foreign keys remain disabled.
pub fn open(location: &DatabaseLocation) -> Result<SqliteConnection, PersistenceError> {
    let url: String = location.connection_url();
    info!(database = %url, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(&url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    let mut pragmas: String =
        format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;");
    if location.wants_wal() {
        pragmas.push_str(" PRAGMA journal_mode = WAL;");
    }
    conn.batch_execute(&pragmas)
        .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    let applied: ConnectionPragmas = read_pragmas(&mut conn)?;
    if !applied.foreign_keys {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    debug!(?applied, "SQLite connection ready");
    Ok(conn)
}

/// Reads the connection pragmas the store depends on.
///
/// # Errors
///
/// Returns an error if a pragma query fails.
pub fn read_pragmas(conn: &mut SqliteConnection) -> Result<ConnectionPragmas, PersistenceError> {
    let foreign_keys: ForeignKeysRow =
        diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    let busy_timeout: BusyTimeoutRow =
        diesel::sql_query("PRAGMA busy_timeout").get_result(conn)?;
    let journal_mode: JournalModeRow =
        diesel::sql_query("PRAGMA journal_mode").get_result(conn)?;

    Ok(ConnectionPragmas {
        foreign_keys: foreign_keys.foreign_keys != 0,
        busy_timeout_ms: busy_timeout.timeout,
        journal_mode: journal_mode.journal_mode.to_lowercase(),
    })
}

/// Fails unless foreign keys are enforced on this connection.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if they are off.
pub fn require_foreign_keys(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    if read_pragmas(conn)?.foreign_keys {
        Ok(())
    } else {
        Err(PersistenceError::ForeignKeyEnforcementNotEnabled)
    }
}

/// Returns the rowid of the last row this connection inserted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}
