// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! Connection setup, embedded migrations, PRAGMA handling and the
//! `sqlite_master` introspection used to confirm the partial unique indexes.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::connection::SimpleConnection;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::PersistenceError;

/// How long a writer waits for another connection's lock before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Embedded `SQLite` migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Row returned by `PRAGMA foreign_keys`.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Row returned by the `sqlite_master` index lookup.
#[derive(QueryableByName)]
struct IndexSqlRow {
    #[diesel(sql_type = Text)]
    sql: String,
}

/// Partial unique indexes and the predicate each must carry.
pub const REQUIRED_PARTIAL_INDEXES: [(&str, &str); 3] = [
    (
        "idx_applications_number",
        "WHERE application_number IS NOT NULL",
    ),
    (
        "idx_applications_one_draft_per_owner",
        "WHERE status = 'draft'",
    ),
    (
        "idx_enrollments_live_student_offering",
        "WHERE status != 'cancelled'",
    ),
];

/// Returns `last_insert_rowid()` for the connection.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Verifies that foreign key enforcement is enabled.
///
/// # Arguments
///
/// * `conn` - The database connection to check
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Verifies that every required partial unique index exists with its predicate.
///
/// # Errors
///
/// Returns `PersistenceError::MissingIndex` naming the first index that is
/// absent, not unique, or lacks its `WHERE` clause.
pub fn verify_partial_indexes(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    for (name, predicate) in REQUIRED_PARTIAL_INDEXES {
        let rows: Vec<IndexSqlRow> = diesel::sql_query(
            "SELECT sql FROM sqlite_master WHERE type = 'index' AND name = ? AND sql IS NOT NULL",
        )
        .bind::<Text, _>(name)
        .load(conn)?;

        let normalized: Option<String> = rows
            .first()
            .map(|row| row.sql.split_whitespace().collect::<Vec<&str>>().join(" "));
        match normalized {
            Some(sql) if sql.starts_with("CREATE UNIQUE INDEX") && sql.contains(predicate) => {}
            _ => return Err(PersistenceError::MissingIndex(name.to_string())),
        }
    }

    info!("Partial unique indexes verified");
    Ok(())
}

/// Applies every embedded migration not yet recorded in the database.
///
/// # Errors
///
/// Returns the migration harness error unchanged.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Applying class application migrations");
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Opens a connection, turns on foreign keys, sets the busy timeout and
/// migrates the schema.
///
/// The busy timeout makes a second connection's `BEGIN IMMEDIATE` wait for the
/// current writer instead of failing with `SQLITE_BUSY`.
///
/// `database_url` is either a file path or a `file:...?mode=memory&cache=shared`
/// URI for isolated in-memory stores.
///
/// # Errors
///
/// Returns `DatabaseConnectionFailed`, `QueryFailed` or `MigrationFailed`.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, "Opening class application store");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    // Diesel has no PRAGMA DSL
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    conn.batch_execute(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Switches a file database to write-ahead logging so readers never block
/// the submitting writer.
///
/// # Errors
///
/// Returns `QueryFailed` if the PRAGMA is rejected.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}
