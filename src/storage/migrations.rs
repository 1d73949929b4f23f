/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0); // No version record yet

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn).map_err(|e| StorageError::Migration(format!("v1: {}", e)))?;
    }

    Ok(())
}

/// Migration to version 1: addictions, consumption entries and streaks
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS addictions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            level INTEGER NOT NULL DEFAULT 1 CHECK (level BETWEEN 1 AND 10),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS consumption_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            addiction_id TEXT NOT NULL,
            entry_date TEXT NOT NULL,
            notes TEXT,
            image_url TEXT,
            barcode_data TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (addiction_id) REFERENCES addictions (id) ON DELETE CASCADE
        );

        -- One row per (user, addiction); the unique key is what upserts conflict on
        CREATE TABLE IF NOT EXISTS streaks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            addiction_id TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            last_entry_date TEXT,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, addiction_id),
            FOREIGN KEY (addiction_id) REFERENCES addictions (id) ON DELETE CASCADE
        );",
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_addictions_user_created
            ON addictions (user_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_entries_user_addiction_date
            ON consumption_entries (user_id, addiction_id, entry_date);

        CREATE INDEX IF NOT EXISTS idx_entries_user_date
            ON consumption_entries (user_id, entry_date);",
    )?;

    tracing::debug!("Created database indexes for v1");
    Ok(())
}
