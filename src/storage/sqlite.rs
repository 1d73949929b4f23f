/// SQLite implementation of the tracker storage interface
///
/// This module provides the concrete SQLite implementation for storing and
/// retrieving addictions, entries and streaks. Timestamps are stored as
/// RFC 3339 text in UTC with fixed precision so they sort lexically.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Addiction, AddictionId, ConsumptionEntry, EntryId, Level, Streak, UserId};
use crate::storage::{migrations, StorageError, TrackerStorage};

const ADDICTION_COLUMNS: &str = "id, name, description, level, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, addiction_id, entry_date, notes, image_url, barcode_data, created_at, updated_at";
const STREAK_COLUMNS: &str = "addiction_id, current_streak, longest_streak, last_entry_date, updated_at";

/// SQLite-based storage implementation
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Fresh in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn invalid(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), rusqlite::types::Type::Text)
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid(idx, "Invalid datetime"))
}

fn parse_optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| invalid(idx, "Invalid datetime"))
    })
    .transpose()
}

fn parse_addiction_id(row: &Row, idx: usize) -> rusqlite::Result<AddictionId> {
    let raw: String = row.get(idx)?;
    AddictionId::from_string(&raw).map_err(|_| invalid(idx, "Invalid UUID"))
}

fn addiction_from_row(row: &Row) -> rusqlite::Result<Addiction> {
    Ok(Addiction::from_existing(
        parse_addiction_id(row, 0)?,
        row.get(1)?,
        row.get(2)?,
        Level::clamped(row.get::<_, i64>(3)?),
        parse_timestamp(row, 4)?,
        parse_timestamp(row, 5)?,
    ))
}

fn entry_from_row(row: &Row) -> rusqlite::Result<ConsumptionEntry> {
    let id_str: String = row.get(0)?;
    let id = EntryId::from_string(&id_str).map_err(|_| invalid(0, "Invalid UUID"))?;

    Ok(ConsumptionEntry::from_existing(
        id,
        parse_addiction_id(row, 1)?,
        parse_timestamp(row, 2)?,
        row.get(3)?, // notes
        row.get(4)?, // image_url
        row.get(5)?, // barcode_data
        parse_timestamp(row, 6)?,
        parse_timestamp(row, 7)?,
    ))
}

fn streak_from_row(row: &Row) -> rusqlite::Result<Streak> {
    Ok(Streak {
        addiction_id: parse_addiction_id(row, 0)?,
        current_streak: row.get(1)?,
        longest_streak: row.get(2)?,
        last_entry_date: parse_optional_timestamp(row, 3)?,
        updated_at: parse_timestamp(row, 4)?,
    })
}

impl TrackerStorage for SqliteStorage {
    fn create_addiction(&self, user_id: &UserId, addiction: &Addiction) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO addictions (id, user_id, name, description, level, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                addiction.id.to_string(),
                user_id.to_string(),
                addiction.name,
                addiction.description,
                addiction.level.value(),
                format_timestamp(&addiction.created_at),
                format_timestamp(&addiction.updated_at),
            ],
        )?;

        tracing::debug!("Created addiction: {} ({})", addiction.name, addiction.id);
        Ok(())
    }

    fn get_addiction(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<Addiction, StorageError> {
        let sql = format!(
            "SELECT {} FROM addictions WHERE id = ?1 AND user_id = ?2",
            ADDICTION_COLUMNS
        );

        self.conn
            .query_row(&sql, params![addiction_id.to_string(), user_id.to_string()], addiction_from_row)
            .optional()?
            .ok_or_else(|| StorageError::AddictionNotFound {
                addiction_id: addiction_id.to_string(),
            })
    }

    fn update_addiction(&self, user_id: &UserId, addiction: &Addiction) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE addictions SET
                name = ?3,
                description = ?4,
                level = ?5,
                updated_at = ?6
             WHERE id = ?1 AND user_id = ?2",
            params![
                addiction.id.to_string(),
                user_id.to_string(),
                addiction.name,
                addiction.description,
                addiction.level.value(),
                format_timestamp(&addiction.updated_at),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::AddictionNotFound {
                addiction_id: addiction.id.to_string(),
            });
        }

        tracing::debug!("Updated addiction: {} ({})", addiction.name, addiction.id);
        Ok(())
    }

    fn delete_addiction(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let id = addiction_id.to_string();
        let owner = user_id.to_string();

        tx.execute(
            "DELETE FROM streaks WHERE addiction_id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        tx.execute(
            "DELETE FROM consumption_entries WHERE addiction_id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        let rows_affected = tx.execute(
            "DELETE FROM addictions WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;

        if rows_affected == 0 {
            // Dropping the transaction rolls it back
            return Err(StorageError::AddictionNotFound { addiction_id: id });
        }
        tx.commit()?;

        tracing::debug!("Deleted addiction: {}", addiction_id);
        Ok(())
    }

    fn list_addictions(&self, user_id: &UserId) -> Result<Vec<Addiction>, StorageError> {
        let sql = format!(
            "SELECT {} FROM addictions WHERE user_id = ?1 ORDER BY created_at DESC",
            ADDICTION_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id.to_string()], addiction_from_row)?;

        let mut addictions = Vec::new();
        for addiction in rows {
            addictions.push(addiction?);
        }
        Ok(addictions)
    }

    fn create_entry(&self, user_id: &UserId, entry: &ConsumptionEntry) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO consumption_entries (
                id, user_id, addiction_id, entry_date, notes, image_url, barcode_data, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id.to_string(),
                user_id.to_string(),
                entry.addiction_id.to_string(),
                format_timestamp(&entry.entry_date),
                entry.notes,
                entry.image_url,
                entry.barcode_data,
                format_timestamp(&entry.created_at),
                format_timestamp(&entry.updated_at),
            ],
        )?;

        tracing::debug!("Created entry: {} for addiction {}", entry.id, entry.addiction_id);
        Ok(())
    }

    fn get_entry(&self, user_id: &UserId, entry_id: &EntryId) -> Result<ConsumptionEntry, StorageError> {
        let sql = format!(
            "SELECT {} FROM consumption_entries WHERE id = ?1 AND user_id = ?2",
            ENTRY_COLUMNS
        );

        self.conn
            .query_row(&sql, params![entry_id.to_string(), user_id.to_string()], entry_from_row)
            .optional()?
            .ok_or_else(|| StorageError::EntryNotFound {
                entry_id: entry_id.to_string(),
            })
    }

    fn update_entry(&self, user_id: &UserId, entry: &ConsumptionEntry) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE consumption_entries SET
                notes = ?3,
                image_url = ?4,
                barcode_data = ?5,
                updated_at = ?6
             WHERE id = ?1 AND user_id = ?2",
            params![
                entry.id.to_string(),
                user_id.to_string(),
                entry.notes,
                entry.image_url,
                entry.barcode_data,
                format_timestamp(&entry.updated_at),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::EntryNotFound {
                entry_id: entry.id.to_string(),
            });
        }
        Ok(())
    }

    fn delete_entry(&self, user_id: &UserId, entry_id: &EntryId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM consumption_entries WHERE id = ?1 AND user_id = ?2",
            params![entry_id.to_string(), user_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::EntryNotFound {
                entry_id: entry_id.to_string(),
            });
        }

        tracing::debug!("Deleted entry: {}", entry_id);
        Ok(())
    }

    fn list_entries(
        &self,
        user_id: &UserId,
        addiction_id: Option<&AddictionId>,
    ) -> Result<Vec<ConsumptionEntry>, StorageError> {
        let mut entries = Vec::new();

        match addiction_id {
            Some(addiction_id) => {
                let sql = format!(
                    "SELECT {} FROM consumption_entries WHERE user_id = ?1 AND addiction_id = ?2
                     ORDER BY entry_date DESC",
                    ENTRY_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![user_id.to_string(), addiction_id.to_string()],
                    entry_from_row,
                )?;
                for entry in rows {
                    entries.push(entry?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM consumption_entries WHERE user_id = ?1 ORDER BY entry_date DESC",
                    ENTRY_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![user_id.to_string()], entry_from_row)?;
                for entry in rows {
                    entries.push(entry?);
                }
            }
        }

        Ok(entries)
    }

    fn upsert_streak(&self, user_id: &UserId, streak: &Streak) -> Result<Streak, StorageError> {
        self.conn.execute(
            "INSERT INTO streaks (
                user_id, addiction_id, current_streak, longest_streak, last_entry_date, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (user_id, addiction_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_entry_date = excluded.last_entry_date,
                updated_at = excluded.updated_at",
            params![
                user_id.to_string(),
                streak.addiction_id.to_string(),
                streak.current_streak,
                streak.longest_streak,
                streak.last_entry_date.as_ref().map(format_timestamp),
                format_timestamp(&streak.updated_at),
            ],
        )?;

        tracing::debug!("Upserted streak for addiction: {}", streak.addiction_id);

        self.get_streak(user_id, &streak.addiction_id)?
            .ok_or_else(|| StorageError::AddictionNotFound {
                addiction_id: streak.addiction_id.to_string(),
            })
    }

    fn get_streak(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<Option<Streak>, StorageError> {
        let sql = format!(
            "SELECT {} FROM streaks WHERE user_id = ?1 AND addiction_id = ?2",
            STREAK_COLUMNS
        );

        Ok(self
            .conn
            .query_row(&sql, params![user_id.to_string(), addiction_id.to_string()], streak_from_row)
            .optional()?)
    }

    fn list_streaks(&self, user_id: &UserId) -> Result<Vec<Streak>, StorageError> {
        let sql = format!("SELECT {} FROM streaks WHERE user_id = ?1", STREAK_COLUMNS);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id.to_string()], streak_from_row)?;

        let mut streaks = Vec::new();
        for streak in rows {
            streaks.push(streak?);
        }
        Ok(streaks)
    }
}
