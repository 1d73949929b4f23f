/// Storage layer for persisting addiction data
///
/// This module handles all database operations using SQLite. Every row is
/// owned by a user and every query is scoped by that owner.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use crate::domain::{Addiction, AddictionId, ConsumptionEntry, EntryId, Streak, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Addiction not found: {addiction_id}")]
    AddictionNotFound { addiction_id: String },

    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the row-oriented store the services talk to
///
/// Keeping it a trait lets services and tests stay independent of SQLite.
pub trait TrackerStorage {
    /// Insert a new addiction
    fn create_addiction(&self, user_id: &UserId, addiction: &Addiction) -> Result<(), StorageError>;

    /// Get one addiction owned by the user
    fn get_addiction(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<Addiction, StorageError>;

    /// Overwrite the mutable fields of an addiction
    fn update_addiction(&self, user_id: &UserId, addiction: &Addiction) -> Result<(), StorageError>;

    /// Delete an addiction together with its entries and streak
    fn delete_addiction(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<(), StorageError>;

    /// All addictions of the user, newest first
    fn list_addictions(&self, user_id: &UserId) -> Result<Vec<Addiction>, StorageError>;

    /// Insert a new entry
    fn create_entry(&self, user_id: &UserId, entry: &ConsumptionEntry) -> Result<(), StorageError>;

    /// Get one entry owned by the user
    fn get_entry(&self, user_id: &UserId, entry_id: &EntryId) -> Result<ConsumptionEntry, StorageError>;

    /// Overwrite the editable fields of an entry
    fn update_entry(&self, user_id: &UserId, entry: &ConsumptionEntry) -> Result<(), StorageError>;

    /// Delete one entry
    fn delete_entry(&self, user_id: &UserId, entry_id: &EntryId) -> Result<(), StorageError>;

    /// Entries of the user, optionally for one addiction, newest entry_date first
    fn list_entries(
        &self,
        user_id: &UserId,
        addiction_id: Option<&AddictionId>,
    ) -> Result<Vec<ConsumptionEntry>, StorageError>;

    /// Create or overwrite the streak row keyed by (user, addiction)
    fn upsert_streak(&self, user_id: &UserId, streak: &Streak) -> Result<Streak, StorageError>;

    /// Streak row for one addiction, if one was ever written
    fn get_streak(&self, user_id: &UserId, addiction_id: &AddictionId) -> Result<Option<Streak>, StorageError>;

    /// All streak rows of the user
    fn list_streaks(&self, user_id: &UserId) -> Result<Vec<Streak>, StorageError>;
}
