/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Addiction, ConsumptionEntry, Streak)
/// and their validation rules, plus the streak engine that turns entry
/// history into a persisted streak record.

pub mod addiction;
pub mod entry;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use addiction::*;
pub use entry::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid addiction name: {0}")]
    InvalidName(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
