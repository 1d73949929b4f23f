/// Addiction entity and related functionality
///
/// This module defines the Addiction struct that represents a behavior the
/// user logs occurrences of, along with validation and partial updates.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{AddictionId, DomainError, Level};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// A tracked addiction (habit)
///
/// Each addiction has a display name and an intensity level from 1 to 10.
/// The level decides how often the reminder scheduler nudges the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addiction {
    /// Unique identifier for this addiction
    pub id: AddictionId,
    /// Display name (e.g., "Coffee", "Doomscrolling")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Intensity level, drives the reminder interval
    pub level: Level,
    /// When this addiction was created
    pub created_at: DateTime<Utc>,
    /// Last time any field was changed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new addiction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAddiction {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to level 1 when absent
    pub level: Option<i64>,
}

/// Partial update of an addiction
///
/// `None` leaves the field untouched. For `description`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddictionUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub level: Option<i64>,
}

impl AddictionUpdate {
    /// Whether applying this update requires rescheduling the reminder
    pub fn touches_reminder(&self) -> bool {
        self.name.is_some() || self.level.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.level.is_none()
    }
}

impl Addiction {
    /// Create a new addiction with validation
    pub fn new(input: NewAddiction) -> Result<Self, DomainError> {
        let name = Self::validate_name(&input.name)?;
        Self::validate_description(&input.description)?;

        let now = Utc::now();
        Ok(Self {
            id: AddictionId::new(),
            name,
            description: input.description,
            level: input.level.map(Level::clamped).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an addiction from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    pub fn from_existing(
        id: AddictionId,
        name: String,
        description: Option<String>,
        level: Level,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            level,
            created_at,
            updated_at,
        }
    }

    /// Apply a partial update with validation
    ///
    /// Nothing is changed if any of the new values fails validation.
    pub fn apply(&mut self, update: AddictionUpdate) -> Result<(), DomainError> {
        let name = match update.name {
            Some(ref new_name) => Some(Self::validate_name(new_name)?),
            None => None,
        };
        if let Some(ref new_desc) = update.description {
            Self::validate_description(new_desc)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(level) = update.level {
            self.level = Level::clamped(level);
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Whether the reminder scheduler can register a reminder for this addiction
    pub fn is_schedulable(&self) -> bool {
        !self.id.0.is_nil() && !self.name.trim().is_empty()
    }

    // Validation helper methods

    /// Validate the name and return its trimmed form
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidName(
                "Addiction name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidName(format!(
                "Addiction name cannot be longer than {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(trimmed.to_string())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(DomainError::Validation {
                    message: format!(
                        "Description cannot be longer than {} characters",
                        MAX_DESCRIPTION_LEN
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_valid_addiction() {
        let addiction = Addiction::new(NewAddiction {
            name: "  Coffee ".to_string(),
            description: Some("Second cup after lunch".to_string()),
            level: Some(7),
        })
        .unwrap();

        assert_eq!(addiction.name, "Coffee");
        assert_eq!(addiction.level.value(), 7);
        assert!(addiction.is_schedulable());
    }

    #[test]
    fn test_level_defaults_to_one() {
        let addiction = Addiction::new(NewAddiction {
            name: "Sugar".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(addiction.level.value(), 1);
    }

    #[test]
    fn test_invalid_name() {
        let result = Addiction::new(NewAddiction {
            name: "   ".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(DomainError::InvalidName(_))));

        let result = Addiction::new(NewAddiction {
            name: "x".repeat(101),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_update_is_atomic() {
        let mut addiction = Addiction::new(NewAddiction {
            name: "Snacks".to_string(),
            level: Some(3),
            ..Default::default()
        })
        .unwrap();

        let bad = AddictionUpdate {
            name: Some(String::new()),
            level: Some(9),
            ..Default::default()
        };
        assert!(addiction.apply(bad).is_err());
        assert_eq!(addiction.level.value(), 3);

        let good = AddictionUpdate {
            level: Some(12),
            description: Some(None),
            ..Default::default()
        };
        assert!(good.touches_reminder());
        addiction.apply(good).unwrap();
        assert_eq!(addiction.level.value(), 10);
        assert_eq!(addiction.description, None);
    }

    #[test]
    fn test_description_only_update_keeps_reminder() {
        let update = AddictionUpdate {
            description: Some(Some("notes".to_string())),
            ..Default::default()
        };
        assert!(!update.touches_reminder());
        assert!(!update.is_empty());
        assert!(AddictionUpdate::default().is_empty());
    }
}
