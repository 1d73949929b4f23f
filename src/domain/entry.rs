/// ConsumptionEntry entity for logging occurrences
///
/// This module defines the ConsumptionEntry struct that represents a single
/// logged occurrence of an addiction at a point in time, with optional notes
/// and an optional image reference.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{AddictionId, DomainError, EntryId};

const MAX_NOTES_LEN: usize = 500;

/// A single logged occurrence of an addiction
///
/// The timestamp is fixed once created; only notes, image and barcode can be
/// edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which addiction this entry is for
    pub addiction_id: AddictionId,
    /// When the occurrence happened (ordering key for streaks)
    pub entry_date: DateTime<Utc>,
    /// User's notes about this occurrence
    pub notes: Option<String>,
    /// Reference to an uploaded photo
    pub image_url: Option<String>,
    /// Scanned product barcode, if any
    pub barcode_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for logging a new entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub addiction_id: AddictionId,
    /// Defaults to the current time
    pub entry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub barcode_data: Option<String>,
}

impl NewEntry {
    pub fn now(addiction_id: AddictionId) -> Self {
        Self {
            addiction_id,
            entry_date: None,
            notes: None,
            image_url: None,
            barcode_data: None,
        }
    }
}

/// Edit of the mutable entry fields; `Some(None)` clears a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub notes: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub barcode_data: Option<Option<String>>,
}

impl ConsumptionEntry {
    /// Create a new entry with validation
    ///
    /// `created_at` is set to the current time, and so is `entry_date` when
    /// the input leaves it out.
    pub fn new(input: NewEntry) -> Result<Self, DomainError> {
        Self::validate_notes(&input.notes)?;
        Self::validate_reference("Image URL", &input.image_url)?;
        Self::validate_reference("Barcode", &input.barcode_data)?;

        let now = Utc::now();
        Ok(Self {
            id: EntryId::new(),
            addiction_id: input.addiction_id,
            entry_date: input.entry_date.unwrap_or(now),
            notes: input.notes,
            image_url: input.image_url,
            barcode_data: input.barcode_data,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an entry from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: EntryId,
        addiction_id: AddictionId,
        entry_date: DateTime<Utc>,
        notes: Option<String>,
        image_url: Option<String>,
        barcode_data: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            addiction_id,
            entry_date,
            notes,
            image_url,
            barcode_data,
            created_at,
            updated_at,
        }
    }

    /// Apply an edit to the mutable fields
    pub fn apply(&mut self, update: EntryUpdate) -> Result<(), DomainError> {
        if let Some(ref notes) = update.notes {
            Self::validate_notes(notes)?;
        }
        if let Some(ref image_url) = update.image_url {
            Self::validate_reference("Image URL", image_url)?;
        }
        if let Some(ref barcode) = update.barcode_data {
            Self::validate_reference("Barcode", barcode)?;
        }

        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
        if let Some(barcode) = update.barcode_data {
            self.barcode_data = barcode;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Check if this entry has non-blank notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.chars().count() > MAX_NOTES_LEN {
                return Err(DomainError::InvalidValue {
                    message: format!("Notes cannot be longer than {} characters", MAX_NOTES_LEN),
                });
            }
        }
        Ok(())
    }

    fn validate_reference(label: &str, value: &Option<String>) -> Result<(), DomainError> {
        if let Some(v) = value {
            if v.trim().is_empty() {
                return Err(DomainError::InvalidValue {
                    message: format!("{} cannot be empty if specified", label),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_entry_defaults_to_now() {
        let before = Utc::now();
        let entry = ConsumptionEntry::new(NewEntry::now(AddictionId::new())).unwrap();

        assert!(entry.entry_date >= before);
        assert_eq!(entry.created_at, entry.updated_at);
        assert!(!entry.has_notes());
    }

    #[test]
    fn test_create_entry_keeps_explicit_date() {
        let when = Utc::now() - Duration::days(3);
        let entry = ConsumptionEntry::new(NewEntry {
            entry_date: Some(when),
            notes: Some("after dinner".to_string()),
            ..NewEntry::now(AddictionId::new())
        })
        .unwrap();

        assert_eq!(entry.entry_date, when);
        assert!(entry.has_notes());
    }

    #[test]
    fn test_notes_too_long() {
        let result = ConsumptionEntry::new(NewEntry {
            notes: Some("n".repeat(501)),
            ..NewEntry::now(AddictionId::new())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_edit_leaves_timestamp() {
        let mut entry = ConsumptionEntry::new(NewEntry::now(AddictionId::new())).unwrap();
        let logged = entry.entry_date;

        entry
            .apply(EntryUpdate {
                notes: Some(Some("edited".to_string())),
                image_url: Some(Some("https://cdn.example/p.jpg".to_string())),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(entry.entry_date, logged);
        assert_eq!(entry.notes.as_deref(), Some("edited"));

        let blank = EntryUpdate {
            barcode_data: Some(Some(" ".to_string())),
            ..Default::default()
        };
        assert!(entry.apply(blank).is_err());
    }
}
