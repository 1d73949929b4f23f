/// Consumption entry service
///
/// Every write that changes an addiction's history is followed by a full
/// streak recomputation for that addiction before the call returns.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::domain::{AddictionId, ConsumptionEntry, EntryId, EntryUpdate, NewEntry};
use crate::services::{require_user, PhotoMirror, StorageHandle, StreakService, TrackerError};

#[derive(Clone)]
pub struct EntryService {
    storage: StorageHandle,
    auth: Arc<dyn AuthProvider>,
    streaks: StreakService,
    photos: Option<PhotoMirror>,
}

impl EntryService {
    pub fn new(
        storage: StorageHandle,
        auth: Arc<dyn AuthProvider>,
        streaks: StreakService,
        photos: Option<PhotoMirror>,
    ) -> Self {
        Self {
            storage,
            auth,
            streaks,
            photos,
        }
    }

    /// Entries of the signed-in user, newest entry_date first
    pub async fn list(&self, addiction_id: Option<&AddictionId>) -> Result<Vec<ConsumptionEntry>, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.list_entries(&user_id, addiction_id))?)
    }

    pub async fn get(&self, entry_id: &EntryId) -> Result<ConsumptionEntry, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.get_entry(&user_id, entry_id))?)
    }

    /// Log an entry and refresh the addiction's streak
    ///
    /// When `photo` is given and a mirror is configured, the entry's image
    /// points at the local copy, which is written in the background.
    pub async fn create(
        &self,
        input: NewEntry,
        photo: Option<PathBuf>,
    ) -> Result<ConsumptionEntry, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        let mut entry = ConsumptionEntry::new(input)?;

        // The addiction must exist and belong to this user
        self.storage.with(|s| s.get_addiction(&user_id, &entry.addiction_id))?;

        let pending_copy = match (&self.photos, photo) {
            (Some(mirror), Some(source)) => {
                let destination = mirror.destination(&source, &user_id, &entry.addiction_id, &entry.id);
                if entry.image_url.is_none() {
                    entry.image_url = Some(destination.to_string_lossy().into_owned());
                }
                Some((mirror, source, destination))
            }
            (None, Some(source)) => {
                tracing::warn!("No photo directory configured, not keeping {}", source.display());
                None
            }
            _ => None,
        };

        self.storage.with(|s| s.create_entry(&user_id, &entry))?;
        tracing::info!("Logged entry {} for addiction {}", entry.id, entry.addiction_id);

        self.streaks.calculate_streak(&entry.addiction_id).await?;

        if let Some((mirror, source, destination)) = pending_copy {
            // Not awaited; the copy never affects the saved entry
            mirror.mirror(source, destination);
        }
        Ok(entry)
    }

    /// Edit notes, image or barcode of an entry
    pub async fn update(&self, entry_id: &EntryId, update: EntryUpdate) -> Result<ConsumptionEntry, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;

        let mut entry = self.storage.with(|s| s.get_entry(&user_id, entry_id))?;
        entry.apply(update)?;
        self.storage.with(|s| s.update_entry(&user_id, &entry))?;

        Ok(entry)
    }

    /// Delete an entry and refresh the addiction's streak
    pub async fn delete(&self, entry_id: &EntryId) -> Result<(), TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;

        let entry = self.storage.with(|s| s.get_entry(&user_id, entry_id))?;
        self.storage.with(|s| s.delete_entry(&user_id, entry_id))?;
        tracing::info!("Deleted entry {}", entry_id);

        self.streaks.calculate_streak(&entry.addiction_id).await?;
        Ok(())
    }
}
