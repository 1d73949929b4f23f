/// Addiction service
///
/// CRUD over addictions with the reminder kept in step: a new addiction gets
/// a reminder, renaming or changing the level replaces it and deleting an
/// addiction cancels it before the row goes away.

use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::domain::{Addiction, AddictionId, AddictionUpdate, NewAddiction};
use crate::reminder::ReminderScheduler;
use crate::services::{require_user, StorageHandle, TrackerError};

#[derive(Clone)]
pub struct AddictionService {
    storage: StorageHandle,
    auth: Arc<dyn AuthProvider>,
    reminders: Arc<ReminderScheduler>,
}

impl AddictionService {
    pub fn new(
        storage: StorageHandle,
        auth: Arc<dyn AuthProvider>,
        reminders: Arc<ReminderScheduler>,
    ) -> Self {
        Self {
            storage,
            auth,
            reminders,
        }
    }

    /// All addictions of the signed-in user, newest first
    pub async fn list(&self) -> Result<Vec<Addiction>, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.list_addictions(&user_id))?)
    }

    pub async fn get(&self, addiction_id: &AddictionId) -> Result<Addiction, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.get_addiction(&user_id, addiction_id))?)
    }

    /// Create an addiction and start its reminder
    pub async fn create(&self, input: NewAddiction) -> Result<Addiction, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        let addiction = Addiction::new(input)?;

        self.storage.with(|s| s.create_addiction(&user_id, &addiction))?;
        tracing::info!("Created addiction '{}' at level {}", addiction.name, addiction.level);

        self.reminders.schedule_reminder(&addiction).await?;
        Ok(addiction)
    }

    /// Apply a partial update
    ///
    /// The reminder is only replaced when the name or level actually changed.
    pub async fn update(
        &self,
        addiction_id: &AddictionId,
        update: AddictionUpdate,
    ) -> Result<Addiction, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        if update.is_empty() {
            return Err(TrackerError::InvalidInput(
                "At least one field must be provided for update".to_string(),
            ));
        }

        let mut addiction = self.storage.with(|s| s.get_addiction(&user_id, addiction_id))?;
        let (old_name, old_level) = (addiction.name.clone(), addiction.level);
        let may_reschedule = update.touches_reminder();

        addiction.apply(update)?;
        self.storage.with(|s| s.update_addiction(&user_id, &addiction))?;

        if may_reschedule && (addiction.name != old_name || addiction.level != old_level) {
            self.reminders.schedule_reminder(&addiction).await?;
        }
        Ok(addiction)
    }

    /// Delete an addiction with its entries and streak
    pub async fn delete(&self, addiction_id: &AddictionId) -> Result<(), TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;

        // Make sure it exists and belongs to the user before touching reminders
        let addiction = self.storage.with(|s| s.get_addiction(&user_id, addiction_id))?;

        self.reminders.cancel_reminder(addiction_id).await?;
        self.storage.with(|s| s.delete_addiction(&user_id, addiction_id))?;

        tracing::info!("Deleted addiction '{}'", addiction.name);
        Ok(())
    }

    /// Schedule a reminder for every addiction of the signed-in user
    ///
    /// Returns how many reminders were scheduled.
    pub async fn rehydrate_reminders(&self) -> Result<usize, TrackerError> {
        let addictions = self.list().await?;
        for addiction in &addictions {
            self.reminders.schedule_reminder(addiction).await?;
        }

        tracing::info!("Rehydrated {} reminder(s)", addictions.len());
        Ok(addictions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalSession;
    use crate::domain::UserId;
    use crate::reminder::{
        LogNotifier, NativeBackend, Platform, ReminderRegistry, StaticPlatform, SystemClock,
        TimerBackend, FIRST_NOTIFICATION_ID,
    };
    use crate::storage::{SqliteStorage, StorageError};

    fn service(auth: Arc<LocalSession>) -> AddictionService {
        let notifier = Arc::new(LogNotifier::new());
        let reminders = ReminderScheduler::new(
            Arc::new(ReminderRegistry::new()),
            Arc::new(StaticPlatform(Platform::Native)),
            Arc::new(NativeBackend::new(notifier.clone())),
            Arc::new(TimerBackend::new(notifier)),
            Arc::new(SystemClock),
        );
        AddictionService::new(
            StorageHandle::new(SqliteStorage::in_memory().unwrap()),
            auth,
            Arc::new(reminders),
        )
    }

    fn coffee() -> NewAddiction {
        NewAddiction {
            name: "Coffee".to_string(),
            level: Some(3),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_schedules_reminder() {
        let service = service(Arc::new(LocalSession::signed_in(UserId::new())));

        let created = service.create(coffee()).await.unwrap();
        let listed: Vec<AddictionId> = service.list().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(listed, vec![created.id]);
        assert_eq!(
            service.reminders.registry().notification_id(&created.id).await,
            Some(FIRST_NOTIFICATION_ID)
        );
    }

    #[tokio::test]
    async fn test_update_reschedules_only_on_level_or_name_change() {
        let service = service(Arc::new(LocalSession::signed_in(UserId::new())));
        let created = service.create(coffee()).await.unwrap();
        let registry = service.reminders.registry();

        service
            .update(
                &created.id,
                AddictionUpdate {
                    description: Some(Some("morning cup".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(registry.notification_id(&created.id).await, Some(FIRST_NOTIFICATION_ID));

        // Same level again is not a change
        service
            .update(&created.id, AddictionUpdate { level: Some(3), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(registry.notification_id(&created.id).await, Some(FIRST_NOTIFICATION_ID));

        let updated = service
            .update(&created.id, AddictionUpdate { level: Some(8), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.level.value(), 8);
        assert_eq!(registry.notification_id(&created.id).await, Some(FIRST_NOTIFICATION_ID + 1));
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let service = service(Arc::new(LocalSession::signed_in(UserId::new())));
        let created = service.create(coffee()).await.unwrap();

        assert!(matches!(
            service.update(&created.id, AddictionUpdate::default()).await,
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cancels_reminder_first() {
        let service = service(Arc::new(LocalSession::signed_in(UserId::new())));
        let created = service.create(coffee()).await.unwrap();

        service.delete(&created.id).await.unwrap();

        assert_eq!(service.reminders.registry().active_count().await, 0);
        assert!(matches!(
            service.get(&created.id).await,
            Err(TrackerError::Persistence(StorageError::AddictionNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_signed_out_user_is_rejected_before_storage() {
        let service = service(Arc::new(LocalSession::signed_out()));

        assert!(matches!(
            service.create(coffee()).await,
            Err(TrackerError::AuthenticationRequired)
        ));
        assert!(matches!(service.list().await, Err(TrackerError::AuthenticationRequired)));
    }

    #[tokio::test]
    async fn test_invalid_name_is_rejected() {
        let service = service(Arc::new(LocalSession::signed_in(UserId::new())));

        let result = service
            .create(NewAddiction {
                name: "   ".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(TrackerError::Domain(_))));
        assert!(service.list().await.unwrap().is_empty());
    }
}
