/// Sign-in and sign-out
///
/// Reminders only run while someone is signed in. Signing in schedules them
/// for every addiction of the user; signing out stops them all.

use std::sync::Arc;

use crate::auth::{LocalSession, Session};
use crate::domain::UserId;
use crate::reminder::ReminderScheduler;
use crate::services::{AddictionService, TrackerError};

#[derive(Clone)]
pub struct SessionService {
    session: Arc<LocalSession>,
    addictions: AddictionService,
    reminders: Arc<ReminderScheduler>,
}

impl SessionService {
    pub fn new(
        session: Arc<LocalSession>,
        addictions: AddictionService,
        reminders: Arc<ReminderScheduler>,
    ) -> Self {
        Self {
            session,
            addictions,
            reminders,
        }
    }

    /// Start a session for `user_id` and bring its reminders back
    ///
    /// Reminders of a previous user are stopped first.
    pub async fn sign_in(&self, user_id: UserId) -> Result<Session, TrackerError> {
        self.reminders.cancel_all().await?;

        let session = self.session.sign_in(user_id);
        let permitted = self.reminders.request_permissions().await?;
        if !permitted {
            tracing::warn!("Notification permission not granted; reminders may stay silent");
        }

        self.addictions.rehydrate_reminders().await?;
        Ok(session)
    }

    /// Stop every reminder, then end the session
    pub async fn sign_out(&self) -> Result<Option<UserId>, TrackerError> {
        self.reminders.cancel_all().await?;
        Ok(self.session.sign_out())
    }
}
