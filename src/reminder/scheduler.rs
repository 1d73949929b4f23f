/// Reminder lifecycle: one recurring reminder per addiction
///
/// The scheduler owns no global state. The handle map and notification id
/// counter live in a `ReminderRegistry` passed in at construction, and the
/// platform, clock and both backends are injected collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{Addiction, AddictionId};
use crate::reminder::{
    interval_minutes, ActiveReminder, Clock, NotificationId, Platform, PlatformDetector, Reminder,
    ReminderBackend, ReminderError,
};

/// First id handed out for native notifications
pub const FIRST_NOTIFICATION_ID: NotificationId = 1000;

pub const REMINDER_TITLE: &str = "Continue Your Addiction";

pub fn reminder_body(name: &str) -> String {
    format!("Don't forget to continue your addiction: {}", name)
}

/// Read-only view of an active reminder handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleInfo {
    pub notification_id: NotificationId,
    pub platform: Platform,
    pub interval: Duration,
    /// An in-process timer is still ticking for it
    pub timer_running: bool,
}

/// Process-local reminder state
///
/// Ids are handed out monotonically and never reused while the process runs.
pub struct ReminderRegistry {
    state: Mutex<RegistryState>,
}

struct RegistryState {
    handles: HashMap<AddictionId, ActiveReminder>,
    next_id: NotificationId,
}

impl RegistryState {
    fn allocate_id(&mut self) -> NotificationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl ReminderRegistry {
    pub fn new() -> Self {
        Self::starting_at(FIRST_NOTIFICATION_ID)
    }

    pub fn starting_at(first_id: NotificationId) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                handles: HashMap::new(),
                next_id: first_id,
            }),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.state.lock().await.handles.len()
    }

    /// Snapshot of the active handle for an addiction
    pub async fn handle_for(&self, addiction_id: &AddictionId) -> Option<HandleInfo> {
        self.state.lock().await.handles.get(addiction_id).map(|h| HandleInfo {
            notification_id: h.notification_id,
            platform: h.platform,
            interval: h.interval,
            timer_running: h.has_running_timer(),
        })
    }

    pub async fn notification_id(&self, addiction_id: &AddictionId) -> Option<NotificationId> {
        self.handle_for(addiction_id).await.map(|h| h.notification_id)
    }

    pub async fn platform_of(&self, addiction_id: &AddictionId) -> Option<Platform> {
        self.handle_for(addiction_id).await.map(|h| h.platform)
    }

    async fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().await
    }
}

impl Default for ReminderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Schedules and cancels level-driven reminders
pub struct ReminderScheduler {
    registry: Arc<ReminderRegistry>,
    detector: Arc<dyn PlatformDetector>,
    native: Arc<dyn ReminderBackend>,
    fallback: Arc<dyn ReminderBackend>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(
        registry: Arc<ReminderRegistry>,
        detector: Arc<dyn PlatformDetector>,
        native: Arc<dyn ReminderBackend>,
        fallback: Arc<dyn ReminderBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            detector,
            native,
            fallback,
            clock,
        }
    }

    pub fn registry(&self) -> &ReminderRegistry {
        &self.registry
    }

    fn backend(&self, platform: Platform) -> &dyn ReminderBackend {
        match platform {
            Platform::Native => self.native.as_ref(),
            Platform::Web => self.fallback.as_ref(),
        }
    }

    /// Ask the active platform for permission to notify
    pub async fn request_permissions(&self) -> Result<bool, ReminderError> {
        let platform = self.detector.current();
        let granted = self.backend(platform).request_permissions().await?;
        tracing::debug!("Notification permission on {}: {}", platform.as_str(), granted);
        Ok(granted)
    }

    /// Replace the addiction's reminder with one matching its current level
    ///
    /// Addictions without an id or name are ignored.
    pub async fn schedule_reminder(&self, addiction: &Addiction) -> Result<(), ReminderError> {
        if !addiction.is_schedulable() {
            tracing::debug!("Skipping reminder for addiction without id or name");
            return Ok(());
        }

        let mut state = self.registry.lock().await;

        // Tear down the old reminder before registering the new one
        if let Some(previous) = state.handles.get(&addiction.id) {
            self.backend(previous.platform).stop(previous).await?;
            state.handles.remove(&addiction.id);
        }

        let minutes = interval_minutes(addiction.level.value() as i64);
        let reminder = Reminder {
            addiction_id: addiction.id,
            notification_id: state.allocate_id(),
            title: REMINDER_TITLE.to_string(),
            body: reminder_body(&addiction.name),
            interval: Duration::from_secs(u64::from(minutes) * 60),
            first_fire_at: self.clock.now() + chrono::Duration::minutes(i64::from(minutes)),
        };

        let backend = self.backend(self.detector.current());
        let active = backend.start(&reminder).await?;
        state.handles.insert(addiction.id, active);

        tracing::info!(
            "Scheduled {} reminder #{} for '{}' every {} min",
            backend.platform().as_str(),
            reminder.notification_id,
            addiction.name,
            minutes
        );
        Ok(())
    }

    /// Stop the addiction's reminder; does nothing if there is none
    pub async fn cancel_reminder(&self, addiction_id: &AddictionId) -> Result<(), ReminderError> {
        let mut state = self.registry.lock().await;

        let Some(active) = state.handles.get(addiction_id) else {
            return Ok(());
        };
        self.backend(active.platform).stop(active).await?;
        state.handles.remove(addiction_id);

        tracing::debug!("Cancelled reminder for addiction {}", addiction_id);
        Ok(())
    }

    /// Stop every reminder (used on sign-out)
    ///
    /// The registry is empty afterwards even if a backend fails to cancel one
    /// of them; the first failure is returned.
    pub async fn cancel_all(&self) -> Result<(), ReminderError> {
        let mut state = self.registry.lock().await;
        let handles: Vec<ActiveReminder> = state.handles.drain().map(|(_, h)| h).collect();
        drop(state);

        let count = handles.len();
        let results = join_all(
            handles
                .iter()
                .map(|active| self.backend(active.platform).stop(active)),
        )
        .await;

        tracing::info!("Cancelled {} reminder(s)", count);
        results.into_iter().collect::<Result<Vec<_>, _>>().map(|_| ())
    }
}
