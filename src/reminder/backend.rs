/// The two ways a recurring reminder can be kept alive
///
/// `NativeBackend` hands the whole schedule to the OS notification service.
/// `TimerBackend` runs an in-process repeating timer and raises a host
/// notification on each tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::AddictionId;
use crate::reminder::{
    HostNotifier, NativeNotifier, NotificationId, Platform, ReminderError, ScheduledNotification,
};

/// Everything a backend needs to register one recurring reminder
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub addiction_id: AddictionId,
    pub notification_id: NotificationId,
    pub title: String,
    pub body: String,
    pub interval: Duration,
    pub first_fire_at: DateTime<Utc>,
}

/// A reminder that is currently registered with a backend
#[derive(Debug)]
pub struct ActiveReminder {
    pub notification_id: NotificationId,
    /// Backend that created it; cancellation must go back to the same one
    pub platform: Platform,
    pub interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl ActiveReminder {
    pub fn native(notification_id: NotificationId, interval: Duration) -> Self {
        Self {
            notification_id,
            platform: Platform::Native,
            interval,
            timer: None,
        }
    }

    pub fn timer(notification_id: NotificationId, interval: Duration, task: JoinHandle<()>) -> Self {
        Self {
            notification_id,
            platform: Platform::Web,
            interval,
            timer: Some(task),
        }
    }

    /// Whether an in-process timer is still ticking for this reminder
    pub fn has_running_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

// A handle that goes away without `stop` must not leave its timer ticking
impl Drop for ActiveReminder {
    fn drop(&mut self) {
        if let Some(task) = self.timer.take() {
            task.abort();
        }
    }
}

/// A way of keeping a recurring reminder alive
#[async_trait]
pub trait ReminderBackend: Send + Sync {
    fn platform(&self) -> Platform;

    /// Ask for permission to notify; denial is `Ok(false)`
    async fn request_permissions(&self) -> Result<bool, ReminderError>;

    async fn start(&self, reminder: &Reminder) -> Result<ActiveReminder, ReminderError>;

    async fn stop(&self, active: &ActiveReminder) -> Result<(), ReminderError>;
}

/// Delegates scheduling to the OS notification service
pub struct NativeBackend {
    notifier: Arc<dyn NativeNotifier>,
}

impl NativeBackend {
    pub fn new(notifier: Arc<dyn NativeNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ReminderBackend for NativeBackend {
    fn platform(&self) -> Platform {
        Platform::Native
    }

    async fn request_permissions(&self) -> Result<bool, ReminderError> {
        if self.notifier.check_permissions().await?.is_granted() {
            return Ok(true);
        }
        Ok(self.notifier.request_permissions().await?.is_granted())
    }

    async fn start(&self, reminder: &Reminder) -> Result<ActiveReminder, ReminderError> {
        self.notifier
            .schedule(vec![ScheduledNotification {
                id: reminder.notification_id,
                title: reminder.title.clone(),
                body: reminder.body.clone(),
                first_fire_at: reminder.first_fire_at,
                repeat_every_seconds: reminder.interval.as_secs(),
                sound: Some("default".to_string()),
            }])
            .await?;

        Ok(ActiveReminder::native(reminder.notification_id, reminder.interval))
    }

    async fn stop(&self, active: &ActiveReminder) -> Result<(), ReminderError> {
        self.notifier.cancel(&[active.notification_id]).await
    }
}

/// Keeps an in-process repeating timer per reminder
pub struct TimerBackend {
    notifier: Arc<dyn HostNotifier>,
}

impl TimerBackend {
    pub fn new(notifier: Arc<dyn HostNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ReminderBackend for TimerBackend {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    async fn request_permissions(&self) -> Result<bool, ReminderError> {
        if !self.notifier.is_supported() {
            return Ok(false);
        }
        Ok(self.notifier.request_permission().await?.is_granted())
    }

    async fn start(&self, reminder: &Reminder) -> Result<ActiveReminder, ReminderError> {
        if reminder.interval.is_zero() {
            return Err(ReminderError::Platform("reminder interval must be positive".to_string()));
        }

        let notifier = Arc::clone(&self.notifier);
        let period = reminder.interval;
        let title = reminder.title.clone();
        let body = reminder.body.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // Unsupported or unpermitted hosts get nothing, silently
                if notifier.is_supported() && notifier.permission().is_granted() {
                    notifier.show(&title, &body);
                }
            }
        });

        tracing::debug!(
            "Started reminder timer #{} every {:?}",
            reminder.notification_id,
            period
        );
        Ok(ActiveReminder::timer(reminder.notification_id, period, task))
    }

    async fn stop(&self, active: &ActiveReminder) -> Result<(), ReminderError> {
        if let Some(task) = &active.timer {
            task.abort();
        }
        Ok(())
    }
}
