/// Platform collaborators consumed by the reminder scheduler
///
/// The scheduler never talks to an OS or browser API directly. It goes
/// through these traits, which lets the binary route notifications to the
/// log and lets tests substitute recording fakes and fixed clocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::ReminderError;

/// Identifier of a scheduled notification on the native service
pub type NotificationId = i32;

/// Host platform the app is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// OS-level scheduled notifications are available
    Native,
    /// Browser-like host: in-process timers raise notifications
    Web,
}

impl Platform {
    /// Best guess for the platform this binary was built for
    pub fn host() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            Platform::Native
        } else {
            Platform::Web
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Native => "native",
            Platform::Web => "web",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Platform::Native),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform '{}', expected 'native' or 'web'", other)),
        }
    }
}

/// Answers which platform is active; consulted on every scheduler call
pub trait PlatformDetector: Send + Sync {
    fn current(&self) -> Platform;
}

/// Detector that always reports the same platform
#[derive(Debug, Clone, Copy)]
pub struct StaticPlatform(pub Platform);

impl PlatformDetector for StaticPlatform {
    fn current(&self) -> Platform {
        self.0
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of a permission check or prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet; asking may still grant it
    Prompt,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }
}

/// A repeating notification handed to the native service
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub first_fire_at: DateTime<Utc>,
    pub repeat_every_seconds: u64,
    pub sound: Option<String>,
}

/// OS-level notification service
#[async_trait]
pub trait NativeNotifier: Send + Sync {
    async fn check_permissions(&self) -> Result<PermissionState, ReminderError>;

    async fn request_permissions(&self) -> Result<PermissionState, ReminderError>;

    async fn schedule(&self, notifications: Vec<ScheduledNotification>) -> Result<(), ReminderError>;

    async fn cancel(&self, ids: &[NotificationId]) -> Result<(), ReminderError>;
}

/// Whatever local notification capability a non-native host exposes
#[async_trait]
pub trait HostNotifier: Send + Sync {
    /// False when the host has no notification API at all
    fn is_supported(&self) -> bool;

    fn permission(&self) -> PermissionState;

    async fn request_permission(&self) -> Result<PermissionState, ReminderError>;

    /// Raise a user-visible notification right now
    fn show(&self, title: &str, body: &str);
}

/// Notifier that writes every notification to the tracing log
///
/// Serves both roles for the stdio server, where there is no device to ring.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    permission: PermissionState,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            permission: PermissionState::Granted,
        }
    }

    pub fn with_permission(permission: PermissionState) -> Self {
        Self { permission }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NativeNotifier for LogNotifier {
    async fn check_permissions(&self) -> Result<PermissionState, ReminderError> {
        Ok(self.permission)
    }

    async fn request_permissions(&self) -> Result<PermissionState, ReminderError> {
        Ok(self.permission)
    }

    async fn schedule(&self, notifications: Vec<ScheduledNotification>) -> Result<(), ReminderError> {
        for n in notifications {
            tracing::info!(
                "Scheduled notification #{} \"{}\" first at {} then every {}s",
                n.id,
                n.body,
                n.first_fire_at.to_rfc3339(),
                n.repeat_every_seconds
            );
        }
        Ok(())
    }

    async fn cancel(&self, ids: &[NotificationId]) -> Result<(), ReminderError> {
        tracing::info!("Cancelled notifications {:?}", ids);
        Ok(())
    }
}

#[async_trait]
impl HostNotifier for LogNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionState {
        self.permission
    }

    async fn request_permission(&self) -> Result<PermissionState, ReminderError> {
        Ok(self.permission)
    }

    /// Emitted at warn, the level the binary logs by default
    fn show(&self, title: &str, body: &str) {
        tracing::warn!("{}: {}", title, body);
    }
}
