/// Level-to-interval mapping and reminder scheduler behavior with fake
/// notification collaborators
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use addiction_tracker::reminder::{
    format_interval, interval_minutes, HostNotifier, NativeNotifier, NotificationId,
    PermissionState, PlatformDetector, ScheduledNotification,
};
use addiction_tracker::*;
use async_trait::async_trait;

/// Platform that can be switched while the scheduler is alive
struct SwitchablePlatform(Mutex<Platform>);

impl SwitchablePlatform {
    fn set(&self, platform: Platform) {
        *self.0.lock().unwrap() = platform;
    }
}

impl PlatformDetector for SwitchablePlatform {
    fn current(&self) -> Platform {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct FakeNative {
    scheduled: Mutex<Vec<NotificationId>>,
    cancelled: Mutex<Vec<NotificationId>>,
}

#[async_trait]
impl NativeNotifier for FakeNative {
    async fn check_permissions(&self) -> Result<PermissionState, ReminderError> {
        Ok(PermissionState::Granted)
    }

    async fn request_permissions(&self) -> Result<PermissionState, ReminderError> {
        Ok(PermissionState::Granted)
    }

    async fn schedule(&self, notifications: Vec<ScheduledNotification>) -> Result<(), ReminderError> {
        self.scheduled
            .lock()
            .unwrap()
            .extend(notifications.iter().map(|n| n.id));
        Ok(())
    }

    async fn cancel(&self, ids: &[NotificationId]) -> Result<(), ReminderError> {
        self.cancelled.lock().unwrap().extend_from_slice(ids);
        Ok(())
    }
}

#[derive(Default)]
struct FakeHost {
    shown: AtomicUsize,
}

#[async_trait]
impl HostNotifier for FakeHost {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn request_permission(&self) -> Result<PermissionState, ReminderError> {
        Ok(PermissionState::Granted)
    }

    fn show(&self, _title: &str, _body: &str) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    scheduler: ReminderScheduler,
    platform: Arc<SwitchablePlatform>,
    native: Arc<FakeNative>,
    host: Arc<FakeHost>,
}

fn harness(initial: Platform) -> Harness {
    let platform = Arc::new(SwitchablePlatform(Mutex::new(initial)));
    let native = Arc::new(FakeNative::default());
    let host = Arc::new(FakeHost::default());

    let scheduler = ReminderScheduler::new(
        Arc::new(ReminderRegistry::new()),
        platform.clone(),
        Arc::new(NativeBackend::new(native.clone())),
        Arc::new(TimerBackend::new(host.clone())),
        Arc::new(SystemClock),
    );

    Harness {
        scheduler,
        platform,
        native,
        host,
    }
}

fn addiction(name: &str, level: i64) -> Addiction {
    Addiction::new(NewAddiction {
        name: name.to_string(),
        level: Some(level),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_handle_is_stopped_by_the_backend_that_created_it() {
    let h = harness(Platform::Web);
    let coffee = addiction("Coffee", 10);

    h.scheduler.schedule_reminder(&coffee).await.unwrap();

    // Switching platforms must not orphan the running timer
    h.platform.set(Platform::Native);
    h.scheduler.schedule_reminder(&coffee).await.unwrap();

    tokio::time::sleep(Duration::from_secs(5 * 60 * 3)).await;
    assert_eq!(h.host.shown.load(Ordering::SeqCst), 0);
    assert_eq!(h.native.scheduled.lock().unwrap().len(), 1);
    assert_eq!(
        h.scheduler.registry().platform_of(&coffee.id).await,
        Some(Platform::Native)
    );
}

#[tokio::test(start_paused = true)]
async fn test_level_change_changes_timer_period() {
    let h = harness(Platform::Web);
    let mut sugar = addiction("Sugar", 1);
    h.scheduler.schedule_reminder(&sugar).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30 * 60)).await;
    assert_eq!(h.host.shown.load(Ordering::SeqCst), 0);

    sugar.level = Level::clamped(10);
    h.scheduler.schedule_reminder(&sugar).await.unwrap();

    tokio::time::sleep(Duration::from_secs(31 * 60)).await;
    assert_eq!(h.host.shown.load(Ordering::SeqCst), 6);
    assert_eq!(h.scheduler.registry().active_count().await, 1);
}

#[tokio::test]
async fn test_cancel_all_then_cancel_one_is_noop() {
    let h = harness(Platform::Native);
    let a = addiction("Coffee", 3);
    let b = addiction("Sugar", 7);

    h.scheduler.schedule_reminder(&a).await.unwrap();
    h.scheduler.schedule_reminder(&b).await.unwrap();
    tokio_test::assert_ok!(h.scheduler.cancel_all().await);
    tokio_test::assert_ok!(h.scheduler.cancel_reminder(&a.id).await);

    assert_eq!(h.scheduler.registry().active_count().await, 0);
    let mut cancelled = h.native.cancelled.lock().unwrap().clone();
    cancelled.sort();
    assert_eq!(cancelled, vec![1000, 1001]);
}

#[test]
fn test_interval_table() {
    let expected = [60, 54, 48, 42, 36, 29, 23, 17, 11, 5];
    for (level, minutes) in (1..=10).zip(expected) {
        assert_eq!(interval_minutes(level), minutes, "level {}", level);
    }

    assert_eq!(interval_minutes(0), interval_minutes(1));
    assert_eq!(interval_minutes(-4), 60);
    assert_eq!(interval_minutes(11), interval_minutes(10));
    assert_eq!(interval_minutes(250), 5);
}

#[test]
fn test_interval_formatting() {
    assert_eq!(format_interval(60), "1 hour");
    assert_eq!(format_interval(90), "1h 30m");
    assert_eq!(format_interval(45), "45 minutes");
}

#[test]
fn test_level_is_clamped() {
    assert_eq!(Level::clamped(0).value(), 1);
    assert_eq!(Level::clamped(42).value(), 10);
    assert_eq!(Level::default().value(), 1);
}
