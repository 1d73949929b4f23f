/// Level-driven reminders
///
/// This module turns an addiction's level into a reminder interval and keeps
/// exactly one recurring reminder alive per addiction, either through the OS
/// notification service or an in-process timer.

pub mod backend;
pub mod interval;
pub mod platform;
pub mod scheduler;

pub use backend::*;
pub use interval::*;
pub use platform::*;
pub use scheduler::*;

use thiserror::Error;

/// Errors raised by notification collaborators
///
/// A denied permission is not an error; see `request_permissions`.
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Notification platform error: {0}")]
    Platform(String),
}
