/// Application services
///
/// Services resolve the signed-in user, validate input, talk to storage and
/// keep derived state (streaks, reminders) in step with every write.

pub mod addictions;
pub mod entries;
pub mod photos;
pub mod session;
pub mod streaks;

pub use addictions::AddictionService;
pub use entries::EntryService;
pub use photos::PhotoMirror;
pub use session::SessionService;
pub use streaks::StreakService;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::auth::AuthProvider;
use crate::domain::{DomainError, UserId};
use crate::reminder::ReminderError;
use crate::storage::{StorageError, TrackerStorage};

/// Errors surfaced by service operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Reminder error: {0}")]
    Reminder(#[from] ReminderError),
}

/// Shared handle to the row store
///
/// SQLite connections are not `Sync`, so access goes through a mutex that is
/// only ever held for the duration of one synchronous storage call.
#[derive(Clone)]
pub struct StorageHandle {
    inner: Arc<Mutex<Box<dyn TrackerStorage + Send>>>,
}

impl StorageHandle {
    pub fn new<S>(storage: S) -> Self
    where
        S: TrackerStorage + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(storage))),
        }
    }

    /// Run one storage call
    pub fn with<R>(&self, f: impl FnOnce(&dyn TrackerStorage) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&**guard)
    }
}

/// Resolve the signed-in user or fail before touching storage
pub(crate) fn require_user(auth: &dyn AuthProvider) -> Result<UserId, TrackerError> {
    auth.current_user().ok_or(TrackerError::AuthenticationRequired)
}
