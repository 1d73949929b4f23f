/// Authentication collaborator
///
/// Services only need to know who the current principal is. Sign-in and
/// sign-out here just start and end a local session; credential checks live
/// outside this crate.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::UserId;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
}

/// Exposes the current authenticated principal, if any
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;

    fn session(&self) -> Option<Session>;
}

/// In-process session holder
#[derive(Debug, Default)]
pub struct LocalSession {
    session: RwLock<Option<Session>>,
}

impl LocalSession {
    /// Create a session holder with nobody signed in
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Create a session holder with `user_id` already signed in
    pub fn signed_in(user_id: UserId) -> Self {
        let holder = Self::default();
        holder.sign_in(user_id);
        holder
    }

    /// Start a session, replacing any previous one
    pub fn sign_in(&self, user_id: UserId) -> Session {
        let session = Session {
            user_id,
            started_at: Utc::now(),
        };
        *self.write() = Some(session.clone());
        tracing::info!("Signed in as {}", user_id);
        session
    }

    /// End the current session; returns the user that was signed in
    pub fn sign_out(&self) -> Option<UserId> {
        let previous = self.write().take().map(|s| s.user_id);
        if let Some(user_id) = previous {
            tracing::info!("Signed out {}", user_id);
        }
        previous
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        // A poisoned lock still holds a valid Option
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl AuthProvider for LocalSession {
    fn current_user(&self) -> Option<UserId> {
        self.session().map(|s| s.user_id)
    }

    fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
