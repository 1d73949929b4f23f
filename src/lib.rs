/// Public library interface for the Addiction Tracker MCP server
///
/// This module exports the server and the building blocks it is made of, so
/// other applications and tests can wire their own collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod auth;
pub mod config;
pub mod domain;
pub mod mcp;
pub mod reminder;
pub mod services;
pub mod storage;
pub mod tools;

pub use auth::{AuthProvider, LocalSession, Session};
pub use config::{AppConfig, ConfigOverrides};
pub use domain::*;
pub use reminder::{
    interval_minutes, Clock, LogNotifier, NativeBackend, Platform, ReminderError, ReminderRegistry,
    ReminderScheduler, StaticPlatform, SystemClock, TimerBackend,
};
pub use services::{
    AddictionService, EntryService, PhotoMirror, SessionService, StorageHandle, StreakService,
    TrackerError,
};
pub use storage::{SqliteStorage, StorageError, TrackerStorage};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tracker error: {0}")]
    Tracker(#[from] services::TrackerError),
}

/// Collaborators the server is assembled from
pub struct ServerParts<S> {
    pub storage: S,
    pub session: Arc<LocalSession>,
    pub reminders: Arc<ReminderScheduler>,
    pub engine: StreakEngine,
    pub clock: Arc<dyn Clock>,
    pub photos: Option<PhotoMirror>,
    /// Who `session_sign_in` signs in when no user is named
    pub default_user: UserId,
}

/// Main addiction tracker server that implements the MCP protocol
///
/// Holds the services that every tool goes through. The server owns no
/// global state; reminder handles live in the injected registry.
pub struct AddictionTrackerServer {
    addictions: AddictionService,
    entries: EntryService,
    streaks: StreakService,
    sessions: SessionService,
    reminders: Arc<ReminderScheduler>,
    default_user: UserId,
}

impl AddictionTrackerServer {
    /// Create a server from resolved configuration
    ///
    /// Opens (and migrates) the database, then signs in the configured user,
    /// which brings back reminders for all of their addictions.
    pub async fn new(config: AppConfig) -> Result<Self, ServerError> {
        tracing::info!(
            "Initializing Addiction Tracker server with database: {:?}",
            config.database_path
        );

        let storage = SqliteStorage::new(config.database_path.clone())?;
        let notifier = Arc::new(LogNotifier::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let reminders = Arc::new(ReminderScheduler::new(
            Arc::new(ReminderRegistry::new()),
            Arc::new(StaticPlatform(config.platform)),
            Arc::new(NativeBackend::new(notifier.clone())),
            Arc::new(TimerBackend::new(notifier)),
            clock.clone(),
        ));

        let server = Self::from_parts(ServerParts {
            storage,
            session: Arc::new(LocalSession::signed_out()),
            reminders,
            engine: config.streak_engine(),
            clock,
            photos: Some(PhotoMirror::new(config.photo_dir.clone())),
            default_user: config.user_id,
        });

        server.sessions.sign_in(config.user_id).await?;
        Ok(server)
    }

    /// Convenience constructor with defaults for everything but the database
    pub async fn with_database(db_path: PathBuf, user_id: UserId) -> Result<Self, ServerError> {
        let photo_dir = db_path
            .parent()
            .map(|p| p.join("photos"))
            .unwrap_or_else(|| PathBuf::from("photos"));

        Self::new(AppConfig {
            database_path: db_path,
            user_id,
            platform: Platform::Web,
            photo_dir,
            utc_offset_minutes: 0,
        })
        .await
    }

    /// Assemble a server from explicit collaborators
    pub fn from_parts<S>(parts: ServerParts<S>) -> Self
    where
        S: TrackerStorage + Send + 'static,
    {
        let storage = StorageHandle::new(parts.storage);
        let auth: Arc<dyn AuthProvider> = parts.session.clone();

        let streaks = StreakService::new(storage.clone(), auth.clone(), parts.engine, parts.clock);
        let addictions = AddictionService::new(storage.clone(), auth.clone(), parts.reminders.clone());
        let entries = EntryService::new(storage, auth, streaks.clone(), parts.photos);
        let sessions = SessionService::new(parts.session, addictions.clone(), parts.reminders.clone());

        Self {
            addictions,
            entries,
            streaks,
            sessions,
            reminders: parts.reminders,
            default_user: parts.default_user,
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method returns once stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let count = self.addictions.list().await.map(|a| a.len()).unwrap_or(0);
        tracing::info!("Server started successfully, tracking {} addiction(s)", count);

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn addictions(&self) -> &AddictionService {
        &self.addictions
    }

    pub fn entries(&self) -> &EntryService {
        &self.entries
    }

    pub fn streaks(&self) -> &StreakService {
        &self.streaks
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn default_user(&self) -> UserId {
        self.default_user
    }
}
