/// Runtime configuration
///
/// Resolves where the database and photos live, which local user the server
/// acts as and how days and reminders are handled on this host.

use std::io;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;

use crate::domain::{StreakEngine, UserId};
use crate::reminder::Platform;

const APP_DIR: &str = "addiction_tracker";
const DATABASE_FILE: &str = "addictions.db";
const USER_ID_FILE: &str = "user_id";
const PHOTO_DIR: &str = "photos";

/// Fully resolved settings for one server run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub user_id: UserId,
    pub platform: Platform,
    pub photo_dir: PathBuf,
    pub utc_offset_minutes: i32,
}

/// Settings as given on the command line; anything missing gets a default
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database: Option<PathBuf>,
    pub user: Option<String>,
    pub platform: Option<Platform>,
    pub photo_dir: Option<PathBuf>,
    pub utc_offset_minutes: Option<i32>,
}

impl AppConfig {
    pub fn resolve(overrides: ConfigOverrides) -> io::Result<Self> {
        let database_path = match overrides.database {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                path
            }
            None => default_database_path()?,
        };

        let data_dir = database_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let user_id = match overrides.user {
            Some(raw) => UserId::from_string(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid user id: {}", e)))?,
            None => load_or_create_user_id(&data_dir)?,
        };

        let utc_offset_minutes = overrides.utc_offset_minutes.unwrap_or(0);
        // Validate early so the engine can be built without failing later
        day_boundary(utc_offset_minutes)?;

        Ok(Self {
            database_path,
            user_id,
            platform: overrides.platform.unwrap_or_else(Platform::host),
            photo_dir: overrides.photo_dir.unwrap_or_else(|| data_dir.join(PHOTO_DIR)),
            utc_offset_minutes,
        })
    }

    /// Streak engine using the configured day boundary
    pub fn streak_engine(&self) -> StreakEngine {
        day_boundary(self.utc_offset_minutes)
            .map(StreakEngine::with_offset)
            .unwrap_or_default()
    }
}

fn day_boundary(offset_minutes: i32) -> io::Result<FixedOffset> {
    offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("UTC offset out of range: {} minutes", offset_minutes),
            )
        })
}

/// Get the default database path with robust fallback strategy
pub fn default_database_path() -> io::Result<PathBuf> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(format!(".{}", APP_DIR))),
        dirs::data_dir().map(|p| p.join(APP_DIR)),
        dirs::config_dir().map(|p| p.join(APP_DIR)),
        std::env::current_dir().ok().map(|p| p.join(format!(".{}", APP_DIR))),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if is_writable_dir(potential_path) {
            return Ok(potential_path.join(DATABASE_FILE));
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join(APP_DIR);
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join(DATABASE_FILE))
}

fn is_writable_dir(path: &Path) -> bool {
    if std::fs::create_dir_all(path).is_err() {
        return false;
    }
    let test_file = path.join(".test_write");
    if std::fs::write(&test_file, "test").is_err() {
        return false;
    }
    let _ = std::fs::remove_file(&test_file);
    true
}

/// Read the local user id stored in `dir`, creating one on first run
pub fn load_or_create_user_id(dir: &Path) -> io::Result<UserId> {
    let path = dir.join(USER_ID_FILE);

    match std::fs::read_to_string(&path) {
        Ok(raw) => UserId::from_string(&raw).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Corrupt user id file {}: {}", path.display(), e),
            )
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let user_id = UserId::new();
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, user_id.to_string())?;
            tracing::info!("Created local user {}", user_id);
            Ok(user_id)
        }
        Err(e) => Err(e),
    }
}
