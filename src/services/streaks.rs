/// Streak service
///
/// Reads entry history, runs the streak engine and upserts the result.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::auth::AuthProvider;
use crate::domain::{AddictionId, Streak, StreakEngine};
use crate::reminder::Clock;
use crate::services::{require_user, StorageHandle, TrackerError};

#[derive(Clone)]
pub struct StreakService {
    storage: StorageHandle,
    auth: Arc<dyn AuthProvider>,
    engine: StreakEngine,
    clock: Arc<dyn Clock>,
}

impl StreakService {
    pub fn new(
        storage: StorageHandle,
        auth: Arc<dyn AuthProvider>,
        engine: StreakEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            auth,
            engine,
            clock,
        }
    }

    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }

    /// Current calendar day under the engine's day boundary
    pub fn today(&self) -> NaiveDate {
        self.engine.day_of(self.clock.now())
    }

    /// Stored streak for one addiction, if it was ever computed
    pub async fn get_streak(&self, addiction_id: &AddictionId) -> Result<Option<Streak>, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.get_streak(&user_id, addiction_id))?)
    }

    pub async fn get_all_streaks(&self) -> Result<Vec<Streak>, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        Ok(self.storage.with(|s| s.list_streaks(&user_id))?)
    }

    /// Recompute and persist the streak of one addiction
    ///
    /// The stored row is the one returned, so callers see exactly what a
    /// later `get_streak` would.
    pub async fn calculate_streak(&self, addiction_id: &AddictionId) -> Result<Streak, TrackerError> {
        let user_id = require_user(self.auth.as_ref())?;
        let now = self.clock.now();

        let streak = self.storage.with(|s| {
            let entries = s.list_entries(&user_id, Some(addiction_id))?;
            let previous_longest = s
                .get_streak(&user_id, addiction_id)?
                .map(|existing| existing.longest_streak)
                .unwrap_or(0);

            let computed = self.engine.compute(*addiction_id, &entries, previous_longest, now);
            s.upsert_streak(&user_id, &computed)
        })?;

        tracing::debug!(
            "Streak for {}: current {} longest {}",
            addiction_id,
            streak.current_streak,
            streak.longest_streak
        );
        Ok(streak)
    }
}
