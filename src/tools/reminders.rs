/// Tool for inspecting reminder frequency
///
/// This module implements the reminder_interval MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::Level;
use crate::reminder::{format_interval, interval_minutes, ReminderScheduler};
use crate::services::{AddictionService, TrackerError};
use crate::tools::parse_addiction_id;

/// Parameters for the reminder_interval tool; give a level or an addiction
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ReminderIntervalParams {
    /// Level 1-10 to look up
    pub level: Option<i64>,
    /// Use the level of this addiction instead
    pub addiction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReminderIntervalResponse {
    pub level: u8,
    pub interval_minutes: u32,
    pub interval: String,
    /// Only set when asking about an addiction
    pub scheduled: Option<bool>,
    pub message: String,
}

pub async fn reminder_interval(
    addictions: &AddictionService,
    reminders: &ReminderScheduler,
    params: ReminderIntervalParams,
) -> Result<ReminderIntervalResponse, TrackerError> {
    let (level, name, scheduled) = match (params.addiction_id.as_deref(), params.level) {
        (Some(raw), _) => {
            let addiction = addictions.get(&parse_addiction_id(raw)?).await?;
            let scheduled = reminders.registry().notification_id(&addiction.id).await.is_some();
            (addiction.level, Some(addiction.name), Some(scheduled))
        }
        (None, Some(level)) => (Level::clamped(level), None, None),
        (None, None) => {
            return Err(TrackerError::InvalidInput(
                "Provide either a level or an addiction_id".to_string(),
            ))
        }
    };

    let minutes = interval_minutes(i64::from(level));
    let interval = format_interval(minutes);
    let message = match (&name, scheduled) {
        (Some(name), Some(true)) => format!("'{}' (level {}) reminds you every {}.", name, level, interval),
        (Some(name), _) => format!(
            "'{}' (level {}) would remind you every {}, but no reminder is running.",
            name, level, interval
        ),
        (None, _) => format!("Level {} reminds you every {}.", level, interval),
    };

    Ok(ReminderIntervalResponse {
        level: level.value(),
        interval_minutes: minutes,
        interval,
        scheduled,
        message,
    })
}
