/// Tool for checking streaks
///
/// This module implements the streak_status MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Addiction, Streak};
use crate::services::{AddictionService, StreakService, TrackerError};
use crate::tools::{parse_addiction_id, plural};

/// Parameters for checking streak status
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StreakStatusParams {
    /// ID of one addiction (optional, shows all if omitted)
    pub addiction_id: Option<String>,
    /// Recompute from the entry history before reporting (optional)
    pub recalculate: Option<bool>,
}

/// Streak of a single addiction
#[derive(Debug, Serialize)]
pub struct StreakStatus {
    pub addiction_id: String,
    pub name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_entry_date: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct StreakStatusResponse {
    pub streaks: Vec<StreakStatus>,
    pub message: String,
}

pub async fn streak_status(
    addictions: &AddictionService,
    streaks: &StreakService,
    params: StreakStatusParams,
) -> Result<StreakStatusResponse, TrackerError> {
    let targets: Vec<Addiction> = match params.addiction_id.as_deref() {
        Some(raw) => vec![addictions.get(&parse_addiction_id(raw)?).await?],
        None => addictions.list().await?,
    };

    let engine = *streaks.engine();
    let today = streaks.today();
    let mut statuses = Vec::with_capacity(targets.len());
    let mut lines = Vec::with_capacity(targets.len());

    for addiction in &targets {
        let streak = if params.recalculate.unwrap_or(false) {
            streaks.calculate_streak(&addiction.id).await?
        } else {
            streaks
                .get_streak(&addiction.id)
                .await?
                .unwrap_or_else(|| Streak::new(addiction.id))
        };

        let active = streak.is_active(&engine, today);
        lines.push(format!(
            "**{}**: {} day{} (best {}){}\n   {}",
            addiction.name,
            streak.current_streak,
            plural(streak.current_streak),
            streak.longest_streak,
            if active { "" } else { " - inactive" },
            streak.motivational_message()
        ));
        statuses.push(StreakStatus {
            addiction_id: addiction.id.to_string(),
            name: addiction.name.clone(),
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            last_entry_date: streak.last_entry_date.map(|d| d.to_rfc3339()),
            active,
        });
    }

    let message = if statuses.is_empty() {
        "No addictions tracked yet.".to_string()
    } else {
        lines.join("\n\n")
    };

    Ok(StreakStatusResponse {
        streaks: statuses,
        message,
    })
}
