/// Tools for logging consumption entries
///
/// This module implements entry_log, entry_update, entry_delete and
/// entry_list.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{ConsumptionEntry, EntryUpdate, NewEntry, Streak};
use crate::services::{EntryService, StreakService, TrackerError};
use crate::tools::{optional_edit, parse_addiction_id, parse_entry_date, parse_entry_id, plural};

const DEFAULT_LIST_LIMIT: usize = 20;

/// Parameters for logging an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogEntryParams {
    /// ID of the addiction this entry is for
    pub addiction_id: String,
    /// When it happened (YYYY-MM-DD or RFC 3339, defaults to now)
    pub entry_date: Option<String>,
    /// Optional notes
    pub notes: Option<String>,
    /// Optional reference to an uploaded image
    pub image_url: Option<String>,
    /// Optional scanned barcode
    pub barcode_data: Option<String>,
    /// Optional local photo to keep a copy of
    pub photo_path: Option<String>,
}

/// Parameters for editing an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateEntryParams {
    /// ID of the entry to edit
    pub entry_id: String,
    /// New notes; an empty string clears them
    pub notes: Option<String>,
    /// New image reference; an empty string clears it
    pub image_url: Option<String>,
    /// New barcode; an empty string clears it
    pub barcode_data: Option<String>,
}

/// Parameters for deleting an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    /// ID of the entry to delete
    pub entry_id: String,
}

/// Parameters for listing entries
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListEntriesParams {
    /// Only entries of this addiction (optional)
    pub addiction_id: Option<String>,
    /// Maximum number of entries to show (default 20)
    pub limit: Option<usize>,
}

/// Response from logging an entry
#[derive(Debug, Serialize)]
pub struct LogEntryResponse {
    pub entry: ConsumptionEntry,
    pub streak: Option<Streak>,
    pub message: String,
}

/// Response from listing entries
#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    pub entries: Vec<ConsumptionEntry>,
    pub total: usize,
    pub message: String,
}

fn describe(entry: &ConsumptionEntry) -> String {
    let mut line = format!(
        "- {} (ID: {})",
        entry.entry_date.format("%Y-%m-%d %H:%M UTC"),
        entry.id
    );
    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        line.push_str(&format!("\n  Notes: {}", notes));
    }
    if let Some(image) = &entry.image_url {
        line.push_str(&format!("\n  Image: {}", image));
    }
    if let Some(barcode) = &entry.barcode_data {
        line.push_str(&format!("\n  Barcode: {}", barcode));
    }
    line
}

pub async fn log_entry(
    entries: &EntryService,
    streaks: &StreakService,
    params: LogEntryParams,
) -> Result<LogEntryResponse, TrackerError> {
    let addiction_id = parse_addiction_id(&params.addiction_id)?;
    let day_boundary = streaks.engine().day_boundary();
    let entry_date = params
        .entry_date
        .as_deref()
        .map(|raw| parse_entry_date(raw, day_boundary))
        .transpose()?;
    let photo = params
        .photo_path
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let entry = entries
        .create(
            NewEntry {
                addiction_id,
                entry_date,
                notes: params.notes,
                image_url: params.image_url,
                barcode_data: params.barcode_data,
            },
            photo,
        )
        .await?;

    let streak = streaks.get_streak(&addiction_id).await?;
    let message = match &streak {
        Some(s) => format!(
            "Logged entry {}. Current streak: {} day{} (best {}).",
            entry.id,
            s.current_streak,
            plural(s.current_streak),
            s.longest_streak
        ),
        None => format!("Logged entry {}.", entry.id),
    };

    Ok(LogEntryResponse {
        entry,
        streak,
        message,
    })
}

pub async fn update_entry(
    entries: &EntryService,
    params: UpdateEntryParams,
) -> Result<String, TrackerError> {
    let entry_id = parse_entry_id(&params.entry_id)?;
    let update = EntryUpdate {
        notes: optional_edit(params.notes),
        image_url: optional_edit(params.image_url),
        barcode_data: optional_edit(params.barcode_data),
    };
    if update == EntryUpdate::default() {
        return Err(TrackerError::InvalidInput(
            "At least one of notes, image_url or barcode_data must be provided".to_string(),
        ));
    }

    let entry = entries.update(&entry_id, update).await?;
    Ok(format!("Updated entry:\n{}", describe(&entry)))
}

pub async fn delete_entry(
    entries: &EntryService,
    streaks: &StreakService,
    params: DeleteEntryParams,
) -> Result<String, TrackerError> {
    let entry_id = parse_entry_id(&params.entry_id)?;
    let entry = entries.get(&entry_id).await?;
    entries.delete(&entry_id).await?;

    let streak = streaks.get_streak(&entry.addiction_id).await?;
    let current = streak.map(|s| s.current_streak).unwrap_or(0);
    Ok(format!(
        "Deleted entry {}. Current streak is now {} day{}.",
        entry_id,
        current,
        plural(current)
    ))
}

pub async fn list_entries(
    entries: &EntryService,
    params: ListEntriesParams,
) -> Result<ListEntriesResponse, TrackerError> {
    let addiction_id = params.addiction_id.as_deref().map(parse_addiction_id).transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1);

    let mut all = entries.list(addiction_id.as_ref()).await?;
    let total = all.len();
    all.truncate(limit);

    let message = if all.is_empty() {
        "No entries logged yet.".to_string()
    } else {
        let shown = all.iter().map(describe).collect::<Vec<_>>().join("\n");
        format!("Showing {} of {} entries (newest first):\n{}", all.len(), total, shown)
    };

    Ok(ListEntriesResponse {
        entries: all,
        total,
        message,
    })
}
