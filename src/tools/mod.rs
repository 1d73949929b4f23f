/// MCP tools for addiction tracking
///
/// This module contains all the MCP tools that external clients can call.
/// Each tool has a parameter struct whose JSON schema is advertised by
/// `tools/list`, and a function that drives the services.

pub mod addictions;
pub mod entries;
pub mod reminders;
pub mod session;
pub mod streaks;

pub use addictions::*;
pub use entries::*;
pub use reminders::*;
pub use session::*;
pub use streaks::*;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::domain::{AddictionId, EntryId};
use crate::services::TrackerError;

pub(crate) fn parse_addiction_id(raw: &str) -> Result<AddictionId, TrackerError> {
    AddictionId::from_string(raw)
        .map_err(|_| TrackerError::InvalidInput(format!("Invalid addiction ID '{}'", raw)))
}

pub(crate) fn parse_entry_id(raw: &str) -> Result<EntryId, TrackerError> {
    EntryId::from_string(raw).map_err(|_| TrackerError::InvalidInput(format!("Invalid entry ID '{}'", raw)))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates
///
/// A bare date becomes noon of that day at `day_boundary`, so it is counted
/// on the day the user named.
pub(crate) fn parse_entry_date(raw: &str, day_boundary: FixedOffset) -> Result<DateTime<Utc>, TrackerError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .and_then(|naive| day_boundary.from_local_datetime(&naive).single())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            TrackerError::InvalidInput(format!(
                "Invalid date '{}'. Use YYYY-MM-DD or an RFC 3339 timestamp",
                raw
            ))
        })
}

/// Absent leaves a field alone; an empty string clears it
pub(crate) fn optional_edit(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

pub(crate) fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
