/// Streak calculation and tracking functionality
///
/// This module defines the Streak record persisted per addiction and the
/// StreakEngine that recomputes it from the full entry history. Recomputation
/// is always from scratch, so deleting an entry shrinks the current streak
/// correctly, while the longest streak only ever ratchets upwards.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use crate::domain::{AddictionId, ConsumptionEntry};

/// Calculated streak information for an addiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    /// Which addiction this streak data is for
    pub addiction_id: AddictionId,
    /// Consecutive days with at least one entry, ending today or yesterday
    pub current_streak: u32,
    /// Best run ever recorded; never decreases between recomputations
    pub longest_streak: u32,
    /// Original timestamp of the most recent entry (None if no entries)
    pub last_entry_date: Option<DateTime<Utc>>,
    /// When this record was last recomputed
    pub updated_at: DateTime<Utc>,
}

impl Streak {
    /// Create an empty streak record for an addiction without entries
    pub fn new(addiction_id: AddictionId) -> Self {
        Self {
            addiction_id,
            current_streak: 0,
            longest_streak: 0,
            last_entry_date: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether the last entry falls on `today` or the day before
    pub fn is_active(&self, engine: &StreakEngine, today: NaiveDate) -> bool {
        match self.last_entry_date {
            None => false,
            Some(last) => (today - engine.day_of(last)).num_days() <= 1,
        }
    }

    /// Get a short status line based on the current streak
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 if self.longest_streak > 0 => format!(
                "No active streak right now. Your best run so far is {} day{}.",
                self.longest_streak,
                if self.longest_streak == 1 { "" } else { "s" }
            ),
            0 => "No streak yet. Log an entry to start one.".to_string(),
            1 => "1 day logged in a row.".to_string(),
            2..=6 => format!("{} days in a row.", self.current_streak),
            7..=29 => format!("{} days in a row, over a week strong.", self.current_streak),
            _ => format!("{} days in a row, a month or more.", self.current_streak),
        }
    }
}

/// Computes streaks from entry timestamps
///
/// Timestamps are bucketed into calendar days using one fixed offset for the
/// whole process. The default is UTC so results don't depend on host locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakEngine {
    day_boundary: FixedOffset,
}

impl Default for StreakEngine {
    fn default() -> Self {
        Self::utc()
    }
}

impl StreakEngine {
    /// Engine that draws day boundaries at UTC midnight
    pub fn utc() -> Self {
        Self {
            day_boundary: Utc.fix(),
        }
    }

    /// Engine that draws day boundaries at midnight of a fixed UTC offset
    pub fn with_offset(day_boundary: FixedOffset) -> Self {
        Self { day_boundary }
    }

    pub fn day_boundary(&self) -> FixedOffset {
        self.day_boundary
    }

    /// Calendar day a timestamp falls on under this engine's policy
    pub fn day_of(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.day_boundary).date_naive()
    }

    /// Recompute the streak for one addiction from all of its entries
    ///
    /// `previous_longest` is the longest streak stored before this run; the
    /// result's `longest_streak` is never lower than it. The longest run is
    /// searched over the full history, not just up to the end of the current run.
    pub fn compute(
        &self,
        addiction_id: AddictionId,
        entries: &[ConsumptionEntry],
        previous_longest: u32,
        now: DateTime<Utc>,
    ) -> Streak {
        let timestamps: Vec<DateTime<Utc>> = entries.iter().map(|e| e.entry_date).collect();
        self.compute_from_timestamps(addiction_id, &timestamps, previous_longest, now)
    }

    /// Same as [`compute`](Self::compute) but over bare timestamps
    pub fn compute_from_timestamps(
        &self,
        addiction_id: AddictionId,
        timestamps: &[DateTime<Utc>],
        previous_longest: u32,
        now: DateTime<Utc>,
    ) -> Streak {
        let Some(last_entry_date) = timestamps.iter().max().copied() else {
            return Streak {
                addiction_id,
                current_streak: 0,
                longest_streak: previous_longest,
                last_entry_date: None,
                updated_at: now,
            };
        };

        // Newest first, one slot per calendar day; future days count as today
        let today = self.day_of(now);
        let mut days: Vec<NaiveDate> = timestamps.iter().map(|t| self.day_of(*t).min(today)).collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();

        let (current_streak, longest_run) = Self::walk(&days, today);

        Streak {
            addiction_id,
            current_streak,
            longest_streak: longest_run.max(previous_longest),
            last_entry_date: Some(last_entry_date),
            updated_at: now,
        }
    }

    /// Walk deduplicated days (newest first) and return (current, longest run)
    fn walk(days: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
        let Some(most_recent) = days.first() else {
            return (0, 0);
        };

        let mut counting_current = (today - *most_recent).num_days() <= 1;
        let mut current = 0;
        let mut longest = 0;
        let mut run = 1;

        for pair in days.windows(2) {
            let gap = (pair[0] - pair[1]).num_days();
            if gap == 1 {
                run += 1;
                continue;
            }

            if counting_current {
                current = run;
                counting_current = false;
            }
            longest = longest.max(run);
            run = 1;
        }

        if counting_current {
            current = run;
        }
        (current, longest.max(run))
    }
}
