/// Streak engine properties
use addiction_tracker::*;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 20, 15, 0, 0).unwrap()
}

fn at(days_ago: i64, hour: u32) -> DateTime<Utc> {
    let day = now().date_naive() - Duration::days(days_ago);
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
}

fn compute(stamps: &[DateTime<Utc>], previous_longest: u32) -> Streak {
    StreakEngine::utc().compute_from_timestamps(AddictionId::new(), stamps, previous_longest, now())
}

#[test]
fn test_stale_history_has_no_current_streak() {
    for gap in 2..6 {
        let stamps: Vec<_> = (gap..gap + 4).map(|d| at(d, 9)).collect();
        let streak = compute(&stamps, 0);

        assert_eq!(streak.current_streak, 0, "gap of {} days", gap);
        assert_eq!(streak.longest_streak, 4);
    }
}

#[test]
fn test_consecutive_days_ending_today_ignore_duplicates() {
    for n in 1..8 {
        let mut stamps = Vec::new();
        for d in 0..n {
            stamps.push(at(d, 8));
            stamps.push(at(d, 20));
        }

        let streak = compute(&stamps, 0);
        assert_eq!(streak.current_streak, n as u32);
        assert_eq!(streak.longest_streak, n as u32);
    }
}

#[test]
fn test_run_ending_yesterday_is_still_current() {
    let streak = compute(&[at(1, 9), at(2, 9), at(3, 9)], 0);
    assert_eq!(streak.current_streak, 3);
}

#[test]
fn test_longest_run_can_predate_current_run() {
    let streak = compute(&[at(0, 8), at(6, 8), at(7, 8), at(8, 8)], 0);
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 3);
}

#[test]
fn test_longest_never_decreases() {
    let mut stamps = vec![at(0, 9), at(1, 9), at(2, 9), at(3, 9), at(10, 9)];
    let mut previous = 0;

    while !stamps.is_empty() {
        let streak = compute(&stamps, previous);
        assert!(streak.longest_streak >= previous);
        previous = streak.longest_streak;
        stamps.remove(0);
    }

    assert_eq!(compute(&[], previous).longest_streak, 4);
}

#[test]
fn test_deleting_most_recent_never_increases_current() {
    let mut stamps = vec![at(0, 9), at(1, 9), at(3, 9), at(4, 9), at(5, 9)];
    let mut before = compute(&stamps, 0);

    while !stamps.is_empty() {
        stamps.remove(0);
        let after = compute(&stamps, before.longest_streak);

        assert!(after.current_streak <= before.current_streak);
        assert!(after.longest_streak >= before.longest_streak);
        before = after;
    }
}

#[test]
fn test_day_boundary_follows_offset() {
    // 23:30 UTC on the 19th is already the 20th at UTC+2
    let late = Utc.with_ymd_and_hms(2024, 6, 19, 23, 30, 0).unwrap();
    let utc = StreakEngine::utc();
    let plus_two = StreakEngine::with_offset(FixedOffset::east_opt(2 * 3600).unwrap());

    let stamps = [late, at(0, 9)];
    let id = AddictionId::new();
    assert_eq!(utc.compute_from_timestamps(id, &stamps, 0, now()).current_streak, 2);
    assert_eq!(plus_two.compute_from_timestamps(id, &stamps, 0, now()).current_streak, 1);
}
