use serde::Serialize;

use crate::models::ProgressRecord;

/// Aggregates look at the most recent N stored records, not the last N
/// calendar days; days without an entry simply never enter the window.
pub const STATS_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    /// Lifetime completed-workout count, independent of the window.
    pub total_completed_workouts: i64,
    pub avg_calories_consumed: i64,
    pub avg_calories_burned: i64,
    /// Count of completed-workout records inside the window. Kept under
    /// the historical "streak" name even though it is a plain count.
    pub workout_streak_last_30_days: i64,
}

/// `recent` must be ordered newest-first; anything past the window is
/// ignored. `total_completed_workouts` comes from a separate full-history
/// count so callers can pass more (or fewer) rows than the window holds.
pub fn summarize(recent: &[ProgressRecord], total_completed_workouts: i64) -> ProgressStats {
    let window = &recent[..recent.len().min(STATS_WINDOW)];

    ProgressStats {
        total_completed_workouts,
        avg_calories_consumed: mean(window.iter().filter_map(|r| r.calories_consumed)),
        avg_calories_burned: mean(window.iter().filter_map(|r| r.calories_burned)),
        workout_streak_last_30_days: window.iter().filter(|r| r.workout_completed).count() as i64,
    }
}

/// Mean over the present values, rounded to the nearest integer; zero when
/// nothing is present.
fn mean(values: impl Iterator<Item = i32>) -> i64 {
    let mut sum: i64 = 0;
    let mut count: i64 = 0;
    for value in values {
        sum += i64::from(value);
        count += 1;
    }
    if count == 0 {
        0
    } else {
        (sum as f64 / count as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn record(day: u32, consumed: Option<i32>, burned: Option<i32>, workout: bool) -> ProgressRecord {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let mut r = ProgressRecord::fresh(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() - chrono::Days::new(u64::from(day)),
            now,
        );
        r.calories_consumed = consumed;
        r.calories_burned = burned;
        r.workout_completed = workout;
        r
    }

    #[test]
    fn empty_history_yields_zeroes() {
        let stats = summarize(&[], 0);
        assert_eq!(
            stats,
            ProgressStats {
                total_completed_workouts: 0,
                avg_calories_consumed: 0,
                avg_calories_burned: 0,
                workout_streak_last_30_days: 0,
            }
        );
    }

    #[test]
    fn means_skip_absent_values_and_round() {
        let records = vec![
            record(0, Some(500), Some(301), true),
            record(1, None, Some(300), false),
            record(2, Some(601), None, true),
        ];
        let stats = summarize(&records, 7);
        // (500 + 601) / 2 = 550.5 -> 551, (301 + 300) / 2 = 300.5 -> 301
        assert_eq!(stats.avg_calories_consumed, 551);
        assert_eq!(stats.avg_calories_burned, 301);
        assert_eq!(stats.workout_streak_last_30_days, 2);
        assert_eq!(stats.total_completed_workouts, 7);
    }

    #[test]
    fn window_never_exceeds_thirty_records() {
        // 40 records newest-first; the 30 newest have workouts completed and
        // 1000 calories, the 10 oldest would skew both numbers if counted.
        let mut records: Vec<ProgressRecord> = (0..30)
            .map(|d| record(d, Some(1000), Some(500), true))
            .collect();
        records.extend((30..40).map(|d| record(d, Some(9000), Some(9000), true)));

        let stats = summarize(&records, 40);
        assert_eq!(stats.avg_calories_consumed, 1000);
        assert_eq!(stats.avg_calories_burned, 500);
        assert_eq!(stats.workout_streak_last_30_days, 30);
        // The lifetime figure still sees all of history.
        assert_eq!(stats.total_completed_workouts, 40);
    }

    #[test]
    fn lifetime_count_is_window_independent() {
        let records = vec![record(0, Some(100), Some(100), false)];
        let stats = summarize(&records, 12);
        assert_eq!(stats.total_completed_workouts, 12);
        assert_eq!(stats.workout_streak_last_30_days, 0);
    }
}
