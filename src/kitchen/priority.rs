use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ItemStatus;

/// Preparation estimate used when an order carries none.
pub const DEFAULT_ESTIMATED_MINUTES: i32 = 15;

const WARNING_RATIO: f64 = 0.7;
const CRITICAL_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    Warning,
    Critical,
}

impl Priority {
    pub fn weight(&self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Warning => 2,
            Priority::Critical => 3,
        }
    }
}

/// Urgency tier of an order at `now`.
///
/// Elapsed time is measured from `created_at`; the kitchen start stamp does
/// not reset the clock. An order without a creation time is `Normal`.
pub fn priority_for(
    created_at: Option<DateTime<Utc>>,
    _kitchen_started_at: Option<DateTime<Utc>>,
    estimated_minutes: Option<i32>,
    now: DateTime<Utc>,
) -> Priority {
    let Some(created_at) = created_at else {
        return Priority::Normal;
    };

    let estimated = estimated_minutes
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_ESTIMATED_MINUTES);
    let elapsed_minutes = (now - created_at).num_milliseconds() as f64 / 60_000.0;
    let ratio = elapsed_minutes / f64::from(estimated);

    if ratio >= CRITICAL_RATIO {
        Priority::Critical
    } else if ratio >= WARNING_RATIO {
        Priority::Warning
    } else {
        Priority::Normal
    }
}

/// Whole minutes since `since`, never negative.
pub fn elapsed_minutes(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_minutes().max(0)
}

/// Share of items marked ready, 0-100.
pub fn progress_percent<'a>(statuses: impl IntoIterator<Item = &'a ItemStatus>) -> f64 {
    let (total, ready) = statuses.into_iter().fold((0_u32, 0_u32), |(total, ready), s| {
        (total + 1, ready + u32::from(*s == ItemStatus::Ready))
    });
    if total == 0 {
        return 0.0;
    }
    f64::from(ready) / f64::from(total) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap()
    }

    fn created(minutes_ago: i64) -> Option<DateTime<Utc>> {
        Some(now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn tiers_for_fifteen_minute_estimate() {
        assert_eq!(priority_for(created(16), None, Some(15), now()), Priority::Critical);
        assert_eq!(priority_for(created(11), None, Some(15), now()), Priority::Warning);
        assert_eq!(priority_for(created(5), None, Some(15), now()), Priority::Normal);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(priority_for(created(15), None, Some(15), now()), Priority::Critical);
        assert_eq!(priority_for(created(7), None, Some(10), now()), Priority::Warning);
    }

    #[test]
    fn missing_estimate_defaults_to_fifteen_minutes() {
        assert_eq!(priority_for(created(16), None, None, now()), Priority::Critical);
        assert_eq!(priority_for(created(11), None, Some(0), now()), Priority::Warning);
    }

    #[test]
    fn kitchen_start_does_not_reset_the_clock() {
        let started = Some(now() - Duration::minutes(1));
        assert_eq!(priority_for(created(20), started, Some(15), now()), Priority::Critical);
    }

    #[test]
    fn missing_timestamps_degrade_to_normal() {
        assert_eq!(priority_for(None, None, Some(1), now()), Priority::Normal);
        assert_eq!(
            priority_for(None, created(60), Some(1), now()),
            Priority::Normal
        );
    }

    #[test]
    fn future_creation_is_normal() {
        let ahead = Some(now() + Duration::minutes(5));
        assert_eq!(priority_for(ahead, None, Some(15), now()), Priority::Normal);
        assert_eq!(elapsed_minutes(now() + Duration::minutes(5), now()), 0);
    }

    #[test]
    fn progress_counts_ready_items() {
        let statuses = [ItemStatus::Ready, ItemStatus::Pending, ItemStatus::Ready, ItemStatus::Preparing];
        assert_eq!(progress_percent(&statuses), 50.0);
        assert_eq!(progress_percent(&[]), 0.0);
    }
}
