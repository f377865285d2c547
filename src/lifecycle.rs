//! Table occupancy state machine.
//!
//! A table moves `free -> occupied -> free`, with `waiting` (party waiting on
//! service) and `paying` (bill requested) as detours while occupied. Every
//! status change goes through [`TableStatus::apply`], which rejects moves the
//! floor staff cannot make, e.g. requesting the bill for an empty table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::TableStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableEvent {
    /// A party sits down; opens a session.
    Seat,
    Wait,
    RequestBill,
    Resume,
    /// The party leaves; closes the session.
    Release,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("table cannot go from {from} via {event:?}")]
    Invalid { from: TableStatus, event: TableEvent },
    #[error("table is already {0}")]
    AlreadyThere(TableStatus),
}

impl TableStatus {
    pub fn apply(self, event: TableEvent) -> Result<TableStatus, TransitionError> {
        use TableEvent::*;
        use TableStatus::*;

        let next = match (self, event) {
            (Free, Seat) => Occupied,
            (Occupied, Wait) => Waiting,
            (Occupied | Waiting, RequestBill) => Paying,
            (Waiting | Paying, Resume) => Occupied,
            (Occupied | Waiting | Paying, Release) => Free,
            (from, event) => return Err(TransitionError::Invalid { from, event }),
        };
        Ok(next)
    }

    /// Event that takes `self` to `target`, for callers that ask for a status directly.
    pub fn event_towards(self, target: TableStatus) -> Result<TableEvent, TransitionError> {
        if self == target {
            return Err(TransitionError::AlreadyThere(target));
        }
        let event = match target {
            TableStatus::Free => TableEvent::Release,
            TableStatus::Occupied if self == TableStatus::Free => TableEvent::Seat,
            TableStatus::Occupied => TableEvent::Resume,
            TableStatus::Waiting => TableEvent::Wait,
            TableStatus::Paying => TableEvent::RequestBill,
        };
        // Validate so the caller gets the same error as a direct `apply`.
        self.apply(event)?;
        Ok(event)
    }

    pub fn has_session(&self) -> bool {
        !matches!(self, TableStatus::Free)
    }
}

/// Minutes a party is expected to stay before the table is flagged.
pub const IDEAL_SESSION_MINUTES: i32 = 60;

/// Milliseconds since the session started, never negative.
pub fn elapsed_ms(session_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - session_start).num_milliseconds().max(0)
}

pub fn over_ideal_time(session_start: DateTime<Utc>, ideal_minutes: i32, now: DateTime<Utc>) -> bool {
    elapsed_ms(session_start, now) > i64::from(ideal_minutes) * 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use TableEvent::*;
    use TableStatus::*;

    #[test]
    fn full_service_cycle() {
        let status = Free.apply(Seat).unwrap();
        assert_eq!(status, Occupied);
        let status = status.apply(Wait).unwrap();
        assert_eq!(status, Waiting);
        let status = status.apply(RequestBill).unwrap();
        assert_eq!(status, Paying);
        assert_eq!(status.apply(Release).unwrap(), Free);
    }

    #[test]
    fn free_table_rejects_everything_but_seat() {
        for event in [Wait, RequestBill, Resume, Release] {
            assert_eq!(
                Free.apply(event),
                Err(TransitionError::Invalid { from: Free, event })
            );
        }
    }

    #[test]
    fn occupied_table_cannot_be_seated_twice() {
        assert!(Occupied.apply(Seat).is_err());
        assert!(Paying.apply(Wait).is_err());
    }

    #[test]
    fn direct_status_requests_resolve_to_events() {
        assert_eq!(Free.event_towards(Occupied), Ok(Seat));
        assert_eq!(Paying.event_towards(Occupied), Ok(Resume));
        assert_eq!(Occupied.event_towards(Paying), Ok(RequestBill));
        assert_eq!(Waiting.event_towards(Free), Ok(Release));
        assert_eq!(
            Occupied.event_towards(Occupied),
            Err(TransitionError::AlreadyThere(Occupied))
        );
        assert!(Free.event_towards(Paying).is_err());
    }

    #[test]
    fn session_clock() {
        use chrono::{Duration, TimeZone};
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap();
        assert_eq!(elapsed_ms(start, start + Duration::seconds(90)), 90_000);
        assert_eq!(elapsed_ms(start, start - Duration::seconds(5)), 0);
        assert!(!over_ideal_time(start, 60, start + Duration::minutes(60)));
        assert!(over_ideal_time(start, 60, start + Duration::minutes(61)));
    }
}
