//! Overdue / near-deadline classification.

use chrono::{DateTime, Duration, Utc};

use crate::fields::{DeadlineClass, Status};
use crate::task::Task;

/// How far ahead, in hours, a deadline counts as near.
pub const NEAR_DEADLINE_HOURS: i64 = 6;

pub fn near_deadline_window() -> Duration {
    Duration::hours(NEAR_DEADLINE_HOURS)
}

pub fn is_overdue(end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    end_date < now
}

pub fn is_near_deadline(end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    end_date <= now + near_deadline_window() && end_date > now
}

/// Classify a deadline. Completed work and tasks without a deadline are
/// always normal.
pub fn classify(end_date: Option<DateTime<Utc>>, status: Status, now: DateTime<Utc>) -> DeadlineClass {
    let Some(end) = end_date else {
        return DeadlineClass::Normal;
    };
    if status == Status::Completed {
        DeadlineClass::Normal
    } else if is_overdue(end, now) {
        DeadlineClass::Overdue
    } else if is_near_deadline(end, now) {
        DeadlineClass::NearDeadline
    } else {
        DeadlineClass::Normal
    }
}

pub fn classify_task(task: &Task, now: DateTime<Utc>) -> DeadlineClass {
    classify(task.end_date, task.status, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_classification() {
        let t = now();
        assert_eq!(classify(Some(t - Duration::hours(1)), Status::InProgress, t), DeadlineClass::Overdue);
        assert_eq!(classify(Some(t + Duration::hours(3)), Status::InProgress, t), DeadlineClass::NearDeadline);
        assert_eq!(classify(Some(t + Duration::hours(10)), Status::InProgress, t), DeadlineClass::Normal);
    }

    #[test]
    fn test_completed_overrides_overdue() {
        let t = now();
        assert_eq!(classify(Some(t - Duration::hours(100)), Status::Completed, t), DeadlineClass::Normal);
    }

    #[test]
    fn test_missing_deadline_is_normal() {
        assert_eq!(classify(None, Status::Pending, now()), DeadlineClass::Normal);
    }

    #[test]
    fn test_window_edges() {
        let t = now();
        assert_eq!(classify(Some(t + near_deadline_window()), Status::Waiting, t), DeadlineClass::NearDeadline);
        assert_eq!(
            classify(Some(t + near_deadline_window() + Duration::seconds(1)), Status::Waiting, t),
            DeadlineClass::Normal
        );
        // Exactly at the deadline it is neither past nor ahead.
        assert_eq!(classify(Some(t), Status::Accepted, t), DeadlineClass::Normal);
    }
}
