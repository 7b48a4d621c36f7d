//! Urgency ordering for task lists.
//!
//! Both variants put incomplete tasks before completed ones and list
//! completed tasks most recently ended first. They differ in how incomplete
//! tasks are tiered: the director view only lifts near-deadline tasks, the
//! "my tasks" view also lifts overdue tasks above those.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::deadline::classify_task;
use crate::fields::{DeadlineClass, SortVariant, Status};
use crate::task::Task;

/// Order tasks by urgency. The input is left untouched.
pub fn sort_tasks<'a>(tasks: &'a [Task], now: DateTime<Utc>, variant: SortVariant) -> Vec<&'a Task> {
    let (mut incomplete, mut completed): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|t| t.status != Status::Completed);

    incomplete.sort_by(|a, b| {
        let tier_a = tier(a, now, variant);
        let tier_b = tier(b, now, variant);
        tier_a
            .cmp(&tier_b)
            .then_with(|| deadline_ascending(a.end_date, b.end_date))
    });
    completed.sort_by(|a, b| deadline_descending(a.end_date, b.end_date));

    incomplete.extend(completed);
    incomplete
}

fn tier(task: &Task, now: DateTime<Utc>, variant: SortVariant) -> u8 {
    match (variant, classify_task(task, now)) {
        (SortVariant::DeadlineFirst, DeadlineClass::NearDeadline) => 0,
        (SortVariant::DeadlineFirst, _) => 1,
        (SortVariant::OverdueFirst, DeadlineClass::Overdue) => 0,
        (SortVariant::OverdueFirst, DeadlineClass::NearDeadline) => 1,
        (SortVariant::OverdueFirst, DeadlineClass::Normal) => 2,
    }
}

// Missing deadlines go last in both directions.
fn deadline_ascending(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn deadline_descending(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn task(id: u64, end: Option<i64>, status: Status) -> Task {
        Task {
            task_id: id,
            title: format!("Task {id}"),
            description: None,
            start_date: None,
            end_date: end.map(|h| now() + Duration::hours(h)),
            status,
            progress: None,
            director_id: Some(1),
            recurring_task_id: None,
            department_ids: vec![],
            department_names: vec![],
            department_statuses: Default::default(),
            department_waiting_reasons: Default::default(),
            assigned_user_ids: vec![2],
            assigned_user_names: vec!["Ana".into()],
            waiting_reason: None,
            completed_at: None,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.task_id).collect()
    }

    #[test]
    fn test_near_deadline_then_normal_then_completed() {
        let tasks = vec![
            task(1, Some(1), Status::InProgress),
            task(2, Some(10), Status::InProgress),
            task(3, Some(-1), Status::Completed),
        ];
        assert_eq!(ids(&sort_tasks(&tasks, now(), SortVariant::DeadlineFirst)), vec![1, 2, 3]);
    }

    #[test]
    fn test_near_deadline_beats_earlier_deadline() {
        let tasks = vec![
            task(1, Some(30), Status::Pending),
            task(2, Some(-5), Status::InProgress),
            task(3, Some(4), Status::Accepted),
            task(4, None, Status::Pending),
        ];
        // Overdue task 2 is only ordered by its date in the two-tier variant.
        assert_eq!(ids(&sort_tasks(&tasks, now(), SortVariant::DeadlineFirst)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_overdue_first_variant() {
        let tasks = vec![
            task(1, Some(30), Status::Pending),
            task(2, Some(4), Status::InProgress),
            task(3, Some(-2), Status::Waiting),
            task(4, Some(-8), Status::Accepted),
            task(5, Some(1), Status::InProgress),
        ];
        assert_eq!(ids(&sort_tasks(&tasks, now(), SortVariant::OverdueFirst)), vec![4, 3, 5, 2, 1]);
    }

    #[test]
    fn test_completed_most_recent_first() {
        let tasks = vec![
            task(1, Some(-50), Status::Completed),
            task(2, None, Status::Completed),
            task(3, Some(-1), Status::Completed),
            task(4, Some(2), Status::Waiting),
        ];
        assert_eq!(ids(&sort_tasks(&tasks, now(), SortVariant::DeadlineFirst)), vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_tasks(&[], now(), SortVariant::OverdueFirst).is_empty());
    }
}
