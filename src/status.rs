//! Status normalisation and department aggregation.
//!
//! Stages are ordered `PENDING < ACCEPTED < IN_PROGRESS < WAITING < COMPLETED`.
//! The aggregate of a department-scoped task is its least advanced department,
//! which is what positions the overall progress indicator. Note that WAITING
//! counts as further along than IN_PROGRESS here.

use std::collections::BTreeMap;

use crate::fields::{DisplayStatus, Status, TaskScope};
use crate::task::Task;

/// All statuses in stage order.
pub const STAGE_ORDER: [Status; 5] = [
    Status::Pending,
    Status::Accepted,
    Status::InProgress,
    Status::Waiting,
    Status::Completed,
];

/// Position of a status in [`STAGE_ORDER`].
pub fn stage_index(status: Status) -> usize {
    match status {
        Status::Pending => 0,
        Status::Accepted => 1,
        Status::InProgress => 2,
        Status::Waiting => 3,
        Status::Completed => 4,
    }
}

/// Status shown on a single badge.
pub fn normalize_display_status(status: Status) -> DisplayStatus {
    match status {
        Status::Pending | Status::Accepted | Status::InProgress => DisplayStatus::InProgress,
        Status::Waiting => DisplayStatus::Waiting,
        Status::Completed => DisplayStatus::Completed,
    }
}

/// The slowest status across departments, `PENDING` when there are none.
pub fn aggregate_department_status(department_statuses: &BTreeMap<u64, Status>) -> Status {
    department_statuses
        .values()
        .copied()
        .min_by_key(|&s| stage_index(s))
        .unwrap_or(Status::Pending)
}

/// Progress indicator position in percent.
pub fn progress_bar_position(status: Status) -> f64 {
    stage_index(status) as f64 / (STAGE_ORDER.len() - 1) as f64 * 100.0
}

/// Overall status of a task: the department aggregate for department-scoped
/// tasks, the task's own status otherwise.
///
/// Every listed department takes part, so one the backend has not reported
/// yet holds the aggregate at `PENDING`.
pub fn effective_status(task: &Task) -> Status {
    match task.scope() {
        TaskScope::Departments => {
            let statuses: BTreeMap<u64, Status> = task
                .department_ids
                .iter()
                .map(|&id| (id, task.department_status(id)))
                .collect();
            aggregate_department_status(&statuses)
        }
        TaskScope::Users | TaskScope::Unassigned => task.status,
    }
}

/// Uppercase wire name, as shown in tables.
pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pending => "PENDING",
        Status::Accepted => "ACCEPTED",
        Status::InProgress => "IN_PROGRESS",
        Status::Waiting => "WAITING",
        Status::Completed => "COMPLETED",
    }
}

pub fn display_label(status: DisplayStatus) -> &'static str {
    status_label(status.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(pairs: &[(u64, Status)]) -> BTreeMap<u64, Status> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_normalize_display_status() {
        assert_eq!(normalize_display_status(Status::Pending), DisplayStatus::InProgress);
        assert_eq!(normalize_display_status(Status::Accepted), DisplayStatus::InProgress);
        assert_eq!(normalize_display_status(Status::InProgress), DisplayStatus::InProgress);
        assert_eq!(normalize_display_status(Status::Waiting), DisplayStatus::Waiting);
        assert_eq!(normalize_display_status(Status::Completed), DisplayStatus::Completed);
    }

    #[test]
    fn test_aggregate_takes_slowest_department() {
        let m = statuses(&[(1, Status::InProgress), (2, Status::Pending)]);
        assert_eq!(aggregate_department_status(&m), Status::Pending);

        // IN_PROGRESS sits before WAITING in the stage order.
        let m = statuses(&[(1, Status::Waiting), (2, Status::InProgress)]);
        assert_eq!(aggregate_department_status(&m), Status::InProgress);

        let m = statuses(&[(1, Status::Completed), (2, Status::Waiting)]);
        assert_eq!(aggregate_department_status(&m), Status::Waiting);
    }

    #[test]
    fn test_aggregate_of_nothing_is_pending() {
        assert_eq!(aggregate_department_status(&BTreeMap::new()), Status::Pending);
    }

    #[test]
    fn test_progress_bar_position() {
        assert_eq!(progress_bar_position(Status::Pending), 0.0);
        assert_eq!(progress_bar_position(Status::Accepted), 25.0);
        assert_eq!(progress_bar_position(Status::InProgress), 50.0);
        assert_eq!(progress_bar_position(Status::Waiting), 75.0);
        assert_eq!(progress_bar_position(Status::Completed), 100.0);
    }

    #[test]
    fn test_stage_order_matches_index() {
        for (i, s) in STAGE_ORDER.iter().enumerate() {
            assert_eq!(stage_index(*s), i);
        }
    }

    #[test]
    fn test_effective_status_counts_unreported_departments() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "taskId": 1,
            "title": "Inventory",
            "status": "IN_PROGRESS",
            "departmentIds": [1, 2],
            "departmentStatuses": {"1": "COMPLETED"}
        }))
        .unwrap();
        assert_eq!(effective_status(&task), Status::Pending);

        let direct: Task = serde_json::from_value(serde_json::json!({
            "taskId": 2,
            "title": "Call supplier",
            "status": "WAITING",
            "assignedUserIds": [5]
        }))
        .unwrap();
        assert_eq!(effective_status(&direct), Status::Waiting);
    }
}
