//! Department progress board: per-department status transitions.
//!
//! Two update paths exist and they deliberately differ:
//!
//! - a directly assigned task moves forward only, over the reduced order
//!   `IN_PROGRESS -> WAITING -> COMPLETED`, and stops at `COMPLETED`;
//! - a department's share may be set to any non-pending status at any time.
//!
//! A change to `WAITING` needs a reason. Everything is checked locally before
//! the backend is called, and after a successful call the task is reloaded
//! before the board accepts the next change.

use chrono::{DateTime, Utc};

use crate::deadline::classify_task;
use crate::error::{BoardError, ValidationError};
use crate::fields::{DeadlineClass, DisplayStatus, Status, TaskScope, TransitionPolicy};
use crate::service::TaskService;
use crate::status::{effective_status, normalize_display_status, progress_bar_position};
use crate::task::Task;

/// Forward order offered on the direct-assignment path.
pub const DIRECT_ORDER: [Status; 3] = [Status::InProgress, Status::Waiting, Status::Completed];

/// Choices on the department path, regardless of the current status.
pub const DEPARTMENT_CHOICES: [Status; 4] = [
    Status::Accepted,
    Status::InProgress,
    Status::Waiting,
    Status::Completed,
];

/// Statuses a user may pick next.
pub fn offered_statuses(policy: TransitionPolicy, current: Status) -> Vec<Status> {
    match policy {
        TransitionPolicy::DepartmentStatus => DEPARTMENT_CHOICES.to_vec(),
        TransitionPolicy::DirectAssignment => {
            let from: Status = normalize_display_status(current).into();
            DIRECT_ORDER
                .iter()
                .skip_while(|&&s| s != from)
                .skip(1)
                .copied()
                .collect()
        }
    }
}

/// A validated status change, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub target: Status,
    pub waiting_reason: Option<String>,
}

impl StatusChange {
    /// `WAITING` requires a non-blank reason, stored trimmed. Any other target
    /// clears the reason.
    pub fn new(target: Status, reason: Option<&str>) -> Result<Self, ValidationError> {
        let waiting_reason = match target {
            Status::Waiting => {
                let reason = reason.map(str::trim).unwrap_or("");
                if reason.is_empty() {
                    return Err(ValidationError::BlankWaitingReason);
                }
                Some(reason.to_string())
            }
            _ => None,
        };
        Ok(StatusChange {
            target,
            waiting_reason,
        })
    }
}

/// One line of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentRow {
    pub department_id: u64,
    pub name: String,
    pub status: Status,
    pub waiting_reason: Option<String>,
    pub position: f64,
}

/// Interactive view over one task.
pub struct DepartmentProgressBoard<'s, S: TaskService + ?Sized> {
    service: &'s mut S,
    task: Task,
}

impl<'s, S: TaskService + ?Sized> DepartmentProgressBoard<'s, S> {
    pub fn open(service: &'s mut S, task_id: u64) -> Result<Self, BoardError> {
        let task = service.get_task(task_id)?;
        Ok(DepartmentProgressBoard { service, task })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn scope(&self) -> TaskScope {
        self.task.scope()
    }

    /// Department lines in assignment order.
    pub fn rows(&self) -> Vec<DepartmentRow> {
        self.task
            .department_ids
            .iter()
            .map(|&id| {
                let status = self.task.department_status(id);
                DepartmentRow {
                    department_id: id,
                    name: self.task.department_name(id),
                    status,
                    waiting_reason: self.task.department_waiting_reasons.get(&id).cloned(),
                    position: progress_bar_position(status),
                }
            })
            .collect()
    }

    /// The slowest department, or the task's own status.
    pub fn aggregate(&self) -> Status {
        effective_status(&self.task)
    }

    pub fn badge(&self) -> DisplayStatus {
        normalize_display_status(self.task.status)
    }

    pub fn progress(&self) -> f64 {
        progress_bar_position(self.aggregate())
    }

    pub fn deadline(&self, now: DateTime<Utc>) -> DeadlineClass {
        classify_task(&self.task, now)
    }

    /// Choices for a department, or for the task itself when it is directly
    /// assigned (`department_id = None`).
    pub fn choices(&self, department_id: Option<u64>) -> Vec<Status> {
        match department_id {
            Some(id) => offered_statuses(TransitionPolicy::DepartmentStatus, self.task.department_status(id)),
            None => offered_statuses(TransitionPolicy::DirectAssignment, self.task.status),
        }
    }

    pub fn change_department_status(
        &mut self,
        department_id: u64,
        target: Status,
        reason: Option<&str>,
    ) -> Result<(), BoardError> {
        if self.task.scope() != TaskScope::Departments {
            return Err(ValidationError::WrongScope("assigned to departments").into());
        }
        if !self.task.department_ids.contains(&department_id) {
            return Err(ValidationError::UnknownDepartment(department_id).into());
        }
        let from = self.task.department_status(department_id);
        if !self.choices(Some(department_id)).contains(&target) {
            return Err(ValidationError::StatusNotOffered { from, to: target }.into());
        }
        let change = StatusChange::new(target, reason)?;

        tracing::info!(task_id = self.task.task_id, department_id, ?from, to = ?target, "changing department status");
        self.service
            .update_department_status(self.task.task_id, department_id, change.target, change.waiting_reason)?;
        self.reload()
    }

    pub fn change_task_status(&mut self, target: Status, reason: Option<&str>) -> Result<(), BoardError> {
        if self.task.scope() != TaskScope::Users {
            return Err(ValidationError::WrongScope("assigned to users").into());
        }
        let from = self.task.status;
        if !self.choices(None).contains(&target) {
            return Err(ValidationError::StatusNotOffered { from, to: target }.into());
        }
        let change = StatusChange::new(target, reason)?;

        tracing::info!(task_id = self.task.task_id, ?from, to = ?target, "changing task status");
        self.service
            .update_task_status(self.task.task_id, change.target, change.waiting_reason)?;
        self.reload()
    }

    /// Fetch the task again from the backend.
    pub fn reload(&mut self) -> Result<(), BoardError> {
        self.task = self.service.get_task(self.task.task_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::ApiError;
    use crate::task::{RecurringTaskDefinition, TaskDraft};

    /// Records every update call and applies it to an in-memory task list.
    #[derive(Default)]
    struct RecordingService {
        tasks: Vec<Task>,
        updates: Vec<(u64, Option<u64>, Status, Option<String>)>,
    }

    impl TaskService for RecordingService {
        fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
            Ok(self.tasks.clone())
        }

        fn get_task(&self, task_id: u64) -> Result<Task, ApiError> {
            self.tasks
                .iter()
                .find(|t| t.task_id == task_id)
                .cloned()
                .ok_or_else(|| ApiError::not_found(format!("Task {task_id}")))
        }

        fn list_recurring_tasks(&self) -> Result<Vec<RecurringTaskDefinition>, ApiError> {
            Ok(Vec::new())
        }

        fn create_task(&mut self, _draft: &TaskDraft, _director_id: u64) -> Result<Task, ApiError> {
            Err(ApiError::new(501, "not supported"))
        }

        fn update_task_status(&mut self, task_id: u64, status: Status, reason: Option<String>) -> Result<(), ApiError> {
            self.updates.push((task_id, None, status, reason.clone()));
            if let Some(t) = self.tasks.iter_mut().find(|t| t.task_id == task_id) {
                t.status = status;
                t.waiting_reason = reason;
            }
            Ok(())
        }

        fn update_department_status(
            &mut self,
            task_id: u64,
            department_id: u64,
            status: Status,
            reason: Option<String>,
        ) -> Result<(), ApiError> {
            self.updates.push((task_id, Some(department_id), status, reason.clone()));
            if let Some(t) = self.tasks.iter_mut().find(|t| t.task_id == task_id) {
                t.department_statuses.insert(department_id, status);
                match reason {
                    Some(r) => t.department_waiting_reasons.insert(department_id, r),
                    None => t.department_waiting_reasons.remove(&department_id),
                };
            }
            Ok(())
        }

        fn set_recurring_active(&mut self, id: u64, _active: bool) -> Result<RecurringTaskDefinition, ApiError> {
            Err(ApiError::not_found(format!("Recurring task {id}")))
        }
    }

    fn department_task() -> Task {
        Task {
            task_id: 1,
            title: "Year-end close".into(),
            description: None,
            start_date: None,
            end_date: None,
            status: Status::Pending,
            progress: None,
            director_id: Some(1),
            recurring_task_id: None,
            department_ids: vec![10, 20],
            department_names: vec!["Finance".into(), "Legal".into()],
            department_statuses: BTreeMap::from([(10, Status::InProgress), (20, Status::Pending)]),
            department_waiting_reasons: BTreeMap::new(),
            assigned_user_ids: vec![],
            assigned_user_names: vec![],
            waiting_reason: None,
            completed_at: None,
        }
    }

    fn direct_task(status: Status) -> Task {
        Task {
            task_id: 2,
            department_ids: vec![],
            department_names: vec![],
            department_statuses: BTreeMap::new(),
            assigned_user_ids: vec![7],
            assigned_user_names: vec!["Mia".into()],
            status,
            ..department_task()
        }
    }

    #[test]
    fn test_forward_only_offers() {
        let direct = TransitionPolicy::DirectAssignment;
        assert_eq!(offered_statuses(direct, Status::Waiting), vec![Status::Completed]);
        assert_eq!(offered_statuses(direct, Status::Pending), vec![Status::Waiting, Status::Completed]);
        assert_eq!(offered_statuses(direct, Status::Accepted), vec![Status::Waiting, Status::Completed]);
        assert_eq!(offered_statuses(direct, Status::InProgress), vec![Status::Waiting, Status::Completed]);
        assert!(offered_statuses(direct, Status::Completed).is_empty());
    }

    #[test]
    fn test_department_offers_ignore_current_status() {
        for s in crate::status::STAGE_ORDER {
            assert_eq!(offered_statuses(TransitionPolicy::DepartmentStatus, s), DEPARTMENT_CHOICES.to_vec());
        }
    }

    #[test]
    fn test_status_change_reason_rules() {
        assert_eq!(StatusChange::new(Status::Waiting, Some("  ")), Err(ValidationError::BlankWaitingReason));
        assert_eq!(StatusChange::new(Status::Waiting, None), Err(ValidationError::BlankWaitingReason));
        assert_eq!(
            StatusChange::new(Status::Waiting, Some("  vendor late ")).unwrap().waiting_reason,
            Some("vendor late".to_string())
        );
        assert_eq!(StatusChange::new(Status::Completed, Some("ignored")).unwrap().waiting_reason, None);
    }

    #[test]
    fn test_blank_reason_makes_no_call() {
        let mut service = RecordingService {
            tasks: vec![department_task()],
            ..Default::default()
        };
        let mut board = DepartmentProgressBoard::open(&mut service, 1).unwrap();
        let before = board.task().clone();

        let err = board.change_department_status(10, Status::Waiting, Some("   ")).unwrap_err();
        assert!(matches!(err, BoardError::Validation(ValidationError::BlankWaitingReason)));
        assert_eq!(board.task(), &before);
        drop(board);
        assert!(service.updates.is_empty());
    }

    #[test]
    fn test_department_change_reloads_task() {
        let mut service = RecordingService {
            tasks: vec![department_task()],
            ..Default::default()
        };
        let mut board = DepartmentProgressBoard::open(&mut service, 1).unwrap();
        assert_eq!(board.aggregate(), Status::Pending);
        assert_eq!(board.progress(), 0.0);

        board.change_department_status(20, Status::Waiting, Some("Awaiting contract")).unwrap();
        assert_eq!(board.aggregate(), Status::InProgress);
        let rows = board.rows();
        assert_eq!(rows[1].name, "Legal");
        assert_eq!(rows[1].status, Status::Waiting);
        assert_eq!(rows[1].waiting_reason.as_deref(), Some("Awaiting contract"));

        // Any other status clears the reason.
        board.change_department_status(20, Status::Accepted, None).unwrap();
        assert_eq!(board.rows()[1].waiting_reason, None);
        drop(board);
        assert_eq!(service.updates.len(), 2);
        assert_eq!(service.updates[1], (1, Some(20), Status::Accepted, None));
    }

    #[test]
    fn test_department_path_rejects_pending_and_unknown_department() {
        let mut service = RecordingService {
            tasks: vec![department_task()],
            ..Default::default()
        };
        let mut board = DepartmentProgressBoard::open(&mut service, 1).unwrap();
        assert!(matches!(
            board.change_department_status(10, Status::Pending, None),
            Err(BoardError::Validation(ValidationError::StatusNotOffered { .. }))
        ));
        assert!(matches!(
            board.change_department_status(99, Status::Accepted, None),
            Err(BoardError::Validation(ValidationError::UnknownDepartment(99)))
        ));
        assert!(matches!(
            board.change_task_status(Status::Completed, None),
            Err(BoardError::Validation(ValidationError::WrongScope(_)))
        ));
    }

    #[test]
    fn test_direct_path_is_forward_only_and_terminal() {
        let mut service = RecordingService {
            tasks: vec![direct_task(Status::Waiting)],
            ..Default::default()
        };
        let mut board = DepartmentProgressBoard::open(&mut service, 2).unwrap();
        assert_eq!(board.choices(None), vec![Status::Completed]);
        assert!(matches!(
            board.change_task_status(Status::InProgress, None),
            Err(BoardError::Validation(ValidationError::StatusNotOffered { .. }))
        ));

        board.change_task_status(Status::Completed, None).unwrap();
        assert_eq!(board.badge(), DisplayStatus::Completed);
        assert!(board.choices(None).is_empty());
        drop(board);
        assert_eq!(service.updates, vec![(2, None, Status::Completed, None)]);
    }
}
