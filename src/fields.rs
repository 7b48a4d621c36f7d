//! Enumerations and field types for task management.
//!
//! This module defines the closed vocabularies exchanged with the task backend
//! (statuses, roles, recurrence units) and the derived classifications the
//! client computes on top of them. Unknown wire values are rejected by serde
//! rather than carried around as raw strings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task or of one department's share of a task.
///
/// Variants are declared in stage order; see [`crate::status::STAGE_ORDER`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Accepted,
    InProgress,
    Waiting,
    Completed,
}

/// The status shown on a single badge. Pending and accepted work is presented
/// as in progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayStatus {
    InProgress,
    Waiting,
    Completed,
}

impl From<DisplayStatus> for Status {
    fn from(d: DisplayStatus) -> Self {
        match d {
            DisplayStatus::InProgress => Status::InProgress,
            DisplayStatus::Waiting => Status::Waiting,
            DisplayStatus::Completed => Status::Completed,
        }
    }
}

/// Organisational role of a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(alias = "ROLE_SUPER_ADMIN")]
    SuperAdmin,
    #[serde(alias = "ROLE_DIRECTOR")]
    Director,
    #[serde(alias = "ROLE_MANAGER")]
    Manager,
    #[serde(alias = "ROLE_USER")]
    User,
}

/// Unit of a recurring task schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Deadline highlighting of a task relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineClass {
    Overdue,
    NearDeadline,
    Normal,
}

/// Ordering applied to task lists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortVariant {
    /// Director view: near-deadline first, then by deadline.
    DeadlineFirst,
    /// "My tasks" view: overdue, then near-deadline, then the rest.
    OverdueFirst,
}

/// Which status update path a transition goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// A task assigned straight to users: forward-only over a reduced order.
    DirectAssignment,
    /// One department's share of a task: any non-pending status.
    DepartmentStatus,
}

/// Whether a task is tracked per department or assigned to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    Departments,
    Users,
    Unassigned,
}
