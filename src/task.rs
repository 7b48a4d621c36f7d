//! Task data structures and related functionality.
//!
//! This module defines the backend resources the client works with: tasks,
//! recurring task definitions, departments, users, attachments and comments,
//! plus the `TaskDraft` used by the create form.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::fields::*;

/// A work item as served by the task backend.
///
/// A task is either department-scoped (`department_ids` non-empty, one status
/// per department) or assigned directly to users with a single status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "iso_datetime::deserialize_opt")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "iso_datetime::deserialize_opt")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: Status,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub director_id: Option<u64>,
    #[serde(default)]
    pub recurring_task_id: Option<u64>,
    #[serde(default)]
    pub department_ids: Vec<u64>,
    #[serde(default)]
    pub department_names: Vec<String>,
    #[serde(default)]
    pub department_statuses: BTreeMap<u64, Status>,
    #[serde(default)]
    pub department_waiting_reasons: BTreeMap<u64, String>,
    #[serde(default)]
    pub assigned_user_ids: Vec<u64>,
    #[serde(default)]
    pub assigned_user_names: Vec<String>,
    /// Reason given when a directly assigned task was set to WAITING.
    #[serde(default)]
    pub waiting_reason: Option<String>,
    #[serde(default, deserialize_with = "iso_datetime::deserialize_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Which assignment model this task uses.
    pub fn scope(&self) -> TaskScope {
        if !self.department_ids.is_empty() {
            TaskScope::Departments
        } else if !self.assigned_user_ids.is_empty() {
            TaskScope::Users
        } else {
            TaskScope::Unassigned
        }
    }

    /// Status of one department's share. Departments the backend has not
    /// reported yet are pending.
    pub fn department_status(&self, department_id: u64) -> Status {
        self.department_statuses
            .get(&department_id)
            .copied()
            .unwrap_or(Status::Pending)
    }

    /// Display name of a department, falling back to its id.
    pub fn department_name(&self, department_id: u64) -> String {
        self.department_ids
            .iter()
            .position(|&id| id == department_id)
            .and_then(|i| self.department_names.get(i).cloned())
            .unwrap_or_else(|| format!("#{department_id}"))
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Template from which the backend periodically generates task instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTaskDefinition {
    pub recurring_task_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub director_id: Option<u64>,
    #[serde(default)]
    pub department_ids: Vec<u64>,
    #[serde(default)]
    pub assigned_user_ids: Vec<u64>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: u32,
    pub is_active: bool,
}

impl RecurringTaskDefinition {
    /// Human readable schedule, e.g. "every 2 weeks".
    pub fn describe_schedule(&self) -> String {
        let unit = match self.recurrence_type {
            RecurrenceType::Minutely => "minute",
            RecurrenceType::Hourly => "hour",
            RecurrenceType::Daily => "day",
            RecurrenceType::Weekly => "week",
            RecurrenceType::Monthly => "month",
        };
        if self.recurrence_interval == 1 {
            format!("every {unit}")
        } else {
            format!("every {} {unit}s", self.recurrence_interval)
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recurrence_interval == 0 {
            return Err(ValidationError::InvalidRecurrenceInterval);
        }
        Ok(())
    }
}

/// A recurring definition paired with the task instances generated from it.
/// Derived on every load and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroup<'a> {
    pub definition: &'a RecurringTaskDefinition,
    pub tasks: Vec<&'a Task>,
}

impl TaskGroup<'_> {
    /// Number of instances in each status, in stage order.
    pub fn status_counts(&self) -> Vec<(Status, usize)> {
        crate::status::STAGE_ORDER
            .iter()
            .map(|&s| (s, self.tasks.iter().filter(|t| t.status == s).count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub department_id: Option<u64>,
}

/// File attached to a task, or to a comment on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub attachment_id: u64,
    pub task_id: u64,
    #[serde(default)]
    pub comment_id: Option<u64>,
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
    pub uploaded_by: u64,
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: u64,
    pub task_id: u64,
    pub author_id: u64,
    pub content: String,
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Input of the create-task form, validated before anything is sent.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub department_ids: Vec<u64>,
    pub assigned_user_ids: Vec<u64>,
}

impl TaskDraft {
    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::EmptyTitle);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end <= start {
                errors.push(ValidationError::EndNotAfterStart);
            }
        }
        if self.department_ids.is_empty() && self.assigned_user_ids.is_empty() {
            errors.push(ValidationError::NoAssignee);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// ISO-8601 parsing for backend timestamps. Offsets are honoured; timestamps
/// without one are taken as UTC.
pub mod iso_datetime {
    use super::*;

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        }
    }
}
