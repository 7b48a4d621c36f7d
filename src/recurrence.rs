//! Grouping of task instances under their recurring definitions.
//!
//! Instances generated from a recurring definition are independent tasks.
//! When the backend stamps an instance with `recurringTaskId` that link is
//! used. Otherwise an instance is correlated to a definition by equal title,
//! description (missing treated as empty) and owning director. Two unrelated
//! tasks with the same title and description under one director are
//! therefore grouped together.

use std::collections::HashSet;

use crate::fields::Status;
use crate::task::{RecurringTaskDefinition, Task, TaskGroup};

/// Result of [`group_tasks`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<'a> {
    pub groups: Vec<TaskGroup<'a>>,
    pub ungrouped: Vec<&'a Task>,
}

/// Does `task` belong to `definition`?
pub fn matches_definition(task: &Task, definition: &RecurringTaskDefinition) -> bool {
    if let Some(id) = task.recurring_task_id {
        return id == definition.recurring_task_id;
    }
    task.title == definition.title
        && task.description.as_deref().unwrap_or("") == definition.description.as_deref().unwrap_or("")
        && task.director_id == definition.director_id
}

/// Partition tasks into recurring groups and the remaining one-off tasks.
///
/// Definitions are visited in order and a task joins the first one it
/// matches. Definitions without matching tasks produce no group.
pub fn group_tasks<'a>(
    tasks: &'a [Task],
    definitions: &'a [RecurringTaskDefinition],
    status_filter: Option<Status>,
) -> Grouping<'a> {
    let filtered: Vec<&Task> = tasks
        .iter()
        .filter(|t| status_filter.map_or(true, |s| t.status == s))
        .collect();

    if definitions.is_empty() {
        return Grouping {
            groups: Vec::new(),
            ungrouped: filtered,
        };
    }

    let mut claimed: HashSet<u64> = HashSet::new();
    let mut groups = Vec::new();
    for definition in definitions {
        let matching: Vec<&Task> = filtered
            .iter()
            .copied()
            .filter(|t| !claimed.contains(&t.task_id) && matches_definition(t, definition))
            .collect();
        if matching.is_empty() {
            continue;
        }
        claimed.extend(matching.iter().map(|t| t.task_id));
        groups.push(TaskGroup {
            definition,
            tasks: matching,
        });
    }

    let ungrouped = filtered
        .into_iter()
        .filter(|t| !claimed.contains(&t.task_id))
        .collect();

    Grouping { groups, ungrouped }
}
