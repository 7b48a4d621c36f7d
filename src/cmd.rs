//! Command implementations for the CLI interface.
//!
//! This module contains the handlers behind each `tb` subcommand. Handlers
//! validate input locally, call the backend through the service traits and
//! print the result; errors are returned to `main` which shows them.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::auth::{AuthContext, UserProfile};
use crate::board::DepartmentProgressBoard;
use crate::config::Config;
use crate::db::*;
use crate::deadline::classify_task;
use crate::error::AppError;
use crate::fields::*;
use crate::recurrence::{group_tasks, matches_definition};
use crate::service::{
    delete_attachment_tolerant, upload_attachments, AttachmentService, CommentService, TaskService, UploadReport,
};
use crate::sorter::sort_tasks;
use crate::status::{display_label, effective_status, normalize_display_status, progress_bar_position, status_label};
use crate::task::{Task, TaskDraft};
use crate::tui::board_run::run_board_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as a user from the snapshot.
    Login {
        /// User ID.
        user_id: u64,
    },

    /// Clear the stored session.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// List tasks ordered by urgency.
    List {
        /// Only tasks with this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Ordering. Defaults to overdue-first with --mine, deadline-first otherwise.
        #[arg(long, value_enum)]
        variant: Option<SortVariant>,
        /// Only tasks assigned to me, my department, or created by me.
        #[arg(long)]
        mine: bool,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show tasks grouped under their recurring definitions.
    Groups {
        /// Only tasks with this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// View a single task.
    View {
        /// Task ID.
        id: u64,
    },

    /// Change the status of a task assigned directly to users.
    Status {
        /// Task ID.
        id: u64,
        /// New status: in-progress | waiting | completed.
        #[arg(value_enum)]
        status: Status,
        /// Required when the new status is waiting.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Change one department's status on a task.
    DeptStatus {
        /// Task ID.
        id: u64,
        /// Department ID.
        department: u64,
        /// New status: accepted | in-progress | waiting | completed.
        #[arg(value_enum)]
        status: Status,
        /// Required when the new status is waiting.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Create a task.
    Create {
        /// Task title.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Start: "now", "today", "in 2d", YYYY-MM-DD or ISO-8601. Defaults to now.
        #[arg(long)]
        start: Option<String>,
        /// Deadline, same formats as --start.
        #[arg(long)]
        end: Option<String>,
        /// Department ID. May be repeated.
        #[arg(long = "department")]
        departments: Vec<u64>,
        /// User ID. May be repeated.
        #[arg(long = "user")]
        users: Vec<u64>,
        /// File to attach. May be repeated.
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },

    /// Attach files to a task.
    Attach {
        /// Task ID.
        id: u64,
        /// Files to upload, one after another.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete an attachment.
    Detach {
        /// Attachment ID.
        attachment_id: u64,
    },

    /// Comment on a task.
    Comment {
        /// Task ID.
        id: u64,
        /// Comment text.
        text: String,
    },

    /// Delete a comment.
    Uncomment {
        /// Comment ID.
        comment_id: u64,
    },

    /// Manage recurring task definitions.
    Recurring {
        #[command(subcommand)]
        action: RecurringAction,
    },

    /// Open the interactive department board for a task.
    Board {
        /// Task ID.
        id: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring definitions.
    List,
    /// Resume generating instances.
    Activate {
        /// Recurring task ID.
        id: u64,
    },
    /// Stop generating instances. Existing instances are kept.
    Deactivate {
        /// Recurring task ID.
        id: u64,
    },
}

/// Log in as a snapshot user and persist the session.
pub fn cmd_login(service: &SnapshotService, auth: &mut AuthContext, cfg: &Config, user_id: u64) -> Result<(), AppError> {
    let user = service
        .database()
        .user(user_id)
        .ok_or_else(|| AppError::BadInput(format!("No user with ID {user_id}")))?;
    let profile = UserProfile {
        id: user.user_id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        roles: user.roles.clone(),
    };
    let token = format!("snapshot-{}-{}", user.user_id, Utc::now().timestamp());
    auth.login(token, profile);
    auth.save(&cfg.session_path)?;
    println!("Logged in as {} ({})", user.display_name, user.username);
    Ok(())
}

pub fn cmd_logout(auth: &mut AuthContext, cfg: &Config) -> Result<(), AppError> {
    auth.logout();
    auth.save(&cfg.session_path)?;
    println!("Logged out");
    Ok(())
}

pub fn cmd_whoami(auth: &AuthContext) -> Result<(), AppError> {
    let user = auth.require_user()?;
    let roles: Vec<&str> = user.roles.iter().map(|&r| format_role(r)).collect();
    println!("{} ({}) #{} [{}]", user.display_name, user.username, user.id, roles.join(", "));
    Ok(())
}

/// Tasks that concern a user: assigned to them, to their department, or
/// created by them.
pub fn is_my_task(task: &Task, user_id: u64, department_id: Option<u64>) -> bool {
    task.assigned_user_ids.contains(&user_id)
        || department_id.is_some_and(|d| task.department_ids.contains(&d))
        || task.director_id == Some(user_id)
}

/// List tasks with optional filtering, ordered by urgency.
pub fn cmd_list(
    service: &SnapshotService,
    auth: &AuthContext,
    status: Option<Status>,
    variant: Option<SortVariant>,
    mine: bool,
    limit: Option<usize>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut tasks = service.list_tasks()?;
    if let Some(s) = status {
        tasks.retain(|t| t.status == s);
    }
    if mine {
        let me = auth.require_user()?;
        let my_department = service.database().user(me.id).and_then(|u| u.department_id);
        tasks.retain(|t| is_my_task(t, me.id, my_department));
    }

    let variant = variant.unwrap_or(if mine {
        SortVariant::OverdueFirst
    } else {
        SortVariant::DeadlineFirst
    });
    let mut sorted = sort_tasks(&tasks, now, variant);
    if let Some(n) = limit {
        sorted.truncate(n);
    }
    if sorted.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&sorted, now);
    Ok(())
}

/// Show recurring groups followed by the one-off tasks.
pub fn cmd_groups(service: &SnapshotService, status: Option<Status>, now: DateTime<Utc>) -> Result<(), AppError> {
    let tasks = service.list_tasks()?;
    let definitions = service.list_recurring_tasks()?;
    let grouping = group_tasks(&tasks, &definitions, status);

    for group in &grouping.groups {
        let def = group.definition;
        let counts: Vec<String> = group
            .status_counts()
            .iter()
            .map(|(s, n)| format!("{} {n}", status_label(*s)))
            .collect();
        println!(
            "== #{} {} ({}, {}) [{}]",
            def.recurring_task_id,
            def.title,
            def.describe_schedule(),
            if def.is_active { "active" } else { "inactive" },
            counts.join(", ")
        );
        print_table(&group.tasks, now);
        println!();
    }

    if !grouping.ungrouped.is_empty() {
        println!("== One-off tasks");
        print_table(&grouping.ungrouped, now);
    } else if grouping.groups.is_empty() {
        println!("No tasks.");
    }
    Ok(())
}

/// Text progress bar, 20 cells wide.
fn progress_bar(percent: f64) -> String {
    let filled = (percent / 5.0).round() as usize;
    format!("[{}{}] {:>3.0}%", "#".repeat(filled), ".".repeat(20 - filled.min(20)), percent)
}

/// View detailed information about a task.
pub fn cmd_view(service: &mut SnapshotService, auth: &AuthContext, id: u64, now: DateTime<Utc>) -> Result<(), AppError> {
    let (task, rows, department_choices, direct_choices) = {
        let board = DepartmentProgressBoard::open(&mut *service, id)?;
        let first_department = board.task().department_ids.first().copied();
        (
            board.task().clone(),
            board.rows(),
            first_department.map(|d| board.choices(Some(d))).unwrap_or_default(),
            board.choices(None),
        )
    };
    let aggregate = effective_status(&task);
    let class = classify_task(&task, now);

    println!("Task #{}: {}", task.task_id, task.title);
    println!(
        "Status:      {} ({})",
        display_label(normalize_display_status(task.status)),
        status_label(task.status)
    );
    println!("Progress:    {} {}", progress_bar(progress_bar_position(aggregate)), status_label(aggregate));
    if let Some(p) = task.progress {
        println!("Reported:    {p}%");
    }
    println!(
        "Deadline:    {} {}",
        format_due_relative(task.end_date, now),
        match class {
            DeadlineClass::Overdue => "(overdue)",
            DeadlineClass::NearDeadline => "(due soon)",
            DeadlineClass::Normal => "",
        }
    );
    if let Some(director) = task.director_id.and_then(|d| service.database().user(d)) {
        println!("Director:    {}", director.display_name);
    }
    println!("Description: {}", task.description.as_deref().unwrap_or("-"));

    let definitions = service.list_recurring_tasks()?;
    if let Some(def) = definitions.iter().find(|d| matches_definition(&task, d)) {
        println!("Recurring:   #{} {}", def.recurring_task_id, def.describe_schedule());
    }

    match task.scope() {
        TaskScope::Departments => {
            println!();
            println!("{:<6} {:<20} {:<12} {}", "Dept", "Name", "Status", "Reason");
            for row in &rows {
                println!(
                    "{:<6} {:<20} {:<12} {}",
                    row.department_id,
                    truncate(&row.name, 20),
                    status_label(row.status),
                    row.waiting_reason.as_deref().unwrap_or("")
                );
            }
            let choices: Vec<&str> = department_choices.into_iter().map(status_label).collect();
            println!("Departments may move to: {}", choices.join(", "));
        }
        TaskScope::Users => {
            println!("Assigned:    {}", task.assigned_user_names.join(", "));
            if let Some(reason) = &task.waiting_reason {
                println!("Waiting on:  {reason}");
            }
            if direct_choices.is_empty() {
                println!("Next status: none (completed)");
            } else {
                let choices: Vec<&str> = direct_choices.into_iter().map(status_label).collect();
                println!("Next status: {}", choices.join(", "));
            }
        }
        TaskScope::Unassigned => println!("Assigned:    -"),
    }

    let attachments = service.list_attachments(id)?;
    if !attachments.is_empty() {
        println!();
        println!("Attachments:");
        for a in attachments {
            let mine = if auth.can_delete_attachment(&a) { " *" } else { "" };
            println!("  #{} {} ({} bytes){mine}", a.attachment_id, a.file_name, a.size);
        }
    }

    let comments = service.list_comments(id)?;
    if !comments.is_empty() {
        println!();
        println!("Comments:");
        for c in comments {
            let author = service
                .database()
                .user(c.author_id)
                .map(|u| u.display_name.clone())
                .unwrap_or_else(|| format!("user {}", c.author_id));
            println!("  #{} {} ({}): {}", c.comment_id, author, c.created_at.format("%Y-%m-%d %H:%M"), c.content);
        }
    }
    Ok(())
}

/// Change the status of a directly assigned task.
pub fn cmd_status(
    service: &mut SnapshotService,
    auth: &AuthContext,
    id: u64,
    status: Status,
    reason: Option<String>,
) -> Result<(), AppError> {
    auth.require_user()?;
    let mut board = DepartmentProgressBoard::open(service, id)?;
    board.change_task_status(status, reason.as_deref())?;
    println!(
        "Task {} is now {}",
        id,
        display_label(normalize_display_status(board.task().status))
    );
    Ok(())
}

/// Change one department's status.
pub fn cmd_dept_status(
    service: &mut SnapshotService,
    auth: &AuthContext,
    id: u64,
    department: u64,
    status: Status,
    reason: Option<String>,
) -> Result<(), AppError> {
    auth.require_user()?;
    let mut board = DepartmentProgressBoard::open(service, id)?;
    board.change_department_status(department, status, reason.as_deref())?;
    println!(
        "{} is now {} (task progress {})",
        board.task().department_name(department),
        status_label(status),
        status_label(board.aggregate())
    );
    Ok(())
}

fn require_planner(auth: &AuthContext) -> Result<&UserProfile, AppError> {
    let user = auth.require_user()?;
    if [Role::Director, Role::Manager, Role::SuperAdmin]
        .iter()
        .any(|&r| auth.has_role(r))
    {
        Ok(user)
    } else {
        Err(AppError::Forbidden("only directors and managers can do this".into()))
    }
}

fn parse_date_arg(raw: Option<&str>, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => parse_datetime_input(s, now)
            .map(Some)
            .ok_or_else(|| AppError::BadInput(format!("cannot parse date '{s}'"))),
    }
}

/// Print the outcome of an upload. Files that failed make the command fail
/// after the others have been attempted.
fn finish_upload(report: &UploadReport) -> Result<(), AppError> {
    for a in &report.uploaded {
        println!("Attached {} as #{}", a.file_name, a.attachment_id);
    }
    for (path, e) in &report.failed {
        eprintln!("Failed to attach {}: {}", path.display(), e.user_message());
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(AppError::BadInput(format!("{} file(s) could not be attached", report.failed.len())))
    }
}

/// Create a task and upload its attachments.
#[allow(clippy::too_many_arguments)]
pub fn cmd_create(
    service: &mut SnapshotService,
    auth: &AuthContext,
    title: String,
    desc: Option<String>,
    start: Option<String>,
    end: Option<String>,
    departments: Vec<u64>,
    users: Vec<u64>,
    attachments: Vec<PathBuf>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let me = require_planner(auth)?;
    let draft = TaskDraft {
        title,
        description: desc,
        start_date: parse_date_arg(start.as_deref(), now)?.or(Some(now)),
        end_date: parse_date_arg(end.as_deref(), now)?,
        department_ids: departments,
        assigned_user_ids: users,
    };
    draft.validate().map_err(AppError::InvalidForm)?;

    let task = service.create_task(&draft, me.id)?;
    println!("Created task {}", task.task_id);

    if !attachments.is_empty() {
        let report = upload_attachments(service, task.task_id, &attachments, me.id);
        finish_upload(&report)?;
    }
    Ok(())
}

/// Upload files to a task one at a time.
pub fn cmd_attach(service: &mut SnapshotService, auth: &AuthContext, id: u64, files: Vec<PathBuf>) -> Result<(), AppError> {
    let me = auth.require_user()?;
    service.get_task(id)?;
    let report = upload_attachments(service, id, &files, me.id);
    finish_upload(&report)
}

/// Delete an attachment owned by the current user.
pub fn cmd_detach(service: &mut SnapshotService, auth: &AuthContext, attachment_id: u64) -> Result<(), AppError> {
    auth.require_user()?;
    // An unknown ID is an error here; only the delete itself may find the
    // attachment already gone.
    let attachment = service.get_attachment(attachment_id)?;
    if !auth.can_delete_attachment(&attachment) {
        return Err(AppError::Forbidden("you can only delete your own attachments".into()));
    }
    delete_attachment_tolerant(service, attachment_id)?;
    println!("Attachment {attachment_id} deleted");
    Ok(())
}

pub fn cmd_comment(service: &mut SnapshotService, auth: &AuthContext, id: u64, text: String) -> Result<(), AppError> {
    let me = auth.require_user()?;
    let comment = service.add_comment(id, me.id, &text)?;
    println!("Added comment {}", comment.comment_id);
    Ok(())
}

pub fn cmd_uncomment(service: &mut SnapshotService, auth: &AuthContext, comment_id: u64) -> Result<(), AppError> {
    auth.require_user()?;
    let comment = service.get_comment(comment_id)?;
    if !auth.can_delete_comment(&comment) {
        return Err(AppError::Forbidden("you can only delete your own comments".into()));
    }
    service.delete_comment(comment_id)?;
    println!("Comment {comment_id} deleted");
    Ok(())
}

/// Handle recurring definition commands.
pub fn cmd_recurring(service: &mut SnapshotService, auth: &AuthContext, action: RecurringAction) -> Result<(), AppError> {
    match action {
        RecurringAction::List => {
            let tasks = service.list_tasks()?;
            let definitions = service.list_recurring_tasks()?;
            if definitions.is_empty() {
                println!("No recurring tasks.");
                return Ok(());
            }
            let grouping = group_tasks(&tasks, &definitions, None);
            println!("{:<5} {:<9} {:<18} {:<9} {}", "ID", "State", "Schedule", "Instances", "Title");
            for def in &definitions {
                let instances = grouping
                    .groups
                    .iter()
                    .find(|g| g.definition.recurring_task_id == def.recurring_task_id)
                    .map_or(0, |g| g.tasks.len());
                println!(
                    "{:<5} {:<9} {:<18} {:<9} {}",
                    def.recurring_task_id,
                    if def.is_active { "active" } else { "inactive" },
                    def.describe_schedule(),
                    instances,
                    def.title
                );
            }
            Ok(())
        }
        RecurringAction::Activate { id } => set_recurring(service, auth, id, true),
        RecurringAction::Deactivate { id } => set_recurring(service, auth, id, false),
    }
}

fn set_recurring(service: &mut SnapshotService, auth: &AuthContext, id: u64, active: bool) -> Result<(), AppError> {
    require_planner(auth)?;
    let def = service.set_recurring_active(id, active)?;
    println!(
        "Recurring task {} \"{}\" {}",
        def.recurring_task_id,
        def.title,
        if def.is_active { "activated" } else { "deactivated" }
    );
    Ok(())
}

/// Launch the department board.
pub fn cmd_board(service: &mut SnapshotService, auth: &AuthContext, id: u64) -> Result<(), AppError> {
    auth.require_user()?;
    run_board_tui(service, id)?;
    Ok(())
}

/// Session commands work without reading the snapshot.
pub fn needs_snapshot(command: &Commands) -> bool {
    !matches!(command, Commands::Logout | Commands::Whoami | Commands::Completions { .. })
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn task(json: serde_json::Value) -> Task {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_is_my_task() {
        let direct = task(serde_json::json!({
            "taskId": 1, "title": "a", "status": "PENDING", "directorId": 1, "assignedUserIds": [5]
        }));
        let dept = task(serde_json::json!({
            "taskId": 2, "title": "b", "status": "PENDING", "directorId": 1, "departmentIds": [10]
        }));
        assert!(is_my_task(&direct, 5, None));
        assert!(!is_my_task(&direct, 6, Some(10)));
        assert!(is_my_task(&dept, 6, Some(10)));
        assert!(is_my_task(&dept, 1, None));
    }

    fn logged_in(id: u64, roles: Vec<Role>) -> AuthContext {
        let mut auth = AuthContext::default();
        auth.login("t".into(), UserProfile {
            id,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            roles,
        });
        auth
    }

    #[test]
    fn test_detach_unknown_attachment_is_not_found() {
        let mut service = SnapshotService::in_memory(Database::default());
        let auth = logged_in(5, vec![Role::User]);
        match cmd_detach(&mut service, &auth, 999).unwrap_err() {
            AppError::Api(e) => assert_eq!(e.status, 404),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_detach_checks_owner() {
        let db: Database = serde_json::from_value(serde_json::json!({
            "tasks": [{"taskId": 1, "title": "a", "status": "PENDING", "assignedUserIds": [5]}],
            "attachments": [{
                "attachmentId": 3, "taskId": 1, "fileName": "plan.pdf",
                "uploadedBy": 6, "uploadedAt": "2024-05-10T12:00:00Z"
            }]
        }))
        .unwrap();
        let mut service = SnapshotService::in_memory(db);

        let err = cmd_detach(&mut service, &logged_in(5, vec![Role::User]), 3).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        cmd_detach(&mut service, &logged_in(6, vec![Role::User]), 3).unwrap();
        assert!(service.list_attachments(1).unwrap().is_empty());
    }

    #[test]
    fn test_session_commands_skip_snapshot() {
        assert!(!needs_snapshot(&Commands::Logout));
        assert!(!needs_snapshot(&Commands::Whoami));
        assert!(needs_snapshot(&Commands::Login { user_id: 1 }));
        assert!(needs_snapshot(&Commands::View { id: 1 }));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), format!("[{}]   0%", ".".repeat(20)));
        assert_eq!(progress_bar(50.0), format!("[{}{}]  50%", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(100.0), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn test_blank_waiting_reason_rejected_before_saving() {
        let db: Database = serde_json::from_value(serde_json::json!({
            "users": [{"userId": 5, "username": "kim", "displayName": "Kim", "roles": ["USER"]}],
            "tasks": [{"taskId": 1, "title": "a", "status": "IN_PROGRESS", "assignedUserIds": [5]}]
        }))
        .unwrap();
        let mut service = SnapshotService::in_memory(db);
        let mut auth = AuthContext::default();
        auth.login("t".into(), UserProfile {
            id: 5,
            username: "kim".into(),
            display_name: "Kim".into(),
            roles: vec![Role::User],
        });

        let err = cmd_status(&mut service, &auth, 1, Status::Waiting, Some(" ".into())).unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::BlankWaitingReason)));
        assert_eq!(service.get_task(1).unwrap().status, Status::InProgress);

        cmd_status(&mut service, &auth, 1, Status::Waiting, Some("Parts on order".into())).unwrap();
        let task = service.get_task(1).unwrap();
        assert_eq!(task.status, Status::Waiting);
        assert_eq!(task.waiting_reason.as_deref(), Some("Parts on order"));
    }

    #[test]
    fn test_create_requires_planner_and_valid_form() {
        let mut service = SnapshotService::in_memory(Database::default());
        let mut auth = AuthContext::default();
        auth.login("t".into(), UserProfile {
            id: 5,
            username: "kim".into(),
            display_name: "Kim".into(),
            roles: vec![Role::User],
        });
        let now = Utc::now();
        let err = cmd_create(&mut service, &auth, "x".into(), None, None, None, vec![], vec![5], vec![], now)
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut director = AuthContext::default();
        director.login("t".into(), UserProfile {
            id: 1,
            username: "dana".into(),
            display_name: "Dana".into(),
            roles: vec![Role::Director],
        });
        let err = cmd_create(
            &mut service,
            &director,
            " ".into(),
            None,
            Some("in 2d".into()),
            Some("in 1d".into()),
            vec![],
            vec![],
            vec![],
            now,
        )
        .unwrap_err();
        match err {
            AppError::InvalidForm(errors) => assert_eq!(
                errors,
                vec![
                    ValidationError::EmptyTitle,
                    ValidationError::EndNotAfterStart,
                    ValidationError::NoAssignee
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.list_tasks().unwrap().is_empty());
    }
}
