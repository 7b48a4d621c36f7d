//! Snapshot storage and utility functions for the task client.
//!
//! This module provides the `Database` struct holding a JSON snapshot of the
//! backend's resources, `SnapshotService` which answers the service traits
//! from that snapshot, and helpers for date input parsing, formatting and
//! table output.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, AppError};
use crate::fields::*;
use crate::service::{AttachmentService, CommentService, TaskService};
use crate::status::{display_label, effective_status, normalize_display_status, status_label};
use crate::task::{iso_datetime, Attachment, Comment, Department, RecurringTaskDefinition, Task, TaskDraft, User};

/// Snapshot of the backend resources.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub recurring_tasks: Vec<RecurringTaskDefinition>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Carried through untouched.
    #[serde(default)]
    pub evaluations: Vec<serde_json::Value>,
}

impl Database {
    /// Load a snapshot from JSON. A missing file is an empty snapshot; a file
    /// with unknown statuses, roles or malformed dates is rejected.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let db: Database = serde_json::from_str(&buf)?;
        for def in &db.recurring_tasks {
            def.validate()?;
        }
        tracing::debug!(tasks = db.tasks.len(), recurring = db.recurring_tasks.len(), "loaded snapshot");
        Ok(db)
    }

    /// Save to JSON using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn get(&self, task_id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn get_mut(&mut self, task_id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    pub fn user(&self, user_id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn department(&self, department_id: u64) -> Option<&Department> {
        self.departments.iter().find(|d| d.department_id == department_id)
    }

    fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.task_id).max().unwrap_or(0) + 1
    }

    fn next_attachment_id(&self) -> u64 {
        self.attachments.iter().map(|a| a.attachment_id).max().unwrap_or(0) + 1
    }

    fn next_comment_id(&self) -> u64 {
        self.comments.iter().map(|c| c.comment_id).max().unwrap_or(0) + 1
    }
}

/// Answers the service traits from a snapshot, writing every mutation back
/// to the snapshot file.
pub struct SnapshotService {
    db: Database,
    path: Option<PathBuf>,
    attachment_dir: Option<PathBuf>,
}

impl SnapshotService {
    pub fn open(path: &Path, attachment_dir: PathBuf) -> Result<Self, AppError> {
        Ok(SnapshotService {
            db: Database::load(path)?,
            path: Some(path.to_path_buf()),
            attachment_dir: Some(attachment_dir),
        })
    }

    /// Snapshot that is never written to disk.
    pub fn in_memory(db: Database) -> Self {
        SnapshotService {
            db,
            path: None,
            attachment_dir: None,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn persist(&self) -> Result<(), ApiError> {
        if let Some(path) = &self.path {
            self.db.save(path).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "failed to write snapshot");
                ApiError::new(500, format!("Failed to save snapshot: {e}"))
            })?;
        }
        Ok(())
    }

    fn task_mut(&mut self, task_id: u64) -> Result<&mut Task, ApiError> {
        self.db
            .get_mut(task_id)
            .ok_or_else(|| ApiError::not_found(format!("Task {task_id}")))
    }
}

fn mark_completion(task: &mut Task) {
    if task.status == Status::Completed {
        task.completed_at.get_or_insert_with(Utc::now);
    } else {
        task.completed_at = None;
    }
}

impl TaskService for SnapshotService {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        Ok(self.db.tasks.clone())
    }

    fn get_task(&self, task_id: u64) -> Result<Task, ApiError> {
        self.db
            .get(task_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Task {task_id}")))
    }

    fn list_recurring_tasks(&self) -> Result<Vec<RecurringTaskDefinition>, ApiError> {
        Ok(self.db.recurring_tasks.clone())
    }

    fn create_task(&mut self, draft: &TaskDraft, director_id: u64) -> Result<Task, ApiError> {
        let mut department_names = Vec::with_capacity(draft.department_ids.len());
        for &id in &draft.department_ids {
            let department = self
                .db
                .department(id)
                .ok_or_else(|| ApiError::new(400, format!("Unknown department {id}")))?;
            department_names.push(department.name.clone());
        }
        let mut assigned_user_names = Vec::with_capacity(draft.assigned_user_ids.len());
        for &id in &draft.assigned_user_ids {
            let user = self
                .db
                .user(id)
                .ok_or_else(|| ApiError::new(400, format!("Unknown user {id}")))?;
            assigned_user_names.push(user.display_name.clone());
        }

        let task = Task {
            task_id: self.db.next_task_id(),
            title: draft.title.trim().to_string(),
            description: draft.description.clone().filter(|d| !d.trim().is_empty()),
            start_date: draft.start_date.or_else(|| Some(Utc::now())),
            end_date: draft.end_date,
            status: Status::Pending,
            progress: Some(0),
            director_id: Some(director_id),
            recurring_task_id: None,
            department_ids: draft.department_ids.clone(),
            department_names,
            department_statuses: draft.department_ids.iter().map(|&id| (id, Status::Pending)).collect(),
            department_waiting_reasons: Default::default(),
            assigned_user_ids: draft.assigned_user_ids.clone(),
            assigned_user_names,
            waiting_reason: None,
            completed_at: None,
        };
        self.db.tasks.push(task.clone());
        self.persist()?;
        tracing::info!(task_id = task.task_id, "created task");
        Ok(task)
    }

    fn update_task_status(
        &mut self,
        task_id: u64,
        status: Status,
        waiting_reason: Option<String>,
    ) -> Result<(), ApiError> {
        let task = self.task_mut(task_id)?;
        task.status = status;
        task.waiting_reason = waiting_reason;
        mark_completion(task);
        self.persist()
    }

    fn update_department_status(
        &mut self,
        task_id: u64,
        department_id: u64,
        status: Status,
        waiting_reason: Option<String>,
    ) -> Result<(), ApiError> {
        let task = self.task_mut(task_id)?;
        if !task.department_ids.contains(&department_id) {
            return Err(ApiError::new(
                400,
                format!("Department {department_id} is not assigned to task {task_id}"),
            ));
        }
        task.department_statuses.insert(department_id, status);
        match waiting_reason {
            Some(reason) => {
                task.department_waiting_reasons.insert(department_id, reason);
            }
            None => {
                task.department_waiting_reasons.remove(&department_id);
            }
        }
        task.status = effective_status(task);
        mark_completion(task);
        self.persist()
    }

    fn set_recurring_active(
        &mut self,
        recurring_task_id: u64,
        active: bool,
    ) -> Result<RecurringTaskDefinition, ApiError> {
        let def = self
            .db
            .recurring_tasks
            .iter_mut()
            .find(|d| d.recurring_task_id == recurring_task_id)
            .ok_or_else(|| ApiError::not_found(format!("Recurring task {recurring_task_id}")))?;
        def.is_active = active;
        let def = def.clone();
        self.persist()?;
        Ok(def)
    }
}

impl AttachmentService for SnapshotService {
    fn list_attachments(&self, task_id: u64) -> Result<Vec<Attachment>, ApiError> {
        Ok(self
            .db
            .attachments
            .iter()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect())
    }

    fn get_attachment(&self, attachment_id: u64) -> Result<Attachment, ApiError> {
        self.db
            .attachments
            .iter()
            .find(|a| a.attachment_id == attachment_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Attachment {attachment_id}")))
    }

    fn upload_attachment(&mut self, task_id: u64, file: &Path, uploaded_by: u64) -> Result<Attachment, ApiError> {
        if self.db.get(task_id).is_none() {
            return Err(ApiError::not_found(format!("Task {task_id}")));
        }
        let meta = fs::metadata(file)
            .map_err(|e| ApiError::new(400, format!("Cannot read {}: {e}", file.display())))?;
        if !meta.is_file() {
            return Err(ApiError::new(400, format!("{} is not a file", file.display())));
        }
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        let attachment_id = self.db.next_attachment_id();
        if let Some(dir) = &self.attachment_dir {
            let stored = dir.join(format!("{attachment_id}_{file_name}"));
            fs::create_dir_all(dir)
                .and_then(|_| fs::copy(file, &stored))
                .map_err(|e| ApiError::new(500, format!("Failed to store {file_name}: {e}")))?;
        }

        let attachment = Attachment {
            attachment_id,
            task_id,
            comment_id: None,
            file_name,
            size: meta.len(),
            uploaded_by,
            uploaded_at: Utc::now(),
        };
        self.db.attachments.push(attachment.clone());
        self.persist()?;
        Ok(attachment)
    }

    fn delete_attachment(&mut self, attachment_id: u64) -> Result<(), ApiError> {
        let Some(idx) = self
            .db
            .attachments
            .iter()
            .position(|a| a.attachment_id == attachment_id)
        else {
            return Err(ApiError::new(404, "Attachment already deleted"));
        };
        let removed = self.db.attachments.remove(idx);
        if let Some(dir) = &self.attachment_dir {
            let stored = dir.join(format!("{}_{}", removed.attachment_id, removed.file_name));
            if let Err(e) = fs::remove_file(&stored) {
                tracing::debug!(path = %stored.display(), error = %e, "stored attachment not removed");
            }
        }
        self.persist()
    }
}

impl CommentService for SnapshotService {
    fn list_comments(&self, task_id: u64) -> Result<Vec<Comment>, ApiError> {
        let mut comments: Vec<Comment> = self
            .db
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    fn get_comment(&self, comment_id: u64) -> Result<Comment, ApiError> {
        self.db
            .comments
            .iter()
            .find(|c| c.comment_id == comment_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Comment {comment_id}")))
    }

    fn add_comment(&mut self, task_id: u64, author_id: u64, content: &str) -> Result<Comment, ApiError> {
        if self.db.get(task_id).is_none() {
            return Err(ApiError::not_found(format!("Task {task_id}")));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::new(400, "Comment must not be empty"));
        }
        let comment = Comment {
            comment_id: self.db.next_comment_id(),
            task_id,
            author_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.db.comments.push(comment.clone());
        self.persist()?;
        Ok(comment)
    }

    fn delete_comment(&mut self, comment_id: u64) -> Result<(), ApiError> {
        let before = self.db.comments.len();
        self.db.comments.retain(|c| c.comment_id != comment_id);
        if self.db.comments.len() == before {
            return Err(ApiError::not_found(format!("Comment {comment_id}")));
        }
        // Attachments on the comment go with it.
        self.db.attachments.retain(|a| a.comment_id != Some(comment_id));
        self.persist()
    }
}

/// Parse a human-readable date/time for deadlines.
///
/// Supports:
/// - "now", "today", "tomorrow" (a bare day means the end of that day, local time)
/// - "in 6h", "in 3d", "in 2w"
/// - "YYYY-MM-DD", "YYYY-MM-DD HH:MM" (local time)
/// - ISO-8601 timestamps
pub fn parse_datetime_input(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = s.trim().to_lowercase();
    let today = now.with_timezone(&Local).date_naive();

    match s.as_str() {
        "now" => return Some(now),
        "today" => return end_of_day(today),
        "tomorrow" => return end_of_day(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(unit) = rest.chars().last() {
            let num = &rest[..rest.len() - unit.len_utf8()];
            if let Ok(n) = num.trim().parse::<i64>() {
                match unit {
                    'h' => return Some(now + Duration::hours(n)),
                    'd' => return Some(now + Duration::days(n)),
                    'w' => return Some(now + Duration::weeks(n)),
                    _ => {}
                }
            }
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return end_of_day(date);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M") {
        return local_to_utc(naive);
    }
    iso_datetime::parse(&s.to_uppercase())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    local_to_utc(date.and_time(NaiveTime::from_hms_opt(23, 59, 59)?))
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a deadline relative to now ("in 3h", "in 2d", "5h late").
pub fn format_due_relative(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d - now;
            let hours = delta.num_hours();
            if delta.num_minutes() >= 0 {
                if hours < 1 {
                    format!("in {}m", delta.num_minutes())
                } else if hours < 48 {
                    format!("in {hours}h")
                } else {
                    format!("in {}d", delta.num_days())
                }
            } else if -hours < 48 {
                format!("{}h late", (-delta.num_minutes() + 59) / 60)
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// Marker shown next to a deadline.
pub fn format_deadline_marker(class: DeadlineClass) -> &'static str {
    match class {
        DeadlineClass::Overdue => "!!",
        DeadlineClass::NearDeadline => "!",
        DeadlineClass::Normal => "",
    }
}

pub fn format_role(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "Super admin",
        Role::Director => "Director",
        Role::Manager => "Manager",
        Role::User => "User",
    }
}

/// Assignees column: department names or user names.
pub fn format_assignees(task: &Task) -> String {
    match task.scope() {
        TaskScope::Departments => task.department_names.join(", "),
        TaskScope::Users => task.assigned_user_names.join(", "),
        TaskScope::Unassigned => "-".into(),
    }
}

/// Print tasks as a table with badge, aggregate and deadline columns.
pub fn print_table(tasks: &[&Task], now: DateTime<Utc>) {
    println!(
        "{:<5} {:<12} {:<12} {:<3} {:<10} {:<20} {}",
        "ID", "Badge", "Progress", "", "Due", "Assigned", "Title"
    );
    for t in tasks {
        let class = crate::deadline::classify_task(t, now);
        println!(
            "{:<5} {:<12} {:<12} {:<3} {:<10} {:<20} {}",
            t.task_id,
            display_label(normalize_display_status(t.status)),
            status_label(effective_status(t)),
            format_deadline_marker(class),
            format_due_relative(t.end_date, now),
            truncate(&format_assignees(t), 20),
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
