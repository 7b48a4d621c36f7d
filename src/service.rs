//! Backend seams.
//!
//! The task backend is reached through these traits. Every call completes
//! before the next one starts and no concurrency token is sent, so two
//! clients updating the same department race and the last write wins.

use std::path::{Path, PathBuf};

use crate::error::ApiError;
use crate::fields::Status;
use crate::task::{Attachment, Comment, RecurringTaskDefinition, Task, TaskDraft};

pub trait TaskService {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    fn get_task(&self, task_id: u64) -> Result<Task, ApiError>;

    fn list_recurring_tasks(&self) -> Result<Vec<RecurringTaskDefinition>, ApiError>;

    fn create_task(&mut self, draft: &TaskDraft, director_id: u64) -> Result<Task, ApiError>;

    /// Overall status of a directly assigned task.
    fn update_task_status(
        &mut self,
        task_id: u64,
        status: Status,
        waiting_reason: Option<String>,
    ) -> Result<(), ApiError>;

    /// Status of one department's share of a task.
    fn update_department_status(
        &mut self,
        task_id: u64,
        department_id: u64,
        status: Status,
        waiting_reason: Option<String>,
    ) -> Result<(), ApiError>;

    /// Soft stop or restart of a recurring definition.
    fn set_recurring_active(
        &mut self,
        recurring_task_id: u64,
        active: bool,
    ) -> Result<RecurringTaskDefinition, ApiError>;
}

pub trait AttachmentService {
    fn list_attachments(&self, task_id: u64) -> Result<Vec<Attachment>, ApiError>;

    fn get_attachment(&self, attachment_id: u64) -> Result<Attachment, ApiError>;

    fn upload_attachment(&mut self, task_id: u64, file: &Path, uploaded_by: u64) -> Result<Attachment, ApiError>;

    fn delete_attachment(&mut self, attachment_id: u64) -> Result<(), ApiError>;
}

pub trait CommentService {
    fn list_comments(&self, task_id: u64) -> Result<Vec<Comment>, ApiError>;

    fn get_comment(&self, comment_id: u64) -> Result<Comment, ApiError>;

    fn add_comment(&mut self, task_id: u64, author_id: u64, content: &str) -> Result<Comment, ApiError>;

    fn delete_comment(&mut self, comment_id: u64) -> Result<(), ApiError>;
}

/// Outcome of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<Attachment>,
    pub failed: Vec<(PathBuf, ApiError)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload files one at a time. A failed file is logged and recorded and the
/// remaining files are still attempted.
pub fn upload_attachments<S: AttachmentService + ?Sized>(
    service: &mut S,
    task_id: u64,
    files: &[PathBuf],
    uploaded_by: u64,
) -> UploadReport {
    let mut report = UploadReport::default();
    for file in files {
        match service.upload_attachment(task_id, file, uploaded_by) {
            Ok(attachment) => {
                tracing::debug!(task_id, file = %file.display(), "uploaded attachment");
                report.uploaded.push(attachment);
            }
            Err(e) => {
                tracing::warn!(task_id, file = %file.display(), error = %e, "attachment upload failed");
                report.failed.push((file.clone(), e));
            }
        }
    }
    report
}

/// Delete an attachment, treating "already deleted" as success.
pub fn delete_attachment_tolerant<S: AttachmentService + ?Sized>(
    service: &mut S,
    attachment_id: u64,
) -> Result<(), ApiError> {
    match service.delete_attachment(attachment_id) {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_deleted() => {
            tracing::debug!(attachment_id, "attachment was already deleted");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Rejects uploads of files named "bad*" and answers deletes with `delete_error`.
    #[derive(Default)]
    struct FlakyAttachments {
        attempts: Vec<PathBuf>,
        delete_error: Option<ApiError>,
    }

    impl AttachmentService for FlakyAttachments {
        fn list_attachments(&self, _task_id: u64) -> Result<Vec<Attachment>, ApiError> {
            Ok(Vec::new())
        }

        fn get_attachment(&self, attachment_id: u64) -> Result<Attachment, ApiError> {
            Err(ApiError::not_found(format!("Attachment {attachment_id}")))
        }

        fn upload_attachment(&mut self, task_id: u64, file: &Path, uploaded_by: u64) -> Result<Attachment, ApiError> {
            self.attempts.push(file.to_path_buf());
            let name = file.display().to_string();
            if name.contains("bad") {
                return Err(ApiError::new(413, "File too large"));
            }
            Ok(Attachment {
                attachment_id: self.attempts.len() as u64,
                task_id,
                comment_id: None,
                file_name: name,
                size: 1,
                uploaded_by,
                uploaded_at: Utc::now(),
            })
        }

        fn delete_attachment(&mut self, _attachment_id: u64) -> Result<(), ApiError> {
            match self.delete_error.clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_upload_continues_after_failure() {
        let mut service = FlakyAttachments::default();
        let files: Vec<PathBuf> = ["a.txt", "bad.bin", "c.txt"].iter().map(PathBuf::from).collect();
        let report = upload_attachments(&mut service, 5, &files, 1);

        assert_eq!(service.attempts, files);
        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PathBuf::from("bad.bin"));
        assert_eq!(report.failed[0].1.user_message(), "File too large");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_delete_tolerates_already_deleted() {
        let mut service = FlakyAttachments {
            delete_error: Some(ApiError::new(400, "Attachment already deleted")),
            ..Default::default()
        };
        assert!(delete_attachment_tolerant(&mut service, 1).is_ok());

        service.delete_error = Some(ApiError::new(500, "Storage unavailable"));
        assert!(delete_attachment_tolerant(&mut service, 1).is_err());
    }
}
