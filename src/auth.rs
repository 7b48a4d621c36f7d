//! Identity of the current actor.
//!
//! `AuthContext` is created once per run from the session file, handed to
//! whatever needs to know who is acting, and cleared on logout or when the
//! backend answers 401.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::fields::Role;
use crate::task::{Attachment, Comment};

/// The minimal profile kept alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl AuthContext {
    /// Load the persisted session. A missing file is a logged-out context.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(AuthContext::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persist the session, or remove the file when logged out.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if !self.is_authenticated() {
            if path.exists() {
                fs::remove_file(path)?;
            }
            return Ok(());
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn login(&mut self, token: String, user: UserProfile) {
        tracing::info!(user_id = user.id, "logged in");
        self.token = Some(token);
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = user.id, "logged out");
        }
        self.token = None;
    }

    /// Clear the session after the backend rejected the token.
    pub fn handle_unauthorized(&mut self) {
        tracing::warn!("session rejected by backend, clearing credentials");
        self.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The current user, or `NotLoggedIn`.
    pub fn require_user(&self) -> Result<&UserProfile, AppError> {
        match (&self.token, &self.user) {
            (Some(_), Some(user)) => Ok(user),
            _ => Err(AppError::NotLoggedIn),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|u| u.roles.contains(&role))
    }

    /// Whether the current user owns a resource created by `owner_id`.
    pub fn is_owner(&self, owner_id: u64) -> bool {
        self.user.as_ref().is_some_and(|u| u.id == owner_id)
    }

    pub fn can_delete_attachment(&self, attachment: &Attachment) -> bool {
        self.is_owner(attachment.uploaded_by) || self.has_role(Role::SuperAdmin)
    }

    pub fn can_delete_comment(&self, comment: &Comment) -> bool {
        self.is_owner(comment.author_id) || self.has_role(Role::SuperAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: u64, roles: Vec<Role>) -> UserProfile {
        UserProfile {
            id,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            roles,
        }
    }

    fn attachment(uploaded_by: u64) -> Attachment {
        Attachment {
            attachment_id: 1,
            task_id: 1,
            comment_id: None,
            file_name: "plan.pdf".into(),
            size: 10,
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut ctx = AuthContext::default();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.require_user(), Err(AppError::NotLoggedIn)));

        ctx.login("token-1".into(), profile(3, vec![Role::Manager]));
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.require_user().unwrap().id, 3);
        assert!(ctx.has_role(Role::Manager));

        ctx.handle_unauthorized();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn test_ownership_checks() {
        let mut ctx = AuthContext::default();
        ctx.login("t".into(), profile(3, vec![Role::User]));
        assert!(ctx.can_delete_attachment(&attachment(3)));
        assert!(!ctx.can_delete_attachment(&attachment(4)));

        let mut admin = AuthContext::default();
        admin.login("t".into(), profile(9, vec![Role::SuperAdmin]));
        assert!(admin.can_delete_attachment(&attachment(4)));

        assert!(!AuthContext::default().can_delete_attachment(&attachment(3)));
    }

    #[test]
    fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut ctx = AuthContext::default();
        ctx.login("abc".into(), profile(2, vec![Role::Director]));
        ctx.save(&path).unwrap();
        assert_eq!(AuthContext::load(&path).unwrap(), ctx);

        ctx.logout();
        ctx.save(&path).unwrap();
        assert!(!path.exists());
        assert!(!AuthContext::load(&path).unwrap().is_authenticated());
    }
}
