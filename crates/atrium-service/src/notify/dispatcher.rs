//! Approval notification dispatcher.
//!
//! The workflow service treats every dispatch failure as non-fatal: a
//! transition never fails because mail could not be resolved or a
//! notification row could not be written.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use atrium_core::config::notifier::NotifierConfig;
use atrium_core::result::AppResult;
use atrium_database::repositories::notification::NotificationRepository;
use atrium_database::repositories::user::UserRepository;
use atrium_entity::approval::{ApprovalRequest, Decision};
use atrium_entity::notification::Notification;

use super::templates;
use crate::directory::UserDirectory;

/// Role-targeted notification fan-out for approval transitions.
#[async_trait]
pub trait ApprovalNotifier: Send + Sync {
    /// Resolve the manager addresses for an optional department scope,
    /// falling back to the unscoped manager list when the scope matches
    /// nobody.
    async fn manager_emails(&self, department: Option<&str>) -> AppResult<Vec<String>>;

    /// Resolve all admin addresses.
    async fn admin_emails(&self) -> AppResult<Vec<String>>;

    /// Notify managers of a new submission.
    async fn notify_submitted(&self, approval: &ApprovalRequest) -> AppResult<()>;

    /// Notify admins that a manager forwarded a request.
    async fn notify_forwarded(
        &self,
        approval: &ApprovalRequest,
        manager: &str,
        notes: Option<&str>,
    ) -> AppResult<()>;

    /// Notify the requester of the final outcome.
    async fn notify_decision(
        &self,
        approval: &ApprovalRequest,
        admin: &str,
        decision: Decision,
        notes: Option<&str>,
    ) -> AppResult<()>;
}

/// Notifier that resolves recipients through the user directory, writes
/// in-app notification rows, and traces the would-be mail delivery.
/// The actual mail transport is out of scope; delivery is recorded via
/// `tracing` for the operator.
pub struct DirectoryNotifier {
    users: Arc<UserRepository>,
    notifications: Arc<NotificationRepository>,
    directory: Arc<dyn UserDirectory>,
    config: NotifierConfig,
}

impl DirectoryNotifier {
    /// Create a new directory-backed notifier.
    pub fn new(
        users: Arc<UserRepository>,
        notifications: Arc<NotificationRepository>,
        directory: Arc<dyn UserDirectory>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            users,
            notifications,
            directory,
            config,
        }
    }

    /// Resolve a display name, falling back to the raw reference.
    async fn name_for(&self, reference: &str) -> String {
        match self.directory.display_name(reference).await {
            Ok(Some(name)) => name,
            _ => reference.to_string(),
        }
    }

    /// Deliver one message to each recipient. Per-recipient failures are
    /// logged and skipped so one bad address never blocks the rest.
    async fn deliver(&self, recipients: &[String], subject: &str, body: &str) {
        for recipient in recipients {
            info!(
                to = %recipient,
                from = %self.config.from_address,
                subject = %format!("{} {subject}", self.config.subject_prefix),
                "Dispatching approval mail"
            );
            let row = Notification::new(recipient, "approval", subject, body);
            if let Err(e) = self.notifications.insert(&row).await {
                warn!(to = %recipient, error = %e, "Failed to store notification");
            }
        }
    }
}

#[async_trait]
impl ApprovalNotifier for DirectoryNotifier {
    async fn manager_emails(&self, department: Option<&str>) -> AppResult<Vec<String>> {
        if let Some(department) = department {
            let scoped = self.users.manager_emails(Some(department)).await?;
            if !scoped.is_empty() {
                return Ok(scoped);
            }
        }
        self.users.manager_emails(None).await
    }

    async fn admin_emails(&self) -> AppResult<Vec<String>> {
        self.users.admin_emails().await
    }

    async fn notify_submitted(&self, approval: &ApprovalRequest) -> AppResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let recipients = self.manager_emails(approval.department.as_deref()).await?;
        if recipients.is_empty() {
            return Ok(());
        }
        let requester = self.name_for(&approval.requested_by).await;
        let (subject, body) = templates::submitted(approval, &requester);
        self.deliver(&recipients, &subject, &body).await;
        Ok(())
    }

    async fn notify_forwarded(
        &self,
        approval: &ApprovalRequest,
        manager: &str,
        notes: Option<&str>,
    ) -> AppResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let recipients = self.admin_emails().await?;
        if recipients.is_empty() {
            return Ok(());
        }
        let manager_name = self.name_for(manager).await;
        let (subject, body) = templates::forwarded(approval, &manager_name, notes);
        self.deliver(&recipients, &subject, &body).await;
        Ok(())
    }

    async fn notify_decision(
        &self,
        approval: &ApprovalRequest,
        admin: &str,
        decision: Decision,
        notes: Option<&str>,
    ) -> AppResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let admin_name = self.name_for(admin).await;
        let (subject, body) = templates::decision(approval, &admin_name, decision, notes);
        self.deliver(
            std::slice::from_ref(&approval.requested_by),
            &subject,
            &body,
        )
        .await;
        Ok(())
    }
}
