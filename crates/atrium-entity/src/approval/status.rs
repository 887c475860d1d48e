//! Approval status enumeration and the workflow state machine predicates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an approval request.
///
/// Transitions are monotonic: `pending_manager → pending_admin →
/// {approved | rejected}`, with an admin-override shortcut
/// `pending_manager → approved`. A request never re-enters
/// `pending_manager` after leaving it, and terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting review by a department manager (initial state).
    PendingManager,
    /// Forwarded by a manager, awaiting an admin decision.
    PendingAdmin,
    /// Finally approved (terminal).
    Approved,
    /// Finally rejected (terminal).
    Rejected,
}

impl ApprovalStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether a manager may forward the request to an admin.
    pub fn can_forward(&self) -> bool {
        matches!(self, Self::PendingManager)
    }

    /// Whether a final decision may be recorded.
    pub fn can_decide(&self) -> bool {
        !self.is_terminal()
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingManager => "pending_manager",
            Self::PendingAdmin => "pending_admin",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = atrium_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending_manager" => Ok(Self::PendingManager),
            "pending_admin" => Ok(Self::PendingAdmin),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(atrium_core::AppError::validation(format!(
                "Invalid approval status: '{s}'"
            ))),
        }
    }
}

/// A final decision on an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Approve the request.
    Approved,
    /// Reject the request.
    Rejected,
}

impl Decision {
    /// The terminal status this decision resolves to.
    pub fn into_status(self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Rejected => ApprovalStatus::Rejected,
        }
    }

    /// Return the decision as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
        assert!(!ApprovalStatus::PendingManager.is_terminal());
        assert!(!ApprovalStatus::PendingAdmin.is_terminal());
    }

    #[test]
    fn test_forward_only_from_pending_manager() {
        assert!(ApprovalStatus::PendingManager.can_forward());
        assert!(!ApprovalStatus::PendingAdmin.can_forward());
        assert!(!ApprovalStatus::Approved.can_forward());
    }

    #[test]
    fn test_decide_from_either_pending_state() {
        assert!(ApprovalStatus::PendingManager.can_decide());
        assert!(ApprovalStatus::PendingAdmin.can_decide());
        assert!(!ApprovalStatus::Rejected.can_decide());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&ApprovalStatus::PendingManager).unwrap();
        assert_eq!(json, "\"pending_manager\"");
        assert_eq!(Decision::Approved.into_status(), ApprovalStatus::Approved);
    }
}
