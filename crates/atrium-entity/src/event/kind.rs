//! Approval event kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happened to an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_event_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The request was submitted.
    Submitted,
    /// A manager forwarded the request to the admins.
    Forwarded,
    /// An admin approved the request.
    Approved,
    /// An admin rejected the request.
    Rejected,
    /// The proposed patch was applied to the asset.
    Applied,
    /// A manager replaced the proposed patch.
    PatchUpdated,
    /// A reviewer left a per-field comment.
    Comment,
}

impl EventKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Forwarded => "forwarded",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Applied => "applied",
            Self::PatchUpdated => "patch_updated",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = atrium_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(Self::Submitted),
            "forwarded" => Ok(Self::Forwarded),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "applied" => Ok(Self::Applied),
            "patch_updated" => Ok(Self::PatchUpdated),
            "comment" => Ok(Self::Comment),
            _ => Err(atrium_core::AppError::validation(format!(
                "Invalid event kind: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&EventKind::PatchUpdated).unwrap(),
            "\"patch_updated\""
        );
        assert_eq!("patch_updated".parse::<EventKind>().unwrap(), EventKind::PatchUpdated);
    }
}
