//! Approval action enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of asset change an approval request proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    /// Register a new asset.
    Create,
    /// Modify an existing asset via a field diff.
    Edit,
    /// Retire an asset from service.
    Decommission,
}

impl ApprovalAction {
    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Decommission => "decommission",
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApprovalAction {
    type Err = atrium_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "decommission" => Ok(Self::Decommission),
            _ => Err(atrium_core::AppError::validation(format!(
                "Invalid approval action: '{s}'. Expected one of: create, edit, decommission"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("edit".parse::<ApprovalAction>().unwrap(), ApprovalAction::Edit);
        assert_eq!(
            "Decommission".parse::<ApprovalAction>().unwrap(),
            ApprovalAction::Decommission
        );
        assert!("destroy".parse::<ApprovalAction>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&ApprovalAction::Decommission).unwrap();
        assert_eq!(json, "\"decommission\"");
    }
}
