//! Typed asset field diff.

use serde::{Deserialize, Serialize};

/// The mutable asset fields an approved edit may rewrite.
///
/// A stored approval patch is arbitrary JSON; converting it through this
/// struct enumerates exactly which columns can be written and silently
/// drops unknown keys, so a crafted diff can never touch anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPatch {
    /// New asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New operational status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New owning department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// New assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl AssetPatch {
    /// Parse a stored JSON diff, keeping only known fields.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let known = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            name: known("name"),
            status: known("status"),
            location: known("location"),
            department: known("department"),
            assignee: known("assignee"),
        }
    }

    /// Whether the diff carries no applicable change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.department.is_none()
            && self.assignee.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_are_dropped() {
        let patch = AssetPatch::from_value(&json!({
            "status": "retired",
            "password_hash": "sneaky",
            "id": "AST-999"
        }));
        assert_eq!(patch.status.as_deref(), Some("retired"));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_diff() {
        assert!(AssetPatch::from_value(&json!({})).is_empty());
        assert!(AssetPatch::from_value(&json!({"serial": "x"})).is_empty());
    }
}
