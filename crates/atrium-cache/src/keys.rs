//! Cache and mirror key builders.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all Atrium list-cache keys.
const PREFIX: &str = "atrium";

// ── Mirror keyspace (one JSON list per entity type) ────────

/// Mirror key for the approvals list.
pub fn approvals_mirror() -> &'static str {
    "approvals"
}

/// Mirror key for the approval events list.
pub fn approval_events_mirror() -> &'static str {
    "approval_events"
}

/// Mirror key for the user directory fallback snapshot.
pub fn users_mirror() -> &'static str {
    "app_users_fallback"
}

// ── List-cache keys ────────────────────────────────────────

/// Cache key for a filtered approvals list. `parts` are the normalized
/// filter components (status, department, requester, asset ids).
pub fn approvals_list(parts: &[String; 4]) -> String {
    format!("{PREFIX}:approvals:list:{}", parts.join("|"))
}

/// Prefix invalidating every cached approvals list.
pub fn approvals_list_prefix() -> String {
    format!("{PREFIX}:approvals:list:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_key_shape() {
        let parts = [
            "pending_manager".to_string(),
            "ops".to_string(),
            "all".to_string(),
            "all".to_string(),
        ];
        assert_eq!(
            approvals_list(&parts),
            "atrium:approvals:list:pending_manager|ops|all|all"
        );
        assert!(approvals_list(&parts).starts_with(&approvals_list_prefix()));
    }
}
