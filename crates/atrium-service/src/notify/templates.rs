//! Message templates for approval notifications.

use atrium_entity::approval::{ApprovalRequest, Decision};

/// Label used for an asset in notification bodies.
pub fn asset_label(asset_id: &str) -> String {
    format!("Asset {asset_id}")
}

/// Subject and body for a submission notice sent to managers.
pub fn submitted(approval: &ApprovalRequest, requester_name: &str) -> (String, String) {
    let subject = format!("Approval {} awaits review", approval.id);
    let mut body = format!(
        "{requester_name} requested to {} {} (approval {}).",
        approval.action,
        asset_label(&approval.asset_id),
        approval.id
    );
    if let Some(notes) = &approval.notes {
        body.push_str(&format!(" Notes: {notes}"));
    }
    (subject, body)
}

/// Subject and body for a forwarding notice sent to admins.
pub fn forwarded(
    approval: &ApprovalRequest,
    manager_name: &str,
    notes: Option<&str>,
) -> (String, String) {
    let subject = format!("Approval {} forwarded for decision", approval.id);
    let mut body = format!(
        "{manager_name} forwarded the {} request for {} (approval {}).",
        approval.action,
        asset_label(&approval.asset_id),
        approval.id
    );
    if let Some(notes) = notes {
        body.push_str(&format!(" Notes: {notes}"));
    }
    (subject, body)
}

/// Subject and body for a decision notice sent to the requester.
pub fn decision(
    approval: &ApprovalRequest,
    admin_name: &str,
    decision: Decision,
    notes: Option<&str>,
) -> (String, String) {
    let subject = format!("Approval {} {}", approval.id, decision);
    let mut body = format!(
        "{admin_name} {} your {} request for {} (approval {}).",
        decision,
        approval.action,
        asset_label(&approval.asset_id),
        approval.id
    );
    if let Some(notes) = notes {
        body.push_str(&format!(" Notes: {notes}"));
    }
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::types::id::ApprovalId;
    use atrium_entity::approval::{ApprovalAction, ApprovalStatus};
    use chrono::Utc;

    fn sample() -> ApprovalRequest {
        ApprovalRequest {
            id: ApprovalId::from_string("APR-100001"),
            asset_id: "AST-1".to_string(),
            action: ApprovalAction::Edit,
            status: ApprovalStatus::PendingManager,
            requested_by: "u1@x.com".to_string(),
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            patch: None,
            department: None,
        }
    }

    #[test]
    fn test_submitted_mentions_actor_and_asset() {
        let (subject, body) = submitted(&sample(), "Uma");
        assert!(subject.contains("APR-100001"));
        assert!(body.contains("Uma"));
        assert!(body.contains("Asset AST-1"));
        assert!(body.contains("edit"));
    }

    #[test]
    fn test_decision_includes_outcome() {
        let (subject, body) = decision(&sample(), "Ada", Decision::Rejected, Some("budget"));
        assert!(subject.contains("rejected"));
        assert!(body.contains("Notes: budget"));
    }
}
