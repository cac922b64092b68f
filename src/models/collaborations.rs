use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Collaboration role mapping for review.collaboration_role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "review.collaboration_role", rename_all = "lowercase")]
pub enum CollaborationRole {
    Owner,
    Editor,
    Reviewer,
    Viewer,
}

impl CollaborationRole {
    /// Reviewers are the required voters for the aggregate design status.
    pub fn is_required_reviewer(self) -> bool {
        matches!(self, Self::Reviewer)
    }

    pub fn permissions(self) -> CollaborationPermissions {
        CollaborationPermissions::from_role(self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPermissions {
    pub can_view: bool,
    pub can_annotate: bool,
    pub can_resolve: bool,
    pub can_approve: bool,
    pub can_edit: bool,
    pub can_manage_collaborators: bool,
}

impl CollaborationPermissions {
    pub fn from_role(role: CollaborationRole) -> Self {
        match role {
            CollaborationRole::Owner | CollaborationRole::Editor => Self {
                can_view: true,
                can_annotate: true,
                can_resolve: true,
                can_approve: true,
                can_edit: true,
                can_manage_collaborators: true,
            },
            CollaborationRole::Reviewer => Self {
                can_view: true,
                can_annotate: true,
                can_resolve: true,
                can_approve: true,
                can_edit: false,
                can_manage_collaborators: false,
            },
            CollaborationRole::Viewer => Self {
                can_view: true,
                can_annotate: true,
                can_resolve: false,
                can_approve: false,
                can_edit: false,
                can_manage_collaborators: false,
            },
        }
    }
}

/// Collaboration model mapped to review.design_collaboration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DesignCollaboration {
    pub design_id: Uuid,
    pub user_id: Uuid,
    pub role: CollaborationRole,
    pub added_by: Uuid,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{CollaborationPermissions, CollaborationRole};

    #[test]
    fn viewers_may_annotate_but_not_approve() {
        let viewer = CollaborationPermissions::from_role(CollaborationRole::Viewer);
        assert!(viewer.can_view);
        assert!(viewer.can_annotate);
        assert!(!viewer.can_approve);
        assert!(!viewer.can_resolve);
        assert!(!viewer.can_edit);
    }

    #[test]
    fn approval_is_limited_to_owner_editor_reviewer() {
        for role in [
            CollaborationRole::Owner,
            CollaborationRole::Editor,
            CollaborationRole::Reviewer,
        ] {
            assert!(role.permissions().can_approve, "{role:?} should approve");
        }
        assert!(!CollaborationRole::Viewer.permissions().can_approve);
    }

    #[test]
    fn only_managers_publish_and_manage() {
        assert!(CollaborationRole::Editor.permissions().can_edit);
        assert!(CollaborationRole::Owner.permissions().can_manage_collaborators);
        assert!(!CollaborationRole::Reviewer.permissions().can_edit);
        assert!(!CollaborationRole::Reviewer.permissions().can_manage_collaborators);
    }

    #[test]
    fn only_reviewers_are_required_voters() {
        assert!(CollaborationRole::Reviewer.is_required_reviewer());
        assert!(!CollaborationRole::Owner.is_required_reviewer());
        assert!(!CollaborationRole::Editor.is_required_reviewer());
    }

    #[test]
    fn role_serializes_lowercase() {
        let value = serde_json::to_value(CollaborationRole::Reviewer).expect("serialize");
        assert_eq!(value, serde_json::json!("reviewer"));
    }
}
