use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::collaborations::CollaborationRole;

/// Annotation shape mapping for review.annotation_shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "review.annotation_shape", rename_all = "lowercase")]
pub enum AnnotationShape {
    Rectangle,
    Circle,
    Arrow,
    Freeform,
}

impl AnnotationShape {
    pub fn requires_path(self) -> bool {
        matches!(self, Self::Freeform)
    }
}

/// Pinned annotation mapped to review.annotation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Annotation {
    pub id: Uuid,
    pub design_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: String,
    pub shape: AnnotationShape,
    pub path_data: Option<String>,
    pub resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Annotation {
    /// Marks the annotation resolved. Returns false, leaving the existing
    /// resolver and timestamp untouched, when it was already resolved.
    pub fn resolve(&mut self, user_id: Uuid, note: Option<String>, now: DateTime<Utc>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_by = Some(user_id);
        self.resolved_at = Some(now);
        self.resolved_note = note;
        true
    }

    /// Clears every resolution field. Returns false when nothing was resolved.
    pub fn reopen(&mut self) -> bool {
        if !self.resolved {
            return false;
        }
        self.resolved = false;
        self.resolved_by = None;
        self.resolved_at = None;
        self.resolved_note = None;
        true
    }

    /// The author, the resolver and design owners/editors may reopen.
    pub fn can_be_reopened_by(&self, user_id: Uuid, role: CollaborationRole) -> bool {
        self.user_id == user_id
            || self.resolved_by == Some(user_id)
            || matches!(role, CollaborationRole::Owner | CollaborationRole::Editor)
    }
}

/// Reply in an annotation thread, mapped to review.annotation_reply.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnnotationReply {
    pub id: Uuid,
    pub annotation_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn annotation(author: Uuid) -> Annotation {
        let now = Utc::now();
        Annotation {
            id: Uuid::new_v4(),
            design_id: Uuid::new_v4(),
            user_id: author,
            content: "Logo is off-brand".to_string(),
            x: 120.0,
            y: 48.0,
            width: Some(64.0),
            height: Some(32.0),
            color: "#ff3b30".to_string(),
            shape: AnnotationShape::Rectangle,
            path_data: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolved_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resolve_sets_all_resolution_fields() {
        let resolver = Uuid::new_v4();
        let now = Utc::now();
        let mut item = annotation(Uuid::new_v4());

        assert!(item.resolve(resolver, Some("fixed in v2".to_string()), now));
        assert!(item.resolved);
        assert_eq!(item.resolved_by, Some(resolver));
        assert_eq!(item.resolved_at, Some(now));
        assert_eq!(item.resolved_note.as_deref(), Some("fixed in v2"));
    }

    #[test]
    fn resolving_twice_keeps_first_resolution() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let now = Utc::now();
        let mut item = annotation(Uuid::new_v4());

        item.resolve(first, None, now);
        let changed = item.resolve(second, Some("again".to_string()), now + Duration::minutes(5));

        assert!(!changed);
        assert_eq!(item.resolved_by, Some(first));
        assert_eq!(item.resolved_at, Some(now));
        assert_eq!(item.resolved_note, None);
    }

    #[test]
    fn reopen_clears_resolution() {
        let mut item = annotation(Uuid::new_v4());
        item.resolve(Uuid::new_v4(), Some("done".to_string()), Utc::now());

        assert!(item.reopen());
        assert!(!item.resolved);
        assert!(item.resolved_by.is_none());
        assert!(item.resolved_at.is_none());
        assert!(item.resolved_note.is_none());
        assert!(!item.reopen());
    }

    #[test]
    fn reopen_permissions() {
        let author = Uuid::new_v4();
        let resolver = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut item = annotation(author);
        item.resolve(resolver, None, Utc::now());

        assert!(item.can_be_reopened_by(author, CollaborationRole::Viewer));
        assert!(item.can_be_reopened_by(resolver, CollaborationRole::Reviewer));
        assert!(item.can_be_reopened_by(stranger, CollaborationRole::Editor));
        assert!(item.can_be_reopened_by(stranger, CollaborationRole::Owner));
        assert!(!item.can_be_reopened_by(stranger, CollaborationRole::Reviewer));
        assert!(!item.can_be_reopened_by(stranger, CollaborationRole::Viewer));
    }

    #[test]
    fn only_freeform_requires_path() {
        assert!(AnnotationShape::Freeform.requires_path());
        assert!(!AnnotationShape::Arrow.requires_path());
    }
}
