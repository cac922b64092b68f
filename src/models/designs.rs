use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Design status mapping for review.design_status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "review.design_status", rename_all = "kebab-case")]
pub enum DesignStatus {
    Draft,
    InReview,
    Approved,
    Rejected,
}

impl DesignStatus {
    /// Status a design takes when a new version is published. A fresh image
    /// invalidates every earlier verdict, so reviewers have to vote again.
    pub fn after_publish(has_reviewers: bool) -> Self {
        if has_reviewers {
            Self::InReview
        } else {
            Self::Draft
        }
    }
}

/// Design model mapped to review.design.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Design {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub version: i32,
    pub status: DesignStatus,
    pub project_id: Option<Uuid>,
    pub created_by: Uuid,
    pub width: i32,
    pub height: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Design {
    /// Returns true when the point lies inside the current image bounds.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= f64::from(self.width) && y <= f64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(width: i32, height: i32) -> Design {
        let now = Utc::now();
        Design {
            id: Uuid::new_v4(),
            title: "Landing hero".to_string(),
            description: None,
            image_url: "https://cdn.example.com/hero.png".to_string(),
            thumbnail_url: None,
            version: 1,
            status: DesignStatus::Draft,
            project_id: None,
            created_by: Uuid::new_v4(),
            width,
            height,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn publish_with_reviewers_moves_to_in_review() {
        assert_eq!(DesignStatus::after_publish(true), DesignStatus::InReview);
    }

    #[test]
    fn publish_without_reviewers_stays_draft() {
        assert_eq!(DesignStatus::after_publish(false), DesignStatus::Draft);
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let value = serde_json::to_value(DesignStatus::InReview).expect("serialize");
        assert_eq!(value, serde_json::json!("in-review"));
        let parsed: DesignStatus = serde_json::from_value(serde_json::json!("approved")).unwrap();
        assert_eq!(parsed, DesignStatus::Approved);
    }

    #[test]
    fn contains_point_checks_image_bounds() {
        let design = design(800, 600);
        assert!(design.contains_point(0.0, 0.0));
        assert!(design.contains_point(800.0, 600.0));
        assert!(!design.contains_point(800.5, 10.0));
        assert!(!design.contains_point(-1.0, 10.0));
    }
}
