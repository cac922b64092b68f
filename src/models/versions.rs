use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable image revision mapped to review.design_version.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DesignVersion {
    pub id: Uuid,
    pub design_id: Uuid,
    pub version_number: i32,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Next number in a design's gapless version sequence.
pub fn next_version_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Annotations keep their stored coordinates across versions, so a change of
/// dimensions means existing anchors may no longer line up with the image.
pub fn anchors_may_be_misaligned(previous: Dimensions, next: Dimensions) -> bool {
    previous != next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_numbers_start_at_one() {
        assert_eq!(next_version_number(None), 1);
    }

    #[test]
    fn version_numbers_have_no_gaps() {
        assert_eq!(next_version_number(Some(1)), 2);
        assert_eq!(next_version_number(Some(41)), 42);
    }

    #[test]
    fn misalignment_only_when_dimensions_change() {
        let base = Dimensions::new(1440, 900);
        assert!(!anchors_may_be_misaligned(base, Dimensions::new(1440, 900)));
        assert!(anchors_may_be_misaligned(base, Dimensions::new(1920, 1080)));
    }
}
