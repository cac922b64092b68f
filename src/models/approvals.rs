use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::designs::DesignStatus;

/// Reviewer verdict mapping for review.approval_status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "review.approval_status", rename_all = "kebab-case")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
    NeedsChanges,
}

/// Current verdict of one user, mapped to review.design_approval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DesignApproval {
    pub id: Uuid,
    pub design_id: Uuid,
    pub user_id: Uuid,
    pub status: ApprovalStatus,
    pub comment: Option<String>,
    pub design_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit entry mapped to review.design_approval_event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApprovalEvent {
    pub id: Uuid,
    pub design_id: Uuid,
    pub user_id: Uuid,
    pub status: ApprovalStatus,
    pub comment: Option<String>,
    pub design_version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct ReviewerVerdict {
    pub user_id: Uuid,
    pub status: ApprovalStatus,
}

/// Derives the design status from the required reviewers and their verdicts.
///
/// `verdicts` must be ordered oldest first; a later verdict from the same
/// user replaces an earlier one. Verdicts from users outside `reviewers` are
/// ignored. Without reviewers there is nothing to aggregate and `current`
/// is kept.
pub fn aggregate_status(
    current: DesignStatus,
    reviewers: &[Uuid],
    verdicts: &[ReviewerVerdict],
) -> DesignStatus {
    if reviewers.is_empty() {
        return current;
    }

    let latest: HashMap<Uuid, ApprovalStatus> = verdicts
        .iter()
        .map(|verdict| (verdict.user_id, verdict.status))
        .collect();
    let votes: Vec<Option<ApprovalStatus>> = reviewers
        .iter()
        .map(|reviewer| latest.get(reviewer).copied())
        .collect();

    if votes.contains(&Some(ApprovalStatus::Rejected)) {
        return DesignStatus::Rejected;
    }
    if votes.contains(&Some(ApprovalStatus::NeedsChanges)) {
        return DesignStatus::InReview;
    }
    if votes.iter().all(|vote| *vote == Some(ApprovalStatus::Approved)) {
        return DesignStatus::Approved;
    }
    DesignStatus::InReview
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(user_id: Uuid, status: ApprovalStatus) -> ReviewerVerdict {
        ReviewerVerdict { user_id, status }
    }

    #[test]
    fn two_reviewers_need_both_approvals() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let reviewers = [first, second];

        let mut votes = vec![verdict(first, ApprovalStatus::Approved)];
        let status = aggregate_status(DesignStatus::InReview, &reviewers, &votes);
        assert_eq!(status, DesignStatus::InReview);

        votes.push(verdict(second, ApprovalStatus::Approved));
        let status = aggregate_status(status, &reviewers, &votes);
        assert_eq!(status, DesignStatus::Approved);
    }

    #[test]
    fn any_rejection_wins() {
        let reviewers = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let votes = [
            verdict(reviewers[0], ApprovalStatus::Approved),
            verdict(reviewers[1], ApprovalStatus::NeedsChanges),
            verdict(reviewers[2], ApprovalStatus::Rejected),
        ];
        assert_eq!(
            aggregate_status(DesignStatus::Approved, &reviewers, &votes),
            DesignStatus::Rejected
        );
    }

    #[test]
    fn needs_changes_keeps_design_in_review() {
        let reviewers = [Uuid::new_v4(), Uuid::new_v4()];
        let votes = [
            verdict(reviewers[0], ApprovalStatus::Approved),
            verdict(reviewers[1], ApprovalStatus::NeedsChanges),
        ];
        assert_eq!(
            aggregate_status(DesignStatus::Draft, &reviewers, &votes),
            DesignStatus::InReview
        );
    }

    #[test]
    fn latest_vote_per_reviewer_counts() {
        let reviewer = Uuid::new_v4();
        let votes = [
            verdict(reviewer, ApprovalStatus::NeedsChanges),
            verdict(reviewer, ApprovalStatus::Approved),
        ];
        assert_eq!(
            aggregate_status(DesignStatus::InReview, &[reviewer], &votes),
            DesignStatus::Approved
        );
    }

    #[test]
    fn votes_from_non_reviewers_are_ignored() {
        let reviewer = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let votes = [verdict(editor, ApprovalStatus::Rejected)];
        assert_eq!(
            aggregate_status(DesignStatus::InReview, &[reviewer], &votes),
            DesignStatus::InReview
        );
    }

    #[test]
    fn no_reviewers_keeps_current_status() {
        let votes = [verdict(Uuid::new_v4(), ApprovalStatus::Approved)];
        assert_eq!(
            aggregate_status(DesignStatus::Draft, &[], &votes),
            DesignStatus::Draft
        );
    }

    #[test]
    fn approval_status_wire_format() {
        let value = serde_json::to_value(ApprovalStatus::NeedsChanges).expect("serialize");
        assert_eq!(value, serde_json::json!("needs-changes"));
    }
}
