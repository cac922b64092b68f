use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    dto::approvals::{
        ApprovalHistoryResponse, ApprovalListResponse, ApprovalResponse, SubmitApprovalRequest,
    },
    error::AppError,
    models::{
        approvals::aggregate_status,
        collaborations::CollaborationRole,
        designs::{Design, DesignStatus},
    },
    repositories::{
        approvals::{self as approval_repo, UpsertApprovalParams},
        collaborations as collaboration_repo,
        designs as design_repo,
    },
    telemetry::BusinessEvent,
    usecases::{designs::DesignService, validation::normalize_optional_text},
};

pub struct ApprovalService;

const MAX_APPROVAL_COMMENT_LENGTH: usize = 2000;

/// Outcome of re-deriving a design's status inside a transaction.
#[derive(Debug)]
pub(crate) struct StatusRefresh {
    pub design: Design,
    pub previous: DesignStatus,
}

impl StatusRefresh {
    pub fn unchanged(design: Design) -> Self {
        Self {
            previous: design.status,
            design,
        }
    }

    pub fn changed(&self) -> bool {
        self.previous != self.design.status
    }

    /// Call after commit.
    pub fn log_change(&self) {
        if self.changed() {
            BusinessEvent::DesignStatusChanged {
                design_id: self.design.id,
                from: self.previous,
                to: self.design.status,
            }
            .log();
        }
    }
}

impl ApprovalService {
    /// Records the caller's verdict on the current version and re-derives the
    /// design status, all under the design row lock.
    pub async fn submit_approval(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
        req: SubmitApprovalRequest,
    ) -> Result<ApprovalResponse, AppError> {
        let comment =
            normalize_optional_text(req.comment, "comment", MAX_APPROVAL_COMMENT_LENGTH)?;
        let (_, role) = DesignService::require_role(pool, design_id, user_id).await?;
        check_can_approve(role)?;

        let mut tx = pool.begin().await?;
        let design = design_repo::lock_design(&mut tx, design_id)
            .await?
            .ok_or(AppError::NotFound("Design not found".to_string()))?;
        let approval = approval_repo::upsert_approval(
            &mut tx,
            UpsertApprovalParams {
                design_id,
                user_id,
                status: req.status,
                comment,
                design_version: design.version,
            },
        )
        .await?;
        let refresh = refresh_status(&mut tx, design).await?;
        tx.commit().await?;

        BusinessEvent::ApprovalSubmitted {
            design_id,
            user_id,
            status: approval.status,
            design_version: approval.design_version,
        }
        .log();
        refresh.log_change();

        Ok(ApprovalResponse {
            approval,
            design_status: refresh.design.status,
            status_changed: refresh.changed(),
        })
    }

    pub async fn list_approvals(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<ApprovalListResponse, AppError> {
        DesignService::require_role(pool, design_id, user_id).await?;
        let data = approval_repo::list_approvals(pool, design_id).await?;
        Ok(ApprovalListResponse { data })
    }

    pub async fn list_history(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<ApprovalHistoryResponse, AppError> {
        DesignService::require_role(pool, design_id, user_id).await?;
        let data = approval_repo::list_approval_events(pool, design_id).await?;
        Ok(ApprovalHistoryResponse { data })
    }
}

fn check_can_approve(role: CollaborationRole) -> Result<(), AppError> {
    if role.permissions().can_approve {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only owners, editors and reviewers can submit approvals".to_string(),
    ))
}

/// Re-derives the status of a design whose row is locked by `tx`. Only
/// verdicts cast on the current version count.
pub(crate) async fn refresh_status(
    tx: &mut Transaction<'_, Postgres>,
    design: Design,
) -> Result<StatusRefresh, AppError> {
    let reviewers = collaboration_repo::list_reviewer_ids(tx, design.id).await?;
    let verdicts =
        approval_repo::list_verdicts_for_version(tx, design.id, design.version).await?;
    let previous = design.status;
    let next = aggregate_status(previous, &reviewers, &verdicts);

    let design = if next != previous {
        design_repo::update_design_status(tx, design.id, next).await?
    } else {
        design
    };

    Ok(StatusRefresh { design, previous })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewers_cannot_submit_approvals() {
        let result = check_can_approve(CollaborationRole::Viewer);
        assert!(matches!(
            result,
            Err(AppError::Forbidden(message)) if message.contains("submit approvals")
        ));
    }

    #[test]
    fn voting_roles_can_submit_approvals() {
        for role in [
            CollaborationRole::Owner,
            CollaborationRole::Editor,
            CollaborationRole::Reviewer,
        ] {
            assert!(check_can_approve(role).is_ok());
        }
    }
}
