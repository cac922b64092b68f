use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::collaborations::{
        AddCollaboratorRequest, CollaboratorListResponse, CollaboratorResponse,
        UpdateCollaboratorRequest,
    },
    error::AppError,
    models::collaborations::CollaborationRole,
    repositories::{collaborations as collaboration_repo, designs as design_repo},
    telemetry::BusinessEvent,
    usecases::{
        approvals::{StatusRefresh, refresh_status},
        designs::DesignService,
    },
};

pub struct CollaborationService;

impl CollaborationService {
    pub async fn list_collaborators(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<CollaboratorListResponse, AppError> {
        DesignService::require_role(pool, design_id, user_id).await?;
        let data = collaboration_repo::list_collaborators(pool, design_id).await?;
        Ok(CollaboratorListResponse { data })
    }

    /// Adding a reviewer changes the required voter set; the status is then
    /// re-derived in the same transaction.
    pub async fn add_collaborator(
        pool: &PgPool,
        design_id: Uuid,
        actor_id: Uuid,
        req: AddCollaboratorRequest,
    ) -> Result<CollaboratorResponse, AppError> {
        let (_, actor_role) = DesignService::require_role(pool, design_id, actor_id).await?;
        check_grant(actor_role, req.role)?;

        let mut tx = pool.begin().await?;
        let design = design_repo::lock_design(&mut tx, design_id)
            .await?
            .ok_or(AppError::NotFound("Design not found".to_string()))?;
        let collaborator = collaboration_repo::add_collaborator(
            &mut tx,
            design_id,
            req.user_id,
            req.role,
            actor_id,
            req.notifications_enabled.unwrap_or(true),
        )
        .await?;
        let refresh = if collaborator.role.is_required_reviewer() {
            refresh_status(&mut tx, design).await?
        } else {
            StatusRefresh::unchanged(design)
        };
        tx.commit().await?;

        BusinessEvent::CollaboratorAdded {
            design_id,
            added_by: actor_id,
            user_id: collaborator.user_id,
            role: collaborator.role,
        }
        .log();
        refresh.log_change();

        Ok(CollaboratorResponse {
            collaborator,
            design_status: refresh.design.status,
        })
    }

    pub async fn update_collaborator(
        pool: &PgPool,
        design_id: Uuid,
        target_user_id: Uuid,
        actor_id: Uuid,
        req: UpdateCollaboratorRequest,
    ) -> Result<CollaboratorResponse, AppError> {
        if req.role.is_none() && req.notifications_enabled.is_none() {
            return Err(AppError::ValidationError(
                "role or notifications_enabled is required".to_string(),
            ));
        }
        let (_, actor_role) = DesignService::require_role(pool, design_id, actor_id).await?;
        if req.notifications_enabled.is_some() {
            check_notification_toggle(actor_role, actor_id, target_user_id)?;
        }

        let mut tx = pool.begin().await?;
        let design = design_repo::lock_design(&mut tx, design_id)
            .await?
            .ok_or(AppError::NotFound("Design not found".to_string()))?;
        let current = collaboration_repo::find_collaborator(&mut tx, design_id, target_user_id)
            .await?
            .ok_or(AppError::NotFound("Collaborator not found".to_string()))?;

        let role = match req.role {
            Some(role) if role != current.role => {
                let owner_count = collaboration_repo::count_owners(&mut tx, design_id).await?;
                check_role_change(actor_role, current.role, role, owner_count)?;
                role
            }
            _ => current.role,
        };
        let notifications_enabled = req
            .notifications_enabled
            .unwrap_or(current.notifications_enabled);

        let collaborator = collaboration_repo::update_collaborator(
            &mut tx,
            design_id,
            target_user_id,
            role,
            notifications_enabled,
        )
        .await?;
        let refresh = if changes_reviewer_set(current.role, role) {
            refresh_status(&mut tx, design).await?
        } else {
            StatusRefresh::unchanged(design)
        };
        tx.commit().await?;

        BusinessEvent::CollaboratorUpdated {
            design_id,
            updated_by: actor_id,
            user_id: target_user_id,
            role: collaborator.role,
            notifications_enabled: collaborator.notifications_enabled,
        }
        .log();
        refresh.log_change();

        Ok(CollaboratorResponse {
            collaborator,
            design_status: refresh.design.status,
        })
    }
}

fn check_grant(actor_role: CollaborationRole, role: CollaborationRole) -> Result<(), AppError> {
    if !actor_role.permissions().can_manage_collaborators {
        return Err(AppError::Forbidden(
            "Only owners and editors can manage collaborators".to_string(),
        ));
    }
    if role == CollaborationRole::Owner && actor_role != CollaborationRole::Owner {
        return Err(AppError::Forbidden(
            "Only owners can grant or revoke the owner role".to_string(),
        ));
    }
    Ok(())
}

/// A design always keeps at least one owner.
fn check_role_change(
    actor_role: CollaborationRole,
    current: CollaborationRole,
    next: CollaborationRole,
    owner_count: i64,
) -> Result<(), AppError> {
    check_grant(actor_role, next)?;
    if current == CollaborationRole::Owner {
        if actor_role != CollaborationRole::Owner {
            return Err(AppError::Forbidden(
                "Only owners can grant or revoke the owner role".to_string(),
            ));
        }
        if next != CollaborationRole::Owner && owner_count <= 1 {
            return Err(AppError::BadRequest(
                "Cannot remove the last owner of a design".to_string(),
            ));
        }
    }
    Ok(())
}

/// Only reviewers vote, so only moves into or out of that role touch the status.
fn changes_reviewer_set(current: CollaborationRole, next: CollaborationRole) -> bool {
    current != next && (current.is_required_reviewer() || next.is_required_reviewer())
}

fn check_notification_toggle(
    actor_role: CollaborationRole,
    actor_id: Uuid,
    target_user_id: Uuid,
) -> Result<(), AppError> {
    if actor_id == target_user_id || actor_role.permissions().can_manage_collaborators {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "You can only change your own notification settings".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        approvals::{ApprovalStatus, ReviewerVerdict, aggregate_status},
        collaborations::CollaborationRole::{Editor, Owner, Reviewer, Viewer},
        designs::DesignStatus,
    };

    #[test]
    fn editors_manage_but_cannot_grant_owner() {
        assert!(check_grant(Editor, Reviewer).is_ok());
        assert!(matches!(
            check_grant(Editor, Owner),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_grant(Owner, Owner).is_ok());
    }

    #[test]
    fn reviewers_and_viewers_cannot_manage() {
        for role in [Reviewer, Viewer] {
            assert!(matches!(
                check_grant(role, Viewer),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn last_owner_cannot_be_demoted() {
        let result = check_role_change(Owner, Owner, Editor, 1);
        assert!(matches!(result, Err(AppError::BadRequest(message)) if message.contains("last owner")));
        assert!(check_role_change(Owner, Owner, Editor, 2).is_ok());
    }

    #[test]
    fn editors_cannot_demote_owners() {
        assert!(matches!(
            check_role_change(Editor, Owner, Viewer, 3),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn editors_can_swap_non_owner_roles() {
        assert!(check_role_change(Editor, Viewer, Reviewer, 1).is_ok());
        assert!(check_role_change(Editor, Reviewer, Viewer, 1).is_ok());
    }

    #[test]
    fn only_reviewer_moves_refresh_status() {
        assert!(changes_reviewer_set(Reviewer, Viewer));
        assert!(changes_reviewer_set(Viewer, Reviewer));
        assert!(!changes_reviewer_set(Reviewer, Reviewer));
        assert!(!changes_reviewer_set(Editor, Viewer));
    }

    #[test]
    fn demoting_the_last_reviewer_keeps_the_status() {
        let reviewer = Uuid::new_v4();
        let verdicts = [ReviewerVerdict {
            user_id: reviewer,
            status: ApprovalStatus::Rejected,
        }];
        assert_eq!(
            aggregate_status(DesignStatus::InReview, &[reviewer], &verdicts),
            DesignStatus::Rejected
        );

        assert!(changes_reviewer_set(Reviewer, Viewer));
        let remaining: [Uuid; 0] = [];
        assert_eq!(
            aggregate_status(DesignStatus::Rejected, &remaining, &verdicts),
            DesignStatus::Rejected
        );
    }

    #[test]
    fn users_toggle_their_own_notifications() {
        let user = Uuid::new_v4();
        assert!(check_notification_toggle(Viewer, user, user).is_ok());
        assert!(check_notification_toggle(Editor, user, Uuid::new_v4()).is_ok());
        assert!(matches!(
            check_notification_toggle(Reviewer, user, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }
}
