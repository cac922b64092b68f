use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::approvals::{ApprovalEvent, ApprovalStatus, DesignApproval, ReviewerVerdict},
};

#[derive(Debug)]
pub(crate) struct UpsertApprovalParams {
    pub design_id: Uuid,
    pub user_id: Uuid,
    pub status: ApprovalStatus,
    pub comment: Option<String>,
    pub design_version: i32,
}

/// Writes the user's current verdict (one row per design and user) and
/// appends the submission to the audit trail.
pub async fn upsert_approval(
    tx: &mut Transaction<'_, Postgres>,
    params: UpsertApprovalParams,
) -> Result<DesignApproval, AppError> {
    let approval = crate::log_query_fetch_one!(
        "approvals.upsert_approval",
        sqlx::query_as::<_, DesignApproval>(
            r#"
            INSERT INTO review.design_approval (
                design_id,
                user_id,
                status,
                comment,
                design_version
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (design_id, user_id) DO UPDATE
            SET
                status = EXCLUDED.status,
                comment = EXCLUDED.comment,
                design_version = EXCLUDED.design_version,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(params.design_id)
        .bind(params.user_id)
        .bind(params.status)
        .bind(params.comment.as_deref())
        .bind(params.design_version)
        .fetch_one(&mut **tx)
    )?;

    crate::log_query_execute!(
        "approvals.insert_approval_event",
        sqlx::query(
            r#"
            INSERT INTO review.design_approval_event (
                design_id,
                user_id,
                status,
                comment,
                design_version
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(params.design_id)
        .bind(params.user_id)
        .bind(params.status)
        .bind(params.comment)
        .bind(params.design_version)
        .execute(&mut **tx)
    )?;

    Ok(approval)
}

/// Verdicts cast on the given design version, oldest first.
pub async fn list_verdicts_for_version(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    design_version: i32,
) -> Result<Vec<ReviewerVerdict>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "approvals.list_verdicts_for_version",
        sqlx::query_as::<_, ReviewerVerdict>(
            r#"
            SELECT user_id, status
            FROM review.design_approval
            WHERE design_id = $1
            AND design_version = $2
            ORDER BY updated_at ASC
            "#,
        )
        .bind(design_id)
        .bind(design_version)
        .fetch_all(&mut **tx)
    )?;

    Ok(rows)
}

pub async fn list_approvals(
    pool: &PgPool,
    design_id: Uuid,
) -> Result<Vec<DesignApproval>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "approvals.list_approvals",
        sqlx::query_as::<_, DesignApproval>(
            r#"
            SELECT *
            FROM review.design_approval
            WHERE design_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(design_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn list_approval_events(
    pool: &PgPool,
    design_id: Uuid,
) -> Result<Vec<ApprovalEvent>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "approvals.list_approval_events",
        sqlx::query_as::<_, ApprovalEvent>(
            r#"
            SELECT id, design_id, user_id, status, comment, design_version, created_at
            FROM review.design_approval_event
            WHERE design_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(design_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}
