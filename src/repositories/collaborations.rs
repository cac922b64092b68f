use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::collaborations::{CollaborationRole, DesignCollaboration},
};

const UNIQUE_VIOLATION: &str = "23505";

pub async fn add_collaborator(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    user_id: Uuid,
    role: CollaborationRole,
    added_by: Uuid,
    notifications_enabled: bool,
) -> Result<DesignCollaboration, AppError> {
    let row = crate::log_query_fetch_one!(
        "collaborations.add_collaborator",
        sqlx::query_as::<_, DesignCollaboration>(
            r#"
            INSERT INTO review.design_collaboration (
                design_id,
                user_id,
                role,
                added_by,
                notifications_enabled
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(design_id)
        .bind(user_id)
        .bind(role)
        .bind(added_by)
        .bind(notifications_enabled)
        .fetch_one(&mut **tx)
    )
    .map_err(map_collaborator_unique_violation)?;

    Ok(row)
}

pub async fn get_role(
    pool: &PgPool,
    design_id: Uuid,
    user_id: Uuid,
) -> Result<Option<CollaborationRole>, AppError> {
    let role = crate::log_query_fetch_optional!(
        "collaborations.get_role",
        sqlx::query_scalar::<_, CollaborationRole>(
            r#"
            SELECT role
            FROM review.design_collaboration
            WHERE design_id = $1
            AND user_id = $2
            "#,
        )
        .bind(design_id)
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(role)
}

pub async fn find_collaborator(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    user_id: Uuid,
) -> Result<Option<DesignCollaboration>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "collaborations.find_collaborator",
        sqlx::query_as::<_, DesignCollaboration>(
            r#"
            SELECT *
            FROM review.design_collaboration
            WHERE design_id = $1
            AND user_id = $2
            "#,
        )
        .bind(design_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
    )?;

    Ok(row)
}

pub async fn list_collaborators(
    pool: &PgPool,
    design_id: Uuid,
) -> Result<Vec<DesignCollaboration>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "collaborations.list_collaborators",
        sqlx::query_as::<_, DesignCollaboration>(
            r#"
            SELECT *
            FROM review.design_collaboration
            WHERE design_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(design_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn list_reviewer_ids(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
) -> Result<Vec<Uuid>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "collaborations.list_reviewer_ids",
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM review.design_collaboration
            WHERE design_id = $1
            AND role = 'reviewer'
            ORDER BY created_at ASC
            "#,
        )
        .bind(design_id)
        .fetch_all(&mut **tx)
    )?;

    Ok(rows)
}

pub async fn update_collaborator(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    user_id: Uuid,
    role: CollaborationRole,
    notifications_enabled: bool,
) -> Result<DesignCollaboration, AppError> {
    let row = crate::log_query_fetch_one!(
        "collaborations.update_collaborator",
        sqlx::query_as::<_, DesignCollaboration>(
            r#"
            UPDATE review.design_collaboration
            SET role = $3, notifications_enabled = $4, updated_at = NOW()
            WHERE design_id = $1
            AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(design_id)
        .bind(user_id)
        .bind(role)
        .bind(notifications_enabled)
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

pub async fn count_owners(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
) -> Result<i64, AppError> {
    let count = crate::log_query_fetch_one!(
        "collaborations.count_owners",
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM review.design_collaboration
            WHERE design_id = $1
            AND role = 'owner'
            "#,
        )
        .bind(design_id)
        .fetch_one(&mut **tx)
    )?;

    Ok(count)
}

/// Collaborators who opted into notifications, excluding the acting user.
pub async fn list_notification_recipients(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    actor_id: Uuid,
) -> Result<Vec<Uuid>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "collaborations.list_notification_recipients",
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM review.design_collaboration
            WHERE design_id = $1
            AND user_id <> $2
            AND notifications_enabled
            "#,
        )
        .bind(design_id)
        .bind(actor_id)
        .fetch_all(&mut **tx)
    )?;

    Ok(rows)
}

fn map_collaborator_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Conflict("User already collaborates on this design".to_string())
        }
        _ => err.into(),
    }
}
