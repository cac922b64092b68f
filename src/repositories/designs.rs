use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::designs::{Design, DesignStatus},
};

#[derive(Debug)]
pub(crate) struct CreateDesignParams {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub project_id: Option<Uuid>,
    pub created_by: Uuid,
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct UpdateDesignParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug)]
pub(crate) struct DesignImageParams {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub version: i32,
    pub status: DesignStatus,
}

pub async fn create_design(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateDesignParams,
) -> Result<Design, AppError> {
    let design = crate::log_query_fetch_one!(
        "designs.create_design",
        sqlx::query_as::<_, Design>(
            r#"
            INSERT INTO review.design (
                title,
                description,
                image_url,
                thumbnail_url,
                width,
                height,
                project_id,
                created_by,
                tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(params.title)
        .bind(params.description)
        .bind(params.image_url)
        .bind(params.thumbnail_url)
        .bind(params.width)
        .bind(params.height)
        .bind(params.project_id)
        .bind(params.created_by)
        .bind(params.tags)
        .fetch_one(&mut **tx)
    )?;

    Ok(design)
}

pub async fn find_design(pool: &PgPool, design_id: Uuid) -> Result<Option<Design>, AppError> {
    let design = crate::log_query_fetch_optional!(
        "designs.find_design",
        sqlx::query_as::<_, Design>(
            r#"
            SELECT *
            FROM review.design
            WHERE id = $1
            "#,
        )
        .bind(design_id)
        .fetch_optional(pool)
    )?;

    Ok(design)
}

/// Loads the design and takes its row lock. Version publication, approval
/// upserts and reviewer changes all serialize on this lock.
pub async fn lock_design(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
) -> Result<Option<Design>, AppError> {
    let design = crate::log_query_fetch_optional!(
        "designs.lock_design",
        sqlx::query_as::<_, Design>(
            r#"
            SELECT *
            FROM review.design
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(design_id)
        .fetch_optional(&mut **tx)
    )?;

    Ok(design)
}

pub async fn list_designs_for_user(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
    status: Option<DesignStatus>,
) -> Result<Vec<Design>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "designs.list_designs_for_user",
        sqlx::query_as::<_, Design>(
            r#"
            SELECT d.*
            FROM review.design d
            JOIN review.design_collaboration c
                ON c.design_id = d.id
                AND c.user_id = $1
            WHERE ($2::uuid IS NULL OR d.project_id = $2)
            AND ($3::review.design_status IS NULL OR d.status = $3)
            ORDER BY d.updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .bind(status)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn update_design_details(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    params: UpdateDesignParams,
) -> Result<Design, AppError> {
    let design = crate::log_query_fetch_one!(
        "designs.update_design_details",
        sqlx::query_as::<_, Design>(
            r#"
            UPDATE review.design
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                project_id = COALESCE($4, project_id),
                tags = COALESCE($5, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(design_id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.project_id)
        .bind(params.tags)
        .fetch_one(&mut **tx)
    )?;

    Ok(design)
}

pub async fn update_design_image(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    params: DesignImageParams,
) -> Result<Design, AppError> {
    let design = crate::log_query_fetch_one!(
        "designs.update_design_image",
        sqlx::query_as::<_, Design>(
            r#"
            UPDATE review.design
            SET
                image_url = $2,
                thumbnail_url = $3,
                width = $4,
                height = $5,
                version = $6,
                status = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(design_id)
        .bind(params.image_url)
        .bind(params.thumbnail_url)
        .bind(params.width)
        .bind(params.height)
        .bind(params.version)
        .bind(params.status)
        .fetch_one(&mut **tx)
    )?;

    Ok(design)
}

pub async fn update_design_status(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
    status: DesignStatus,
) -> Result<Design, AppError> {
    let design = crate::log_query_fetch_one!(
        "designs.update_design_status",
        sqlx::query_as::<_, Design>(
            r#"
            UPDATE review.design
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(design_id)
        .bind(status)
        .fetch_one(&mut **tx)
    )?;

    Ok(design)
}
