use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::annotations::{Annotation, AnnotationReply, AnnotationShape},
};

#[derive(Debug)]
pub(crate) struct CreateAnnotationParams {
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
}

pub async fn create_annotation(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateAnnotationParams,
) -> Result<Annotation, AppError> {
    let row = crate::log_query_fetch_one!(
        "annotations.create_annotation",
        sqlx::query_as::<_, Annotation>(
            r#"
            INSERT INTO review.annotation (
                design_id,
                user_id,
                content,
                x,
                y,
                width,
                height,
                color,
                shape,
                path_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(params.design_id)
        .bind(params.user_id)
        .bind(params.content)
        .bind(params.x)
        .bind(params.y)
        .bind(params.width)
        .bind(params.height)
        .bind(params.color)
        .bind(params.shape)
        .bind(params.path_data)
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

pub async fn find_annotation(
    pool: &PgPool,
    annotation_id: Uuid,
) -> Result<Option<Annotation>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "annotations.find_annotation",
        sqlx::query_as::<_, Annotation>(
            r#"
            SELECT *
            FROM review.annotation
            WHERE id = $1
            "#,
        )
        .bind(annotation_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

/// Row-locks the annotation so concurrent resolve/reopen calls serialize.
pub async fn lock_annotation(
    tx: &mut Transaction<'_, Postgres>,
    annotation_id: Uuid,
) -> Result<Option<Annotation>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "annotations.lock_annotation",
        sqlx::query_as::<_, Annotation>(
            r#"
            SELECT *
            FROM review.annotation
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(annotation_id)
        .fetch_optional(&mut **tx)
    )?;

    Ok(row)
}

pub async fn list_annotations(
    pool: &PgPool,
    design_id: Uuid,
    resolved: Option<bool>,
) -> Result<Vec<Annotation>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "annotations.list_annotations",
        sqlx::query_as::<_, Annotation>(
            r#"
            SELECT *
            FROM review.annotation
            WHERE design_id = $1
            AND ($2::boolean IS NULL OR resolved = $2)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(design_id)
        .bind(resolved)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

/// Persists the resolution fields exactly as they are on `annotation`.
pub async fn save_resolution(
    tx: &mut Transaction<'_, Postgres>,
    annotation: &Annotation,
) -> Result<Annotation, AppError> {
    let row = crate::log_query_fetch_one!(
        "annotations.save_resolution",
        sqlx::query_as::<_, Annotation>(
            r#"
            UPDATE review.annotation
            SET
                resolved = $2,
                resolved_by = $3,
                resolved_at = $4,
                resolved_note = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(annotation.id)
        .bind(annotation.resolved)
        .bind(annotation.resolved_by)
        .bind(annotation.resolved_at)
        .bind(annotation.resolved_note.as_deref())
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

pub async fn update_annotation_content(
    tx: &mut Transaction<'_, Postgres>,
    annotation_id: Uuid,
    content: Option<String>,
    color: Option<String>,
) -> Result<Annotation, AppError> {
    let row = crate::log_query_fetch_one!(
        "annotations.update_annotation_content",
        sqlx::query_as::<_, Annotation>(
            r#"
            UPDATE review.annotation
            SET
                content = COALESCE($2, content),
                color = COALESCE($3, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(annotation_id)
        .bind(content)
        .bind(color)
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

pub async fn insert_reply(
    tx: &mut Transaction<'_, Postgres>,
    annotation_id: Uuid,
    author_id: Uuid,
    content: String,
) -> Result<AnnotationReply, AppError> {
    let row = crate::log_query_fetch_one!(
        "annotations.insert_reply",
        sqlx::query_as::<_, AnnotationReply>(
            r#"
            INSERT INTO review.annotation_reply (annotation_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, annotation_id, author_id, content, created_at
            "#,
        )
        .bind(annotation_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

/// Replies for the given annotations in thread order.
pub async fn list_replies(
    pool: &PgPool,
    annotation_ids: &[Uuid],
) -> Result<Vec<AnnotationReply>, AppError> {
    if annotation_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = crate::log_query_fetch_all!(
        "annotations.list_replies",
        sqlx::query_as::<_, AnnotationReply>(
            r#"
            SELECT id, annotation_id, author_id, content, created_at
            FROM review.annotation_reply
            WHERE annotation_id = ANY($1)
            ORDER BY annotation_id, seq ASC
            "#,
        )
        .bind(annotation_ids)
        .fetch_all(pool)
    )?;

    Ok(rows)
}
