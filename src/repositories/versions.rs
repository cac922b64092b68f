use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{error::AppError, models::versions::DesignVersion};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug)]
pub(crate) struct CreateVersionParams {
    pub design_id: Uuid,
    pub version_number: i32,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub width: i32,
    pub height: i32,
}

pub async fn insert_version(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateVersionParams,
) -> Result<DesignVersion, AppError> {
    let version = crate::log_query_fetch_one!(
        "versions.insert_version",
        sqlx::query_as::<_, DesignVersion>(
            r#"
            INSERT INTO review.design_version (
                design_id,
                version_number,
                image_url,
                thumbnail_url,
                created_by,
                notes,
                width,
                height
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(params.design_id)
        .bind(params.version_number)
        .bind(params.image_url)
        .bind(params.thumbnail_url)
        .bind(params.created_by)
        .bind(params.notes)
        .bind(params.width)
        .bind(params.height)
        .fetch_one(&mut **tx)
    )
    .map_err(map_version_unique_violation)?;

    Ok(version)
}

pub async fn max_version_number(
    tx: &mut Transaction<'_, Postgres>,
    design_id: Uuid,
) -> Result<Option<i32>, AppError> {
    let max = crate::log_query_fetch_one!(
        "versions.max_version_number",
        sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT MAX(version_number)
            FROM review.design_version
            WHERE design_id = $1
            "#,
        )
        .bind(design_id)
        .fetch_one(&mut **tx)
    )?;

    Ok(max)
}

pub async fn list_versions(
    pool: &PgPool,
    design_id: Uuid,
) -> Result<Vec<DesignVersion>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "versions.list_versions",
        sqlx::query_as::<_, DesignVersion>(
            r#"
            SELECT *
            FROM review.design_version
            WHERE design_id = $1
            ORDER BY version_number ASC
            "#,
        )
        .bind(design_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

fn map_version_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Conflict(
                "Version number already taken, reload the design and retry".to_string(),
            )
        }
        _ => err.into(),
    }
}
