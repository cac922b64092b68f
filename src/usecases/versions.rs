use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::versions::{PublishVersionRequest, PublishVersionResponse, VersionListResponse},
    error::AppError,
    models::{
        designs::DesignStatus,
        versions::{Dimensions, anchors_may_be_misaligned, next_version_number},
    },
    repositories::{
        collaborations as collaboration_repo,
        designs::{self as design_repo, DesignImageParams},
        versions::{self as version_repo, CreateVersionParams},
    },
    telemetry::BusinessEvent,
    usecases::{
        designs::{DesignService, MAX_VERSION_NOTES_LENGTH},
        validation::{
            normalize_optional_text, validate_dimensions, validate_optional_url, validate_url,
        },
    },
};

pub struct VersionService;

impl VersionService {
    /// Publishes the next image version. Existing annotations are left at
    /// their stored coordinates.
    pub async fn publish_version(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
        req: PublishVersionRequest,
    ) -> Result<PublishVersionResponse, AppError> {
        let image_url = validate_url(&req.image_url, "image_url")?;
        let thumbnail_url = validate_optional_url(req.thumbnail_url, "thumbnail_url")?;
        validate_dimensions(req.width, req.height)?;
        let notes = normalize_optional_text(req.notes, "notes", MAX_VERSION_NOTES_LENGTH)?;

        let (_, role) = DesignService::require_role(pool, design_id, user_id).await?;
        if !role.permissions().can_edit {
            return Err(AppError::Forbidden(
                "Only owners and editors can publish versions".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;
        let design = design_repo::lock_design(&mut tx, design_id)
            .await?
            .ok_or(AppError::NotFound("Design not found".to_string()))?;
        let current_max = version_repo::max_version_number(&mut tx, design_id).await?;
        let version_number = next_version_number(current_max);

        let version = version_repo::insert_version(
            &mut tx,
            CreateVersionParams {
                design_id,
                version_number,
                image_url: image_url.clone(),
                thumbnail_url: thumbnail_url.clone(),
                created_by: user_id,
                notes,
                width: req.width,
                height: req.height,
            },
        )
        .await?;

        let reviewers = collaboration_repo::list_reviewer_ids(&mut tx, design_id).await?;
        let status = DesignStatus::after_publish(!reviewers.is_empty());
        let updated = design_repo::update_design_image(
            &mut tx,
            design_id,
            DesignImageParams {
                image_url,
                thumbnail_url,
                width: req.width,
                height: req.height,
                version: version.version_number,
                status,
            },
        )
        .await?;
        tx.commit().await?;

        let misaligned = anchors_may_be_misaligned(
            Dimensions::new(design.width, design.height),
            Dimensions::new(updated.width, updated.height),
        );
        BusinessEvent::DesignVersionPublished {
            design_id,
            user_id,
            version_number: version.version_number,
            anchors_may_be_misaligned: misaligned,
        }
        .log();
        if design.status != updated.status {
            BusinessEvent::DesignStatusChanged {
                design_id,
                from: design.status,
                to: updated.status,
            }
            .log();
        }

        Ok(PublishVersionResponse {
            version,
            design: updated,
            anchors_may_be_misaligned: misaligned,
        })
    }

    pub async fn list_versions(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<VersionListResponse, AppError> {
        DesignService::require_role(pool, design_id, user_id).await?;
        let data = version_repo::list_versions(pool, design_id).await?;
        Ok(VersionListResponse { data })
    }
}
