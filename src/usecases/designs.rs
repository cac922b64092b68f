use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::designs::{
        CreateDesignRequest, DesignListResponse, DesignResponse, ListDesignsQuery,
        UpdateDesignRequest,
    },
    error::AppError,
    models::{
        collaborations::CollaborationRole,
        designs::Design,
        versions::next_version_number,
    },
    repositories::{
        collaborations as collaboration_repo,
        designs::{self as design_repo, CreateDesignParams, UpdateDesignParams},
        versions::{self as version_repo, CreateVersionParams},
    },
    telemetry::BusinessEvent,
    usecases::validation::{
        normalize_optional_text, normalize_required_text, normalize_tags, validate_dimensions,
        validate_optional_url, validate_url,
    },
};

pub struct DesignService;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub(crate) const MAX_VERSION_NOTES_LENGTH: usize = 2000;

impl DesignService {
    /// Creates the design together with version 1 and the creator's owner
    /// collaboration.
    pub async fn create_design(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateDesignRequest,
    ) -> Result<DesignResponse, AppError> {
        let title = normalize_required_text(&req.title, "title", MAX_TITLE_LENGTH)?;
        let description =
            normalize_optional_text(req.description, "description", MAX_DESCRIPTION_LENGTH)?;
        let image_url = validate_url(&req.image_url, "image_url")?;
        let thumbnail_url = validate_optional_url(req.thumbnail_url, "thumbnail_url")?;
        validate_dimensions(req.width, req.height)?;
        let tags = normalize_tags(req.tags)?;
        let notes = normalize_optional_text(req.notes, "notes", MAX_VERSION_NOTES_LENGTH)?;

        let mut tx = pool.begin().await?;
        let design = design_repo::create_design(
            &mut tx,
            CreateDesignParams {
                title,
                description,
                image_url: image_url.clone(),
                thumbnail_url: thumbnail_url.clone(),
                width: req.width,
                height: req.height,
                project_id: req.project_id,
                created_by: user_id,
                tags,
            },
        )
        .await?;
        version_repo::insert_version(
            &mut tx,
            CreateVersionParams {
                design_id: design.id,
                version_number: next_version_number(None),
                image_url,
                thumbnail_url,
                created_by: user_id,
                notes,
                width: design.width,
                height: design.height,
            },
        )
        .await?;
        collaboration_repo::add_collaborator(
            &mut tx,
            design.id,
            user_id,
            CollaborationRole::Owner,
            user_id,
            true,
        )
        .await?;
        tx.commit().await?;

        BusinessEvent::DesignCreated {
            design_id: design.id,
            user_id,
            project_id: design.project_id,
        }
        .log();

        Ok(design_response(design, CollaborationRole::Owner))
    }

    pub async fn get_design(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<DesignResponse, AppError> {
        let (design, role) = Self::require_role(pool, design_id, user_id).await?;
        Ok(design_response(design, role))
    }

    pub async fn list_designs(
        pool: &PgPool,
        user_id: Uuid,
        query: ListDesignsQuery,
    ) -> Result<DesignListResponse, AppError> {
        let data =
            design_repo::list_designs_for_user(pool, user_id, query.project_id, query.status)
                .await?;
        Ok(DesignListResponse { data })
    }

    /// Updates descriptive fields only. The image changes through a new
    /// version and the status through reviewer verdicts.
    pub async fn update_design(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
        req: UpdateDesignRequest,
    ) -> Result<DesignResponse, AppError> {
        let params = normalize_update(req)?;
        let (_, role) = Self::require_role(pool, design_id, user_id).await?;
        if !role.permissions().can_edit {
            return Err(AppError::Forbidden(
                "Only owners and editors can edit a design".to_string(),
            ));
        }

        let fields = changed_fields(&params);
        let mut tx = pool.begin().await?;
        let design = design_repo::update_design_details(&mut tx, design_id, params).await?;
        tx.commit().await?;

        BusinessEvent::DesignUpdated {
            design_id,
            user_id,
            fields,
        }
        .log();

        Ok(design_response(design, role))
    }

    /// Loads the design and the caller's collaboration role on it.
    pub(crate) async fn require_role(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
    ) -> Result<(Design, CollaborationRole), AppError> {
        let design = design_repo::find_design(pool, design_id)
            .await?
            .ok_or(AppError::NotFound("Design not found".to_string()))?;
        let role = collaboration_repo::get_role(pool, design_id, user_id)
            .await?
            .ok_or(AppError::Forbidden(
                "You are not a collaborator on this design".to_string(),
            ))?;
        Ok((design, role))
    }
}

fn normalize_update(req: UpdateDesignRequest) -> Result<UpdateDesignParams, AppError> {
    if req.status.is_some() {
        return Err(AppError::ValidationError(
            "status is derived from reviewer approvals and cannot be set directly".to_string(),
        ));
    }

    let title = req
        .title
        .map(|title| normalize_required_text(&title, "title", MAX_TITLE_LENGTH))
        .transpose()?;
    let description = req
        .description
        .map(|description| {
            normalize_required_text(&description, "description", MAX_DESCRIPTION_LENGTH)
        })
        .transpose()?;
    let tags = match req.tags {
        Some(tags) => Some(normalize_tags(Some(tags))?),
        None => None,
    };

    let params = UpdateDesignParams {
        title,
        description,
        project_id: req.project_id,
        tags,
    };
    if changed_fields(&params).is_empty() {
        return Err(AppError::ValidationError(
            "At least one field must be provided".to_string(),
        ));
    }
    Ok(params)
}

fn changed_fields(params: &UpdateDesignParams) -> Vec<String> {
    [
        ("title", params.title.is_some()),
        ("description", params.description.is_some()),
        ("project_id", params.project_id.is_some()),
        ("tags", params.tags.is_some()),
    ]
    .into_iter()
    .filter(|(_, present)| *present)
    .map(|(name, _)| name.to_string())
    .collect()
}

fn design_response(design: Design, role: CollaborationRole) -> DesignResponse {
    DesignResponse {
        design,
        role,
        permissions: role.permissions(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::validation::assert_validation_error;

    fn update() -> UpdateDesignRequest {
        UpdateDesignRequest {
            title: None,
            description: None,
            project_id: None,
            tags: None,
            status: None,
        }
    }

    #[test]
    fn status_cannot_be_set_through_update() {
        let req = UpdateDesignRequest {
            title: Some("New title".to_string()),
            status: Some(serde_json::json!("approved")),
            ..update()
        };
        assert_validation_error(normalize_update(req), "status is derived");
    }

    #[test]
    fn empty_update_rejected() {
        assert_validation_error(normalize_update(update()), "At least one field");
    }

    #[test]
    fn update_trims_title_and_tracks_fields() {
        let req = UpdateDesignRequest {
            title: Some("  Checkout v2 ".to_string()),
            tags: Some(vec!["web".to_string()]),
            ..update()
        };
        let params = normalize_update(req).expect("valid");
        assert_eq!(params.title.as_deref(), Some("Checkout v2"));
        assert_eq!(
            changed_fields(&params),
            vec!["title".to_string(), "tags".to_string()]
        );
    }

    #[test]
    fn blank_title_rejected() {
        let req = UpdateDesignRequest {
            title: Some("   ".to_string()),
            ..update()
        };
        assert_validation_error(normalize_update(req), "title is required");
    }
}
