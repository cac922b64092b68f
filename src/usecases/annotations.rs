use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    dto::annotations::{
        AnnotationAction, AnnotationListResponse, AnnotationResponse, CreateAnnotationRequest,
        ListAnnotationsQuery,
    },
    error::AppError,
    models::{
        annotations::{Annotation, AnnotationReply, AnnotationShape},
        collaborations::CollaborationRole,
    },
    repositories::{
        annotations::{self as annotation_repo, CreateAnnotationParams},
        collaborations as collaboration_repo,
        notifications::{self as notification_repo, NotificationKind},
    },
    telemetry::BusinessEvent,
    usecases::{
        designs::DesignService,
        validation::{normalize_color, normalize_optional_text, normalize_required_text},
    },
};

pub struct AnnotationService;

const MAX_CONTENT_LENGTH: usize = 5000;
const MAX_NOTE_LENGTH: usize = 2000;
const MAX_PATH_DATA_LENGTH: usize = 100_000;
const NOTIFICATION_BODY_CHARS: usize = 160;

/// Validated annotation fields, ready to insert.
#[derive(Debug, PartialEq)]
struct AnnotationDraft {
    content: String,
    x: f64,
    y: f64,
    width: Option<f64>,
    height: Option<f64>,
    color: String,
    shape: AnnotationShape,
    path_data: Option<String>,
}

impl AnnotationService {
    pub async fn create_annotation(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
        req: CreateAnnotationRequest,
    ) -> Result<AnnotationResponse, AppError> {
        let draft = prepare_annotation(req)?;
        let (design, role) = DesignService::require_role(pool, design_id, user_id).await?;
        if !role.permissions().can_annotate {
            return Err(AppError::Forbidden(
                "You cannot annotate this design".to_string(),
            ));
        }
        if !design.contains_point(draft.x, draft.y) {
            return Err(AppError::ValidationError(format!(
                "Anchor ({}, {}) is outside the {}x{} design",
                draft.x, draft.y, design.width, design.height
            )));
        }

        let mut tx = pool.begin().await?;
        let annotation = annotation_repo::create_annotation(
            &mut tx,
            CreateAnnotationParams {
                design_id,
                user_id,
                content: draft.content,
                x: draft.x,
                y: draft.y,
                width: draft.width,
                height: draft.height,
                color: draft.color,
                shape: draft.shape,
                path_data: draft.path_data,
            },
        )
        .await?;
        let notified = notify_collaborators(
            &mut tx,
            &annotation,
            user_id,
            NotificationKind::AnnotationCreated,
            "New annotation on a design you follow",
            &annotation.content,
        )
        .await?;
        tx.commit().await?;

        BusinessEvent::AnnotationCreated {
            annotation_id: annotation.id,
            design_id,
            actor_id: user_id,
            notified,
        }
        .log();

        Ok(AnnotationResponse {
            annotation,
            replies: Vec::new(),
        })
    }

    pub async fn list_annotations(
        pool: &PgPool,
        design_id: Uuid,
        user_id: Uuid,
        query: ListAnnotationsQuery,
    ) -> Result<AnnotationListResponse, AppError> {
        DesignService::require_role(pool, design_id, user_id).await?;

        let annotations = annotation_repo::list_annotations(pool, design_id, query.resolved).await?;
        let ids: Vec<Uuid> = annotations.iter().map(|annotation| annotation.id).collect();
        let replies = annotation_repo::list_replies(pool, &ids).await?;

        Ok(AnnotationListResponse {
            data: attach_replies(annotations, replies),
        })
    }

    pub async fn get_annotation(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
    ) -> Result<AnnotationResponse, AppError> {
        let (annotation, _) = load_with_role(pool, annotation_id, user_id).await?;
        with_replies(pool, annotation).await
    }

    /// Dispatches `PATCH /annotations/{id}`.
    pub async fn apply_action(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
        action: AnnotationAction,
    ) -> Result<AnnotationResponse, AppError> {
        match action {
            AnnotationAction::Reply { content } => {
                Self::add_reply(pool, annotation_id, user_id, content).await
            }
            AnnotationAction::Resolve { note } => {
                Self::resolve(pool, annotation_id, user_id, note).await
            }
            AnnotationAction::Reopen => Self::reopen(pool, annotation_id, user_id).await,
            AnnotationAction::Edit { content, color } => {
                Self::edit(pool, annotation_id, user_id, content, color).await
            }
        }
    }

    /// Appends to the thread. Replies are never reordered or removed.
    pub async fn add_reply(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<AnnotationResponse, AppError> {
        let content = normalize_required_text(&content, "content", MAX_CONTENT_LENGTH)?;
        let (annotation, role) = load_with_role(pool, annotation_id, user_id).await?;
        if !role.permissions().can_annotate {
            return Err(AppError::Forbidden(
                "You cannot reply on this design".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;
        let reply = annotation_repo::insert_reply(&mut tx, annotation_id, user_id, content).await?;
        tx.commit().await?;

        BusinessEvent::AnnotationReplied {
            annotation_id,
            reply_id: reply.id,
            actor_id: user_id,
        }
        .log();

        with_replies(pool, annotation).await
    }

    /// Idempotent: resolving an already resolved annotation keeps the first
    /// resolver, timestamp and note.
    pub async fn resolve(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
        note: Option<String>,
    ) -> Result<AnnotationResponse, AppError> {
        let note = normalize_optional_text(note, "note", MAX_NOTE_LENGTH)?;
        let (_, role) = load_with_role(pool, annotation_id, user_id).await?;

        let mut tx = pool.begin().await?;
        let mut annotation = annotation_repo::lock_annotation(&mut tx, annotation_id)
            .await?
            .ok_or(AppError::NotFound("Annotation not found".to_string()))?;
        if !can_resolve(&annotation, user_id, role) {
            return Err(AppError::Forbidden(
                "You cannot resolve this annotation".to_string(),
            ));
        }

        if !annotation.resolve(user_id, note, Utc::now()) {
            tx.commit().await?;
            return with_replies(pool, annotation).await;
        }

        let annotation = annotation_repo::save_resolution(&mut tx, &annotation).await?;
        let body = annotation
            .resolved_note
            .clone()
            .unwrap_or_else(|| annotation.content.clone());
        let notified = notify_collaborators(
            &mut tx,
            &annotation,
            user_id,
            NotificationKind::AnnotationResolved,
            "An annotation was resolved",
            &body,
        )
        .await?;
        tx.commit().await?;

        BusinessEvent::AnnotationResolved {
            annotation_id,
            design_id: annotation.design_id,
            actor_id: user_id,
            notified,
        }
        .log();

        with_replies(pool, annotation).await
    }

    pub async fn reopen(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
    ) -> Result<AnnotationResponse, AppError> {
        let (_, role) = load_with_role(pool, annotation_id, user_id).await?;

        let mut tx = pool.begin().await?;
        let mut annotation = annotation_repo::lock_annotation(&mut tx, annotation_id)
            .await?
            .ok_or(AppError::NotFound("Annotation not found".to_string()))?;
        if !annotation.can_be_reopened_by(user_id, role) {
            return Err(AppError::Forbidden(
                "Only the author, the resolver, or a design owner or editor can reopen"
                    .to_string(),
            ));
        }

        if !annotation.reopen() {
            tx.commit().await?;
            return with_replies(pool, annotation).await;
        }

        let annotation = annotation_repo::save_resolution(&mut tx, &annotation).await?;
        tx.commit().await?;

        BusinessEvent::AnnotationReopened {
            annotation_id,
            design_id: annotation.design_id,
            actor_id: user_id,
        }
        .log();

        with_replies(pool, annotation).await
    }

    /// Authors may reword or recolour their own annotation; the anchor and
    /// shape are fixed.
    pub async fn edit(
        pool: &PgPool,
        annotation_id: Uuid,
        user_id: Uuid,
        content: Option<String>,
        color: Option<String>,
    ) -> Result<AnnotationResponse, AppError> {
        if content.is_none() && color.is_none() {
            return Err(AppError::ValidationError(
                "content or color is required".to_string(),
            ));
        }
        let content = content
            .map(|content| normalize_required_text(&content, "content", MAX_CONTENT_LENGTH))
            .transpose()?;
        let color = color.map(|color| normalize_color(Some(color))).transpose()?;

        let (annotation, _) = load_with_role(pool, annotation_id, user_id).await?;
        if annotation.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can edit an annotation".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;
        let annotation =
            annotation_repo::update_annotation_content(&mut tx, annotation_id, content, color)
                .await?;
        tx.commit().await?;

        with_replies(pool, annotation).await
    }
}

async fn load_with_role(
    pool: &PgPool,
    annotation_id: Uuid,
    user_id: Uuid,
) -> Result<(Annotation, CollaborationRole), AppError> {
    let annotation = annotation_repo::find_annotation(pool, annotation_id)
        .await?
        .ok_or(AppError::NotFound("Annotation not found".to_string()))?;
    let (_, role) = DesignService::require_role(pool, annotation.design_id, user_id).await?;
    Ok((annotation, role))
}

async fn with_replies(
    pool: &PgPool,
    annotation: Annotation,
) -> Result<AnnotationResponse, AppError> {
    let replies = annotation_repo::list_replies(pool, &[annotation.id]).await?;
    Ok(AnnotationResponse {
        annotation,
        replies,
    })
}

async fn notify_collaborators(
    tx: &mut Transaction<'_, Postgres>,
    annotation: &Annotation,
    actor_id: Uuid,
    kind: NotificationKind,
    title: &str,
    body: &str,
) -> Result<u64, AppError> {
    let recipients =
        collaboration_repo::list_notification_recipients(tx, annotation.design_id, actor_id)
            .await?;
    notification_repo::create_annotation_notifications(
        tx,
        notification_repo::CreateAnnotationNotifications {
            user_ids: recipients,
            actor_id,
            design_id: annotation.design_id,
            annotation_id: annotation.id,
            kind,
            title: title.to_string(),
            body: truncate_body(body),
            data: serde_json::json!({
                "annotation_id": annotation.id,
                "design_id": annotation.design_id,
                "x": annotation.x,
                "y": annotation.y,
            }),
        },
    )
    .await
}

fn can_resolve(annotation: &Annotation, user_id: Uuid, role: CollaborationRole) -> bool {
    annotation.user_id == user_id || role.permissions().can_resolve
}

fn prepare_annotation(req: CreateAnnotationRequest) -> Result<AnnotationDraft, AppError> {
    let content = normalize_required_text(&req.content, "content", MAX_CONTENT_LENGTH)?;
    validate_anchor(req.x, req.y)?;
    let width = validate_extent(req.width, "width")?;
    let height = validate_extent(req.height, "height")?;
    let color = normalize_color(req.color)?;
    let path_data = normalize_path_data(req.shape, req.path_data)?;

    Ok(AnnotationDraft {
        content,
        x: req.x,
        y: req.y,
        width,
        height,
        color,
        shape: req.shape,
        path_data,
    })
}

fn validate_anchor(x: f64, y: f64) -> Result<(), AppError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(AppError::ValidationError(
            "x and y must be finite numbers".to_string(),
        ));
    }
    if x < 0.0 || y < 0.0 {
        return Err(AppError::ValidationError(
            "x and y must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_extent(value: Option<f64>, field: &str) -> Result<Option<f64>, AppError> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(AppError::ValidationError(
            format!("{field} must be a non-negative finite number"),
        )),
        other => Ok(other),
    }
}

/// Freeform shapes need their path; every other shape drops it.
fn normalize_path_data(
    shape: AnnotationShape,
    path_data: Option<String>,
) -> Result<Option<String>, AppError> {
    if !shape.requires_path() {
        return Ok(None);
    }
    let path = path_data
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .ok_or_else(|| {
            AppError::ValidationError("Freeform annotations require path_data".to_string())
        })?;
    if path.len() > MAX_PATH_DATA_LENGTH {
        return Err(AppError::ValidationError(format!(
            "path_data exceeds {MAX_PATH_DATA_LENGTH} bytes"
        )));
    }
    Ok(Some(path))
}

fn truncate_body(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= NOTIFICATION_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut shortened: String = trimmed.chars().take(NOTIFICATION_BODY_CHARS).collect();
    shortened.push('…');
    shortened
}

fn attach_replies(
    annotations: Vec<Annotation>,
    replies: Vec<AnnotationReply>,
) -> Vec<AnnotationResponse> {
    let mut threads: HashMap<Uuid, Vec<AnnotationReply>> = HashMap::new();
    for reply in replies {
        threads.entry(reply.annotation_id).or_default().push(reply);
    }
    annotations
        .into_iter()
        .map(|annotation| AnnotationResponse {
            replies: threads.remove(&annotation.id).unwrap_or_default(),
            annotation,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::validation::assert_validation_error;
    use chrono::{Duration, Utc};

    fn request(shape: AnnotationShape, path_data: Option<&str>) -> CreateAnnotationRequest {
        CreateAnnotationRequest {
            content: " Align this with the grid ".to_string(),
            x: 10.0,
            y: 20.0,
            width: Some(40.0),
            height: None,
            color: None,
            shape,
            path_data: path_data.map(str::to_string),
        }
    }

    fn annotation(author: Uuid) -> Annotation {
        let now = Utc::now();
        Annotation {
            id: Uuid::new_v4(),
            design_id: Uuid::new_v4(),
            user_id: author,
            content: "Spacing".to_string(),
            x: 1.0,
            y: 2.0,
            width: None,
            height: None,
            color: "#ff3b30".to_string(),
            shape: AnnotationShape::Circle,
            path_data: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolved_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn reply(annotation_id: Uuid, content: &str, offset: i64) -> AnnotationReply {
        AnnotationReply {
            id: Uuid::new_v4(),
            annotation_id,
            author_id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: Utc::now() + Duration::seconds(offset),
        }
    }

    #[test]
    fn freeform_without_path_is_rejected() {
        assert_validation_error(
            prepare_annotation(request(AnnotationShape::Freeform, Some(""))),
            "require path_data",
        );
        assert_validation_error(
            prepare_annotation(request(AnnotationShape::Freeform, None)),
            "require path_data",
        );
    }

    #[test]
    fn freeform_keeps_path() {
        let draft =
            prepare_annotation(request(AnnotationShape::Freeform, Some("M0 0 L10 10"))).unwrap();
        assert_eq!(draft.path_data.as_deref(), Some("M0 0 L10 10"));
    }

    #[test]
    fn other_shapes_drop_path() {
        let draft =
            prepare_annotation(request(AnnotationShape::Rectangle, Some("M0 0 L10 10"))).unwrap();
        assert_eq!(draft.path_data, None);
        assert_eq!(draft.content, "Align this with the grid");
        assert_eq!(draft.color, "#ff3b30");
    }

    #[test]
    fn rejects_invalid_anchor() {
        let mut req = request(AnnotationShape::Arrow, None);
        req.x = f64::NAN;
        assert_validation_error(prepare_annotation(req), "finite");

        let mut req = request(AnnotationShape::Arrow, None);
        req.y = -5.0;
        assert_validation_error(prepare_annotation(req), "negative");
    }

    #[test]
    fn rejects_negative_extent() {
        let mut req = request(AnnotationShape::Rectangle, None);
        req.height = Some(-1.0);
        assert_validation_error(prepare_annotation(req), "height must be");
    }

    #[test]
    fn rejects_empty_content() {
        let mut req = request(AnnotationShape::Circle, None);
        req.content = "  ".to_string();
        assert_validation_error(prepare_annotation(req), "content is required");
    }

    #[test]
    fn author_or_resolving_roles_can_resolve() {
        let author = Uuid::new_v4();
        let item = annotation(author);
        assert!(can_resolve(&item, author, CollaborationRole::Viewer));
        assert!(can_resolve(&item, Uuid::new_v4(), CollaborationRole::Reviewer));
        assert!(!can_resolve(&item, Uuid::new_v4(), CollaborationRole::Viewer));
    }

    #[test]
    fn replies_attach_in_order() {
        let first = annotation(Uuid::new_v4());
        let second = annotation(Uuid::new_v4());
        let replies = vec![
            reply(first.id, "one", 0),
            reply(second.id, "other", 1),
            reply(first.id, "two", 2),
        ];
        let first_id = first.id;

        let result = attach_replies(vec![first, second], replies);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].annotation.id, first_id);
        let contents: Vec<&str> = result[0]
            .replies
            .iter()
            .map(|reply| reply.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "two"]);
        assert_eq!(result[1].replies.len(), 1);
    }

    #[test]
    fn notification_body_is_truncated() {
        let long = "x".repeat(NOTIFICATION_BODY_CHARS + 20);
        let body = truncate_body(&long);
        assert_eq!(body.chars().count(), NOTIFICATION_BODY_CHARS + 1);
        assert!(body.ends_with('…'));
        assert_eq!(truncate_body("  short "), "short");
    }
}
