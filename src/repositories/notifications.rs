use serde_json::Value;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotificationKind {
    AnnotationCreated,
    AnnotationResolved,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnnotationCreated => "annotation_created",
            Self::AnnotationResolved => "annotation_resolved",
        }
    }
}

pub(crate) struct CreateAnnotationNotifications {
    pub user_ids: Vec<Uuid>,
    pub actor_id: Uuid,
    pub design_id: Uuid,
    pub annotation_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: Value,
}

/// Writes one outbox row per recipient. Delivery happens elsewhere.
pub async fn create_annotation_notifications(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateAnnotationNotifications,
) -> Result<u64, AppError> {
    if params.user_ids.is_empty() {
        return Ok(0);
    }

    let rows = crate::log_query_execute!(
        "notifications.create_annotation_notifications",
        sqlx::query(
            r#"
            INSERT INTO review.notification (
                user_id,
                actor_id,
                design_id,
                annotation_id,
                notification_type,
                title,
                body,
                data
            )
            SELECT
                target_id,
                $2,
                $3,
                $4,
                $5,
                $6,
                $7,
                $8
            FROM UNNEST($1::uuid[]) AS target_id
            "#,
        )
        .bind(params.user_ids)
        .bind(params.actor_id)
        .bind(params.design_id)
        .bind(params.annotation_id)
        .bind(params.kind.as_str())
        .bind(params.title)
        .bind(params.body)
        .bind(sqlx::types::Json(params.data))
        .execute(&mut **tx)
    )?;

    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::NotificationKind;

    #[test]
    fn notification_type_names() {
        assert_eq!(
            NotificationKind::AnnotationCreated.as_str(),
            "annotation_created"
        );
        assert_eq!(
            NotificationKind::AnnotationResolved.as_str(),
            "annotation_resolved"
        );
    }
}
