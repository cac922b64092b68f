use serde::{Deserialize, Serialize};

use crate::models::annotations::{Annotation, AnnotationReply, AnnotationShape};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnotationRequest {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<String>,
    pub shape: AnnotationShape,
    pub path_data: Option<String>,
}

/// Body of `PATCH /annotations/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnnotationAction {
    Reply {
        content: String,
    },
    Resolve {
        note: Option<String>,
    },
    Reopen,
    Edit {
        content: Option<String>,
        color: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ListAnnotationsQuery {
    pub resolved: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AnnotationResponse {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub replies: Vec<AnnotationReply>,
}

#[derive(Debug, Serialize)]
pub struct AnnotationListResponse {
    pub data: Vec<AnnotationResponse>,
}
