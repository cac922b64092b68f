use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    collaborations::{CollaborationPermissions, CollaborationRole},
    designs::{Design, DesignStatus},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDesignRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub project_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Metadata update. Image and dimensions change only through a new version,
/// and `status` is derived from reviewer verdicts, so it is rejected here.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDesignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListDesignsQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<DesignStatus>,
}

#[derive(Debug, Serialize)]
pub struct DesignResponse {
    #[serde(flatten)]
    pub design: Design,
    pub role: CollaborationRole,
    pub permissions: CollaborationPermissions,
}

#[derive(Debug, Serialize)]
pub struct DesignListResponse {
    pub data: Vec<Design>,
}
