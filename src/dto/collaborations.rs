use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    collaborations::{CollaborationRole, DesignCollaboration},
    designs::DesignStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AddCollaboratorRequest {
    pub user_id: Uuid,
    pub role: CollaborationRole,
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCollaboratorRequest {
    pub role: Option<CollaborationRole>,
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CollaboratorResponse {
    pub collaborator: DesignCollaboration,
    pub design_status: DesignStatus,
}

#[derive(Debug, Serialize)]
pub struct CollaboratorListResponse {
    pub data: Vec<DesignCollaboration>,
}
