use serde::{Deserialize, Serialize};

use crate::models::{
    approvals::{ApprovalEvent, ApprovalStatus, DesignApproval},
    designs::DesignStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitApprovalRequest {
    pub status: ApprovalStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub approval: DesignApproval,
    pub design_status: DesignStatus,
    pub status_changed: bool,
}

#[derive(Debug, Serialize)]
pub struct ApprovalListResponse {
    pub data: Vec<DesignApproval>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalHistoryResponse {
    pub data: Vec<ApprovalEvent>,
}
