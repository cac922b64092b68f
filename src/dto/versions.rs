use serde::{Deserialize, Serialize};

use crate::models::{designs::Design, versions::DesignVersion};

#[derive(Debug, Clone, Deserialize)]
pub struct PublishVersionRequest {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishVersionResponse {
    pub version: DesignVersion,
    pub design: Design,
    /// Existing annotations keep their coordinates; clients should warn when
    /// this is set.
    pub anchors_may_be_misaligned: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionListResponse {
    pub data: Vec<DesignVersion>,
}
