use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Document metadata copied into the exporter configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub application: Option<String>,
    pub creator: Option<String>,
    pub display_metadata_title: bool,
}
