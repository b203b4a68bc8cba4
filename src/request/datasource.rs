use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Relational database connection.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Database {
    pub connection_string: String,
    pub driver: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("connection_string", &self.connection_string)
            .field("driver", &self.driver)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// JSON or XML document fetched over HTTP(S) by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSource {
    pub url: String,
    #[serde(rename = "type")]
    pub method: HttpMethod,
    pub date_pattern: Option<String>,
    pub number_pattern: Option<String>,
}

/// Inline JSON datasource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonFile {
    /// Base64 encoded JSON document
    pub json: String,
    pub date_pattern: Option<String>,
    pub number_pattern: Option<String>,
}

/// Inline XML datasource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct XmlFile {
    /// Base64 encoded XML document
    pub xml: String,
    pub date_pattern: Option<String>,
    pub number_pattern: Option<String>,
}
