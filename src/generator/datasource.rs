//! Datasource resolution.
//!
//! A request may populate several datasource fields; the first one in
//! priority order wins and the rest are ignored.

use log::{debug, error};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use url::Url;

use super::{GeneratorError, Workspace};
use crate::request::{HttpMethod, HttpSource, ReportRequest};

pub const JSON_DATASOURCE_FILE: &str = "datasource.json";
pub const XML_DATASOURCE_FILE: &str = "datasource.xml";

const NO_DATASOURCE: &str = "No datasource defined in Report Request";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Json,
    Xml,
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

/// The single datasource handed to the engine.
#[derive(Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineDatasource {
    Database {
        connection_string: String,
        driver: String,
        user: String,
        password: String,
    },
    Http {
        format: DataFormat,
        secure: bool,
        url: Url,
        method: HttpMethod,
        date_pattern: Option<String>,
        number_pattern: Option<String>,
        encoding: String,
    },
    File {
        format: DataFormat,
        path: PathBuf,
        date_pattern: Option<String>,
        number_pattern: Option<String>,
    },
}

impl fmt::Debug for EngineDatasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database {
                connection_string,
                driver,
                user,
                ..
            } => f
                .debug_struct("Database")
                .field("connection_string", connection_string)
                .field("driver", driver)
                .field("user", user)
                .field("password", &"****")
                .finish(),
            Self::Http {
                format,
                secure,
                url,
                method,
                ..
            } => f
                .debug_struct("Http")
                .field("format", format)
                .field("secure", secure)
                .field("url", &url.as_str())
                .field("method", method)
                .finish(),
            Self::File { format, path, .. } => f
                .debug_struct("File")
                .field("format", format)
                .field("path", path)
                .finish(),
        }
    }
}

pub struct DatasourceResolver;

impl DatasourceResolver {
    /// Pick the datasource in the order database, JSON over HTTPS, JSON over
    /// HTTP, XML over HTTPS, XML over HTTP, JSON file, XML file.
    pub fn resolve(
        request: &ReportRequest,
        workspace: &Workspace,
    ) -> Result<EngineDatasource, GeneratorError> {
        if let Some(database) = &request.database {
            debug!("Using database datasource, driver '{}'", database.driver);
            return Ok(EngineDatasource::Database {
                connection_string: database.connection_string.clone(),
                driver: database.driver.clone(),
                user: database.user.clone(),
                password: database.password.clone(),
            });
        }

        let http_sources = [
            (&request.json_https, DataFormat::Json, true),
            (&request.json_http, DataFormat::Json, false),
            (&request.xml_https, DataFormat::Xml, true),
            (&request.xml_http, DataFormat::Xml, false),
        ];
        for (source, format, secure) in http_sources {
            if let Some(source) = source {
                return http_datasource(source, format, secure, &request.encoding);
            }
        }

        if let Some(json) = &request.json_file {
            let path = workspace.write_base64(JSON_DATASOURCE_FILE, &json.json)?;
            debug!("Using json file datasource '{}'", path.display());
            return Ok(EngineDatasource::File {
                format: DataFormat::Json,
                path,
                date_pattern: json.date_pattern.clone(),
                number_pattern: json.number_pattern.clone(),
            });
        }

        if let Some(xml) = &request.xml_file {
            let path = workspace.write_base64(XML_DATASOURCE_FILE, &xml.xml)?;
            debug!("Using xml file datasource '{}'", path.display());
            return Ok(EngineDatasource::File {
                format: DataFormat::Xml,
                path,
                date_pattern: xml.date_pattern.clone(),
                number_pattern: xml.number_pattern.clone(),
            });
        }

        error!("{}", NO_DATASOURCE);
        Err(GeneratorError::DataSource(NO_DATASOURCE.to_string()))
    }
}

fn http_datasource(
    source: &HttpSource,
    format: DataFormat,
    secure: bool,
    encoding: &str,
) -> Result<EngineDatasource, GeneratorError> {
    let url = Url::parse(&source.url).map_err(|e| {
        let msg = format!("Invalid datasource url '{}': {}", source.url, e);
        error!("{}", msg);
        GeneratorError::DataSource(msg)
    })?;

    debug!(
        "Using {} {} datasource '{}'",
        format,
        if secure { "https" } else { "http" },
        url
    );

    Ok(EngineDatasource::Http {
        format,
        secure,
        url,
        method: source.method,
        date_pattern: source.date_pattern.clone(),
        number_pattern: source.number_pattern.clone(),
        encoding: encoding.to_string(),
    })
}
