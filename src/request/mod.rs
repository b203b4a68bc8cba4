//! Report request model - the deserialized body of `POST /report`.
//!
//! Submodules hold the nested blocks:
//! - `parameter` - typed report parameters
//! - `datasource` - the seven datasource variants
//! - `sign` - PDF digital signature settings
//! - `metadata` - document metadata
//! - `pdf` - PDF exporter properties and permission flags

pub mod datasource;
pub mod metadata;
pub mod parameter;
pub mod pdf;
pub mod sign;


use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub use datasource::{Database, HttpMethod, HttpSource, JsonFile, XmlFile};
pub use metadata::Metadata;
pub use parameter::{Parameter, ParameterType};
pub use pdf::PdfProperties;
pub use sign::{CertificateType, Sign, SignLevel, SignRectangle};

/// Cut the paper after a PRINT job.
pub const AFTER_PRINT_CUT_PAPER: u32 = 1;
/// Open the cash drawer after a PRINT job.
pub const AFTER_PRINT_OPEN_CASH_DRAWER: u32 = 2;

pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Output format of the generated report.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportFormat {
    Csv,
    Docx,
    Html,
    Json,
    Ods,
    Odt,
    Pdf,
    Pptx,
    Rtf,
    Text,
    Xls,
    Xlsx,
    Xml,
    Print,
}

impl ReportFormat {
    /// Lowercase name the rendering engine expects.
    pub fn engine_name(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Docx => "docx",
            Self::Html => "html",
            Self::Json => "json",
            Self::Ods => "ods",
            Self::Odt => "odt",
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
            Self::Rtf => "rtf",
            Self::Text => "text",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Xml => "xml",
            Self::Print => "print",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_name())
    }
}

/// Auxiliary file (sub-report, image...) written next to the main template.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportResource {
    pub name: String,
    /// Base64 encoded file content
    pub resource: String,
}

/// A report generation request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    /// Base64 encoded compiled report template
    pub report: String,
    pub report_resources: Vec<ReportResource>,
    pub report_type: Option<ReportFormat>,
    pub parameters: Vec<Parameter>,
    pub database: Option<Database>,
    pub json_http: Option<HttpSource>,
    pub json_https: Option<HttpSource>,
    pub xml_http: Option<HttpSource>,
    pub xml_https: Option<HttpSource>,
    pub json_file: Option<JsonFile>,
    pub xml_file: Option<XmlFile>,
    pub sign: Option<Sign>,
    pub copies: i32,
    pub encoding: String,
    /// Bitmask of `AFTER_PRINT_*` flags, only used with the PRINT format
    pub after_print_operations: u32,
    pub metadata: Option<Metadata>,
    pub pdf_properties: Option<PdfProperties>,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            report: String::new(),
            report_resources: Vec::new(),
            report_type: None,
            parameters: Vec::new(),
            database: None,
            json_http: None,
            json_https: None,
            xml_http: None,
            xml_https: None,
            json_file: None,
            xml_file: None,
            sign: None,
            copies: 1,
            encoding: DEFAULT_ENCODING.to_string(),
            after_print_operations: 0,
            metadata: None,
            pdf_properties: None,
        }
    }
}

impl ReportRequest {
    pub fn cut_paper_after_print(&self) -> bool {
        self.after_print_operations & AFTER_PRINT_CUT_PAPER == AFTER_PRINT_CUT_PAPER
    }

    pub fn open_cash_drawer_after_print(&self) -> bool {
        self.after_print_operations & AFTER_PRINT_OPEN_CASH_DRAWER == AFTER_PRINT_OPEN_CASH_DRAWER
    }
}
