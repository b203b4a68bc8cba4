use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{EngineDatasource, EngineValue, ExporterConfig};
use crate::request::ReportFormat;

/// Printer selection for the PRINT format.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrintProperties {
    pub selected_printer: String,
}

/// Engine configuration built by the pipeline from a request.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineProperties {
    pub format: ReportFormat,
    pub copies: i32,
    pub encoding: String,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub resources: Vec<PathBuf>,
    pub parameters: BTreeMap<String, EngineValue>,
    pub datasource: EngineDatasource,
    pub exporter: ExporterConfig,
    pub print: Option<PrintProperties>,
}

impl EngineProperties {
    pub(crate) fn new(
        format: ReportFormat,
        template_path: PathBuf,
        output_path: PathBuf,
        datasource: EngineDatasource,
    ) -> Self {
        Self {
            format,
            copies: 1,
            encoding: crate::request::DEFAULT_ENCODING.to_string(),
            template_path,
            output_path,
            resources: Vec::new(),
            parameters: BTreeMap::new(),
            datasource,
            exporter: ExporterConfig::Plain,
            print: None,
        }
    }
}
