//! The report generation pipeline.
//!
//! `Generator` turns one `ReportRequest` into a base64 document (or a print
//! job) and always hands its workspace to the background cleanup, whatever
//! the outcome.

use base64::{engine::general_purpose, Engine as _};
use log::{debug, error, info};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    DatasourceResolver, EngineProperties, ExporterPropertyMapper, GeneratorError,
    MetadataInjector, ParameterCoercer, ReportEngine, Workspace,
};
use super::properties::PrintProperties;
use crate::printer::{Printer, PrinterError};
use crate::request::{ReportFormat, ReportRequest, DEFAULT_ENCODING};

pub const TEMPLATE_FILE: &str = "report.jasper";
pub const OUTPUT_FILE: &str = "output";
const SIGNED_SUFFIX: &str = "_sign";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Created,
    WorkspaceReady,
    PropertiesResolved,
    Rendering,
    /// Output encoded, terminal state for every format but PRINT
    Encoded,
    /// Sent to the printer, terminal state for PRINT
    Printed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutput {
    /// Base64 encoded report
    Document(String),
    /// PRINT jobs produce nothing to return
    NoContent,
}

/// Shared dependencies of every generation.
#[derive(Clone)]
pub struct GeneratorContext {
    /// Parent of the per-request workspaces, system temp dir when `None`
    pub tmp_dir: Option<PathBuf>,
    pub engine: Arc<dyn ReportEngine>,
    pub printer: Option<Arc<Printer>>,
    pub mapper: ExporterPropertyMapper,
}

impl GeneratorContext {
    pub fn new(engine: Arc<dyn ReportEngine>) -> Self {
        Self {
            tmp_dir: None,
            engine,
            printer: None,
            mapper: ExporterPropertyMapper::new(),
        }
    }
}

/// Single use report generator.
pub struct Generator {
    id: Uuid,
    context: GeneratorContext,
    state: GenerationState,
    workspace_path: Option<PathBuf>,
}

impl Generator {
    pub fn new(context: GeneratorContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            state: GenerationState::Created,
            workspace_path: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Workspace used by the last generation, it may already be removed.
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace_path.as_deref()
    }

    pub fn generate(&mut self, request: &ReportRequest) -> Result<ReportOutput, GeneratorError> {
        let workspace = match Workspace::create(self.context.tmp_dir.as_deref()) {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("[{}] Cannot create workspace: {}", self.id, e);
                self.state = GenerationState::Failed;
                return Err(e.into());
            }
        };
        self.workspace_path = Some(workspace.path().to_path_buf());
        self.state = GenerationState::WorkspaceReady;

        let result = self.run(request, &workspace);
        workspace.discard();

        match &result {
            Ok(_) => info!("[{}] Report generation finished", self.id),
            Err(e) => {
                self.state = GenerationState::Failed;
                error!("[{}] {}: {}", self.id, e.kind(), e);
            }
        }
        result
    }

    fn run(
        &mut self,
        request: &ReportRequest,
        workspace: &Workspace,
    ) -> Result<ReportOutput, GeneratorError> {
        let parameters = ParameterCoercer::coerce_all(&request.parameters)?;
        let datasource = DatasourceResolver::resolve(request, workspace)?;

        let format = request
            .report_type
            .ok_or_else(|| GeneratorError::Properties("Report type not defined".to_string()))?;
        if request.copies < 1 {
            return Err(GeneratorError::Properties(format!(
                "Copies must be greater than zero, got {}",
                request.copies
            )));
        }
        info!("[{}] Generating '{}' report", self.id, format);

        let template_path = workspace.write_base64(TEMPLATE_FILE, &request.report)?;
        let mut resources = Vec::with_capacity(request.report_resources.len());
        for resource in &request.report_resources {
            resources.push(workspace.write_base64(&resource.name, &resource.resource)?);
        }

        let mut properties = EngineProperties::new(
            format,
            template_path,
            workspace.file_path(OUTPUT_FILE)?,
            datasource,
        );
        properties.parameters = parameters;
        properties.resources = resources;
        properties.copies = request.copies;
        properties.encoding = if request.encoding.trim().is_empty() {
            DEFAULT_ENCODING.to_string()
        } else {
            request.encoding.clone()
        };
        debug!(
            "[{}] Copies {}, encoding '{}'",
            self.id, properties.copies, properties.encoding
        );

        properties.exporter = self.context.mapper.apply(format, request)?;
        MetadataInjector::inject(request.metadata.as_ref(), properties.exporter.metadata_target())?;
        self.state = GenerationState::PropertiesResolved;

        if format == ReportFormat::Print {
            return self.print(request, properties);
        }

        self.state = GenerationState::Rendering;
        let mut output = self.context.engine.render(&properties)?;

        if format == ReportFormat::Pdf && request.sign.is_some() {
            let sign = properties.exporter.sign().ok_or_else(|| {
                GeneratorError::Properties("Signature properties not resolved".to_string())
            })?;
            let signed = signed_path(&output);
            self.context.engine.sign(&output, &signed, sign)?;
            debug!("[{}] Report signed into '{}'", self.id, signed.display());
            output = signed;
        }

        let bytes = fs::read(&output)?;
        let encoded = general_purpose::STANDARD.encode(bytes);
        self.state = GenerationState::Encoded;
        Ok(ReportOutput::Document(encoded))
    }

    fn print(
        &mut self,
        request: &ReportRequest,
        mut properties: EngineProperties,
    ) -> Result<ReportOutput, GeneratorError> {
        let printer = self
            .context
            .printer
            .clone()
            .ok_or(PrinterError::NotConfigured)?;
        // fail before rendering when the printer does not exist
        printer.service()?;
        properties.print = Some(PrintProperties {
            selected_printer: printer.name().to_string(),
        });

        self.state = GenerationState::Rendering;
        self.context.engine.render(&properties)?;
        info!("[{}] Report sent to printer '{}'", self.id, printer.name());

        if request.cut_paper_after_print() {
            printer.cut_paper()?;
        }
        if request.open_cash_drawer_after_print() {
            printer.cash_drawer()?;
        }

        self.state = GenerationState::Printed;
        Ok(ReportOutput::NoContent)
    }
}

fn signed_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(SIGNED_SUFFIX);
    PathBuf::from(name)
}
