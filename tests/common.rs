use parking_lot::Mutex;
use reports_api::generator::{EngineProperties, GeneratorError, ReportEngine, SignConfig};
use reports_api::printer::{PrintService, PrintServiceLookup, PrinterConfig, PrinterError};
use reports_api::request::{JsonFile, ReportFormat, ReportRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const RENDERED: &[u8] = b"%PDF-1.4 rendered";
pub const SIGNED: &[u8] = b"%PDF-1.4 signed";

/// Engine writing fixed bytes to the requested output path.
#[derive(Default)]
pub struct FakeEngine {
    pub rendered: Mutex<Vec<EngineProperties>>,
    pub signed: Mutex<Vec<(PathBuf, PathBuf, SignConfig)>>,
    pub fail_with: Option<String>,
}

impl FakeEngine {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }
}

impl ReportEngine for FakeEngine {
    fn render(&self, properties: &EngineProperties) -> Result<PathBuf, GeneratorError> {
        self.rendered.lock().push(properties.clone());
        if let Some(message) = &self.fail_with {
            return Err(GeneratorError::Render(message.clone()));
        }
        if properties.format != ReportFormat::Print {
            std::fs::write(&properties.output_path, RENDERED)?;
        }
        Ok(properties.output_path.clone())
    }

    fn sign(
        &self,
        source: &Path,
        destination: &Path,
        config: &SignConfig,
    ) -> Result<(), GeneratorError> {
        self.signed.lock().push((
            source.to_path_buf(),
            destination.to_path_buf(),
            config.clone(),
        ));
        std::fs::write(destination, SIGNED)?;
        Ok(())
    }
}

/// Print service keeping every job in memory.
pub struct FakePrintService {
    name: String,
    pub jobs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl PrintService for FakePrintService {
    fn name(&self) -> &str {
        &self.name
    }

    fn print(&self, bytes: &[u8]) -> Result<(), PrinterError> {
        self.jobs.lock().push(bytes.to_vec());
        Ok(())
    }
}

/// Lookup knowing a single printer.
pub struct FakeLookup {
    pub installed: String,
    pub jobs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FakeLookup {
    pub fn new(installed: &str) -> Self {
        Self {
            installed: installed.to_string(),
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PrintServiceLookup for FakeLookup {
    fn lookup(&self, name: &str) -> Result<Option<Arc<dyn PrintService>>, PrinterError> {
        if name != self.installed {
            return Ok(None);
        }
        Ok(Some(Arc::new(FakePrintService {
            name: name.to_string(),
            jobs: self.jobs.clone(),
        })))
    }
}

pub fn printer_config(name: &str) -> PrinterConfig {
    PrinterConfig {
        name: name.to_string(),
        init: vec![27, 64],
        cut: vec![29, 86, 1],
        cash_drawer: vec![27, 112, 0, 60, 120],
    }
}

/// PDF request with an inline `{"items":[]}` JSON datasource.
pub fn json_file_request(format: ReportFormat) -> ReportRequest {
    ReportRequest {
        report: "cmVwb3J0IHRlbXBsYXRl".to_string(),
        report_type: Some(format),
        json_file: Some(JsonFile {
            json: "eyJpdGVtcyI6W119".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Number of entries left in `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
