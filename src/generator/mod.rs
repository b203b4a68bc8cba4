//! Generator module - translates a `ReportRequest` into engine properties,
//! drives the rendering engine and cleans up after it.
//!
//! - `coercer` - parameter values to engine-native values
//! - `datasource` - picks and resolves the request datasource
//! - `workspace` - per-request temporary directory
//! - `exporter` - format specific exporter properties (PDF signing included)
//! - `metadata` - document metadata injection
//! - `properties` - the engine configuration object
//! - `engine` - rendering engine boundary
//! - `pipeline` - the orchestrating `Generator`

pub mod coercer;
pub mod datasource;
pub mod engine;
pub mod exporter;
pub mod metadata;
pub mod pipeline;
pub mod properties;
pub mod workspace;

pub use coercer::{EngineValue, ParameterCoercer};
pub use datasource::{DataFormat, DatasourceResolver, EngineDatasource};
pub use engine::{CommandEngine, ReportEngine};
pub use exporter::{ExporterConfig, ExporterPropertyMapper, SignConfig};
pub use metadata::{DocumentMetadataTarget, MetadataField, MetadataInjector};
pub use pipeline::{GenerationState, Generator, GeneratorContext, ReportOutput};
pub use properties::EngineProperties;
pub use workspace::Workspace;

use thiserror::Error;

/// Errors that can occur during report generation.
///
/// Messages are surfaced to the client verbatim.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{0}")]
    Parameter(String),
    #[error("{0}")]
    DataSource(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Properties(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Injection(String),
    #[error("{0}")]
    Render(String),
    #[error("{0}")]
    Printer(#[from] crate::printer::PrinterError),
}

impl GeneratorError {
    /// Short kind name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parameter(_) => "ParameterError",
            Self::DataSource(_) => "DataSourceError",
            Self::Parse(_) => "ParseError",
            Self::Properties(_) => "PropertiesError",
            Self::Io(_) => "IOError",
            Self::Injection(_) => "InjectionError",
            Self::Render(_) => "RenderError",
            Self::Printer(_) => "PrinterError",
        }
    }
}
