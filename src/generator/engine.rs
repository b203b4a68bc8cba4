//! Rendering engine boundary.
//!
//! The pipeline only sees `ReportEngine`. `CommandEngine` drives an external
//! renderer: the engine properties are written to a uniquely named JSON file
//! next to the template and the configured program is invoked with that file.

use log::{debug, error};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::{EngineProperties, GeneratorError, SignConfig};
use crate::request::ReportFormat;

/// Engine input files are `engine*.json` and `sign*.json`, removed once the
/// program exits.
pub const ENGINE_PROPERTIES_PREFIX: &str = "engine";
pub const SIGN_PROPERTIES_PREFIX: &str = "sign";

pub trait ReportEngine: Send + Sync {
    /// Fill and export the report, returning the output file path. For the
    /// PRINT format the report goes to the selected printer instead.
    fn render(&self, properties: &EngineProperties) -> Result<PathBuf, GeneratorError>;

    /// Sign the PDF at `source` into `destination`.
    fn sign(
        &self,
        source: &Path,
        destination: &Path,
        config: &SignConfig,
    ) -> Result<(), GeneratorError>;
}

/// Engine backed by external programs.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    sign_program: String,
}

impl CommandEngine {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        sign_program: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            sign_program: sign_program.into(),
        }
    }
}

impl ReportEngine for CommandEngine {
    fn render(&self, properties: &EngineProperties) -> Result<PathBuf, GeneratorError> {
        let work_dir = parent_dir(&properties.output_path)?;
        let config_file = write_json(work_dir, ENGINE_PROPERTIES_PREFIX, properties)?;

        debug!(
            "Invoking '{}' with '{}'",
            self.program,
            config_file.path().display()
        );
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(config_file.path())
            .current_dir(work_dir);
        run(&self.program, &mut command)?;

        if properties.format != ReportFormat::Print && !properties.output_path.is_file() {
            let msg = format!(
                "Engine '{}' did not produce '{}'",
                self.program,
                properties.output_path.display()
            );
            error!("{}", msg);
            return Err(GeneratorError::Render(msg));
        }

        Ok(properties.output_path.clone())
    }

    fn sign(
        &self,
        source: &Path,
        destination: &Path,
        config: &SignConfig,
    ) -> Result<(), GeneratorError> {
        let work_dir = parent_dir(destination)?;
        let config_file = write_json(work_dir, SIGN_PROPERTIES_PREFIX, config)?;

        debug!("Signing '{}' into '{}'", source.display(), destination.display());
        let mut command = Command::new(&self.sign_program);
        command
            .arg(source)
            .arg(destination)
            .arg(config_file.path())
            .current_dir(work_dir);
        run(&self.sign_program, &mut command)?;

        if !destination.is_file() {
            let msg = format!("Signed file '{}' not created", destination.display());
            error!("{}", msg);
            return Err(GeneratorError::Render(msg));
        }
        Ok(())
    }
}

fn parent_dir(path: &Path) -> Result<&Path, GeneratorError> {
    path.parent().ok_or_else(|| {
        GeneratorError::Render(format!("'{}' has no parent directory", path.display()))
    })
}

/// Never clashes with a request resource, the file lives as long as the
/// returned handle.
fn write_json<T: Serialize>(
    dir: &Path,
    prefix: &str,
    value: &T,
) -> Result<NamedTempFile, GeneratorError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| GeneratorError::Properties(format!("Cannot serialize {}: {}", prefix, e)))?;
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".json")
        .tempfile_in(dir)?;
    file.write_all(&json)?;
    file.flush()?;
    Ok(file)
}

fn run(program: &str, command: &mut Command) -> Result<(), GeneratorError> {
    let output = command.output().map_err(|e| {
        let msg = format!("Cannot execute '{}': {}", program, e);
        error!("{}", msg);
        GeneratorError::Render(msg)
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let msg = format!("'{}' exited with status {}: {}", program, code, stderr.trim());
        error!("{}", msg);
        return Err(GeneratorError::Render(msg));
    }
    Ok(())
}
