//! CUPS backed print services, driven through the `lpstat` and `lp` tools.

use log::{debug, error};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use super::{PrintService, PrintServiceLookup, PrinterError};

#[derive(Debug, Default, Clone)]
pub struct CupsLookup;

impl PrintServiceLookup for CupsLookup {
    fn lookup(&self, name: &str) -> Result<Option<Arc<dyn PrintService>>, PrinterError> {
        let output = Command::new("lpstat").arg("-e").output()?;
        if !output.status.success() {
            let msg = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("lpstat failed: {}", msg);
            return Err(PrinterError::Job(msg));
        }

        let destinations = String::from_utf8_lossy(&output.stdout);
        let found = destinations.lines().any(|line| line.trim() == name);
        debug!("Printer '{}' found in CUPS: {}", name, found);

        Ok(found.then(|| Arc::new(CupsPrintService::new(name)) as Arc<dyn PrintService>))
    }
}

/// Raw print queue, bytes are passed to the device untouched.
#[derive(Debug, Clone)]
pub struct CupsPrintService {
    name: String,
}

impl CupsPrintService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PrintService for CupsPrintService {
    fn name(&self) -> &str {
        &self.name
    }

    fn print(&self, bytes: &[u8]) -> Result<(), PrinterError> {
        let mut child = Command::new("lp")
            .args(["-d", &self.name, "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(bytes)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let msg = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("lp failed for '{}': {}", self.name, msg);
            return Err(PrinterError::Job(msg));
        }

        debug!("{} bytes sent to '{}'", bytes.len(), self.name);
        Ok(())
    }
}
