//! Receipt printer commands.
//!
//! `Printer` resolves its print service once and keeps it for the lifetime
//! of the process. A failed lookup is not cached, so a printer installed
//! later is picked up by the next call.

pub mod cups;


pub use cups::{CupsLookup, CupsPrintService};

use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// ESC @
pub const DEFAULT_INIT: &str = "27,64";
/// GS V 1
pub const DEFAULT_CUT: &str = "29,86,1";
/// ESC p 0 60 120
pub const DEFAULT_CASH_DRAWER: &str = "27,112,0,60,120";

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Printer not configured")]
    NotConfigured,
    #[error("Printer with name '{0}' not exist, if exists please restart the APi Reports service")]
    NotFound(String),
    #[error("Invalid printer command byte '{0}', must be between -128 and 255")]
    InvalidByte(String),
    #[error("Print job failed: {0}")]
    Job(String),
    #[error("Print job failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A print destination accepting raw bytes.
pub trait PrintService: Send + Sync {
    fn name(&self) -> &str;
    fn print(&self, bytes: &[u8]) -> Result<(), PrinterError>;
}

/// Finds print services by name.
pub trait PrintServiceLookup: Send + Sync {
    fn lookup(&self, name: &str) -> Result<Option<Arc<dyn PrintService>>, PrinterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterConfig {
    pub name: String,
    pub init: Vec<u8>,
    pub cut: Vec<u8>,
    pub cash_drawer: Vec<u8>,
}

impl PrinterConfig {
    /// Build from comma separated decimal byte lists.
    pub fn parse(
        name: impl Into<String>,
        init: &str,
        cut: &str,
        cash_drawer: &str,
    ) -> Result<Self, PrinterError> {
        Ok(Self {
            name: name.into(),
            init: parse_bytes(init)?,
            cut: parse_bytes(cut)?,
            cash_drawer: parse_bytes(cash_drawer)?,
        })
    }
}

/// Parse `"27, 64"` into `[27, 64]`. Negative values are two's complement,
/// so `-1` and `255` are the same byte.
pub fn parse_bytes(list: &str) -> Result<Vec<u8>, PrinterError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.parse::<i16>() {
            Ok(value) if (-128..=255).contains(&value) => Ok(value as u8),
            _ => Err(PrinterError::InvalidByte(item.to_string())),
        })
        .collect()
}

pub struct Printer {
    config: PrinterConfig,
    lookup: Arc<dyn PrintServiceLookup>,
    service: Mutex<Option<Arc<dyn PrintService>>>,
}

impl Printer {
    pub fn new(config: PrinterConfig, lookup: Arc<dyn PrintServiceLookup>) -> Self {
        Self {
            config,
            lookup,
            service: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// The print service, looked up on first use.
    pub fn service(&self) -> Result<Arc<dyn PrintService>, PrinterError> {
        let mut cached = self.service.lock();
        if let Some(service) = cached.as_ref() {
            return Ok(service.clone());
        }

        if self.config.name.trim().is_empty() {
            return Err(PrinterError::NotConfigured);
        }

        let service = self
            .lookup
            .lookup(&self.config.name)?
            .ok_or_else(|| PrinterError::NotFound(self.config.name.clone()))?;
        info!("Print service '{}' resolved", service.name());
        *cached = Some(service.clone());
        Ok(service)
    }

    pub fn cut_paper(&self) -> Result<(), PrinterError> {
        debug!("Cut paper on '{}'", self.config.name);
        self.send(&[&self.config.init, &self.config.cut])
    }

    pub fn cash_drawer(&self) -> Result<(), PrinterError> {
        debug!("Open cash drawer on '{}'", self.config.name);
        self.send(&[&self.config.init, &self.config.cash_drawer])
    }

    pub fn cut_and_cash_drawer(&self) -> Result<(), PrinterError> {
        debug!("Cut paper and open cash drawer on '{}'", self.config.name);
        self.send(&[&self.config.init, &self.config.cut, &self.config.cash_drawer])
    }

    fn send(&self, parts: &[&Vec<u8>]) -> Result<(), PrinterError> {
        let bytes: Vec<u8> = parts.iter().flat_map(|part| part.iter().copied()).collect();
        self.service()?.print(&bytes)
    }
}
