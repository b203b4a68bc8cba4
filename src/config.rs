//! Service configuration read from environment variables (and `.env`).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::printer::{self, PrinterConfig, PrinterError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_QUEUE: usize = 100;
pub const DEFAULT_ENGINE_COMMAND: &str = "jasperstarter-json";
pub const DEFAULT_SIGN_COMMAND: &str = "pdf-sign";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
    #[error("Invalid printer configuration: {0}")]
    Printer(#[from] PrinterError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Parent directory of the report workspaces
    pub tmp_dir: Option<PathBuf>,
    /// Allowed client addresses, empty allows everyone
    pub allowed_ips: Vec<String>,
    pub workers: usize,
    pub queue: usize,
    pub engine_command: String,
    pub engine_args: Vec<String>,
    pub sign_command: String,
    /// Present when `PRINTER_NAME` is set
    pub printer: Option<PrinterConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tmp_dir: None,
            allowed_ips: Vec::new(),
            workers: DEFAULT_WORKERS,
            queue: DEFAULT_QUEUE,
            engine_command: DEFAULT_ENGINE_COMMAND.to_string(),
            engine_args: Vec::new(),
            sign_command: DEFAULT_SIGN_COMMAND.to_string(),
            printer: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment, `run` loads `.env` into it first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, unset and blank values use the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let workers = number(get("REPORT_WORKERS"), "REPORT_WORKERS", DEFAULT_WORKERS)?;
        if workers == 0 {
            return Err(ConfigError::Zero {
                key: "REPORT_WORKERS",
            });
        }

        let printer = match get("PRINTER_NAME") {
            Some(name) => Some(PrinterConfig::parse(
                name.trim(),
                &get("PRINTER_INIT").unwrap_or_else(|| printer::DEFAULT_INIT.to_string()),
                &get("PRINTER_CUT").unwrap_or_else(|| printer::DEFAULT_CUT.to_string()),
                &get("PRINTER_CASH_DRAWER")
                    .unwrap_or_else(|| printer::DEFAULT_CASH_DRAWER.to_string()),
            )?),
            None => None,
        };

        Ok(Self {
            host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: number(get("SERVER_PORT"), "SERVER_PORT", DEFAULT_PORT)?,
            tmp_dir: get("REPORT_TMPDIR").map(PathBuf::from),
            allowed_ips: get("CLIENT_ALLOW_IPS")
                .map(|list| split_list(&list, ','))
                .unwrap_or_default(),
            workers,
            queue: number(get("REPORT_QUEUE"), "REPORT_QUEUE", DEFAULT_QUEUE)?,
            engine_command: get("REPORT_ENGINE_COMMAND")
                .unwrap_or_else(|| DEFAULT_ENGINE_COMMAND.to_string()),
            engine_args: get("REPORT_ENGINE_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            sign_command: get("REPORT_SIGN_COMMAND")
                .unwrap_or_else(|| DEFAULT_SIGN_COMMAND.to_string()),
            printer,
        })
    }
}

fn number<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

fn split_list(list: &str, separator: char) -> Vec<String> {
    list.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
