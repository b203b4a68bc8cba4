use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// Response of the printer and version endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Response {
    pub status: Status,
    pub message: Option<String>,
    /// Elapsed time formatted as `<seconds>s.<nanoseconds>`
    pub duration: Option<String>,
}

impl Response {
    pub fn ok(message: Option<String>, elapsed: Duration) -> Self {
        Self {
            status: Status::Ok,
            message,
            duration: Some(format_duration(elapsed)),
        }
    }

    pub fn error(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            duration: Some(format_duration(elapsed)),
        }
    }
}

/// Response of `POST /report`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ReportResponse {
    pub status: Status,
    pub message: Option<String>,
    pub duration: Option<String>,
    /// Base64 encoded report, absent for PRINT and on errors
    pub report: Option<String>,
}

impl ReportResponse {
    pub fn ok(report: Option<String>, elapsed: Duration) -> Self {
        Self {
            status: Status::Ok,
            message: None,
            duration: Some(format_duration(elapsed)),
            report,
        }
    }

    pub fn error(message: impl Into<String>, elapsed: Option<Duration>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            duration: elapsed.map(format_duration),
            report: None,
        }
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    format!("{}s.{}", elapsed.as_secs(), elapsed.subsec_nanos())
}
