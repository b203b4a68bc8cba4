//! Format specific exporter properties.

use log::{debug, error};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::metadata::{DocumentMetadataTarget, MetadataField};
use super::GeneratorError;
use crate::request::pdf::ALLOW_ALL_PERMISSIONS;
use crate::request::{CertificateType, ReportFormat, ReportRequest, SignLevel, SignRectangle};

pub const KEYSTORE_FILE: &str = "keystore.ks";

/// Exporter configuration handed to the engine, one variant per exporter
/// family.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "exporter", rename_all = "snake_case")]
pub enum ExporterConfig {
    Pdf(PdfExporterConfig),
    Office(OfficeExporterConfig),
    Plain,
}

impl ExporterConfig {
    /// Metadata capability of the selected exporter, if it has one.
    pub fn metadata_target(&mut self) -> Option<&mut dyn DocumentMetadataTarget> {
        match self {
            Self::Pdf(config) => Some(config as &mut dyn DocumentMetadataTarget),
            Self::Office(config) => Some(config as &mut dyn DocumentMetadataTarget),
            Self::Plain => None,
        }
    }

    pub fn sign(&self) -> Option<&SignConfig> {
        match self {
            Self::Pdf(config) if config.sign_pdf => config.sign.as_ref(),
            _ => None,
        }
    }
}

#[derive(Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PdfExporterConfig {
    pub sign_pdf: bool,
    pub user_password: Option<String>,
    pub owner_password: Option<String>,
    pub pdf_java_script: Option<String>,
    pub permissions: Option<i32>,
    pub metadata_title: Option<String>,
    pub metadata_author: Option<String>,
    pub metadata_subject: Option<String>,
    pub metadata_keywords: Option<String>,
    pub metadata_creator: Option<String>,
    pub display_metadata_title: bool,
    /// Used by the signing step only, never serialized
    #[serde(skip)]
    pub sign: Option<SignConfig>,
}

impl fmt::Debug for PdfExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfExporterConfig")
            .field("sign_pdf", &self.sign_pdf)
            .field("user_password", &self.user_password.as_ref().map(|_| "****"))
            .field("owner_password", &self.owner_password.as_ref().map(|_| "****"))
            .field("permissions", &self.permissions)
            .field("metadata_title", &self.metadata_title)
            .field("sign", &self.sign)
            .finish()
    }
}

impl DocumentMetadataTarget for PdfExporterConfig {
    fn supports(&self, field: MetadataField) -> bool {
        !matches!(field, MetadataField::Application)
    }

    fn set_text(&mut self, field: MetadataField, value: &str) -> Result<(), String> {
        let slot = match field {
            MetadataField::Title => &mut self.metadata_title,
            MetadataField::Author => &mut self.metadata_author,
            MetadataField::Subject => &mut self.metadata_subject,
            MetadataField::Keywords => &mut self.metadata_keywords,
            MetadataField::Creator => &mut self.metadata_creator,
            _ => return Err(format!("'{}' is not a text field", field)),
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    fn set_flag(&mut self, field: MetadataField, value: bool) -> Result<(), String> {
        match field {
            MetadataField::DisplayMetadataTitle => {
                self.display_metadata_title = value;
                Ok(())
            }
            _ => Err(format!("'{}' is not a flag", field)),
        }
    }
}

/// DOCX, PPTX, XLSX and XLS exporters.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfficeExporterConfig {
    pub embed_fonts: Option<bool>,
    pub metadata_title: Option<String>,
    pub metadata_author: Option<String>,
    pub metadata_subject: Option<String>,
    pub metadata_keywords: Option<String>,
    pub metadata_application: Option<String>,
}

impl DocumentMetadataTarget for OfficeExporterConfig {
    fn supports(&self, field: MetadataField) -> bool {
        matches!(
            field,
            MetadataField::Title
                | MetadataField::Author
                | MetadataField::Subject
                | MetadataField::Keywords
                | MetadataField::Application
        )
    }

    fn set_text(&mut self, field: MetadataField, value: &str) -> Result<(), String> {
        let slot = match field {
            MetadataField::Title => &mut self.metadata_title,
            MetadataField::Author => &mut self.metadata_author,
            MetadataField::Subject => &mut self.metadata_subject,
            MetadataField::Keywords => &mut self.metadata_keywords,
            MetadataField::Application => &mut self.metadata_application,
            _ => return Err(format!("'{}' is not supported", field)),
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    fn set_flag(&mut self, field: MetadataField, _value: bool) -> Result<(), String> {
        Err(format!("'{}' is not supported", field))
    }
}

/// Signature box in the engine's bottom-left origin coordinates.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureBox {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
    pub rotation: i32,
}

impl From<&SignRectangle> for SignatureBox {
    fn from(rectangle: &SignRectangle) -> Self {
        Self {
            left: rectangle.x,
            bottom: rectangle.y.wrapping_add(rectangle.height),
            right: rectangle.x.wrapping_add(rectangle.width),
            top: rectangle.y,
            rotation: normalize_rotation(rectangle.rotation),
        }
    }
}

/// Only quarter turns are kept, anything else becomes 0.
pub fn normalize_rotation(rotation: i32) -> i32 {
    match rotation % 360 {
        r @ (90 | 180 | 270) => r,
        _ => 0,
    }
}

#[derive(Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignConfig {
    pub keystore_path: PathBuf,
    pub keystore_password: String,
    pub certificate_name: String,
    pub certificate_password: String,
    pub certificate_type: CertificateType,
    pub level: SignLevel,
    pub visible: bool,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub contact: Option<String>,
    pub rectangle: Option<SignatureBox>,
}

impl fmt::Debug for SignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignConfig")
            .field("keystore_path", &self.keystore_path)
            .field("certificate_name", &self.certificate_name)
            .field("level", &self.level)
            .field("visible", &self.visible)
            .field("rectangle", &self.rectangle)
            .finish()
    }
}

/// Builds the exporter configuration for a request.
#[derive(Debug, Clone)]
pub struct ExporterPropertyMapper {
    keystore_path: PathBuf,
}

impl Default for ExporterPropertyMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterPropertyMapper {
    /// Keystore expected as `keystore.ks` in the working directory.
    pub fn new() -> Self {
        let keystore_path = std::env::current_dir()
            .map(|dir| dir.join(KEYSTORE_FILE))
            .unwrap_or_else(|_| PathBuf::from(KEYSTORE_FILE));
        Self { keystore_path }
    }

    pub fn with_keystore_path(path: impl Into<PathBuf>) -> Self {
        Self {
            keystore_path: path.into(),
        }
    }

    pub fn keystore_path(&self) -> &Path {
        &self.keystore_path
    }

    pub fn apply(
        &self,
        format: ReportFormat,
        request: &ReportRequest,
    ) -> Result<ExporterConfig, GeneratorError> {
        match format {
            ReportFormat::Pdf => self.pdf(request).map(ExporterConfig::Pdf),
            ReportFormat::Docx | ReportFormat::Pptx => {
                debug!("Embed fonts set for {}", format);
                Ok(ExporterConfig::Office(OfficeExporterConfig {
                    embed_fonts: Some(true),
                    ..Default::default()
                }))
            }
            ReportFormat::Xlsx | ReportFormat::Xls => {
                Ok(ExporterConfig::Office(OfficeExporterConfig::default()))
            }
            _ => Ok(ExporterConfig::Plain),
        }
    }

    fn pdf(&self, request: &ReportRequest) -> Result<PdfExporterConfig, GeneratorError> {
        let mut config = PdfExporterConfig {
            sign_pdf: request.sign.is_some(),
            ..Default::default()
        };

        if let Some(properties) = &request.pdf_properties {
            config.user_password = non_empty(&properties.user_password);
            config.owner_password = non_empty(&properties.owner_password);
            config.pdf_java_script = non_empty(&properties.javascript);
            config.permissions = Some(resolve_permissions(properties.permissions)?);
        }

        let sign = match &request.sign {
            Some(sign) => sign,
            None => return Ok(config),
        };

        if !self.keystore_path.exists() {
            let msg = format!(
                "Keystore file '{}' not found.",
                self.keystore_path.display()
            );
            error!("{}", msg);
            return Err(GeneratorError::Parse(msg));
        }

        config.sign = Some(SignConfig {
            keystore_path: self.keystore_path.clone(),
            keystore_password: sign.key_store_password.clone(),
            certificate_name: sign.certificate_name.clone(),
            certificate_password: sign.certificate_password.clone(),
            certificate_type: sign.certificate_type,
            level: sign.level,
            visible: sign.visible,
            location: sign.location.clone(),
            reason: sign.reason.clone(),
            contact: sign.contact.clone(),
            rectangle: sign.sign_rectangle.as_ref().map(SignatureBox::from),
        });
        debug!("Pdf signature configured with certificate '{}'", sign.certificate_name);

        Ok(config)
    }
}

/// `None` and `0` mean every permission.
pub fn resolve_permissions(permissions: Option<i32>) -> Result<i32, GeneratorError> {
    match permissions {
        Some(value) if value < 0 => {
            let msg = "Permissions cannot be lower than zero".to_string();
            error!("{}", msg);
            Err(GeneratorError::Parse(msg))
        }
        None | Some(0) => Ok(ALLOW_ALL_PERMISSIONS),
        Some(value) => Ok(value),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
