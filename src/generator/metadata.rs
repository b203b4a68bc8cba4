//! Document metadata injection.
//!
//! Exporter configurations that can carry document metadata implement
//! `DocumentMetadataTarget`. The injector only talks to that trait and skips
//! any field a target does not support.

use log::{debug, error};
use std::fmt;

use super::GeneratorError;
use crate::request::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
    Application,
    DisplayMetadataTitle,
}

impl MetadataField {
    pub const ALL: [MetadataField; 7] = [
        MetadataField::Title,
        MetadataField::Author,
        MetadataField::Subject,
        MetadataField::Keywords,
        MetadataField::Creator,
        MetadataField::Application,
        MetadataField::DisplayMetadataTitle,
    ];
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "metadataTitle",
            Self::Author => "metadataAuthor",
            Self::Subject => "metadataSubject",
            Self::Keywords => "metadataKeywords",
            Self::Creator => "metadataCreator",
            Self::Application => "metadataApplication",
            Self::DisplayMetadataTitle => "displayMetadataTitle",
        };
        f.write_str(name)
    }
}

/// An exporter configuration able to receive document metadata.
pub trait DocumentMetadataTarget {
    fn supports(&self, field: MetadataField) -> bool;

    /// Set a text field. Only called for supported fields.
    fn set_text(&mut self, field: MetadataField, value: &str) -> Result<(), String>;

    /// Set a flag field. Only called for supported fields.
    fn set_flag(&mut self, field: MetadataField, value: bool) -> Result<(), String>;
}

pub struct MetadataInjector;

impl MetadataInjector {
    /// Copy `metadata` into `target`. Missing text values are written as
    /// empty strings.
    pub fn inject(
        metadata: Option<&Metadata>,
        target: Option<&mut dyn DocumentMetadataTarget>,
    ) -> Result<(), GeneratorError> {
        let (metadata, target) = match (metadata, target) {
            (Some(metadata), Some(target)) => (metadata, target),
            _ => return Ok(()),
        };

        for field in MetadataField::ALL {
            if !target.supports(field) {
                debug!("Exporter does not support '{}', skipped", field);
                continue;
            }

            let result = match field {
                MetadataField::Title => target.set_text(field, text(&metadata.title)),
                MetadataField::Author => target.set_text(field, text(&metadata.author)),
                MetadataField::Subject => target.set_text(field, text(&metadata.subject)),
                MetadataField::Keywords => target.set_text(field, text(&metadata.keywords)),
                MetadataField::Creator => target.set_text(field, text(&metadata.creator)),
                MetadataField::Application => {
                    target.set_text(field, text(&metadata.application))
                }
                MetadataField::DisplayMetadataTitle => {
                    target.set_flag(field, metadata.display_metadata_title)
                }
            };

            if let Err(reason) = result {
                let msg = format!("Fail to set metadata '{}': {}", field, reason);
                error!("{}", msg);
                return Err(GeneratorError::Injection(msg));
            }
            debug!("Metadata '{}' set", field);
        }

        Ok(())
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingTarget {
        supported: Vec<MetadataField>,
        text: HashMap<String, String>,
        flags: HashMap<String, bool>,
        reject: Option<MetadataField>,
    }

    impl DocumentMetadataTarget for RecordingTarget {
        fn supports(&self, field: MetadataField) -> bool {
            self.supported.contains(&field)
        }

        fn set_text(&mut self, field: MetadataField, value: &str) -> Result<(), String> {
            if self.reject == Some(field) {
                return Err("read only".to_string());
            }
            self.text.insert(field.to_string(), value.to_string());
            Ok(())
        }

        fn set_flag(&mut self, field: MetadataField, value: bool) -> Result<(), String> {
            self.flags.insert(field.to_string(), value);
            Ok(())
        }
    }

    fn metadata() -> Metadata {
        Metadata {
            title: Some("Invoice".to_string()),
            author: Some("Rebelo".to_string()),
            subject: None,
            keywords: Some("invoice,pdf".to_string()),
            application: Some("Reports".to_string()),
            creator: Some("Creator".to_string()),
            display_metadata_title: true,
        }
    }

    #[test]
    fn test_copies_supported_fields_only() {
        let mut target = RecordingTarget {
            supported: vec![
                MetadataField::Title,
                MetadataField::Subject,
                MetadataField::DisplayMetadataTitle,
            ],
            ..Default::default()
        };

        MetadataInjector::inject(Some(&metadata()), Some(&mut target)).unwrap();

        assert_eq!(target.text.len(), 2);
        assert_eq!(target.text["metadataTitle"], "Invoice");
        assert_eq!(target.text["metadataSubject"], "");
        assert!(target.flags["displayMetadataTitle"]);
    }

    #[test]
    fn test_missing_metadata_or_target_is_noop() {
        let mut target = RecordingTarget {
            supported: MetadataField::ALL.to_vec(),
            ..Default::default()
        };
        MetadataInjector::inject(None, Some(&mut target)).unwrap();
        assert!(target.text.is_empty());

        MetadataInjector::inject(Some(&metadata()), None).unwrap();
    }

    #[test]
    fn test_rejected_write_is_injection_error() {
        let mut target = RecordingTarget {
            supported: MetadataField::ALL.to_vec(),
            reject: Some(MetadataField::Keywords),
            ..Default::default()
        };

        let err = MetadataInjector::inject(Some(&metadata()), Some(&mut target)).unwrap_err();
        assert!(matches!(err, GeneratorError::Injection(_)));
        assert!(err.to_string().contains("metadataKeywords"));
    }
}
