use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Certification level of the PDF signature.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignLevel {
    #[default]
    CertifiedNoChangesAllowed,
    CertifiedFormFilling,
    CertifiedFormFillingAndAnnotations,
}

/// Origin of the signing certificate. Only self-signed keystores exist today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum CertificateType {
    #[default]
    #[serde(rename = "SELF", alias = "self")]
    SelfSigned,
}

/// Visible signature box, top-left origin as sent by the client.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct SignRectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub rotation: i32,
}

#[derive(Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Sign {
    pub key_store_password: String,
    /// Certificate alias inside the keystore
    pub certificate_name: String,
    pub certificate_password: String,
    pub level: SignLevel,
    pub certificate_type: CertificateType,
    pub sign_rectangle: Option<SignRectangle>,
    pub visible: bool,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub contact: Option<String>,
}

impl fmt::Debug for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sign")
            .field("key_store_password", &"*****")
            .field("certificate_name", &self.certificate_name)
            .field("certificate_password", &"****")
            .field("level", &self.level)
            .field("certificate_type", &self.certificate_type)
            .field("sign_rectangle", &self.sign_rectangle)
            .field("visible", &self.visible)
            .field("location", &self.location)
            .field("reason", &self.reason)
            .finish()
    }
}
