use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// PDF permission flags, bit values as defined by the PDF encryption dictionary.
pub const ALLOW_PRINTING: i32 = 4 | 2048;
pub const ALLOW_MODIFY_CONTENTS: i32 = 8;
pub const ALLOW_COPY: i32 = 16;
pub const ALLOW_MODIFY_ANNOTATIONS: i32 = 32;
pub const ALLOW_FILL_IN: i32 = 256;
pub const ALLOW_SCREENREADERS: i32 = 512;
pub const ALLOW_ASSEMBLY: i32 = 1024;
pub const ALLOW_DEGRADED_PRINTING: i32 = 4;

/// Every permission flag combined.
pub const ALLOW_ALL_PERMISSIONS: i32 = ALLOW_ASSEMBLY
    | ALLOW_COPY
    | ALLOW_DEGRADED_PRINTING
    | ALLOW_FILL_IN
    | ALLOW_MODIFY_ANNOTATIONS
    | ALLOW_MODIFY_CONTENTS
    | ALLOW_PRINTING
    | ALLOW_SCREENREADERS;

/// Encryption and scripting options for PDF output.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfProperties {
    pub user_password: Option<String>,
    pub owner_password: Option<String>,
    pub javascript: Option<String>,
    /// Permission bitmask; `null` or `0` means every permission
    pub permissions: Option<i32>,
}

impl fmt::Debug for PdfProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &Option<String>| value.as_ref().map(|v| "*".repeat(v.len()));
        f.debug_struct("PdfProperties")
            .field("user_password", &mask(&self.user_password))
            .field("owner_password", &mask(&self.owner_password))
            .field("javascript", &self.javascript)
            .field("permissions", &self.permissions)
            .finish()
    }
}
