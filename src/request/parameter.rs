use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Type tag of a report parameter.
///
/// Tags are kept as received: an unsupported tag deserializes into
/// `Unknown` and is rejected when the parameter is coerced, so the error can
/// name the offending tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ParameterType {
    String,
    Boolean,
    Bool,
    Double,
    Float,
    Integer,
    Long,
    Short,
    BigDecimal,
    Date,
    Time,
    SqlTime,
    SqlDate,
    Timestamp,
    Unknown(String),
}

impl ParameterType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "P_STRING",
            Self::Boolean => "P_BOOLEAN",
            Self::Bool => "P_BOOL",
            Self::Double => "P_DOUBLE",
            Self::Float => "P_FLOAT",
            Self::Integer => "P_INTEGER",
            Self::Long => "P_LONG",
            Self::Short => "P_SHORT",
            Self::BigDecimal => "P_BIGDECIMAL",
            Self::Date => "P_DATE",
            Self::Time => "P_TIME",
            Self::SqlTime => "P_SQL_TIME",
            Self::SqlDate => "P_SQL_DATE",
            Self::Timestamp => "P_TIMESTAMP",
            Self::Unknown(tag) => tag,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean | Self::Bool)
    }
}

impl From<String> for ParameterType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "P_STRING" => Self::String,
            "P_BOOLEAN" => Self::Boolean,
            "P_BOOL" => Self::Bool,
            "P_DOUBLE" => Self::Double,
            "P_FLOAT" => Self::Float,
            "P_INTEGER" => Self::Integer,
            "P_LONG" => Self::Long,
            "P_SHORT" => Self::Short,
            "P_BIGDECIMAL" => Self::BigDecimal,
            "P_DATE" => Self::Date,
            "P_TIME" => Self::Time,
            "P_SQL_TIME" => Self::SqlTime,
            "P_SQL_DATE" => Self::SqlDate,
            "P_TIMESTAMP" => Self::Timestamp,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<ParameterType> for String {
    fn from(kind: ParameterType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed report parameter, value always transported as a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Parameter {
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "P_STRING")]
    pub kind: ParameterType,
    pub name: String,
    #[serde(default)]
    value: String,
    /// Date pattern, only meaningful for `P_DATE`
    #[serde(default)]
    pub format: Option<String>,
}

impl Parameter {
    pub fn new(kind: ParameterType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: value.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// The parameter value as seen by the coercer.
    ///
    /// Boolean parameters report `"true"` for `1`, `yes` and `on` (case
    /// insensitive); any other literal comes back untouched.
    pub fn value(&self) -> &str {
        if self.kind.is_boolean()
            && (self.value == "1"
                || self.value.eq_ignore_ascii_case("yes")
                || self.value.eq_ignore_ascii_case("on"))
        {
            return "true";
        }
        &self.value
    }

    /// The value exactly as received.
    pub fn raw_value(&self) -> &str {
        &self.value
    }
}
