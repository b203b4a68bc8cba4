//! Parameter coercion.
//!
//! Every request parameter travels as a string; the rendering engine wants
//! native values. `ParameterCoercer` performs that conversion per type tag.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::GeneratorError;
use crate::request::{Parameter, ParameterType};

const SQL_DATE_FORMAT: &str = "%Y-%m-%d";
const SQL_TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A parameter value in the engine's native domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EngineValue {
    String(String),
    Bool(bool),
    Double(f64),
    Float(f32),
    Integer(i32),
    Long(i64),
    Short(i16),
    Decimal(BigDecimal),
    Date(NaiveDateTime),
    Time(NaiveTime),
    SqlDate(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl fmt::Display for EngineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Short(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Date(v) | Self::Timestamp(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::SqlDate(v) => write!(f, "{}", v),
        }
    }
}

/// Stateless converter from request parameters to engine values.
pub struct ParameterCoercer;

impl ParameterCoercer {
    /// Convert one parameter.
    pub fn coerce(parameter: &Parameter) -> Result<EngineValue, GeneratorError> {
        let value = parameter.value();

        match &parameter.kind {
            ParameterType::String => Ok(EngineValue::String(value.to_string())),
            ParameterType::Boolean | ParameterType::Bool => {
                Ok(EngineValue::Bool(value.eq_ignore_ascii_case("true")))
            }
            ParameterType::Double => parse_number(parameter, value.trim()).map(EngineValue::Double),
            ParameterType::Float => parse_number(parameter, value.trim()).map(EngineValue::Float),
            ParameterType::Integer => parse_number(parameter, value).map(EngineValue::Integer),
            ParameterType::Long => parse_number(parameter, value).map(EngineValue::Long),
            ParameterType::Short => parse_number(parameter, value).map(EngineValue::Short),
            ParameterType::BigDecimal => parse_number(parameter, value).map(EngineValue::Decimal),
            ParameterType::Date => {
                let pattern = parameter
                    .format
                    .as_deref()
                    .filter(|format| !format.is_empty())
                    .ok_or_else(|| {
                        invalid(parameter, "a date pattern is required in 'format'".to_string())
                    })?;
                parse_with_pattern(value, pattern)
                    .map(EngineValue::Date)
                    .map_err(|reason| invalid(parameter, reason))
            }
            ParameterType::Time | ParameterType::SqlTime => {
                NaiveTime::parse_from_str(value, SQL_TIME_FORMAT)
                    .map(EngineValue::Time)
                    .map_err(|e| invalid(parameter, e.to_string()))
            }
            ParameterType::SqlDate => NaiveDate::parse_from_str(value, SQL_DATE_FORMAT)
                .map(EngineValue::SqlDate)
                .map_err(|e| invalid(parameter, e.to_string())),
            ParameterType::Timestamp => NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                .map(EngineValue::Timestamp)
                .map_err(|e| invalid(parameter, e.to_string())),
            ParameterType::Unknown(tag) => {
                let msg = format!("The parameter type '{}' not exist", tag);
                error!("{}", msg);
                Err(GeneratorError::Parameter(msg))
            }
        }
    }

    /// Convert all parameters in request order. A repeated name overwrites the
    /// earlier value.
    pub fn coerce_all(
        parameters: &[Parameter],
    ) -> Result<BTreeMap<String, EngineValue>, GeneratorError> {
        debug!("Start populate parameters");
        let mut values = BTreeMap::new();
        for parameter in parameters {
            let value = Self::coerce(parameter)?;
            debug!("Parameter '{}' set to '{}'", parameter.name, value);
            values.insert(parameter.name.clone(), value);
        }
        Ok(values)
    }
}

fn parse_number<T>(parameter: &Parameter, value: &str) -> Result<T, GeneratorError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| invalid(parameter, e.to_string()))
}

fn invalid(parameter: &Parameter, reason: String) -> GeneratorError {
    let msg = format!(
        "Parameter '{}' of type '{}' has an invalid value '{}': {}",
        parameter.name,
        parameter.kind,
        parameter.raw_value(),
        reason
    );
    error!("{}", msg);
    GeneratorError::Parameter(msg)
}

/// Parse a date, time or date-time using a `yyyy-MM-dd HH:mm:ss` style pattern.
///
/// Date-only patterns resolve to midnight and time-only patterns to the
/// epoch day.
pub fn parse_with_pattern(value: &str, pattern: &str) -> Result<NaiveDateTime, String> {
    let format = translate_date_pattern(pattern)?;

    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, &format) {
        return Ok(date_time);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, &format) {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("'{}' is out of range", value));
    }

    match NaiveTime::parse_from_str(value, &format) {
        Ok(time) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .map(|epoch| epoch.and_time(time))
            .ok_or_else(|| format!("'{}' is out of range", value)),
        Err(e) => Err(format!("does not match pattern '{}': {}", pattern, e)),
    }
}

/// Translate a date pattern (`yyyy-MM-dd'T'HH:mm`) into a chrono format string.
pub fn translate_date_pattern(pattern: &str) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut format = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            // '' is an escaped quote, otherwise a quoted literal runs to the next quote
            if chars.get(i + 1) == Some(&'\'') {
                format.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut format, chars[i]);
                i += 1;
            }
            if i == chars.len() {
                return Err(format!("unterminated quote in pattern '{}'", pattern));
            }
            i += 1;
            continue;
        }

        if !ch.is_ascii_alphabetic() {
            push_literal(&mut format, ch);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i] == ch {
            i += 1;
        }
        let run = i - start;

        let item = match (ch, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1..=2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('H', _) | ('k', _) => "%H",
            ('h', _) | ('K', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', 3) => "%3f",
            ('S', 6) => "%6f",
            ('S', 9) => "%9f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('D', _) => "%j",
            ('Z', _) => "%z",
            ('X', _) => "%:z",
            _ => {
                return Err(format!(
                    "unsupported pattern letter '{}' in '{}'",
                    ch.to_string().repeat(run),
                    pattern
                ))
            }
        };
        format.push_str(item);
    }

    Ok(format)
}

fn push_literal(format: &mut String, ch: char) {
    if ch == '%' {
        format.push_str("%%");
    } else {
        format.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn coerce(kind: ParameterType, value: &str) -> Result<EngineValue, GeneratorError> {
        ParameterCoercer::coerce(&Parameter::new(kind, "P", value))
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(
            coerce(ParameterType::String, "The string").unwrap(),
            EngineValue::String("The string".to_string())
        );
        assert_eq!(
            coerce(ParameterType::Double, "999.49").unwrap(),
            EngineValue::Double(999.49)
        );
        assert_eq!(
            coerce(ParameterType::Float, "99.29").unwrap(),
            EngineValue::Float(99.29)
        );
        assert_eq!(
            coerce(ParameterType::Integer, "1999").unwrap(),
            EngineValue::Integer(1999)
        );
        assert_eq!(
            coerce(ParameterType::Long, "9999").unwrap(),
            EngineValue::Long(9999)
        );
        assert_eq!(coerce(ParameterType::Short, "9").unwrap(), EngineValue::Short(9));
        assert_eq!(
            coerce(ParameterType::BigDecimal, "9.99").unwrap(),
            EngineValue::Decimal(BigDecimal::from_str("9.99").unwrap())
        );
    }

    #[test]
    fn test_boolean_types() {
        for kind in [ParameterType::Boolean, ParameterType::Bool] {
            for value in ["1", "yes", "Yes", "on", "On", "true", "TRUE"] {
                assert_eq!(coerce(kind.clone(), value).unwrap(), EngineValue::Bool(true));
            }
            for value in ["0", "no", "off", "false", "anything"] {
                assert_eq!(coerce(kind.clone(), value).unwrap(), EngineValue::Bool(false));
            }
        }
    }

    #[test]
    fn test_sql_date_time_and_timestamp() {
        assert_eq!(
            coerce(ParameterType::SqlDate, "1969-10-05").unwrap(),
            EngineValue::SqlDate(NaiveDate::from_ymd_opt(1969, 10, 5).unwrap())
        );
        let nine_nineteen = NaiveTime::from_hms_opt(9, 19, 29).unwrap();
        assert_eq!(
            coerce(ParameterType::SqlTime, "09:19:29").unwrap(),
            EngineValue::Time(nine_nineteen)
        );
        assert_eq!(
            coerce(ParameterType::Time, "09:19:29").unwrap(),
            EngineValue::Time(nine_nineteen)
        );
        assert_eq!(
            coerce(ParameterType::Timestamp, "1969-10-05 09:19:29").unwrap(),
            EngineValue::Timestamp(
                NaiveDate::from_ymd_opt(1969, 10, 5)
                    .unwrap()
                    .and_time(nine_nineteen)
            )
        );
        assert!(matches!(
            coerce(ParameterType::Timestamp, "1969-10-05 09:19:29.123").unwrap(),
            EngineValue::Timestamp(_)
        ));
    }

    #[test]
    fn test_date_with_pattern() {
        let parameter =
            Parameter::new(ParameterType::Date, "D", "1969-10-05").with_format("yyyy-MM-dd");
        assert_eq!(
            ParameterCoercer::coerce(&parameter).unwrap(),
            EngineValue::Date(
                NaiveDate::from_ymd_opt(1969, 10, 5)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );

        let parameter = Parameter::new(ParameterType::Date, "D", "05/10/1969 09:19:29")
            .with_format("dd/MM/yyyy HH:mm:ss");
        assert_eq!(
            ParameterCoercer::coerce(&parameter).unwrap(),
            EngineValue::Date(
                NaiveDate::from_ymd_opt(1969, 10, 5)
                    .unwrap()
                    .and_hms_opt(9, 19, 29)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_date_without_pattern_fails() {
        let err = coerce(ParameterType::Date, "1969-10-05").unwrap_err();
        assert!(matches!(err, GeneratorError::Parameter(_)));
    }

    #[test]
    fn test_unknown_type_fails_naming_the_type() {
        let err = coerce(ParameterType::Unknown("P_BLOB".to_string()), "x").unwrap_err();
        assert!(matches!(err, GeneratorError::Parameter(_)));
        assert_eq!(err.to_string(), "The parameter type 'P_BLOB' not exist");
    }

    #[test]
    fn test_malformed_numbers_fail() {
        for kind in [
            ParameterType::Integer,
            ParameterType::Long,
            ParameterType::Short,
            ParameterType::Double,
            ParameterType::Float,
            ParameterType::BigDecimal,
        ] {
            let err = coerce(kind, "not-a-number").unwrap_err();
            assert!(matches!(err, GeneratorError::Parameter(_)));
        }
        assert!(coerce(ParameterType::Short, "40000").is_err());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let parameters = vec![
            Parameter::new(ParameterType::String, "NAME", "first"),
            Parameter::new(ParameterType::Integer, "COUNT", "3"),
            Parameter::new(ParameterType::String, "NAME", "second"),
        ];

        let values = ParameterCoercer::coerce_all(&parameters).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["NAME"], EngineValue::String("second".to_string()));
    }

    #[test]
    fn test_translate_date_pattern() {
        assert_eq!(
            translate_date_pattern("yyyy-MM-dd HH:mm:ss").unwrap(),
            "%Y-%m-%d %H:%M:%S"
        );
        assert_eq!(
            translate_date_pattern("dd 'of' MMMM yy").unwrap(),
            "%d of %B %y"
        );
        assert_eq!(translate_date_pattern("HH'h'mm 100%").unwrap(), "%Hh%M 100%%");
        assert!(translate_date_pattern("yyyy 'open").is_err());
        assert!(translate_date_pattern("GGGG").is_err());
    }
}
