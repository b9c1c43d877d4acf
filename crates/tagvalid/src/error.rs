//! Error types: configuration errors that abort a traversal, and the
//! per-rule [`ValidationError`] records that a traversal accumulates.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::registry::ParamKind;

/// Configuration or programming error.
///
/// Returned through `Result` and aborts the current traversal. Reported
/// validation failures are never represented by this type.
#[derive(Error, Debug)]
pub enum Error {
    /// The rule name is not registered
    #[error("{name} does not exist")]
    UnknownRule { name: String },

    /// The rule was given the wrong number of parameters
    #[error("{name} requires {expected} parameters, got {found}")]
    ParamCount {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A rule clause could not be split into a name and parameters
    #[error("invalid rule clause: {0}")]
    Malformed(String),

    /// A `Match(/…/)` clause with a missing or misplaced closing marker
    #[error("invalid {0} function")]
    InvalidMatch(&'static str),

    /// A pattern failed to compile
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A textual parameter is not a valid integer of the declared width
    #[error("invalid {kind} parameter `{value}`: {source}")]
    ParseInt {
        kind: ParamKind,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// 64-bit integer parameters on a platform whose native word is narrower
    #[error("not support int64 on {0}-bit platform")]
    Int64Unsupported(u32),

    /// The declared parameter kind has no textual coercion
    #[error("type not supported: {0}")]
    UnsupportedType(ParamKind),

    /// The name belongs to the validation context itself
    #[error("invalid function name: {0}")]
    ReservedName(String),

    /// `Validation::valid_value` was handed something that is not a record
    #[error("{0} must be a record or a record reference")]
    NotARecord(String),

    /// A rule panicked while running
    #[error("rule {name} panicked: {message}")]
    RulePanicked { name: String, message: String },

    /// A custom rule reported its own failure
    #[error("rule {name} failed: {message}")]
    Rule { name: String, message: String },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A single failed rule.
///
/// `key` is the canonical `"<field>.<rule>.<label>"` triple. `field` and
/// `name` are derived from it when it has exactly three parts; otherwise
/// `field` is empty and `name` is the whole key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable message, label first
    pub message: String,
    /// `"<field>.<rule>.<label>"`
    pub key: String,
    /// Rule name
    pub name: String,
    /// Field name, empty when the key is not a triple
    pub field: String,
    /// The template the message was rendered from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    /// The value that failed
    #[serde(default)]
    pub value: serde_json::Value,
    /// The bound or pattern the value was checked against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_value: Option<serde_json::Value>,
}

/// The parts of a rule key.
pub(crate) struct KeyParts<'k> {
    pub field: &'k str,
    pub name: &'k str,
    pub label: &'k str,
}

impl ValidationError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: String::new(),
            name: String::new(),
            field: String::new(),
            template: String::new(),
            value: serde_json::Value::Null,
            limit_value: None,
        }
    }

    /// Split a key into field, rule name and label.
    ///
    /// An empty label falls back to the field name.
    pub(crate) fn split_key(key: &str) -> KeyParts<'_> {
        let parts: Vec<&str> = key.split('.').collect();
        if let [field, name, label] = *parts.as_slice() {
            let label = if label.is_empty() { field } else { label };
            KeyParts { field, name, label }
        } else {
            KeyParts {
                field: "",
                name: key,
                label: "",
            }
        }
    }

    /// Create an error from a key, filling `field` and `name`.
    pub fn from_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        let parts = Self::split_key(&key);
        let (field, name) = (parts.field.to_string(), parts.name.to_string());
        Self {
            field,
            name,
            key,
            ..Self::new(message)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Internal error structure for JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    fields: Vec<ValidationError>,
}

/// Wrapper for the error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

/// All failures of one validation call, in discovery order.
///
/// Serializes to:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "message": "Validation failed",
///     "fields": [...]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Failed rules
    pub fields: Vec<ValidationError>,
    /// Summary message (default: "Validation failed")
    pub message: String,
}

impl ValidationReport {
    /// Create a report from collected errors.
    pub fn new(fields: Vec<ValidationError>) -> Self {
        Self {
            fields,
            message: "Validation failed".to_string(),
        }
    }

    /// Create a report with a custom summary message.
    pub fn with_message(fields: Vec<ValidationError>, message: impl Into<String>) -> Self {
        Self {
            fields,
            message: message.into(),
        }
    }

    /// The first failure, usually the one shown as a short message.
    pub fn first(&self) -> Option<&ValidationError> {
        self.fields.first()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} field error(s)", self.message, self.fields.len())
    }
}

impl std::error::Error for ValidationReport {}

impl Serialize for ValidationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wrapper = ErrorWrapper {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: self.message.clone(),
                fields: self.fields.clone(),
            },
        };
        wrapper.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wrapper = ErrorWrapper::deserialize(deserializer)?;
        Ok(Self {
            fields: wrapper.error.fields,
            message: wrapper.error.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_with_three_parts_is_split() {
        let error = ValidationError::from_key("Age.Min.年龄", "年龄最小为3");
        assert_eq!(error.field, "Age");
        assert_eq!(error.name, "Min");
        assert_eq!(error.key, "Age.Min.年龄");
    }

    #[test]
    fn other_keys_become_the_rule_name() {
        let error = ValidationError::from_key("Age.Match", "bad");
        assert_eq!(error.field, "");
        assert_eq!(error.name, "Age.Match");

        let error = ValidationError::from_key("plain", "bad");
        assert_eq!(error.field, "");
        assert_eq!(error.name, "plain");
    }

    #[test]
    fn empty_label_falls_back_to_field() {
        let parts = ValidationError::split_key("Name.Required.");
        assert_eq!(parts.label, "Name");
    }

    #[test]
    fn report_serialization() {
        let report = ValidationReport::new(vec![ValidationError::from_key(
            "Email.Email.邮箱",
            "邮箱必须是有效的邮件地址",
        )]);

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["error"]["type"], "validation_error");
        assert_eq!(json["error"]["message"], "Validation failed");
        assert_eq!(json["error"]["fields"][0]["field"], "Email");
        assert_eq!(json["error"]["fields"][0]["name"], "Email");
    }

    #[test]
    fn report_display() {
        let report = ValidationReport::new(vec![
            ValidationError::new("a"),
            ValidationError::new("b"),
        ]);
        assert_eq!(report.to_string(), "Validation failed: 2 field error(s)");
    }

    #[test]
    fn configuration_error_messages() {
        let err = Error::ParamCount {
            name: "Min".into(),
            expected: 1,
            found: 2,
        };
        assert_eq!(err.to_string(), "Min requires 1 parameters, got 2");
        assert_eq!(
            Error::UnknownRule { name: "Nope".into() }.to_string(),
            "Nope does not exist"
        );
    }
}
