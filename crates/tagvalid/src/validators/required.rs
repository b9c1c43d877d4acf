use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

/// Non-nil and non-empty.
///
/// Strings are trimmed first, sequences must have elements, numbers must be
/// non-zero. Booleans and records always pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Required {
    pub key: String,
}

impl Required {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Validator for Required {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        match value {
            Value::Nil => false,
            Value::Str(s) => !s.trim().is_empty(),
            Value::Bool(_) => true,
            Value::Int(i) => !i.is_zero(),
            Value::Uint(u) => *u != 0,
            Value::Float(f) => *f != 0.0,
            Value::Seq(seq) => !seq.is_empty(),
            Value::Record(_) => true,
        }
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Required").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}
