use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

/// Native integer of the value, or `None` for anything Min/Max can't compare.
///
/// Unsigned and floating values are rejected, as are 64-bit integers on
/// platforms with a 32-bit word.
fn native_int(value: &Value<'_>) -> Option<isize> {
    match value {
        Value::Int(i) => i.to_native(),
        _ => None,
    }
}

/// Integer at least `min`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Min {
    pub min: isize,
    pub key: String,
}

impl Min {
    pub fn new(min: isize, key: impl Into<String>) -> Self {
        Self {
            min,
            key: key.into(),
        }
    }
}

impl Validator for Min {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        native_int(value).is_some_and(|v| v >= self.min)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("Min", &[("min", self.min.to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.min.into())
    }
}

/// Integer at most `max`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Max {
    pub max: isize,
    pub key: String,
}

impl Max {
    pub fn new(max: isize, key: impl Into<String>) -> Self {
        Self {
            max,
            key: key.into(),
        }
    }
}

impl Validator for Max {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        native_int(value).is_some_and(|v| v <= self.max)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("Max", &[("max", self.max.to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.max.into())
    }
}

/// Integer within `min..=max`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Range {
    pub min: Min,
    pub max: Max,
    pub key: String,
}

impl Range {
    pub fn new(min: isize, max: isize, key: impl Into<String>) -> Self {
        Self {
            min: Min::new(min, ""),
            max: Max::new(max, ""),
            key: key.into(),
        }
    }
}

impl Validator for Range {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        self.min.is_satisfied(value) && self.max.is_satisfied(value)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format(
            "Range",
            &[
                ("min", self.min.min.to_string()),
                ("max", self.max.max.to_string()),
            ],
        )
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!([self.min.min, self.max.max]))
    }
}
