use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

/// Character count of a string or element count of a sequence.
fn size_of(value: &Value<'_>) -> Option<usize> {
    match value {
        Value::Str(s) => Some(s.chars().count()),
        Value::Seq(seq) => Some(seq.len()),
        _ => None,
    }
}

fn compare(value: &Value<'_>, bound: isize, f: impl Fn(isize, isize) -> bool) -> bool {
    size_of(value)
        .and_then(|n| isize::try_from(n).ok())
        .is_some_and(|n| f(n, bound))
}

/// String or sequence at least `min` long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinSize {
    pub min: isize,
    pub key: String,
}

impl MinSize {
    pub fn new(min: isize, key: impl Into<String>) -> Self {
        Self {
            min,
            key: key.into(),
        }
    }
}

impl Validator for MinSize {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        compare(value, self.min, |n, b| n >= b)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("MinSize", &[("min", self.min.to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.min.into())
    }
}

/// String or sequence at most `max` long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaxSize {
    pub max: isize,
    pub key: String,
}

impl MaxSize {
    pub fn new(max: isize, key: impl Into<String>) -> Self {
        Self {
            max,
            key: key.into(),
        }
    }
}

impl Validator for MaxSize {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        compare(value, self.max, |n, b| n <= b)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("MaxSize", &[("max", self.max.to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.max.into())
    }
}

/// String or sequence exactly `n` long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Length {
    pub n: isize,
    pub key: String,
}

impl Length {
    pub fn new(n: isize, key: impl Into<String>) -> Self {
        Self { n, key: key.into() }
    }
}

impl Validator for Length {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        compare(value, self.n, |n, b| n == b)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("Length", &[("n", self.n.to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.n.into())
    }
}
