use std::collections::HashSet;

use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

/// Hashable scalar form of a sequence element.
#[derive(Debug, PartialEq, Eq, Hash)]
enum Scalar<'a> {
    Str(&'a str),
    Int(i64),
    Uint(u64),
}

fn scalar<'a>(value: &Value<'a>) -> Option<Scalar<'a>> {
    match value {
        Value::Str(s) => Some(Scalar::Str(s)),
        Value::Int(i) => Some(Scalar::Int(i.widen())),
        Value::Uint(u) => Some(Scalar::Uint(*u)),
        _ => None,
    }
}

/// Sequence without duplicate elements.
///
/// Only strings and integers are compared; a sequence holding anything else
/// fails, as does a value that is not a sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repeat {
    pub key: String,
}

impl Repeat {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Validator for Repeat {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        let Some(seq) = value.as_seq() else {
            return false;
        };
        let mut seen = HashSet::with_capacity(seq.len());
        for item in seq.iter() {
            match scalar(&item) {
                Some(s) => {
                    if !seen.insert(s) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Repeat").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToValue;

    #[test]
    fn distinct_elements_pass() {
        let r = Repeat::default();
        assert!(r.is_satisfied(&vec!["a", "b"].to_value()));
        assert!(r.is_satisfied(&vec![1i64, 2, 3].to_value()));
        assert!(r.is_satisfied(&Vec::<u32>::new().to_value()));
    }

    #[test]
    fn duplicates_fail() {
        let r = Repeat::default();
        assert!(!r.is_satisfied(&vec!["a", "a"].to_value()));
        assert!(!r.is_satisfied(&[3u8, 4, 3].to_value()));
        assert!(!r.is_satisfied(&vec![-1i8, 2, -1].to_value()));
    }

    #[test]
    fn unsupported_elements_fail() {
        let r = Repeat::default();
        assert!(!r.is_satisfied(&vec![1.0f64, 2.0].to_value()));
        assert!(!r.is_satisfied(&"ab".to_value()));
    }
}
