use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

fn all_chars(value: &Value<'_>, allowed: impl Fn(char) -> bool) -> bool {
    value.as_str().is_some_and(|s| s.chars().all(allowed))
}

/// Only `[A-Za-z]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alpha {
    pub key: String,
}

impl Validator for Alpha {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        all_chars(value, |c| c.is_ascii_alphabetic())
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Alpha").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// Only `[0-9]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Numeric {
    pub key: String,
}

impl Validator for Numeric {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        all_chars(value, |c| c.is_ascii_digit())
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Numeric").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// Only `[A-Za-z0-9]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlphaNumeric {
    pub key: String,
}

impl Validator for AlphaNumeric {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        all_chars(value, |c| c.is_ascii_alphanumeric())
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("AlphaNumeric").to_string()
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
    fn alpha() {
        let a = Alpha::default();
        assert!(a.is_satisfied(&"abcXYZ".to_value()));
        assert!(!a.is_satisfied(&"abc1".to_value()));
        assert!(!a.is_satisfied(&"é".to_value()));
        assert!(!a.is_satisfied(&7i32.to_value()));
    }

    #[test]
    fn numeric_and_alpha_numeric() {
        assert!(Numeric::default().is_satisfied(&"0123".to_value()));
        assert!(!Numeric::default().is_satisfied(&"12a".to_value()));
        assert!(AlphaNumeric::default().is_satisfied(&"a1B2".to_value()));
        assert!(!AlphaNumeric::default().is_satisfied(&"a-1".to_value()));
    }
}
