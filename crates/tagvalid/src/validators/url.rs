use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

/// Absolute URL with a scheme and a host.
///
/// The input must be written out as `scheme://...` with no surrounding
/// whitespace or control characters; the lenient fix-ups of the URL parser
/// are not relied on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Url {
    pub key: String,
}

impl Url {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Validator for Url {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        let Some(s) = value.as_str() else {
            return false;
        };
        if !is_strict_absolute(s) {
            return false;
        }
        match ::url::Url::parse(s) {
            Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
            Err(_) => false,
        }
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Url").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// `scheme://` prefix with an RFC 3986 scheme and no whitespace or control
/// characters anywhere.
fn is_strict_absolute(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let Some((scheme, _)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToValue;

    #[test]
    fn absolute_urls() {
        let u = Url::default();
        assert!(u.is_satisfied(&"https://example.com/path?q=1".to_value()));
        assert!(u.is_satisfied(&"ws://localhost:8080".to_value()));
    }

    #[test]
    fn rejects_relative_and_hostless() {
        let u = Url::default();
        assert!(!u.is_satisfied(&"/relative/path".to_value()));
        assert!(!u.is_satisfied(&"mailto:user@example.com".to_value()));
        assert!(!u.is_satisfied(&"not a url".to_value()));
        assert!(!u.is_satisfied(&42i32.to_value()));
    }

    #[test]
    fn rejects_inputs_the_parser_would_fix_up() {
        let u = Url::default();
        assert!(!u.is_satisfied(&"http:example.com".to_value()));
        assert!(!u.is_satisfied(&"http:/example.com".to_value()));
        assert!(!u.is_satisfied(&" http://example.com ".to_value()));
        assert!(!u.is_satisfied(&"https:\\\\example.com".to_value()));
        assert!(!u.is_satisfied(&"http://exa\tmple.com".to_value()));
        assert!(!u.is_satisfied(&"1http://example.com".to_value()));
    }
}
