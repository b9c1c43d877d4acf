//! Pattern-based predicates.
//!
//! `Match`/`NoMatch` take a user pattern; the rest wrap a fixed pattern.
//! Values are stringified with their `Display` form before matching.

use regex::Regex;
use std::sync::OnceLock;

use super::Validator;
use crate::messages::MessageTemplates;
use crate::value::Value;

// Pre-compiled regex patterns
static ALPHA_DASH_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static IP_REGEX: OnceLock<Regex> = OnceLock::new();
static BASE64_REGEX: OnceLock<Regex> = OnceLock::new();
static MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();
static TEL_REGEX: OnceLock<Regex> = OnceLock::new();
static ZIP_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

// Anything outside letters, digits, '-' and '_'
fn alpha_dash_regex() -> &'static Regex {
    ALPHA_DASH_REGEX.get_or_init(|| Regex::new(r"[^0-9A-Za-z_\-]").unwrap())
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[0-9A-Za-z_!#$%&'*+/=?^`{|}~\-]+(?:\.[0-9A-Za-z_!#$%&'*+/=?^`{|}~\-]+)*@(?:[0-9A-Za-z_](?:[0-9A-Za-z_\-]*[0-9A-Za-z_])?\.)+[a-zA-Z0-9](?:[0-9A-Za-z_\-]*[0-9A-Za-z_])?$",
        )
        .unwrap()
    })
}

fn ip_regex() -> &'static Regex {
    IP_REGEX.get_or_init(|| {
        Regex::new(r"^((2[0-4][0-9]|25[0-5]|[01]?[0-9][0-9]?)\.){3}(2[0-4][0-9]|25[0-5]|[01]?[0-9][0-9]?)$")
            .unwrap()
    })
}

fn base64_regex() -> &'static Regex {
    BASE64_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$").unwrap()
    })
}

// Mainland China mobile numbers, optional +86/86 prefix
fn mobile_regex() -> &'static Regex {
    MOBILE_REGEX.get_or_init(|| {
        Regex::new(r"^((\+86)|(86))?1([356789][0-9]|4[579]|6[67]|7[0135678]|9[189])[0-9]{8}$")
            .unwrap()
    })
}

// Mainland China landlines, optional area code
fn tel_regex() -> &'static Regex {
    TEL_REGEX.get_or_init(|| Regex::new(r"^(0[0-9]{2,3}(-)?)?[0-9]{7,8}$").unwrap())
}

fn zip_code_regex() -> &'static Regex {
    ZIP_CODE_REGEX.get_or_init(|| Regex::new(r"^[1-9][0-9]{5}$").unwrap())
}

fn is_match(regex: &Regex, value: &Value<'_>) -> bool {
    match value.as_str() {
        Some(s) => regex.is_match(s),
        None => regex.is_match(&value.to_string()),
    }
}

/// Stringified value matches a pattern.
#[derive(Debug, Clone)]
pub struct Match {
    pub regex: Regex,
    pub key: String,
}

impl Match {
    pub fn new(regex: Regex, key: impl Into<String>) -> Self {
        Self {
            regex,
            key: key.into(),
        }
    }
}

impl Validator for Match {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        is_match(&self.regex, value)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("Match", &[("pattern", self.regex.as_str().to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.regex.as_str().into())
    }
}

/// Stringified value does not match a pattern.
#[derive(Debug, Clone)]
pub struct NoMatch {
    pub regex: Regex,
    pub key: String,
}

impl NoMatch {
    pub fn new(regex: Regex, key: impl Into<String>) -> Self {
        Self {
            regex,
            key: key.into(),
        }
    }
}

impl Validator for NoMatch {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        !is_match(&self.regex, value)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.format("NoMatch", &[("pattern", self.regex.as_str().to_string())])
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn limit_value(&self) -> Option<serde_json::Value> {
        Some(self.regex.as_str().into())
    }
}

/// Letters, digits, `-` and `_` only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlphaDash {
    pub key: String,
}

impl Validator for AlphaDash {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        !is_match(alpha_dash_regex(), value)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("AlphaDash").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// Fixed-pattern predicates that only differ in pattern and template.
macro_rules! fixed_pattern {
    ($(#[$doc:meta])* $name:ident, $regex:ident, $template:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub key: String,
        }

        impl $name {
            pub(crate) fn matches(value: &Value<'_>) -> bool {
                is_match($regex(), value)
            }
        }

        impl Validator for $name {
            fn is_satisfied(&self, value: &Value<'_>) -> bool {
                Self::matches(value)
            }

            fn default_message(&self, messages: &MessageTemplates) -> String {
                messages.get($template).to_string()
            }

            fn key(&self) -> &str {
                &self.key
            }
        }
    };
}

fixed_pattern!(
    /// Email address.
    Email, email_regex, "Email"
);
fixed_pattern!(
    /// Dotted IPv4 address.
    IP, ip_regex, "IP"
);
fixed_pattern!(
    /// Standard base64 alphabet with padding.
    Base64, base64_regex, "Base64"
);
fixed_pattern!(
    /// Mainland China mobile number.
    Mobile, mobile_regex, "Mobile"
);
fixed_pattern!(
    /// Mainland China landline number.
    Tel, tel_regex, "Tel"
);
fixed_pattern!(
    /// Mainland China postal code.
    ZipCode, zip_code_regex, "ZipCode"
);

/// Mobile or landline number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phone {
    pub key: String,
}

impl Validator for Phone {
    fn is_satisfied(&self, value: &Value<'_>) -> bool {
        Mobile::matches(value) || Tel::matches(value)
    }

    fn default_message(&self, messages: &MessageTemplates) -> String {
        messages.get("Phone").to_string()
    }

    fn key(&self) -> &str {
        &self.key
    }
}
