//! Message templates for the built-in rules.
//!
//! Templates use `{name}` placeholders (`{min}`, `{max}`, `{n}`,
//! `{pattern}`), filled in by [`render`]. The rendered message is prefixed
//! with the field label, so `年龄` + `最小为{min}` reads `年龄最小为3`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const CHINESE: &[(&str, &str)] = &[
    ("Required", "不能为空"),
    ("Min", "最小为{min}"),
    ("Max", "最大为{max}"),
    ("Range", "范围在{min}至{max}"),
    ("MinSize", "最小为{min}"),
    ("MaxSize", "最大为{max}"),
    ("Length", "长度必须为{n}"),
    ("Alpha", "必须是有效的字母字符"),
    ("Numeric", "必须是有效的数字字符"),
    ("AlphaNumeric", "必须是有效的字母或数字字符"),
    ("Match", "必须匹配格式: {pattern}"),
    ("NoMatch", "必须不匹配格式: {pattern}"),
    ("AlphaDash", "必须是有效的字母或数字或破折号(-_)字符"),
    ("Email", "必须是有效的邮件地址"),
    ("IP", "必须是有效的IP地址"),
    ("Base64", "必须是有效的base64字符"),
    ("Mobile", "必须是有效手机号码"),
    ("Tel", "必须是有效电话号码"),
    ("Phone", "必须是有效的电话号码或者手机号码"),
    ("ZipCode", "必须是有效的邮政编码"),
    ("Repeat", "必须是不重复的数据"),
    ("Url", "必须是有效的URL地址"),
];

const ENGLISH: &[(&str, &str)] = &[
    ("Required", " can not be empty"),
    ("Min", " minimum is {min}"),
    ("Max", " maximum is {max}"),
    ("Range", " range is {min} to {max}"),
    ("MinSize", " minimum size is {min}"),
    ("MaxSize", " maximum size is {max}"),
    ("Length", " required length is {n}"),
    ("Alpha", " must be valid alpha characters"),
    ("Numeric", " must be valid numeric characters"),
    ("AlphaNumeric", " must be valid alpha or numeric characters"),
    ("Match", " must match {pattern}"),
    ("NoMatch", " must not match {pattern}"),
    ("AlphaDash", " must be valid alpha or numeric or dash(-_) characters"),
    ("Email", " must be a valid email address"),
    ("IP", " must be a valid ip address"),
    ("Base64", " must be valid base64 characters"),
    ("Mobile", " must be valid mobile number"),
    ("Tel", " must be valid telephone number"),
    ("Phone", " must be valid telephone or mobile phone number"),
    ("ZipCode", " must be valid zipcode"),
    ("Repeat", " must not contain duplicates"),
    ("Url", " must be a valid URL"),
];

/// Rule name to message template table.
///
/// The built-in table can be overridden exactly once: the first non-empty
/// call to [`set_defaults`](Self::set_defaults) wins and later calls are
/// ignored, so the result does not depend on which component configures
/// templates last.
#[derive(Debug)]
pub struct MessageTemplates {
    builtin: HashMap<String, String>,
    overrides: OnceLock<HashMap<String, String>>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::from_table(CHINESE)
    }
}

impl MessageTemplates {
    /// Templates with the default (Chinese) messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates with English messages.
    pub fn english() -> Self {
        Self::from_table(ENGLISH)
    }

    fn from_table(table: &[(&str, &str)]) -> Self {
        Self {
            builtin: table
                .iter()
                .map(|(name, tmpl)| (name.to_string(), tmpl.to_string()))
                .collect(),
            overrides: OnceLock::new(),
        }
    }

    /// The process-wide table used by contexts that were not given one.
    pub fn global() -> Arc<MessageTemplates> {
        static GLOBAL: OnceLock<Arc<MessageTemplates>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(MessageTemplates::new()))
            .clone()
    }

    /// Override templates once.
    ///
    /// Returns `true` when this call took effect. An empty map is ignored
    /// and does not use up the one-time slot.
    pub fn set_defaults(&self, messages: HashMap<String, String>) -> bool {
        if messages.is_empty() {
            return false;
        }
        let applied = self.overrides.set(messages).is_ok();
        if !applied {
            tracing::debug!("message templates already set, ignoring override");
        }
        applied
    }

    /// Template for a rule, empty when none is registered.
    pub fn get(&self, name: &str) -> &str {
        self.overrides
            .get()
            .and_then(|o| o.get(name))
            .or_else(|| self.builtin.get(name))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Render the template for `name` with the given placeholder values.
    pub fn format(&self, name: &str, params: &[(&str, String)]) -> String {
        render(self.get(name), params)
    }
}

/// Override the process-wide templates. Only the first call has an effect.
pub fn set_default_message_templates(messages: HashMap<String, String>) -> bool {
    MessageTemplates::global().set_defaults(messages)
}

/// Replace `{key}` placeholders with values.
pub fn render(template: &str, params: &[(&str, String)]) -> String {
    let mut result = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lookup() {
        let t = MessageTemplates::new();
        assert_eq!(t.get("Required"), "不能为空");
        assert_eq!(t.get("Unknown"), "");
    }

    #[test]
    fn format_fills_placeholders() {
        let t = MessageTemplates::new();
        assert_eq!(
            t.format("Range", &[("min", 1.to_string()), ("max", 9.to_string())]),
            "范围在1至9"
        );
        assert_eq!(
            MessageTemplates::english().format("Match", &[("pattern", "^a$".to_string())]),
            " must match ^a$"
        );
    }

    #[test]
    fn only_first_override_applies() {
        let t = MessageTemplates::new();
        let first = HashMap::from([("Required".to_string(), "is required".to_string())]);
        let second = HashMap::from([("Required".to_string(), "must be set".to_string())]);

        assert!(t.set_defaults(first));
        assert!(!t.set_defaults(second));
        assert_eq!(t.get("Required"), "is required");
        // untouched entries keep their built-in template
        assert_eq!(t.get("Min"), "最小为{min}");
    }

    #[test]
    fn empty_override_does_not_consume_slot() {
        let t = MessageTemplates::new();
        assert!(!t.set_defaults(HashMap::new()));
        let map = HashMap::from([("Email".to_string(), "bad email".to_string())]);
        assert!(t.set_defaults(map));
        assert_eq!(t.get("Email"), "bad email");
    }
}
