//! The validation context and the record traversal.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result, ValidationError, ValidationReport};
use crate::messages::MessageTemplates;
use crate::parser::parse_tag;
use crate::record::{Field, Record};
use crate::registry::Registry;
use crate::result::CheckResult;
use crate::validators::{
    Alpha, AlphaDash, AlphaNumeric, Base64, Email, Length, Match, Max, MaxSize, Min, MinSize,
    Mobile, NoMatch, Numeric, Phone, Range, Repeat, Required, Tel, Url, Validator, ZipCode, IP,
};
use crate::value::{ToValue, Value};

/// Collects the failures of one validation call.
///
/// Contexts are cheap; create one per call rather than sharing one between
/// threads. [`clear`](Self::clear) resets it for reuse.
///
/// ## Example
///
/// ```rust
/// use tagvalid::Validation;
///
/// let mut v = Validation::new();
/// v.min(&3i32, 5, "Age.Min.年龄");
/// v.email("x", "Email.Email.邮箱").message("邮箱格式不对");
///
/// assert_eq!(v.len(), 2);
/// assert_eq!(v.errors()[0].message, "年龄最小为5");
/// assert_eq!(v.errors()[1].message, "邮箱格式不对");
/// ```
#[derive(Debug)]
pub struct Validation {
    required_first: bool,
    errors: Vec<ValidationError>,
    by_field: HashMap<String, Vec<usize>>,
    registry: Arc<Registry>,
    messages: Arc<MessageTemplates>,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            required_first: false,
            errors: Vec::new(),
            by_field: HashMap::new(),
            registry: Registry::global(),
            messages: MessageTemplates::global(),
        }
    }
}

macro_rules! key_only_rules {
    ($($(#[$doc:meta])* $method:ident => $ty:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method<T: ToValue + ?Sized>(&mut self, value: &T, key: &str) -> CheckResult<'_> {
                self.apply(&$ty { key: key.to_string() }, value)
            }
        )*
    };
}

impl Validation {
    /// A context using the process-wide registry and templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip allowlisted rules on empty fields that have no `Required` rule.
    pub fn required_first(mut self, enabled: bool) -> Self {
        self.required_first = enabled;
        self
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_messages(mut self, messages: Arc<MessageTemplates>) -> Self {
        self.messages = messages;
        self
    }

    pub fn is_required_first(&self) -> bool {
        self.required_first
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn messages(&self) -> &Arc<MessageTemplates> {
        &self.messages
    }

    /// Drop all collected errors.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.by_field.clear();
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All errors in discovery order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Errors of one field in discovery order. Free-form errors live under `""`.
    pub fn field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.by_field
            .get(field)
            .map(|indices| indices.iter().map(|&i| &self.errors[i]).collect())
            .unwrap_or_default()
    }

    /// Errors grouped by field.
    pub fn error_map(&self) -> HashMap<&str, Vec<&ValidationError>> {
        self.by_field
            .iter()
            .map(|(field, indices)| {
                let errors = indices.iter().map(|&i| &self.errors[i]).collect();
                (field.as_str(), errors)
            })
            .collect()
    }

    /// Serializable summary of the collected errors.
    pub fn to_report(&self) -> ValidationReport {
        ValidationReport::new(self.errors.clone())
    }

    /// Allow `name` to be skipped under the required-first policy.
    pub fn can_skip_also(&self, name: &str) {
        self.registry.mark_skippable(name);
    }

    fn push(&mut self, error: ValidationError) -> usize {
        let index = self.errors.len();
        self.by_field
            .entry(error.field.clone())
            .or_default()
            .push(index);
        self.errors.push(error);
        index
    }

    /// Append a free-form error.
    pub fn error(&mut self, message: impl Into<String>) -> CheckResult<'_> {
        let index = self.push(ValidationError::new(message));
        CheckResult::failed(&mut self.errors[index])
    }

    /// Append an error for a `"<field>.<rule>.<label>"` key; the label is
    /// put in front of the message.
    pub fn add_error(&mut self, key: &str, message: &str) {
        let label = ValidationError::split_key(key).label;
        let message = format!("{label} {message}");
        self.push(ValidationError::from_key(key, message));
    }

    /// Append an error for a field and return it for further edits.
    pub fn set_error(&mut self, field: &str, message: &str) -> &mut ValidationError {
        let error = ValidationError {
            key: field.to_string(),
            field: field.to_string(),
            template: message.to_string(),
            ..ValidationError::new(message)
        };
        let index = self.push(error);
        &mut self.errors[index]
    }

    /// Record a failure of `check` on `value`, returning its index.
    fn apply_at(&mut self, check: &dyn Validator, value: &Value<'_>) -> Option<usize> {
        if check.is_satisfied(value) {
            return None;
        }

        let key = check.key();
        let parts = ValidationError::split_key(key);
        let message = format!("{}{}", parts.label, check.default_message(&self.messages));
        let error = ValidationError {
            template: self.messages.get(parts.name).to_string(),
            value: value.to_json(),
            limit_value: check.limit_value(),
            ..ValidationError::from_key(key, message)
        };
        Some(self.push(error))
    }

    /// Run one validator and record its failure.
    pub fn apply<T: ToValue + ?Sized>(
        &mut self,
        check: &dyn Validator,
        value: &T,
    ) -> CheckResult<'_> {
        match self.apply_at(check, &value.to_value()) {
            Some(index) => CheckResult::failed(&mut self.errors[index]),
            None => CheckResult::passed(),
        }
    }

    /// Run validators in order and stop at the first failure.
    pub fn check<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        checks: &[&dyn Validator],
    ) -> CheckResult<'_> {
        let value = value.to_value();
        let failed = checks
            .iter()
            .find_map(|check| self.apply_at(*check, &value));
        match failed {
            Some(index) => CheckResult::failed(&mut self.errors[index]),
            None => CheckResult::passed(),
        }
    }

    pub fn required<T: ToValue + ?Sized>(&mut self, value: &T, key: &str) -> CheckResult<'_> {
        self.apply(&Required::new(key), value)
    }

    pub fn min<T: ToValue + ?Sized>(&mut self, value: &T, min: isize, key: &str) -> CheckResult<'_> {
        self.apply(&Min::new(min, key), value)
    }

    pub fn max<T: ToValue + ?Sized>(&mut self, value: &T, max: isize, key: &str) -> CheckResult<'_> {
        self.apply(&Max::new(max, key), value)
    }

    pub fn range<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        min: isize,
        max: isize,
        key: &str,
    ) -> CheckResult<'_> {
        self.apply(&Range::new(min, max, key), value)
    }

    pub fn min_size<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        min: isize,
        key: &str,
    ) -> CheckResult<'_> {
        self.apply(&MinSize::new(min, key), value)
    }

    pub fn max_size<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        max: isize,
        key: &str,
    ) -> CheckResult<'_> {
        self.apply(&MaxSize::new(max, key), value)
    }

    pub fn length<T: ToValue + ?Sized>(&mut self, value: &T, n: isize, key: &str) -> CheckResult<'_> {
        self.apply(&Length::new(n, key), value)
    }

    /// Stringified value matches `regex`.
    pub fn matches<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        regex: Regex,
        key: &str,
    ) -> CheckResult<'_> {
        self.apply(&Match::new(regex, key), value)
    }

    pub fn no_match<T: ToValue + ?Sized>(
        &mut self,
        value: &T,
        regex: Regex,
        key: &str,
    ) -> CheckResult<'_> {
        self.apply(&NoMatch::new(regex, key), value)
    }

    pub fn repeat<T: ToValue + ?Sized>(&mut self, value: &T, key: &str) -> CheckResult<'_> {
        self.apply(&Repeat::new(key), value)
    }

    pub fn url<T: ToValue + ?Sized>(&mut self, value: &T, key: &str) -> CheckResult<'_> {
        self.apply(&Url::new(key), value)
    }

    key_only_rules! {
        alpha => Alpha,
        numeric => Numeric,
        alpha_numeric => AlphaNumeric,
        alpha_dash => AlphaDash,
        email => Email,
        ip => IP,
        base64 => Base64,
        mobile => Mobile,
        tel => Tel,
        /// Mobile or landline number.
        phone => Phone,
        zip_code => ZipCode,
    }

    /// Validate a value that should hold a record.
    ///
    /// Fails with [`Error::NotARecord`] for anything else, including `None`.
    pub fn valid_value<T: ToValue + ?Sized>(&mut self, value: &T) -> Result<bool> {
        match value.to_value() {
            Value::Record(record) => self.valid(record),
            other => Err(Error::NotARecord(other.to_string())),
        }
    }

    /// Validate the tagged fields of a record.
    ///
    /// Nested records behind tagged fields are validated first and their
    /// failures collected into this context. The record's own
    /// [`Record::valid`] hook runs only when no error has been collected,
    /// after the hooks of its inline groups.
    ///
    /// Returns `Ok(false)` when validation failed and `Err` on a malformed
    /// tag or an unknown rule.
    pub fn valid(&mut self, record: &dyn Record) -> Result<bool> {
        let fields = record.fields();
        self.valid_fields(&fields)?;
        self.run_hook(record, &fields);
        Ok(!self.has_errors())
    }

    fn run_hook(&mut self, record: &dyn Record, fields: &[Field<'_>]) {
        for field in fields.iter().filter(|f| f.is_inline()) {
            if let Some(inner) = field.value.as_record() {
                self.run_hook(inner, &inner.fields());
            }
        }
        if !self.has_errors() {
            tracing::debug!(record = record.type_name(), "running record hook");
            record.valid(self);
        }
    }

    fn valid_fields(&mut self, fields: &[Field<'_>]) -> Result<()> {
        for field in fields {
            if field.is_inline() {
                // inline groups contribute their own fields
                if let Some(inner) = field.value.as_record() {
                    self.valid_fields(&inner.fields())?;
                }
                continue;
            }

            let Some(tag) = field.rules else {
                continue;
            };
            let rules = parse_tag(tag, field.name, field.label.unwrap_or(""), &self.registry)?;
            if rules.is_empty() {
                continue;
            }

            self.descend(&field.value)?;

            let has_required = rules.iter().any(|rule| rule.name() == "Required");
            let empty = !Required::default().is_satisfied(&field.value);
            let registry = Arc::clone(&self.registry);

            for rule in &rules {
                if self.required_first && !has_required && empty && registry.is_skippable(rule.name())
                {
                    tracing::debug!(
                        field = field.name,
                        rule = rule.name(),
                        "skipping rule on empty field"
                    );
                    continue;
                }
                registry.call(rule.name(), self, &field.value, rule.params(), rule.key())?;
            }
        }
        Ok(())
    }

    fn descend(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Record(record) => {
                self.valid(*record)?;
            }
            Value::Seq(seq) => {
                for item in seq.iter() {
                    if let Some(record) = item.as_record() {
                        self.valid(record)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate a record and, only if it passed, every record-valued field
    /// recursively.
    ///
    /// Sequences are not descended into.
    pub fn recursive_valid(&mut self, record: &dyn Record) -> Result<bool> {
        if !self.valid(record)? {
            return Ok(false);
        }
        for field in record.fields() {
            if let Some(inner) = field.value.as_record() {
                self.recursive_valid(inner)?;
            }
        }
        Ok(!self.has_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_indexed_by_field() {
        let mut v = Validation::new();
        v.required("", "Name.Required.名字");
        v.min(&1i32, 3, "Age.Min.年龄");
        v.max(&9i32, 3, "Age.Max.年龄");

        assert_eq!(v.len(), 3);
        assert_eq!(v.field_errors("Age").len(), 2);
        assert_eq!(v.field_errors("Age")[1].name, "Max");
        assert_eq!(v.error_map()["Name"][0].message, "名字不能为空");
    }

    #[test]
    fn failure_carries_diagnostics() {
        let mut v = Validation::new();
        v.range(&20i32, 1, 10, "Age.Range.年龄");
        let error = v.first_error().unwrap();
        assert_eq!(error.message, "年龄范围在1至10");
        assert_eq!(error.template, "范围在{min}至{max}");
        assert_eq!(error.value, serde_json::json!(20));
        assert_eq!(error.limit_value, Some(serde_json::json!([1, 10])));
    }

    #[test]
    fn fluent_overrides() {
        let mut v = Validation::new();
        let result = v
            .min_size("ab", 3, "Name.MinSize.名字")
            .key("custom")
            .message("too short");
        assert!(!result.is_ok());
        assert_eq!(v.errors()[0].key, "custom");
        assert_eq!(v.errors()[0].message, "too short");

        let passed = v.min_size("abcd", 3, "Name.MinSize.名字").message("unused");
        assert!(passed.ok);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn check_stops_at_first_failure() {
        let mut v = Validation::new();
        let required = Required::new("Code.Required.编码");
        let length = Length::new(6, "Code.Length.编码");
        let numeric = Numeric {
            key: "Code.Numeric.编码".into(),
        };
        let checks: [&dyn Validator; 3] = [&required, &length, &numeric];

        assert!(!v.check("12a", &checks).ok);
        assert_eq!(v.len(), 1);
        assert_eq!(v.errors()[0].name, "Length");

        v.clear();
        assert!(v.check("123456", &checks).ok);
        assert!(!v.has_errors());
    }

    #[test]
    fn free_form_errors() {
        let mut v = Validation::new();
        v.error("something broke");
        v.add_error("Age.Custom.年龄", "is odd");
        v.set_error("Email", "taken").template = "already registered".into();

        assert_eq!(v.field_errors("").len(), 1);
        assert_eq!(v.errors()[1].message, "年龄 is odd");
        assert_eq!(v.errors()[1].field, "Age");
        assert_eq!(v.errors()[2].template, "already registered");
        assert_eq!(v.field_errors("Email")[0].message, "taken");
    }

    #[test]
    fn clear_resets_both_views() {
        let mut v = Validation::new();
        v.email("x", "Email.Email.邮箱");
        v.clear();
        assert!(!v.has_errors());
        assert!(v.error_map().is_empty());
    }

    #[test]
    fn non_records_are_rejected() {
        let mut v = Validation::new();
        assert!(matches!(v.valid_value(&5i32), Err(Error::NotARecord(_))));
        let none: Option<i32> = None;
        assert!(matches!(v.valid_value(&none), Err(Error::NotARecord(s)) if s == "<nil>"));
    }

    #[test]
    fn isolated_templates() {
        let messages = Arc::new(MessageTemplates::english());
        let mut v = Validation::new().with_messages(messages);
        v.required("", "Name.Required.Name");
        assert_eq!(v.errors()[0].message, "Name can not be empty");
    }
}
