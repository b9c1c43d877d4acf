//! Rule registry and parameter coercion.
//!
//! The registry maps a rule name to a [`RuleFn`] that declares the kinds of
//! its textual parameters. The parser coerces parameters against those kinds
//! once, and traversal dispatches through [`Registry::call`].

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::validation::Validation;
use crate::value::{supports_i64, Value, WORD_BITS};

/// Names that belong to the validation context and can't be rules.
const RESERVED: &[&str] = &[
    "Clear",
    "HasErrors",
    "ErrorMap",
    "Error",
    "Check",
    "Valid",
    "RecursiveValid",
    "AddError",
    "SetError",
    "apply",
];

/// Rules skipped on empty values under the required-first policy.
const DEFAULT_SKIPPABLE: &[&str] = &["Email", "IP", "Mobile", "Tel", "Phone", "ZipCode"];

/// Declared kind of a rule parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Native signed integer
    Int,
    I8,
    I16,
    I32,
    I64,
    Str,
    /// Compiled regular expression
    Regex,
    // Declarable but not coercible from text
    Uint,
    Float,
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Int => "int",
            ParamKind::I8 => "int8",
            ParamKind::I16 => "int16",
            ParamKind::I32 => "int32",
            ParamKind::I64 => "int64",
            ParamKind::Str => "string",
            ParamKind::Regex => "regex",
            ParamKind::Uint => "uint",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl ParamKind {
    /// Convert a trimmed textual parameter into a typed one.
    pub fn coerce(self, text: &str) -> Result<Param> {
        let parse_err = |source| Error::ParseInt {
            kind: self,
            value: text.to_string(),
            source,
        };

        match self {
            ParamKind::Int => text.parse().map(Param::Int).map_err(parse_err),
            ParamKind::I8 => text.parse().map(Param::I8).map_err(parse_err),
            ParamKind::I16 => text.parse().map(Param::I16).map_err(parse_err),
            ParamKind::I32 => text.parse().map(Param::I32).map_err(parse_err),
            ParamKind::I64 if !supports_i64() => Err(Error::Int64Unsupported(WORD_BITS)),
            ParamKind::I64 => text.parse().map(Param::I64).map_err(parse_err),
            ParamKind::Str => Ok(Param::Str(text.to_string())),
            ParamKind::Regex => Ok(Param::Regex(Regex::new(text)?)),
            ParamKind::Uint | ParamKind::Float | ParamKind::Bool => {
                Err(Error::UnsupportedType(self))
            }
        }
    }
}

/// A coerced rule parameter.
#[derive(Debug, Clone)]
pub enum Param {
    Int(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Str(String),
    Regex(Regex),
}

impl Param {
    pub fn kind(&self) -> ParamKind {
        match self {
            Param::Int(_) => ParamKind::Int,
            Param::I8(_) => ParamKind::I8,
            Param::I16(_) => ParamKind::I16,
            Param::I32(_) => ParamKind::I32,
            Param::I64(_) => ParamKind::I64,
            Param::Str(_) => ParamKind::Str,
            Param::Regex(_) => ParamKind::Regex,
        }
    }

    pub fn as_int(&self) -> Option<isize> {
        match self {
            Param::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Param::Regex(r) => Some(r),
            _ => None,
        }
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Param::Int(a), Param::Int(b)) => a == b,
            (Param::I8(a), Param::I8(b)) => a == b,
            (Param::I16(a), Param::I16(b)) => a == b,
            (Param::I32(a), Param::I32(b)) => a == b,
            (Param::I64(a), Param::I64(b)) => a == b,
            (Param::Str(a), Param::Str(b)) => a == b,
            (Param::Regex(a), Param::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// A dispatchable rule.
///
/// `call` records failures on the context; an `Err` is reserved for
/// configuration problems and aborts the traversal.
pub trait RuleFn: Send + Sync {
    /// Kinds of the textual parameters, in order. Its length is the arity.
    fn param_kinds(&self) -> &[ParamKind];

    fn call(&self, v: &mut Validation, value: &Value<'_>, params: &[Param], key: &str)
        -> Result<()>;
}

/// The built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Required,
    Min,
    Max,
    Range,
    MinSize,
    MaxSize,
    Length,
    Alpha,
    Numeric,
    AlphaNumeric,
    Match,
    NoMatch,
    AlphaDash,
    Email,
    IP,
    Base64,
    Mobile,
    Tel,
    Phone,
    ZipCode,
    Repeat,
    Url,
}

impl Builtin {
    pub const ALL: &'static [Builtin] = &[
        Builtin::Required,
        Builtin::Min,
        Builtin::Max,
        Builtin::Range,
        Builtin::MinSize,
        Builtin::MaxSize,
        Builtin::Length,
        Builtin::Alpha,
        Builtin::Numeric,
        Builtin::AlphaNumeric,
        Builtin::Match,
        Builtin::NoMatch,
        Builtin::AlphaDash,
        Builtin::Email,
        Builtin::IP,
        Builtin::Base64,
        Builtin::Mobile,
        Builtin::Tel,
        Builtin::Phone,
        Builtin::ZipCode,
        Builtin::Repeat,
        Builtin::Url,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Required => "Required",
            Builtin::Min => "Min",
            Builtin::Max => "Max",
            Builtin::Range => "Range",
            Builtin::MinSize => "MinSize",
            Builtin::MaxSize => "MaxSize",
            Builtin::Length => "Length",
            Builtin::Alpha => "Alpha",
            Builtin::Numeric => "Numeric",
            Builtin::AlphaNumeric => "AlphaNumeric",
            Builtin::Match => "Match",
            Builtin::NoMatch => "NoMatch",
            Builtin::AlphaDash => "AlphaDash",
            Builtin::Email => "Email",
            Builtin::IP => "IP",
            Builtin::Base64 => "Base64",
            Builtin::Mobile => "Mobile",
            Builtin::Tel => "Tel",
            Builtin::Phone => "Phone",
            Builtin::ZipCode => "ZipCode",
            Builtin::Repeat => "Repeat",
            Builtin::Url => "Url",
        }
    }
}

fn int_param(name: &str, params: &[Param], index: usize) -> Result<isize> {
    params
        .get(index)
        .and_then(Param::as_int)
        .ok_or_else(|| Error::Malformed(format!("{name} expects an int parameter")))
}

fn regex_param(name: &str, params: &[Param], index: usize) -> Result<Regex> {
    params
        .get(index)
        .and_then(Param::as_regex)
        .cloned()
        .ok_or_else(|| Error::Malformed(format!("{name} expects a regex parameter")))
}

impl RuleFn for Builtin {
    fn param_kinds(&self) -> &[ParamKind] {
        match self {
            Builtin::Min | Builtin::Max | Builtin::MinSize | Builtin::MaxSize | Builtin::Length => {
                &[ParamKind::Int]
            }
            Builtin::Range => &[ParamKind::Int, ParamKind::Int],
            Builtin::Match | Builtin::NoMatch => &[ParamKind::Regex],
            _ => &[],
        }
    }

    fn call(
        &self,
        v: &mut Validation,
        value: &Value<'_>,
        params: &[Param],
        key: &str,
    ) -> Result<()> {
        let name = self.name();
        match self {
            Builtin::Required => v.required(value, key),
            Builtin::Min => v.min(value, int_param(name, params, 0)?, key),
            Builtin::Max => v.max(value, int_param(name, params, 0)?, key),
            Builtin::Range => v.range(
                value,
                int_param(name, params, 0)?,
                int_param(name, params, 1)?,
                key,
            ),
            Builtin::MinSize => v.min_size(value, int_param(name, params, 0)?, key),
            Builtin::MaxSize => v.max_size(value, int_param(name, params, 0)?, key),
            Builtin::Length => v.length(value, int_param(name, params, 0)?, key),
            Builtin::Alpha => v.alpha(value, key),
            Builtin::Numeric => v.numeric(value, key),
            Builtin::AlphaNumeric => v.alpha_numeric(value, key),
            Builtin::Match => v.matches(value, regex_param(name, params, 0)?, key),
            Builtin::NoMatch => v.no_match(value, regex_param(name, params, 0)?, key),
            Builtin::AlphaDash => v.alpha_dash(value, key),
            Builtin::Email => v.email(value, key),
            Builtin::IP => v.ip(value, key),
            Builtin::Base64 => v.base64(value, key),
            Builtin::Mobile => v.mobile(value, key),
            Builtin::Tel => v.tel(value, key),
            Builtin::Phone => v.phone(value, key),
            Builtin::ZipCode => v.zip_code(value, key),
            Builtin::Repeat => v.repeat(value, key),
            Builtin::Url => v.url(value, key),
        };
        Ok(())
    }
}

type ZeroParamFn = dyn Fn(&mut Validation, &Value<'_>, &str) + Send + Sync;
type ParamFn = dyn Fn(&mut Validation, &Value<'_>, &[Param], &str) -> Result<()> + Send + Sync;

enum CustomBody {
    Plain(Box<ZeroParamFn>),
    WithParams(Box<ParamFn>),
}

/// A rule supplied by the application.
///
/// ## Example
///
/// ```rust
/// use tagvalid::{CustomRule, Registry, Value};
///
/// let registry = Registry::new();
/// registry
///     .register(
///         "Adult",
///         CustomRule::new(|v, value, key| {
///             if !matches!(value, Value::Int(i) if i.widen() >= 18) {
///                 v.add_error(key, "must be an adult");
///             }
///         }),
///     )
///     .unwrap();
/// assert!(registry.contains("Adult"));
/// ```
pub struct CustomRule {
    kinds: Vec<ParamKind>,
    body: CustomBody,
}

impl CustomRule {
    /// A rule without parameters.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Validation, &Value<'_>, &str) + Send + Sync + 'static,
    {
        Self {
            kinds: Vec::new(),
            body: CustomBody::Plain(Box::new(f)),
        }
    }

    /// A rule whose textual parameters are coerced to `kinds`.
    pub fn with_params<F>(kinds: impl Into<Vec<ParamKind>>, f: F) -> Self
    where
        F: Fn(&mut Validation, &Value<'_>, &[Param], &str) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            kinds: kinds.into(),
            body: CustomBody::WithParams(Box::new(f)),
        }
    }
}

impl RuleFn for CustomRule {
    fn param_kinds(&self) -> &[ParamKind] {
        &self.kinds
    }

    fn call(
        &self,
        v: &mut Validation,
        value: &Value<'_>,
        params: &[Param],
        key: &str,
    ) -> Result<()> {
        match &self.body {
            CustomBody::Plain(f) => {
                f(v, value, key);
                Ok(())
            }
            CustomBody::WithParams(f) => f(v, value, params, key),
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("param_kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Name to rule mapping plus the required-first skip-allowlist.
///
/// Built-ins are loaded on construction. Registration replaces existing
/// entries; nothing is ever removed.
pub struct Registry {
    rules: RwLock<HashMap<String, Arc<dyn RuleFn>>>,
    skippable: RwLock<HashSet<String>>,
}

// A panic inside a rule can't leave the maps half-written, so a poisoned
// lock is still usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl Default for Registry {
    fn default() -> Self {
        let rules = Builtin::ALL
            .iter()
            .map(|b| (b.name().to_string(), Arc::new(*b) as Arc<dyn RuleFn>))
            .collect();
        let skippable = DEFAULT_SKIPPABLE.iter().map(|s| s.to_string()).collect();
        Self {
            rules: RwLock::new(rules),
            skippable: RwLock::new(skippable),
        }
    }
}

impl Registry {
    /// An isolated registry with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Registry> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Registry::new())).clone()
    }

    /// Add or replace a rule.
    pub fn register(&self, name: impl Into<String>, rule: impl RuleFn + 'static) -> Result<()> {
        let name = name.into();
        if RESERVED.contains(&name.as_str()) {
            return Err(Error::ReservedName(name));
        }
        let mut rules = write(&self.rules);
        if rules.contains_key(&name) {
            tracing::warn!(rule = %name, "replacing registered rule");
        }
        rules.insert(name, Arc::new(rule));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        read(&self.rules).contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.rules).keys().cloned().collect();
        names.sort();
        names
    }

    /// Declared parameter kinds of a rule.
    pub fn param_kinds(&self, name: &str) -> Result<Vec<ParamKind>> {
        read(&self.rules)
            .get(name)
            .map(|rule| rule.param_kinds().to_vec())
            .ok_or_else(|| Error::UnknownRule {
                name: name.to_string(),
            })
    }

    /// Add a rule name to the required-first skip-allowlist.
    pub fn mark_skippable(&self, name: impl Into<String>) {
        write(&self.skippable).insert(name.into());
    }

    pub fn is_skippable(&self, name: &str) -> bool {
        read(&self.skippable).contains(name)
    }

    /// Invoke a rule.
    ///
    /// A panic inside the rule is caught and returned as
    /// [`Error::RulePanicked`].
    pub fn call(
        &self,
        name: &str,
        v: &mut Validation,
        value: &Value<'_>,
        params: &[Param],
        key: &str,
    ) -> Result<()> {
        let rule = read(&self.rules)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRule {
                name: name.to_string(),
            })?;

        let expected = rule.param_kinds().len();
        if params.len() != expected {
            return Err(Error::ParamCount {
                name: name.to_string(),
                expected,
                found: params.len(),
            });
        }

        tracing::trace!(rule = name, key, "dispatching rule");
        catch_unwind(AssertUnwindSafe(|| rule.call(v, value, params, key))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(Error::RulePanicked {
                    name: name.to_string(),
                    message,
                })
            },
        )
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.names())
            .field("skippable", &read(&self.skippable))
            .finish()
    }
}

/// Register a rule on the process-wide registry.
pub fn register_custom_rule(name: impl Into<String>, rule: impl RuleFn + 'static) -> Result<()> {
    Registry::global().register(name, rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToValue;

    #[test]
    fn builtins_are_registered() {
        let registry = Registry::new();
        for builtin in Builtin::ALL {
            assert!(registry.contains(builtin.name()));
        }
        assert_eq!(registry.param_kinds("Range").unwrap().len(), 2);
        assert!(registry.param_kinds("Email").unwrap().is_empty());
    }

    #[test]
    fn coercion_by_kind() {
        assert_eq!(ParamKind::Int.coerce("42").unwrap(), Param::Int(42));
        assert_eq!(ParamKind::I8.coerce("-128").unwrap(), Param::I8(-128));
        assert!(matches!(
            ParamKind::I8.coerce("128"),
            Err(Error::ParseInt { kind: ParamKind::I8, .. })
        ));
        assert_eq!(ParamKind::Str.coerce("abc").unwrap(), Param::Str("abc".into()));
        assert!(matches!(ParamKind::Regex.coerce("(unclosed"), Err(Error::Regex(_))));
        assert!(matches!(
            ParamKind::Float.coerce("1.5"),
            Err(Error::UnsupportedType(ParamKind::Float))
        ));
    }

    #[test]
    fn int64_follows_platform_capability() {
        let result = ParamKind::I64.coerce("9000000000");
        if supports_i64() {
            assert_eq!(result.unwrap(), Param::I64(9_000_000_000));
        } else {
            assert!(matches!(result, Err(Error::Int64Unsupported(32))));
        }
    }

    #[test]
    fn reserved_names_are_rejected() {
        let registry = Registry::new();
        let err = registry
            .register("Valid", CustomRule::new(|_, _, _| {}))
            .unwrap_err();
        assert!(matches!(err, Error::ReservedName(name) if name == "Valid"));
    }

    #[test]
    fn custom_rule_replaces_builtin() {
        let registry = Registry::new();
        registry
            .register("Email", CustomRule::new(|_, _, _| {}))
            .unwrap();

        let mut v = Validation::new();
        registry
            .call("Email", &mut v, &"x".to_value(), &[], "Email.Email.")
            .unwrap();
        assert!(!v.has_errors());
    }

    #[test]
    fn call_checks_arity() {
        let registry = Registry::new();
        let mut v = Validation::new();
        let err = registry
            .call("Min", &mut v, &3i32.to_value(), &[], "Age.Min.")
            .unwrap_err();
        assert!(matches!(err, Error::ParamCount { expected: 1, found: 0, .. }));

        let err = registry
            .call("Nope", &mut v, &3i32.to_value(), &[], "Age.Nope.")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRule { .. }));
    }

    #[test]
    fn panics_become_errors() {
        let registry = Registry::new();
        registry
            .register("Boom", CustomRule::new(|_, _, _| panic!("boom")))
            .unwrap();

        let mut v = Validation::new();
        let err = registry
            .call("Boom", &mut v, &Value::Nil, &[], "X.Boom.")
            .unwrap_err();
        assert!(matches!(err, Error::RulePanicked { ref message, .. } if message == "boom"));
    }

    #[test]
    fn custom_rule_with_params() {
        let registry = Registry::new();
        registry
            .register(
                "Prefix",
                CustomRule::with_params([ParamKind::Str], |v, value, params, key| {
                    let prefix = params[0].as_str().unwrap_or_default();
                    if !value.as_str().is_some_and(|s| s.starts_with(prefix)) {
                        v.add_error(key, "has the wrong prefix");
                    }
                    Ok(())
                }),
            )
            .unwrap();

        let mut v = Validation::new();
        let params = [Param::Str("sk_".into())];
        registry
            .call("Prefix", &mut v, &"pk_123".to_value(), &params, "Token.Prefix.令牌")
            .unwrap();
        assert_eq!(v.errors()[0].message, "令牌 has the wrong prefix");
    }

    #[test]
    fn skip_allowlist() {
        let registry = Registry::new();
        assert!(registry.is_skippable("Email"));
        assert!(!registry.is_skippable("Url"));
        registry.mark_skippable("Url");
        assert!(registry.is_skippable("Url"));
    }
}
