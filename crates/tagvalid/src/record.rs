//! Records: structs whose fields carry rule tags.

use crate::validation::Validation;
use crate::value::Value;

/// A struct that can be walked by [`Validation::valid`].
///
/// Usually derived with `#[derive(Record)]`; hand-written impls list their
/// fields with [`Field`].
///
/// ## Example
///
/// ```rust
/// use tagvalid::{Field, Record, ToValue, Validation};
///
/// struct Login {
///     user: String,
/// }
///
/// impl Record for Login {
///     fn type_name(&self) -> &'static str {
///         "Login"
///     }
///
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![Field::new("User", self.user.to_value())
///             .external_name("user")
///             .rules("Required;MinSize(3)")]
///     }
/// }
///
/// let mut v = Validation::new();
/// assert!(!v.valid(&Login { user: "ab".into() }).unwrap());
/// ```
pub trait Record {
    /// Name of the concrete type, used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// The fields in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Record-specific cross-field checks.
    ///
    /// Runs after every field passed; append failures with
    /// [`Validation::set_error`] or the single-rule helpers.
    fn valid(&self, _v: &mut Validation) {}
}

/// One field of a record together with its tags.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    /// Field identifier, first part of every rule key
    pub name: &'static str,
    /// Serialization name; `None` makes the field an inline group
    pub external_name: Option<&'static str>,
    /// Rule tag, e.g. `Required;Min(3)`
    pub rules: Option<&'static str>,
    /// Human-readable name used in messages
    pub label: Option<&'static str>,
    pub value: Value<'a>,
}

impl<'a> Field<'a> {
    /// A field with no external name, rules or label.
    pub fn new(name: &'static str, value: Value<'a>) -> Self {
        Self {
            name,
            external_name: None,
            rules: None,
            label: None,
            value,
        }
    }

    pub fn external_name(mut self, name: &'static str) -> Self {
        self.external_name = Some(name);
        self
    }

    pub fn rules(mut self, rules: &'static str) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Fields without an external name are expanded into their parent.
    pub fn is_inline(&self) -> bool {
        self.external_name.map_or(true, str::is_empty)
    }
}

impl<'r> std::fmt::Debug for dyn Record + 'r {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.type_name())
            .field("fields", &self.fields())
            .finish()
    }
}
