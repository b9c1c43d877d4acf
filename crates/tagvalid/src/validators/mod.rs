//! Built-in predicates.
//!
//! Each predicate is a small struct holding its bound (if any) and the rule
//! key it reports under. The registry builds them from parsed parameters;
//! they can also be used directly through [`Validation::check`].
//!
//! [`Validation::check`]: crate::Validation::check

mod chars;
mod numeric;
mod pattern;
mod repeat;
mod required;
mod size;
mod url;

pub use chars::{Alpha, AlphaNumeric, Numeric};
pub use numeric::{Max, Min, Range};
pub use pattern::{AlphaDash, Base64, Email, Match, Mobile, NoMatch, Phone, Tel, ZipCode, IP};
pub use repeat::Repeat;
pub use required::Required;
pub use size::{Length, MaxSize, MinSize};
pub use url::Url;

use crate::messages::MessageTemplates;
use crate::value::Value;

/// A single-value predicate with its reporting metadata.
///
/// ## Example
///
/// ```rust
/// use tagvalid::validators::{Min, Validator};
/// use tagvalid::ToValue;
///
/// let min = Min::new(5, "Age.Min.年龄");
/// assert!(min.is_satisfied(&7i32.to_value()));
/// assert!(!min.is_satisfied(&3i32.to_value()));
/// ```
pub trait Validator {
    /// Whether the value passes.
    fn is_satisfied(&self, value: &Value<'_>) -> bool;

    /// The rendered default message, without the label prefix.
    fn default_message(&self, messages: &MessageTemplates) -> String;

    /// Rule key, normally `"<field>.<rule>.<label>"`.
    fn key(&self) -> &str;

    /// The bound or pattern checked against, for diagnostics.
    fn limit_value(&self) -> Option<serde_json::Value> {
        None
    }
}
