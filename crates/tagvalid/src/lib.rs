//! # tagvalid
//!
//! Declarative struct validation driven by rule tags. Each field carries a
//! rule tag such as `Required;Min(3)`, an optional label used in messages,
//! and its serialization name. [`Validation::valid`] walks a record, runs
//! the rules through the [`Registry`] and collects field-keyed errors.
//!
//! ## Example
//!
//! ```rust
//! use tagvalid::{Record, Validation};
//!
//! #[derive(Record)]
//! struct CreateUser {
//!     #[valid("Required")]
//!     #[label("名字")]
//!     name: String,
//!
//!     #[valid("Email")]
//!     #[label("邮箱")]
//!     email: String,
//!
//!     #[valid("Range(18, 120)")]
//!     #[label("年龄")]
//!     age: i32,
//! }
//!
//! let user = CreateUser {
//!     name: String::new(),
//!     email: "x".into(),
//!     age: 30,
//! };
//!
//! let mut v = Validation::new();
//! assert!(!v.valid(&user).unwrap());
//! assert_eq!(v.errors()[0].message, "名字不能为空");
//! assert_eq!(v.errors()[1].key, "email.Email.邮箱");
//! ```
//!
//! ## Rule tags
//!
//! - `Required` - non-empty value
//! - `Min(n)`, `Max(n)`, `Range(min, max)` - integer bounds
//! - `MinSize(n)`, `MaxSize(n)`, `Length(n)` - character or element count
//! - `Alpha`, `Numeric`, `AlphaNumeric`, `AlphaDash` - character classes
//! - `Match(/re/)`, `NoMatch(/re/)` - regular expressions
//! - `Email`, `IP`, `Base64`, `Mobile`, `Tel`, `Phone`, `ZipCode`, `Url` - formats
//! - `Repeat` - no duplicate elements
//!
//! Custom rules are added with [`register_custom_rule`].
//!
//! ## Error Format
//!
//! [`Validation::to_report`] serializes as:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Validation failed",
//!     "fields": [
//!       {"message": "名字不能为空", "key": "name.Required.名字", "name": "Required", "field": "name", "value": ""}
//!     ]
//!   }
//! }
//! ```

extern crate self as tagvalid;

mod config;
mod error;
mod messages;
mod parser;
mod record;
mod registry;
mod result;
mod validation;
pub mod validators;
mod value;

#[cfg(test)]
mod tests;

pub use config::ValidationConfig;
pub use error::{Error, Result, ValidationError, ValidationReport};
pub use messages::{render, set_default_message_templates, MessageTemplates};
pub use parser::{parse_tag, Rule};
pub use record::{Field, Record};
pub use registry::{register_custom_rule, Builtin, CustomRule, Param, ParamKind, Registry, RuleFn};
pub use result::CheckResult;
pub use validation::Validation;
pub use validators::Validator;
pub use value::{supports_i64, Int, Sequence, ToValue, Value, WORD_BITS};

/// Derive [`Record`] and [`ToValue`] from `#[valid]` and `#[label]` field attributes.
pub use tagvalid_macros::Record;

/// Prelude module for validation
pub mod prelude {
    pub use crate::error::{Error, ValidationError, ValidationReport};
    pub use crate::record::{Field, Record};
    pub use crate::registry::{register_custom_rule, CustomRule, Registry};
    pub use crate::validation::Validation;
    pub use crate::value::{ToValue, Value};
    pub use tagvalid_macros::Record;
}
