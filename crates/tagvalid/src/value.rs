//! Runtime view of a field value.
//!
//! Rules never see concrete Rust types. Every field is converted into a
//! [`Value`] through [`ToValue`], and the predicates switch over its variants.

use std::fmt;

use crate::record::Record;

/// Width of the native signed integer (`isize`) in bits.
pub const WORD_BITS: u32 = usize::BITS;

/// Whether 64-bit integers fit the native integer on this platform.
///
/// On 32-bit targets 64-bit parameters are rejected during coercion and
/// 64-bit values fail `Min`/`Max`/`Range` instead of being truncated.
pub const fn supports_i64() -> bool {
    WORD_BITS >= 64
}

/// A signed integer that remembers its declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Int {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
}

impl Int {
    /// Normalize to the native integer.
    ///
    /// Returns `None` for 64-bit values on platforms without 64-bit words.
    pub fn to_native(self) -> Option<isize> {
        match self {
            Int::I8(v) => Some(v as isize),
            Int::I16(v) => Some(v as isize),
            Int::I32(v) => isize::try_from(v).ok(),
            Int::I64(v) if supports_i64() => isize::try_from(v).ok(),
            Int::I64(_) => None,
            Int::Isize(v) => Some(v),
        }
    }

    /// Widen to `i64`, ignoring platform capability.
    pub fn widen(self) -> i64 {
        match self {
            Int::I8(v) => v as i64,
            Int::I16(v) => v as i64,
            Int::I32(v) => v as i64,
            Int::I64(v) => v,
            Int::Isize(v) => v as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        self.widen() == 0
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.widen())
    }
}

/// A field value as seen by rules.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// Absent value (`None`)
    Nil,
    Bool(bool),
    Int(Int),
    Uint(u64),
    Float(f64),
    Str(&'a str),
    Seq(&'a dyn Sequence),
    Record(&'a dyn Record),
}

/// A borrowed list of values.
///
/// Implemented for `Vec<T>` and arrays so sequences are only
/// expanded when a rule walks them.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<Value<'_>>;
}

impl<'s> dyn Sequence + 's {
    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl<T: ToValue, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<Value<'_>> {
        self.as_slice().get(index).map(ToValue::to_value)
    }
}

impl<T: ToValue> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<Value<'_>> {
        self.as_slice().get(index).map(ToValue::to_value)
    }
}

impl<'a> Value<'a> {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Record(_) => "record",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Str(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            Value::Record(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&'a dyn Sequence> {
        match self {
            Value::Seq(s) => Some(*s),
            _ => None,
        }
    }

    /// Convert into an owned JSON value for error reporting.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(i.widen()),
            Value::Uint(u) => Json::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String((*s).to_string()),
            Value::Seq(seq) => Json::Array(seq.iter().map(|v| v.to_json()).collect()),
            Value::Record(record) => {
                let map = record
                    .fields()
                    .into_iter()
                    .map(|field| {
                        let key = field.external_name.unwrap_or(field.name).to_string();
                        (key, field.value.to_json())
                    })
                    .collect();
                Json::Object(map)
            }
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
            Value::Seq(seq) => {
                f.write_str("[")?;
                for (i, item) in seq.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(record) => {
                f.write_str("{")?;
                for (i, field) in record.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", field.value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Seq(seq) => f.debug_list().entries(seq.iter()).finish(),
            Value::Record(record) => f.debug_tuple("Record").field(&record.type_name()).finish(),
        }
    }
}

/// Conversion into a [`Value`].
///
/// Derived for records by `#[derive(Record)]`.
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for Value<'_> {
    fn to_value(&self) -> Value<'_> {
        *self
    }
}

macro_rules! int_to_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::Int(Int::$variant(*self))
                }
            }
        )*
    };
}

int_to_value!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);

macro_rules! uint_to_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::Uint(*self as u64)
                }
            }
        )*
    };
}

uint_to_value!(u8, u16, u32, u64, usize);

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self as f64)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self.as_str())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}
