//! Dynamic values bound to layouts.
//!
//! A [Value] is what a [crate::Codec] validates, encodes and decodes. Integral values are
//! accepted by any integral scalar they fit in, regardless of whether they are held as
//! [Value::Unsigned] or [Value::Signed]. Decoding always yields the canonical variant of the
//! scalar kind.

use crate::{types::structure::Struct, Codec, Error};
use bytes::Bytes;
use std::fmt;

/// A value of any layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    /// A single ASCII character.
    Char(u8),
    Bytes(Bytes),
    /// A C-string (trailing NULs are not part of the value).
    Text(String),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "unsigned",
            Value::Signed(_) => "signed",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Returns the value as a `u64` if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Signed(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Unsigned(v) => Some(*v as f64),
            Value::Signed(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the character as a raw byte.
    pub fn as_char(&self) -> Option<u8> {
        match self {
            Value::Char(c) => Some(*c),
            Value::Text(s) if s.len() == 1 => s.bytes().next(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Integer value, widened so that every `u64` and `i64` fits.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Unsigned(v) => Some(*v as i128),
            Value::Signed(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Number of elements if the value is a sequence.
    pub(crate) fn sequence_len(&self) -> Option<usize> {
        match self {
            Value::Bytes(b) => Some(b.len()),
            Value::Text(s) => Some(s.len()),
            Value::List(l) => Some(l.len()),
            _ => None,
        }
    }

    /// Elements of a sequence, with bytes as unsigned values and text as characters.
    pub(crate) fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Bytes(b) => Some(b.iter().map(|b| Value::Unsigned(*b as u64)).collect()),
            Value::Text(s) => Some(s.bytes().map(Value::Char).collect()),
            Value::List(l) => Some(l.clone()),
            _ => None,
        }
    }

    /// Equality across numeric representations.
    ///
    /// `Unsigned(1)`, `Signed(1)` and `Float(1.0)` are all equal, and a one character text
    /// equals the matching `Char`.
    pub(crate) fn loose_eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            return a == b;
        }
        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            return match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
        }
        if let (Value::Char(_), Value::Text(_)) | (Value::Text(_), Value::Char(_)) = (self, other)
        {
            return self.as_char().is_some() && self.as_char() == other.as_char();
        }
        self == other
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Char(c) => write!(f, "{:?}", *c as char),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Record(r) => write!(f, "{r}"),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $target:ty, $($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from!(Unsigned, u64, u8, u16, u32, u64);
impl_from!(Signed, i64, i8, i16, i32, i64);
impl_from!(Float, f64, f32, f64);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

/// An instance of a [Struct] layout.
///
/// Holds one value per field, hidden fields included (they always hold their default).
/// Assignment through [Record::set] validates against the field's layout.
#[derive(Clone, Debug)]
pub struct Record {
    layout: Struct,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn from_parts(layout: Struct, values: Vec<Value>) -> Self {
        debug_assert_eq!(layout.fields().len(), values.len());
        Self { layout, values }
    }

    /// The struct this record is an instance of.
    pub fn layout(&self) -> &Struct {
        &self.layout
    }

    /// Returns the value of a visible field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layout.position(name).map(|i| &self.values[i])
    }

    /// Assigns a visible field after validating the value against the field's layout.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let index = self
            .layout
            .position(name)
            .ok_or_else(|| Error::UnknownFields(vec![name.to_string()]))?;
        let value = value.into();
        self.layout.fields()[index]
            .layout()
            .validate(&value)
            .map_err(|e| e.in_field(name))?;
        self.values[index] = value;
        Ok(())
    }

    /// Iterates over visible `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.layout
            .fields()
            .iter()
            .zip(self.values.iter())
            .filter_map(|(field, value)| field.name().map(|name| (name, value)))
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.layout.compare_records(self, other).unwrap_or(false)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout.render_record(self) {
            Ok(text) => write!(f, "{text}"),
            Err(err) => write!(f, "<{}: {err}>", self.layout.name()),
        }
    }
}
