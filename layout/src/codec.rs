//! Core codec trait and the closed set of layouts implementing it

use crate::{
    types::{array::Array, enumeration::Enum, scalar::Scalar, structure::Struct},
    Config, Error, Value,
};
use bytes::{Buf, BufMut, BytesMut};
use std::fmt;

/// Facts about a layout, computed once when it is built.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Metadata {
    /// Encoded size in bytes. For a variable layout, this is the minimum size.
    pub size: usize,

    /// Whether the minimum encoded size differs from the maximum.
    pub variable: bool,

    /// Whether the layout is excluded from the visible fields of a struct (padding, reserved).
    pub hidden: bool,

    /// Whether values of the layout are plain native values (scalars and enums).
    pub primitive: bool,
}

/// Operations every layout supports.
pub trait Codec {
    /// Returns the build-time facts about this layout.
    fn metadata(&self) -> Metadata;

    /// Returns the value used when none is supplied (and to pad short arrays).
    fn default_value(&self) -> Value;

    /// Returns the number of bytes `value` occupies once encoded.
    ///
    /// This MUST equal the number of bytes written by `write()` for the same value.
    fn encode_size(&self, value: &Value) -> Result<usize, Error>;

    /// Checks that `value` belongs to the domain of this layout.
    fn validate(&self, value: &Value) -> Result<(), Error>;

    /// Encodes `value` by writing to a buffer.
    ///
    /// Does not validate `value` beyond what is needed to encode it.
    fn write(&self, value: &Value, buf: &mut impl BufMut, cfg: &Config) -> Result<(), Error>;

    /// Decodes a value from `raw`, which must hold exactly the encoding of one value.
    fn read(&self, raw: &[u8], cfg: &Config) -> Result<Value, Error>;

    /// Returns a human-readable representation of `value`.
    fn render(&self, value: &Value) -> Result<String, Error>;

    /// Compares two values of this layout.
    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error>;

    /// Returns the encoded size if it does not depend on the value.
    ///
    /// (Provided method).
    fn fixed_size(&self) -> Option<usize> {
        let metadata = self.metadata();
        (!metadata.variable).then_some(metadata.size)
    }

    /// Encodes a value to a `BytesMut` buffer.
    ///
    /// Validates the value first if `cfg.validate_on_encode` is set.
    ///
    /// Panics if the `write` implementation does not write the expected number of bytes.
    ///
    /// (Provided method).
    fn encode_cfg(&self, value: &Value, cfg: &Config) -> Result<BytesMut, Error> {
        if cfg.validate_on_encode {
            self.validate(value)?;
        }
        let len = self.encode_size(value)?;
        let mut buffer = BytesMut::with_capacity(len);
        self.write(value, &mut buffer, cfg)?;
        assert_eq!(buffer.len(), len, "write() did not write expected bytes");
        Ok(buffer)
    }

    /// Encodes a value using the default config.
    ///
    /// (Provided method).
    fn encode(&self, value: &Value) -> Result<BytesMut, Error> {
        self.encode_cfg(value, &Config::default())
    }

    /// Decodes a value from a buffer, ensuring the buffer is fully consumed.
    ///
    /// (Provided method).
    fn decode_cfg(&self, mut buf: impl Buf, cfg: &Config) -> Result<Value, Error> {
        let raw = buf.copy_to_bytes(buf.remaining());
        self.read(&raw, cfg)
    }

    /// Decodes a value using the default config.
    ///
    /// (Provided method).
    fn decode(&self, buf: impl Buf) -> Result<Value, Error> {
        self.decode_cfg(buf, &Config::default())
    }
}

/// Any layout: a scalar leaf or one of the composite kinds.
///
/// Composite layouts are reference counted, so cloning a `Layout` is cheap and the same schema
/// can be shared across threads.
#[derive(Clone, Debug)]
pub enum Layout {
    Scalar(Scalar),
    Array(Array),
    Struct(Struct),
    Enum(Enum),
}

impl Layout {
    /// Name of the layout as it appears in rendered values (`u16_be`, `u8[2:5]`, `Header`).
    pub fn name(&self) -> String {
        match self {
            Layout::Scalar(s) => s.name(),
            Layout::Array(a) => a.name(),
            Layout::Struct(s) => s.name().to_string(),
            Layout::Enum(e) => e.name().to_string(),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

macro_rules! impl_from_layout {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Layout {
                fn from(v: $variant) -> Self {
                    Layout::$variant(v)
                }
            }

            impl From<&$variant> for Layout {
                fn from(v: &$variant) -> Self {
                    Layout::$variant(v.clone())
                }
            }
        )*
    };
}

impl_from_layout!(Scalar, Array, Struct, Enum);

// Forward a call to the inner layout.
macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Layout::Scalar($inner) => $call,
            Layout::Array($inner) => $call,
            Layout::Struct($inner) => $call,
            Layout::Enum($inner) => $call,
        }
    };
}

impl Codec for Layout {
    fn metadata(&self) -> Metadata {
        dispatch!(self, c => c.metadata())
    }

    fn default_value(&self) -> Value {
        dispatch!(self, c => c.default_value())
    }

    fn encode_size(&self, value: &Value) -> Result<usize, Error> {
        dispatch!(self, c => c.encode_size(value))
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        dispatch!(self, c => c.validate(value))
    }

    fn write(&self, value: &Value, buf: &mut impl BufMut, cfg: &Config) -> Result<(), Error> {
        dispatch!(self, c => c.write(value, buf, cfg))
    }

    fn read(&self, raw: &[u8], cfg: &Config) -> Result<Value, Error> {
        dispatch!(self, c => c.read(raw, cfg))
    }

    fn render(&self, value: &Value) -> Result<String, Error> {
        dispatch!(self, c => c.render(value))
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error> {
        dispatch!(self, c => c.compare(a, b))
    }
}
