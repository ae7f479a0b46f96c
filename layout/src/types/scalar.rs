//! Fixed-width numeric and character leaves.
//!
//! Every integral kind comes in three byte orders: native (`U16`), big endian (`U16_BE`) and
//! little endian (`U16_LE`). The byte order is part of the layout and never negotiated at
//! runtime.
//!
//! A scalar validates its exact representable range. Out of range integers cannot be written
//! even when validation on encode is disabled, since there is no encoding for them.

use crate::{Codec, Config, Error, Metadata, SchemaError, Validator, Value};
use bytes::{Buf, BufMut};
use paste::paste;
use tracing::trace;

/// Numeric or character format of a scalar.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// A single ASCII byte.
    Char,
}

impl Kind {
    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Kind::U8 | Kind::I8 | Kind::Char => 1,
            Kind::U16 | Kind::I16 => 2,
            Kind::U32 | Kind::I32 | Kind::F32 => 4,
            Kind::U64 | Kind::I64 | Kind::F64 => 8,
        }
    }

    pub const fn is_integral(self) -> bool {
        !matches!(self, Kind::F32 | Kind::F64 | Kind::Char)
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64)
    }

    /// Inclusive range of an integral kind.
    pub fn range(self) -> Option<(i128, i128)> {
        let range = match self {
            Kind::U8 => (u8::MIN as i128, u8::MAX as i128),
            Kind::I8 => (i8::MIN as i128, i8::MAX as i128),
            Kind::U16 => (u16::MIN as i128, u16::MAX as i128),
            Kind::I16 => (i16::MIN as i128, i16::MAX as i128),
            Kind::U32 => (u32::MIN as i128, u32::MAX as i128),
            Kind::I32 => (i32::MIN as i128, i32::MAX as i128),
            Kind::U64 => (u64::MIN as i128, u64::MAX as i128),
            Kind::I64 => (i64::MIN as i128, i64::MAX as i128),
            Kind::F32 | Kind::F64 | Kind::Char => return None,
        };
        Some(range)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Kind::U8 => "u8",
            Kind::I8 => "i8",
            Kind::U16 => "u16",
            Kind::I16 => "i16",
            Kind::U32 => "u32",
            Kind::I32 => "i32",
            Kind::U64 => "u64",
            Kind::I64 => "i64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Char => "char",
        }
    }
}

/// Byte order of a scalar.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Endian {
    Native,
    Big,
    Little,
}

impl Endian {
    const fn suffix(self) -> &'static str {
        match self {
            Endian::Native => "",
            Endian::Big => "_be",
            Endian::Little => "_le",
        }
    }
}

/// A fixed-width leaf layout.
#[derive(Clone, Debug)]
pub struct Scalar {
    kind: Kind,
    endian: Endian,
    hidden: bool,
    default: Option<Value>,
    validator: Option<Validator>,
}

macro_rules! scalars {
    ($($name:ident),* $(,)?) => {
        paste! {
            $(
                pub const $name: Scalar = Scalar::new(Kind::$name, Endian::Native);
                pub const [<$name _BE>]: Scalar = Scalar::new(Kind::$name, Endian::Big);
                pub const [<$name _LE>]: Scalar = Scalar::new(Kind::$name, Endian::Little);
            )*
        }
    };
}

scalars!(U8, I8, U16, I16, U32, I32, U64, I64, F32, F64);

/// A single ASCII character.
pub const CHAR: Scalar = Scalar::new(Kind::Char, Endian::Native);

// Write a multi-byte number in the requested byte order.
macro_rules! put {
    ($buf:ident, $endian:expr, $type:ident, $value:expr) => {
        paste! {
            match $endian {
                Endian::Big => $buf.[<put_ $type>]($value),
                Endian::Little => $buf.[<put_ $type _le>]($value),
                Endian::Native => $buf.[<put_ $type _ne>]($value),
            }
        }
    };
}

// Read a multi-byte number in the requested byte order.
macro_rules! get {
    ($buf:ident, $endian:expr, $type:ident) => {
        paste! {
            match $endian {
                Endian::Big => $buf.[<get_ $type>](),
                Endian::Little => $buf.[<get_ $type _le>](),
                Endian::Native => $buf.[<get_ $type _ne>](),
            }
        }
    };
}

impl Scalar {
    pub const fn new(kind: Kind, endian: Endian) -> Self {
        Self {
            kind,
            endian,
            hidden: false,
            default: None,
            validator: None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Name of the scalar, such as `u16_be`.
    pub fn name(&self) -> String {
        format!("{}{}", self.kind.name(), self.endian.suffix())
    }

    /// Marks the scalar as hidden (padding or reserved bytes).
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Replaces the zero default with `value`.
    ///
    /// The default must pass the range check and any validator already attached.
    pub fn with_default(mut self, value: impl Into<Value>) -> Result<Self, SchemaError> {
        let value = value.into();
        self.validate(&value)
            .map_err(|e| SchemaError::InvalidDefault(self.name(), e.to_string()))?;
        self.default = Some(value);
        Ok(self)
    }

    /// Attaches a validator run after the built-in range check.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    fn out_of_range(&self, value: impl std::fmt::Display) -> Error {
        let (min, max) = self.kind.range().unwrap_or_default();
        Error::Invalid(format!(
            "`{value}` is out of range [{min}, {max}] for {}",
            self.name()
        ))
    }

    fn integer<T: TryFrom<i128>>(&self, value: &Value) -> Result<T, Error> {
        let n = value
            .as_i128()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))?;
        T::try_from(n).map_err(|_| self.out_of_range(n))
    }

    fn float(&self, value: &Value) -> Result<f64, Error> {
        let v = value
            .as_f64()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))?;
        if self.kind == Kind::F32 && v.is_finite() && v.abs() > f32::MAX as f64 {
            return Err(Error::Invalid(format!("`{v}` does not fit in f32")));
        }
        Ok(v)
    }

    fn character(&self, value: &Value) -> Result<u8, Error> {
        let c = value
            .as_char()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))?;
        if !c.is_ascii() {
            return Err(Error::Invalid(format!("`{}` is not ASCII", c.escape_ascii())));
        }
        Ok(c)
    }

    // Built-in domain check, without the attached validator.
    fn check(&self, value: &Value) -> Result<(), Error> {
        match self.kind {
            Kind::F32 | Kind::F64 => self.float(value).map(|_| ()),
            Kind::Char => self.character(value).map(|_| ()),
            _ => self.integer::<i128>(value).and_then(|n| {
                let (min, max) = self.kind.range().unwrap_or_default();
                if n < min || n > max {
                    return Err(self.out_of_range(n));
                }
                Ok(())
            }),
        }
    }

    /// Canonical value of an integer for this kind (`Signed` for signed kinds).
    pub(crate) fn integer_value(&self, n: i128) -> Option<Value> {
        if self.kind.is_signed() {
            i64::try_from(n).ok().map(Value::Signed)
        } else {
            u64::try_from(n).ok().map(Value::Unsigned)
        }
    }
}

impl Codec for Scalar {
    fn metadata(&self) -> Metadata {
        Metadata {
            size: self.kind.size(),
            variable: false,
            hidden: self.hidden,
            primitive: true,
        }
    }

    fn default_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match self.kind {
            Kind::F32 | Kind::F64 => Value::Float(0.0),
            Kind::Char => Value::Char(0),
            kind if kind.is_signed() => Value::Signed(0),
            _ => Value::Unsigned(0),
        }
    }

    fn encode_size(&self, _: &Value) -> Result<usize, Error> {
        Ok(self.kind.size())
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        self.check(value)?;
        if let Some(validator) = &self.validator {
            validator.validate(value)?;
        }
        Ok(())
    }

    fn write(&self, value: &Value, buf: &mut impl BufMut, _: &Config) -> Result<(), Error> {
        match self.kind {
            Kind::U8 => buf.put_u8(self.integer(value)?),
            Kind::I8 => buf.put_i8(self.integer(value)?),
            Kind::U16 => put!(buf, self.endian, u16, self.integer(value)?),
            Kind::I16 => put!(buf, self.endian, i16, self.integer(value)?),
            Kind::U32 => put!(buf, self.endian, u32, self.integer(value)?),
            Kind::I32 => put!(buf, self.endian, i32, self.integer(value)?),
            Kind::U64 => put!(buf, self.endian, u64, self.integer(value)?),
            Kind::I64 => put!(buf, self.endian, i64, self.integer(value)?),
            Kind::F32 => put!(buf, self.endian, f32, self.float(value)? as f32),
            Kind::F64 => put!(buf, self.endian, f64, self.float(value)?),
            Kind::Char => buf.put_u8(self.character(value)?),
        }
        Ok(())
    }

    fn read(&self, raw: &[u8], _: &Config) -> Result<Value, Error> {
        let size = self.kind.size();
        if raw.len() < size {
            trace!(scalar = %self.name(), len = raw.len(), "raw data too short");
            return Err(Error::EndOfBuffer(size, raw.len()));
        }
        if raw.len() > size {
            trace!(scalar = %self.name(), len = raw.len(), "raw data too long");
            return Err(Error::ExtraData(raw.len() - size));
        }

        let mut buf = raw;
        let value = match self.kind {
            Kind::U8 => Value::Unsigned(buf.get_u8() as u64),
            Kind::I8 => Value::Signed(buf.get_i8() as i64),
            Kind::U16 => Value::Unsigned(get!(buf, self.endian, u16) as u64),
            Kind::I16 => Value::Signed(get!(buf, self.endian, i16) as i64),
            Kind::U32 => Value::Unsigned(get!(buf, self.endian, u32) as u64),
            Kind::I32 => Value::Signed(get!(buf, self.endian, i32) as i64),
            Kind::U64 => Value::Unsigned(get!(buf, self.endian, u64)),
            Kind::I64 => Value::Signed(get!(buf, self.endian, i64)),
            Kind::F32 => Value::Float(get!(buf, self.endian, f32) as f64),
            Kind::F64 => Value::Float(get!(buf, self.endian, f64)),
            Kind::Char => Value::Char(buf.get_u8()),
        };
        self.validate(&value)?;
        Ok(value)
    }

    fn render(&self, value: &Value) -> Result<String, Error> {
        self.validate(value)?;
        let text = match self.kind {
            Kind::Char => format!("{:?}", self.character(value)? as char),
            _ => value.to_string(),
        };
        Ok(format!("{}({text})", self.name()))
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error> {
        Ok(a.loose_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Round trip the bounds of every integral scalar in every byte order
    macro_rules! impl_int_test {
        ($name:ident, $type:ident) => {
            paste! {
                #[test]
                fn [<test_ $name:lower>]() {
                    for scalar in [$name, [<$name _BE>], [<$name _LE>]] {
                        for v in [$type::MIN, 0, 1, $type::MAX] {
                            let value = Value::from(v);
                            let encoded = scalar.encode(&value).unwrap();
                            assert_eq!(encoded.len(), std::mem::size_of::<$type>());
                            assert_eq!(scalar.decode(encoded).unwrap(), value);
                        }
                        assert_eq!(scalar.fixed_size(), Some(std::mem::size_of::<$type>()));
                    }
                }
            }
        };
    }
    impl_int_test!(U8, u8);
    impl_int_test!(I8, i8);
    impl_int_test!(U16, u16);
    impl_int_test!(I16, i16);
    impl_int_test!(U32, u32);
    impl_int_test!(I32, i32);
    impl_int_test!(U64, u64);
    impl_int_test!(I64, i64);

    #[test]
    fn test_endianness() {
        let value = Value::Unsigned(0x0102);
        assert_eq!(U16_BE.encode(&value).unwrap(), &[0x01, 0x02][..]);
        assert_eq!(U16_LE.encode(&value).unwrap(), &[0x02, 0x01][..]);
        assert_eq!(
            U16.encode(&value).unwrap(),
            &0x0102u16.to_ne_bytes()[..]
        );

        let value = Value::Float(1.0);
        assert_eq!(F32_BE.encode(&value).unwrap(), &[0x3F, 0x80, 0x00, 0x00][..]);
        assert_eq!(F64_LE.encode(&value).unwrap(), &1.0f64.to_le_bytes()[..]);
    }

    #[test]
    fn test_range() {
        assert!(U8.validate(&Value::Unsigned(255)).is_ok());
        assert!(U8.validate(&Value::Signed(255)).is_ok());
        assert!(U8.validate(&Value::Unsigned(256)).unwrap_err().is_validation());
        assert!(U8.validate(&Value::Signed(-1)).unwrap_err().is_validation());
        assert!(I8.validate(&Value::Signed(-128)).is_ok());
        assert!(I8.validate(&Value::Unsigned(128)).is_err());
        assert!(matches!(
            U32.validate(&Value::from("a")),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_out_of_range() {
        // Not representable, so rejected even without validation
        assert!(U8_BE
            .encode(&Value::Unsigned(300))
            .unwrap_err()
            .is_validation());
        assert!(F32
            .encode(&Value::Float(f64::MAX))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_float() {
        assert!(F32.validate(&Value::Float(f64::INFINITY)).is_ok());
        assert!(F32.validate(&Value::Unsigned(3)).is_ok());
        let decoded = F64_BE.decode(&[0x3F, 0xF0, 0, 0, 0, 0, 0, 0][..]).unwrap();
        assert_eq!(decoded, Value::Float(1.0));
    }

    #[test]
    fn test_char() {
        assert_eq!(CHAR.encode(&Value::from("a")).unwrap(), &b"a"[..]);
        assert_eq!(CHAR.decode(&b"z"[..]).unwrap(), Value::Char(b'z'));
        assert!(CHAR.decode(&[0x80][..]).unwrap_err().is_validation());
        assert!(CHAR.validate(&Value::from("ab")).is_err());
        assert_eq!(CHAR.default_value(), Value::Char(0));
    }

    #[test]
    fn test_default() {
        assert_eq!(U8.default_value(), Value::Unsigned(0));
        assert_eq!(I16_BE.default_value(), Value::Signed(0));
        assert_eq!(F32.default_value(), Value::Float(0.0));
        let pad = U8.with_default(0xffu8).unwrap();
        assert_eq!(pad.default_value(), Value::Unsigned(0xff));
        assert!(matches!(
            I8.with_default(200u8),
            Err(SchemaError::InvalidDefault(..))
        ));

        // Attached validators apply to the default too
        let one = U8.with_validator(Validator::exact(1u8));
        assert!(matches!(
            one.clone().with_default(2u8),
            Err(SchemaError::InvalidDefault(..))
        ));
        let one = one.with_default(1u8).unwrap();
        assert_eq!(one.default_value(), Value::Unsigned(1));
    }

    #[test]
    fn test_validator_on_read() {
        let magic = U16_BE.with_validator(Validator::exact(0xcafeu16));
        assert!(magic.decode(&[0xca, 0xfe][..]).is_ok());
        assert!(magic.decode(&[0xca, 0xff][..]).unwrap_err().is_validation());
    }

    #[test]
    fn test_render() {
        assert_eq!(U8.render(&Value::Unsigned(5)).unwrap(), "u8(5)");
        assert_eq!(I32_LE.render(&Value::Signed(-5)).unwrap(), "i32_le(-5)");
        assert_eq!(CHAR.render(&Value::Char(b'a')).unwrap(), "char('a')");
        assert!(U8.render(&Value::Unsigned(256)).is_err());
    }

    #[test]
    fn test_compare() {
        assert!(U8.compare(&Value::Unsigned(1), &Value::Signed(1)).unwrap());
        assert!(!U8.compare(&Value::Unsigned(1), &Value::Unsigned(2)).unwrap());
    }

    #[test]
    fn test_metadata() {
        let m = U64_LE.metadata();
        assert_eq!((m.size, m.variable, m.hidden, m.primitive), (8, false, false, true));
        assert!(U8.hidden().metadata().hidden);
    }
}
