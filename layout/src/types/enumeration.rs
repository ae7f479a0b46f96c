//! Closed sets of named integral literals.

use crate::{scalar::Scalar, Codec, Config, Error, Metadata, SchemaError, Value};
use bytes::BufMut;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace};

#[derive(Debug)]
struct Inner {
    name: String,
    underlying: Scalar,
    literals: Vec<(String, i128)>,
    default: Value,
}

/// An enum layout, encoded as its underlying integral scalar.
#[derive(Clone, Debug)]
pub struct Enum(Arc<Inner>);

/// Assembles an [Enum].
pub struct Builder {
    name: String,
    underlying: Scalar,
    literals: Vec<(String, Option<i128>)>,
}

impl Builder {
    /// Declares a literal with an explicit value.
    pub fn literal(mut self, name: impl Into<String>, value: impl Into<i128>) -> Self {
        self.literals.push((name.into(), Some(value.into())));
        self
    }

    /// Declares a literal numbered after the previous one (or 0 if it is the first).
    pub fn next(mut self, name: impl Into<String>) -> Self {
        self.literals.push((name.into(), None));
        self
    }

    pub fn build(self) -> Result<Enum, SchemaError> {
        let kind = self.underlying.kind();
        if !kind.is_integral() {
            return Err(SchemaError::InvalidUnderlying(
                self.name,
                self.underlying.name(),
            ));
        }

        let mut literals: Vec<(String, i128)> = Vec::with_capacity(self.literals.len());
        let mut names = HashSet::new();
        for (name, value) in self.literals {
            let value = match value {
                Some(value) => value,
                None => match literals.last() {
                    Some((_, prev)) => prev.checked_add(1).ok_or_else(|| {
                        SchemaError::InvalidLiteral(name.clone(), "overflow".into())
                    })?,
                    None => 0,
                },
            };
            let Some(encoded) = self.underlying.integer_value(value) else {
                return Err(SchemaError::InvalidLiteral(
                    name,
                    format!("{value} does not fit in {}", self.underlying.name()),
                ));
            };
            if let Err(err) = self.underlying.validate(&encoded) {
                return Err(SchemaError::InvalidLiteral(name, err.to_string()));
            }
            if !names.insert(name.clone()) {
                return Err(SchemaError::DuplicateLiteral(name, self.name));
            }
            literals.push((name, value));
        }

        let Some((_, first)) = literals.first() else {
            return Err(SchemaError::EmptyEnum(self.name));
        };
        let Some(default) = self.underlying.integer_value(*first) else {
            return Err(SchemaError::EmptyEnum(self.name));
        };
        debug!(
            name = %self.name,
            underlying = %self.underlying.name(),
            literals = literals.len(),
            "built enum layout"
        );
        Ok(Enum(Arc::new(Inner {
            name: self.name,
            underlying: self.underlying,
            literals,
            default,
        })))
    }
}

impl Enum {
    /// Starts an enum encoded as `underlying`, which must be an integral scalar.
    pub fn builder(name: impl Into<String>, underlying: Scalar) -> Builder {
        Builder {
            name: name.into(),
            underlying,
            literals: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn underlying(&self) -> &Scalar {
        &self.0.underlying
    }

    /// Literals in declaration order.
    pub fn literals(&self) -> impl Iterator<Item = (&str, i128)> {
        self.0.literals.iter().map(|(name, v)| (name.as_str(), *v))
    }

    /// Value of the literal called `name`.
    pub fn value_of(&self, name: &str) -> Option<Value> {
        self.0
            .literals
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| self.0.underlying.integer_value(*v))
    }

    /// First declared name of the literal equal to `value`.
    pub fn name_of(&self, value: &Value) -> Option<&str> {
        let value = value.as_i128()?;
        self.0
            .literals
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.as_str())
    }

    fn check_member(&self, value: &Value) -> Result<(), Error> {
        if self.name_of(value).is_none() {
            return Err(Error::Invalid(format!(
                "`{value}` is not a literal of {}",
                self.name()
            )));
        }
        Ok(())
    }
}

impl Codec for Enum {
    fn metadata(&self) -> Metadata {
        Metadata {
            primitive: true,
            ..self.0.underlying.metadata()
        }
    }

    fn default_value(&self) -> Value {
        self.0.default.clone()
    }

    fn encode_size(&self, value: &Value) -> Result<usize, Error> {
        self.0.underlying.encode_size(value)
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        self.0.underlying.validate(value)?;
        self.check_member(value)
    }

    fn write(&self, value: &Value, buf: &mut impl BufMut, cfg: &Config) -> Result<(), Error> {
        self.0.underlying.write(value, buf, cfg)
    }

    fn read(&self, raw: &[u8], cfg: &Config) -> Result<Value, Error> {
        let value = self.0.underlying.read(raw, cfg)?;
        if cfg.strict_enums {
            if let Err(err) = self.check_member(&value) {
                trace!(name = %self.name(), %value, "decoded unknown literal");
                return Err(err);
            }
        }
        Ok(value)
    }

    fn render(&self, value: &Value) -> Result<String, Error> {
        self.0.underlying.validate(value)?;
        let name = self.name_of(value).ok_or_else(|| {
            Error::Invalid(format!("`{value}` is not a literal of {}", self.name()))
        })?;
        Ok(format!("{}.{name} ({value})", self.name()))
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error> {
        self.0.underlying.compare(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{F32, I8, U16_LE, U8};

    fn color() -> Enum {
        Enum::builder("Color", U8)
            .literal("RED", 0)
            .literal("GREEN", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_membership() {
        let color = color();
        assert!(color.validate(&Value::Unsigned(1)).is_ok());
        assert!(color.validate(&Value::Unsigned(2)).unwrap_err().is_validation());
        assert!(color.validate(&Value::Unsigned(256)).unwrap_err().is_validation());
        assert_eq!(color.default_value(), Value::Unsigned(0));
    }

    #[test]
    fn test_render() {
        let color = color();
        assert_eq!(color.render(&Value::Unsigned(0)).unwrap(), "Color.RED (0)");
        assert!(color.render(&Value::Unsigned(7)).is_err());
    }

    #[test]
    fn test_auto_numbering() {
        let level = Enum::builder("Level", I8)
            .next("LOW")
            .next("MID")
            .literal("HIGH", 10)
            .next("MAX")
            .literal("DEFAULT", 1)
            .build()
            .unwrap();
        let literals: Vec<_> = level.literals().collect();
        assert_eq!(
            literals,
            [("LOW", 0), ("MID", 1), ("HIGH", 10), ("MAX", 11), ("DEFAULT", 1)]
        );
        assert_eq!(level.value_of("MAX"), Some(Value::Signed(11)));

        // Aliases render with the first declared name
        assert_eq!(level.name_of(&Value::Signed(1)), Some("MID"));
        assert_eq!(level.render(&Value::Signed(1)).unwrap(), "Level.MID (1)");
    }

    #[test]
    fn test_round_trip() {
        let kind = Enum::builder("Kind", U16_LE)
            .literal("A", 0x0102)
            .next("B")
            .build()
            .unwrap();
        assert_eq!(kind.fixed_size(), Some(2));
        assert!(kind.metadata().primitive);
        let value = kind.value_of("B").unwrap();
        let encoded = kind.encode(&value).unwrap();
        assert_eq!(encoded, &[0x03, 0x01][..]);
        assert_eq!(kind.decode(encoded).unwrap(), value);
    }

    #[test]
    fn test_strict_decode() {
        let color = color();
        assert!(color.decode(&[5][..]).unwrap_err().is_validation());
        let cfg = Config::default().with_strict_enums(false);
        assert_eq!(
            color.decode_cfg(&[5][..], &cfg).unwrap(),
            Value::Unsigned(5)
        );
    }

    #[test]
    fn test_schema_errors() {
        assert!(matches!(
            Enum::builder("Float", F32).next("A").build(),
            Err(SchemaError::InvalidUnderlying(..))
        ));
        assert!(matches!(
            Enum::builder("Big", U8).literal("A", 256).build(),
            Err(SchemaError::InvalidLiteral(..))
        ));
        assert!(matches!(
            Enum::builder("Overflow", U8).literal("A", 255).next("B").build(),
            Err(SchemaError::InvalidLiteral(..))
        ));
        assert!(matches!(
            Enum::builder("Dup", U8).next("A").next("A").build(),
            Err(SchemaError::DuplicateLiteral(..))
        ));
        assert_eq!(
            Enum::builder("Empty", U8).build().unwrap_err(),
            SchemaError::EmptyEnum("Empty".into())
        );
    }
}
