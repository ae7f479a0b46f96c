//! Predicates attached to scalars and instances.

use crate::{Error, SchemaError, Value};
use std::{fmt, sync::Arc};

/// A check run on every validation of a value.
#[derive(Clone)]
pub enum Validator {
    /// Numeric value within `[min, max]` (inclusive).
    Range { min: i128, max: i128 },
    /// Value equal to the expected one.
    Exact(Value),
    /// Value equal to one of the members.
    OneOf(Vec<Value>),
    /// Value accepted by an arbitrary predicate.
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Validator {
    /// Creates an inclusive range validator.
    pub fn range(min: impl Into<i128>, max: impl Into<i128>) -> Self {
        Validator::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Creates a validator accepting the unsigned values that fit in `bits` bits.
    ///
    /// `bits` must be in `1..=127`.
    pub fn bit_size(bits: u32) -> Result<Self, SchemaError> {
        if bits == 0 || bits > 127 {
            return Err(SchemaError::InvalidBounds(format!(
                "bit size {bits} is outside [1, 127]"
            )));
        }
        Ok(Validator::Range {
            min: 0,
            max: i128::MAX >> (127 - bits),
        })
    }

    pub fn exact(value: impl Into<Value>) -> Self {
        Validator::Exact(value.into())
    }

    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Validator::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn predicate(pred: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Validator::Predicate(Arc::new(pred))
    }

    /// Runs the check.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        match self {
            Validator::Range { min, max } => {
                let inside = match (value.as_i128(), value.as_f64()) {
                    (Some(v), _) => *min <= v && v <= *max,
                    (None, Some(v)) => *min as f64 <= v && v <= *max as f64,
                    (None, None) => return Err(Error::mismatch("number", value.kind())),
                };
                if !inside {
                    return Err(Error::Invalid(format!(
                        "`{value}` is out of range [{min}, {max}]"
                    )));
                }
            }
            Validator::Exact(expected) => {
                if !expected.loose_eq(value) {
                    return Err(Error::Invalid(format!(
                        "expected `{expected}`, got `{value}`"
                    )));
                }
            }
            Validator::OneOf(members) => {
                if !members.iter().any(|m| m.loose_eq(value)) {
                    return Err(Error::Invalid(format!("`{value}` is not part of the set")));
                }
            }
            Validator::Predicate(pred) => {
                if !pred(value) {
                    return Err(Error::Invalid(format!("`{value}` rejected by predicate")));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Validator::Exact(v) => f.debug_tuple("Exact").field(v).finish(),
            Validator::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            Validator::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
