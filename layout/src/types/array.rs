//! Repetition of one element layout, bounded by `[min, max]` elements.
//!
//! An array with `min == max` is fixed. Otherwise it is variable and may only appear as the last
//! field of a struct.
//!
//! Arrays shorter than `min` are padded with default elements when encoded, and indexing past
//! the assigned elements (but below `max`) yields the element default, so an array always acts
//! as if it held at least `min` elements.

use crate::{
    scalar::Kind, Bounds, Codec, Config, Error, Layout, Metadata, SchemaError, Validator, Value,
};
use bytes::{BufMut, Bytes};
use core::ops::RangeBounds;
use std::sync::Arc;
use tracing::trace;

/// How decoded elements are collected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Repr {
    /// [Value::List] of elements.
    List,
    /// [Value::Bytes], for single-byte unsigned elements.
    Bytes,
    /// [Value::Text] with trailing NULs stripped, for character elements.
    Text,
}

#[derive(Debug)]
struct Inner {
    bounds: Bounds,
    element: Layout,
    element_size: usize,
    min_size: usize,
    max_size: usize,
    repr: Repr,
}

/// A repetition layout.
#[derive(Clone, Debug)]
pub struct Array(Arc<Inner>);

fn is_char(layout: &Layout) -> bool {
    matches!(layout, Layout::Scalar(s) if s.kind() == Kind::Char)
}

fn is_byte(layout: &Layout) -> bool {
    matches!(layout, Layout::Scalar(s) if s.kind() == Kind::U8)
}

impl Array {
    /// Creates an array of `element` repeated within `bounds`.
    pub fn new(bounds: Bounds, element: impl Into<Layout>) -> Result<Self, SchemaError> {
        let element = element.into();
        let metadata = element.metadata();
        if metadata.variable {
            return Err(SchemaError::VariableElement(element.name()));
        }
        if metadata.size == 0 {
            return Err(SchemaError::EmptyElement(element.name()));
        }
        if metadata.hidden && !bounds.is_exact() {
            return Err(SchemaError::HiddenVariable(element.name()));
        }
        let max_size = bounds.max().checked_mul(metadata.size).ok_or_else(|| {
            SchemaError::InvalidBounds(format!(
                "{} elements of {} overflow the addressable size",
                bounds.max(),
                element.name()
            ))
        })?;
        let repr = if is_char(&element) {
            Repr::Text
        } else {
            Repr::List
        };
        Ok(Self(Arc::new(Inner {
            bounds,
            element,
            element_size: metadata.size,
            min_size: bounds.min() * metadata.size,
            max_size,
            repr,
        })))
    }

    /// Creates an array of exactly `count` elements.
    pub fn fixed(count: usize, element: impl Into<Layout>) -> Result<Self, SchemaError> {
        Self::new(Bounds::exact(count), element)
    }

    /// Creates an array holding a number of elements within `range`.
    pub fn variable(
        range: impl RangeBounds<usize>,
        element: impl Into<Layout>,
    ) -> Result<Self, SchemaError> {
        Self::new(Bounds::new(range)?, element)
    }

    /// Returns the same array, collecting decoded elements as `repr`.
    pub fn with_repr(&self, repr: Repr) -> Result<Self, SchemaError> {
        let supported = match repr {
            Repr::List => true,
            Repr::Bytes => is_byte(&self.0.element),
            Repr::Text => is_char(&self.0.element),
        };
        if !supported {
            return Err(SchemaError::InvalidRepr(
                self.0.element.name(),
                format!("{repr:?}"),
            ));
        }
        Ok(Self(Arc::new(Inner {
            bounds: self.0.bounds,
            element: self.0.element.clone(),
            element_size: self.0.element_size,
            min_size: self.0.min_size,
            max_size: self.0.max_size,
            repr,
        })))
    }

    pub fn bounds(&self) -> Bounds {
        self.0.bounds
    }

    pub fn element(&self) -> &Layout {
        &self.0.element
    }

    pub fn repr(&self) -> Repr {
        self.0.repr
    }

    /// Name of the array, such as `u8[4]` or `u8[2:5]`.
    pub fn name(&self) -> String {
        format!("{}[{}]", self.0.element.name(), self.size_label())
    }

    fn size_label(&self) -> String {
        let bounds = self.0.bounds;
        if bounds.is_exact() {
            format!("{}", bounds.min())
        } else {
            format!("{}:{}", bounds.min(), bounds.max())
        }
    }

    fn elements(&self, value: &Value) -> Result<Vec<Value>, Error> {
        value
            .elements()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))
    }

    fn check_len(&self, len: usize) -> Result<(), Error> {
        let max = self.0.bounds.max();
        if len > max {
            return Err(Error::LengthExceeded(len, max));
        }
        Ok(())
    }

    /// Returns the element at `index`.
    ///
    /// Past the assigned elements, the element default is returned as long as `index` is below
    /// the maximum count.
    pub fn get(&self, value: &Value, index: usize) -> Result<Value, Error> {
        let max = self.0.bounds.max();
        if index >= max {
            return Err(Error::OutOfRange(index, max));
        }
        let mut elements = self.elements(value)?;
        if index < elements.len() {
            return Ok(elements.swap_remove(index));
        }
        Ok(self.0.element.default_value())
    }

    fn collect(&self, elements: Vec<Value>) -> Value {
        match self.0.repr {
            Repr::List => Value::List(elements),
            Repr::Bytes => Value::Bytes(
                elements
                    .iter()
                    .filter_map(Value::as_u64)
                    .map(|b| b as u8)
                    .collect::<Bytes>(),
            ),
            Repr::Text => {
                let text: String = elements
                    .iter()
                    .filter_map(Value::as_char)
                    .map(char::from)
                    .collect();
                Value::Text(text.trim_end_matches('\0').to_string())
            }
        }
    }
}

/// A hidden array of `count` bytes that must all equal `byte`.
///
/// Decoding fails if the padding region holds anything else.
pub fn padding(count: usize, byte: u8) -> Result<Array, SchemaError> {
    let element = crate::scalar::U8
        .hidden()
        .with_default(byte)?
        .with_validator(Validator::exact(byte));
    Array::fixed(count, element)
}

impl Codec for Array {
    fn metadata(&self) -> Metadata {
        Metadata {
            size: self.0.min_size,
            variable: !self.0.bounds.is_exact(),
            hidden: self.0.element.metadata().hidden,
            primitive: false,
        }
    }

    fn default_value(&self) -> Value {
        let element = self.0.element.default_value();
        self.collect(vec![element; self.0.bounds.min()])
    }

    fn encode_size(&self, value: &Value) -> Result<usize, Error> {
        let len = value
            .sequence_len()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))?;
        self.check_len(len)?;
        Ok(len.max(self.0.bounds.min()) * self.0.element_size)
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        let elements = self.elements(value)?;
        self.check_len(elements.len())?;
        for (i, element) in elements.iter().enumerate() {
            self.0
                .element
                .validate(element)
                .map_err(|e| e.at_index(i))?;
        }
        Ok(())
    }

    fn write(&self, value: &Value, buf: &mut impl BufMut, cfg: &Config) -> Result<(), Error> {
        let elements = self.elements(value)?;
        self.check_len(elements.len())?;
        for (i, element) in elements.iter().enumerate() {
            self.0
                .element
                .write(element, buf, cfg)
                .map_err(|e| e.at_index(i))?;
        }

        // Pad up to the minimum count
        let min = self.0.bounds.min();
        if elements.len() < min {
            let default = self.0.element.default_value();
            for i in elements.len()..min {
                self.0
                    .element
                    .write(&default, buf, cfg)
                    .map_err(|e| e.at_index(i))?;
            }
        }
        Ok(())
    }

    fn read(&self, raw: &[u8], cfg: &Config) -> Result<Value, Error> {
        let size = self.0.element_size;
        let (min, max) = (self.0.min_size, self.0.max_size);
        if raw.len() < min || raw.len() > max {
            trace!(array = %self.name(), len = raw.len(), "raw data out of bounds");
            return Err(Error::InvalidLength {
                found: raw.len(),
                min,
                max,
            });
        }
        if raw.len() % size != 0 {
            trace!(array = %self.name(), len = raw.len(), "raw data misaligned");
            return Err(Error::Misaligned(raw.len(), size));
        }

        let elements = raw
            .chunks_exact(size)
            .enumerate()
            .map(|(i, chunk)| self.0.element.read(chunk, cfg).map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.collect(elements))
    }

    fn render(&self, value: &Value) -> Result<String, Error> {
        self.validate(value)?;
        let elements = self.elements(value)?;
        let body = match self.0.repr {
            Repr::List => {
                let rendered = elements
                    .iter()
                    .map(|e| self.0.element.render(e))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{{{}}}", rendered.join(", "))
            }
            Repr::Bytes | Repr::Text => self.collect(elements).to_string(),
        };
        Ok(format!("{} {body}", self.name()))
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error> {
        let a = self.elements(a)?;
        let b = self.elements(b)?;
        let len = a.len().max(b.len());
        if len > self.0.bounds.max() {
            return Ok(false);
        }

        // Missing elements compare as the element default
        let default = self.0.element.default_value();
        for i in 0..len {
            let x = a.get(i).unwrap_or(&default);
            let y = b.get(i).unwrap_or(&default);
            if !self.0.element.compare(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
