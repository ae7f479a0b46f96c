//! A value bound to its layout.

use crate::{Codec, Config, Error, Layout, Validator, Value};
use bytes::{Buf, BytesMut};
use std::fmt;

/// A [Value] together with the [Layout] it belongs to and any extra validators.
///
/// The instance always holds a value that passed validation: assignments that fail leave the
/// previous value in place.
///
/// # Examples
///
/// ```
/// use commonware_layout::{scalar::U16_BE, Instance, Validator};
///
/// let mut port = Instance::new(U16_BE).with_validator(Validator::range(1024, 65535));
/// assert!(port.set(80u16).is_err());
/// port.set(8080u16).unwrap();
/// assert_eq!(port.encode().unwrap(), &[0x1f, 0x90][..]);
/// ```
#[derive(Clone, Debug)]
pub struct Instance {
    layout: Layout,
    value: Value,
    validators: Vec<Validator>,
}

impl Instance {
    /// Creates an instance holding the default value of `layout`.
    pub fn new(layout: impl Into<Layout>) -> Self {
        let layout = layout.into();
        let value = layout.default_value();
        Self {
            layout,
            value,
            validators: Vec::new(),
        }
    }

    /// Creates an instance holding `value`, after validating it.
    pub fn with_value(layout: impl Into<Layout>, value: impl Into<Value>) -> Result<Self, Error> {
        let mut instance = Self::new(layout);
        instance.set(value)?;
        Ok(instance)
    }

    /// Adds a validator run after the layout's own validation.
    ///
    /// The current value is not revalidated.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    fn check(&self, value: &Value) -> Result<(), Error> {
        self.layout.validate(value)?;
        for validator in &self.validators {
            validator.validate(value)?;
        }
        Ok(())
    }

    /// Validates the current value against the layout and every validator.
    pub fn validate(&self) -> Result<(), Error> {
        self.check(&self.value)
    }

    /// Replaces the value.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<(), Error> {
        let value = value.into();
        self.check(&value)?;
        self.value = value;
        Ok(())
    }

    pub fn encode_size(&self) -> Result<usize, Error> {
        self.layout.encode_size(&self.value)
    }

    pub fn encode(&self) -> Result<BytesMut, Error> {
        self.encode_cfg(&Config::default())
    }

    pub fn encode_cfg(&self, cfg: &Config) -> Result<BytesMut, Error> {
        if cfg.validate_on_encode {
            self.validate()?;
        }
        let cfg = cfg.with_validate_on_encode(false);
        self.layout.encode_cfg(&self.value, &cfg)
    }

    /// Decodes a value of `layout` from `buf`, which must be fully consumed.
    pub fn decode(layout: impl Into<Layout>, buf: impl Buf) -> Result<Self, Error> {
        Self::decode_cfg(layout, buf, &Config::default())
    }

    pub fn decode_cfg(layout: impl Into<Layout>, buf: impl Buf, cfg: &Config) -> Result<Self, Error> {
        let mut instance = Self::new(layout);
        instance.load(buf, cfg)?;
        Ok(instance)
    }

    /// Replaces the value with one decoded from `buf`, checked by every validator.
    pub fn load(&mut self, buf: impl Buf, cfg: &Config) -> Result<(), Error> {
        let value = self.layout.decode_cfg(buf, cfg)?;
        for validator in &self.validators {
            validator.validate(&value)?;
        }
        self.value = value;
        Ok(())
    }

    pub fn render(&self) -> Result<String, Error> {
        self.layout.render(&self.value)
    }

    /// Returns a visible field of a struct value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.value.as_record()?.get(name)
    }

    /// Assigns a visible field of a struct value.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let mut updated = self.value.clone();
        let record = updated
            .as_record_mut()
            .ok_or_else(|| Error::mismatch("record", self.value.kind()))?;
        record.set(name, value)?;
        for validator in &self.validators {
            validator.validate(&updated)?;
        }
        self.value = updated;
        Ok(())
    }

    /// Returns an element of an array value.
    ///
    /// Past the assigned elements (but below the maximum count) this is the element default.
    pub fn index(&self, index: usize) -> Result<Value, Error> {
        match &self.layout {
            Layout::Array(array) => array.get(&self.value, index),
            other => Err(Error::mismatch("array", other.name())),
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.layout
            .compare(&self.value, &other.value)
            .unwrap_or(false)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => write!(f, "{text}"),
            Err(err) => write!(f, "<{}: {err}>", self.layout.name()),
        }
    }
}
