//! Composition of named fields into a C-like structure.
//!
//! A struct is assembled once through [Builder], from the fields of zero or more base structs
//! followed by its own fields. At most one field may be variable length, and only if it is the
//! last one.
//!
//! Hidden fields (padding, reserved bytes) have no name. They always hold their default, are
//! never compared and cannot be assigned.

use crate::{Codec, Config, Error, Layout, Metadata, Record, SchemaError, Value};
use bytes::BufMut;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace};

/// A member of a struct.
#[derive(Clone, Debug)]
pub struct Field {
    name: Option<String>,
    layout: Layout,
    offset: usize,
}

impl Field {
    /// Name of the field, or `None` if it is hidden.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Byte offset of the field from the start of the struct.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_hidden(&self) -> bool {
        self.name.is_none()
    }

    // Name used in errors and logs, including for hidden fields.
    fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<{}>", self.layout.name()),
        }
    }
}

#[derive(Debug)]
struct Inner {
    name: String,
    fields: Vec<Field>,
    size: usize,
    variable: bool,
}

/// A struct layout.
///
/// Cloning is cheap, all clones refer to the same definition. Records of a struct only
/// interoperate with records of the same definition.
#[derive(Clone, Debug)]
pub struct Struct(Arc<Inner>);

/// Assembles a [Struct].
///
/// Errors are reported by [Builder::build].
pub struct Builder {
    name: String,
    fields: Vec<(Option<String>, Layout)>,
}

impl Builder {
    /// Appends every field of `base`, in its declaration order.
    pub fn extend(mut self, base: &Struct) -> Self {
        self.fields.extend(
            base.fields()
                .iter()
                .map(|f| (f.name.clone(), f.layout.clone())),
        );
        self
    }

    /// Appends a named field.
    ///
    /// A field with a hidden layout is appended anonymously.
    pub fn field(mut self, name: impl Into<String>, layout: impl Into<Layout>) -> Self {
        let layout = layout.into();
        let name = (!layout.metadata().hidden).then(|| name.into());
        self.fields.push((name, layout));
        self
    }

    /// Appends an anonymous field.
    ///
    /// Anonymous fields must have a fixed size.
    pub fn padding(mut self, layout: impl Into<Layout>) -> Self {
        self.fields.push((None, layout.into()));
        self
    }

    pub fn build(self) -> Result<Struct, SchemaError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut names = HashSet::new();
        let mut size = 0;
        let mut tail: Option<String> = None;
        for (name, layout) in self.fields {
            let field = Field {
                name,
                layout,
                offset: size,
            };
            if let Some(variable) = &tail {
                return Err(SchemaError::VariableNotLast(variable.clone(), field.label()));
            }
            if let Some(name) = &field.name {
                if !names.insert(name.clone()) {
                    return Err(SchemaError::DuplicateField(name.clone(), self.name));
                }
            }

            let metadata = field.layout.metadata();
            if metadata.variable {
                if field.name.is_none() {
                    return Err(SchemaError::HiddenVariable(field.label()));
                }
                tail = Some(field.label());
            }
            size = size.checked_add(metadata.size).ok_or_else(|| {
                SchemaError::InvalidBounds(format!(
                    "{} overflows the addressable size at {}",
                    self.name,
                    field.label()
                ))
            })?;
            fields.push(field);
        }

        let variable = tail.is_some();
        debug!(
            name = %self.name,
            fields = fields.len(),
            size,
            variable,
            "built struct layout"
        );
        Ok(Struct(Arc::new(Inner {
            name: self.name,
            fields,
            size,
            variable,
        })))
    }
}

impl Struct {
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// All fields in declaration order, hidden ones included.
    pub fn fields(&self) -> &[Field] {
        &self.0.fields
    }

    /// Returns a visible field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.position(name).map(|i| &self.0.fields[i])
    }

    /// Byte offset of a visible field.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.field(name).map(Field::offset)
    }

    /// Returns true if both handles refer to the same definition.
    pub fn same(&self, other: &Struct) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.0
            .fields
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }

    /// Creates a record from `(name, value)` pairs of visible fields.
    ///
    /// Fields that are not supplied hold their default. Every supplied value is validated.
    pub fn record<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<Record, Error>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut values = self.default_values();
        let mut unknown = Vec::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            let Some(index) = self.position(name) else {
                unknown.push(name.to_string());
                continue;
            };
            let value = value.into();
            self.0.fields[index]
                .layout
                .validate(&value)
                .map_err(|e| e.in_field(name))?;
            values[index] = value;
        }
        if !unknown.is_empty() {
            return Err(Error::UnknownFields(unknown));
        }
        Ok(Record::from_parts(self.clone(), values))
    }

    /// Copies a record of this struct.
    pub fn record_from(&self, other: &Record) -> Result<Record, Error> {
        if !self.same(other.layout()) {
            return Err(Error::mismatch(self.name(), other.layout().name()));
        }
        Ok(other.clone())
    }

    /// A record with every field holding its default.
    pub fn default_record(&self) -> Record {
        Record::from_parts(self.clone(), self.default_values())
    }

    fn default_values(&self) -> Vec<Value> {
        self.0
            .fields
            .iter()
            .map(|f| f.layout.default_value())
            .collect()
    }

    fn record_of<'a>(&self, value: &'a Value) -> Result<&'a Record, Error> {
        let record = value
            .as_record()
            .ok_or_else(|| Error::mismatch(self.name(), value.kind()))?;
        if !self.same(record.layout()) {
            return Err(Error::mismatch(self.name(), record.layout().name()));
        }
        Ok(record)
    }

    // Visible fields paired with their values in both records.
    fn visible<'a>(
        &'a self,
        record: &'a Record,
    ) -> impl Iterator<Item = (&'a Field, &'a Value)> + 'a {
        self.0
            .fields
            .iter()
            .zip(record.values())
            .filter(|(f, _)| !f.is_hidden())
    }

    pub(crate) fn compare_records(&self, a: &Record, b: &Record) -> Result<bool, Error> {
        for record in [a, b] {
            if !self.same(record.layout()) {
                return Err(Error::mismatch(self.name(), record.layout().name()));
            }
        }
        for ((field, x), (_, y)) in self.visible(a).zip(self.visible(b)) {
            if !field.layout.compare(x, y).map_err(|e| e.in_field(&field.label()))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn render_record(&self, record: &Record) -> Result<String, Error> {
        let mut out = format!("{} {{\n", self.name());
        for (field, value) in self.0.fields.iter().zip(record.values()) {
            let rendered = match &field.name {
                Some(name) => {
                    let text = field.layout.render(value).map_err(|e| e.in_field(name))?;
                    format!("{name}: {text}")
                }
                None => field.layout.render(&field.layout.default_value())?,
            };
            out.push_str("    ");
            out.push_str(&rendered.replace('\n', "\n    "));
            out.push('\n');
        }
        out.push('}');
        Ok(out)
    }
}

impl Codec for Struct {
    fn metadata(&self) -> Metadata {
        Metadata {
            size: self.0.size,
            variable: self.0.variable,
            hidden: false,
            primitive: false,
        }
    }

    fn default_value(&self) -> Value {
        Value::Record(self.default_record())
    }

    fn encode_size(&self, value: &Value) -> Result<usize, Error> {
        let record = self.record_of(value)?;
        if !self.0.variable {
            return Ok(self.0.size);
        }

        // Replace the minimum size of the tail with its actual size
        let (Some(tail), Some(tail_value)) = (self.0.fields.last(), record.values().last()) else {
            return Ok(self.0.size);
        };
        let actual = tail
            .layout
            .encode_size(tail_value)
            .map_err(|e| e.in_field(&tail.label()))?;
        (self.0.size - tail.layout.metadata().size)
            .checked_add(actual)
            .ok_or_else(|| {
                Error::Invalid(format!("{} overflows the addressable size", self.0.name))
            })
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        let record = self.record_of(value)?;
        for (field, value) in self.visible(record) {
            field
                .layout
                .validate(value)
                .map_err(|e| e.in_field(&field.label()))?;
        }
        Ok(())
    }

    fn write(&self, value: &Value, buf: &mut impl BufMut, cfg: &Config) -> Result<(), Error> {
        let record = self.record_of(value)?;
        for (field, value) in self.0.fields.iter().zip(record.values()) {
            let result = if field.is_hidden() {
                field.layout.write(&field.layout.default_value(), buf, cfg)
            } else {
                field.layout.write(value, buf, cfg)
            };
            result.map_err(|e| e.in_field(&field.label()))?;
        }
        Ok(())
    }

    fn read(&self, raw: &[u8], cfg: &Config) -> Result<Value, Error> {
        let size = self.0.size;
        if raw.len() < size {
            trace!(name = %self.name(), len = raw.len(), size, "raw data too short");
            return Err(Error::EndOfBuffer(size, raw.len()));
        }
        if !self.0.variable && raw.len() > size {
            trace!(name = %self.name(), len = raw.len(), size, "raw data too long");
            return Err(Error::ExtraData(raw.len() - size));
        }

        let mut values = Vec::with_capacity(self.0.fields.len());
        let mut rest = raw;
        for field in &self.0.fields {
            let metadata = field.layout.metadata();
            let take = if metadata.variable {
                rest.len()
            } else {
                metadata.size
            };
            let (chunk, remaining) = rest.split_at(take);
            rest = remaining;

            let decoded = field
                .layout
                .read(chunk, cfg)
                .map_err(|e| e.in_field(&field.label()))?;
            if field.is_hidden() {
                values.push(field.layout.default_value());
            } else {
                values.push(decoded);
            }
        }
        Ok(Value::Record(Record::from_parts(self.clone(), values)))
    }

    fn render(&self, value: &Value) -> Result<String, Error> {
        self.render_record(self.record_of(value)?)
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<bool, Error> {
        self.compare_records(self.record_of(a)?, self.record_of(b)?)
    }
}
