//! Error types for layout definition and value operations

use thiserror::Error;

/// Error raised while assembling a layout.
///
/// Layouts are built once, so there is no partial schema: a builder either returns a complete
/// layout or one of these errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field `{0}` is variable length but `{1}` is declared after it")]
    VariableNotLast(String, String),
    #[error("field `{0}` overrides an existing member of `{1}`")]
    DuplicateField(String, String),
    #[error("literal `{0}` is declared twice in `{1}`")]
    DuplicateLiteral(String, String),
    #[error("invalid underlying type for enum `{0}`: {1}")]
    InvalidUnderlying(String, String),
    #[error("invalid value for literal `{0}`: {1}")]
    InvalidLiteral(String, String),
    #[error("invalid default for `{0}`: {1}")]
    InvalidDefault(String, String),
    #[error("enum `{0}` declares no literals")]
    EmptyEnum(String),
    #[error("invalid array bounds: {0}")]
    InvalidBounds(String),
    #[error("array of hidden `{0}` cannot be variable size")]
    HiddenVariable(String),
    #[error("array element `{0}` must not be variable length")]
    VariableElement(String),
    #[error("array element `{0}` has no size")]
    EmptyElement(String),
    #[error("cannot represent array of `{0}` as {1}")]
    InvalidRepr(String, String),
}

/// Error raised while operating on values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid value: {0}")]
    Invalid(String),
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("invalid length: {found} not in [{min}, {max}]")]
    InvalidLength { found: usize, min: usize, max: usize },
    #[error("length {0} is not a multiple of element size {1}")]
    Misaligned(usize, usize), // found, element size
    #[error("unexpected end of buffer: need {0} bytes, have {1}")]
    EndOfBuffer(usize, usize), // needed, available
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("unknown fields: {}", .0.join(", "))]
    UnknownFields(Vec<String>),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("index {0} out of range for at most {1} elements")]
    OutOfRange(usize, usize), // index, max
    #[error("invalid data in field `{0}`: {1}")]
    Field(String, Box<Error>),
    #[error("invalid data at index {0}: {1}")]
    Element(usize, Box<Error>),
}

impl Error {
    /// Returns the innermost error, skipping any field or element annotations.
    pub fn root(&self) -> &Error {
        match self {
            Error::Field(_, inner) | Error::Element(_, inner) => inner.root(),
            other => other,
        }
    }

    /// Returns true if the value violates the domain of its layout.
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Error::Invalid(_) | Error::LengthExceeded(..))
    }

    /// Returns true if raw bytes could not be decoded because of their length.
    pub fn is_decode(&self) -> bool {
        matches!(
            self.root(),
            Error::InvalidLength { .. }
                | Error::Misaligned(..)
                | Error::EndOfBuffer(..)
                | Error::ExtraData(_)
        )
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn in_field(self, name: &str) -> Self {
        Error::Field(name.to_string(), Box::new(self))
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        Error::Element(index, Box::new(self))
    }
}
