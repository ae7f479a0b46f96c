//! Declare the binary layout of C-like structures.
//!
//! # Overview
//!
//! A layout is declared once, as a composition of typed fields, and then used to:
//! - Compute the exact encoded size of a value
//! - Validate values against the domain of every field
//! - Encode values into bytes and decode bytes into values
//! - Render and compare values
//!
//! # Supported Layouts
//!
//! - Scalars: `u8`, `i8`, `u16`, `i16`, `u32`, `i32`, `u64`, `i64`, `f32`, `f64` in native,
//!   big and little endian byte order, and ASCII `char`
//! - Arrays: a fixed or bounded number of elements of one layout
//! - Structs: named fields, optionally extending other structs, with at most one variable length
//!   field at the end
//! - Enums: named literals over an integral scalar
//!
//! Layouts are immutable once built and cheap to clone. Values are dynamic ([Value]), struct
//! values are [Record]s.
//!
//! # Example
//!
//! ```
//! use commonware_layout::{
//!     padding,
//!     scalar::{U16_BE, U8},
//!     Array, Codec, Enum, Struct, Value,
//! };
//!
//! // Declare the layout
//! let kind = Enum::builder("Kind", U8)
//!     .next("PING")
//!     .next("PONG")
//!     .build()
//!     .unwrap();
//! let message = Struct::builder("Message")
//!     .field("kind", &kind)
//!     .field("reserved", padding(1, 0).unwrap())
//!     .field("id", U16_BE)
//!     .field("payload", Array::variable(0..=16, U8).unwrap())
//!     .build()
//!     .unwrap();
//! assert_eq!(message.offset_of("id"), Some(2));
//!
//! // Encode a value
//! let record = message
//!     .record([
//!         ("kind", kind.value_of("PONG").unwrap()),
//!         ("id", Value::from(0x0102u16)),
//!         ("payload", Value::from(&[0xffu8, 0xee])),
//!     ])
//!     .unwrap();
//! let value = Value::Record(record);
//! assert_eq!(message.encode_size(&value).unwrap(), 6);
//! let encoded = message.encode(&value).unwrap();
//! assert_eq!(encoded, &[0x01, 0x00, 0x01, 0x02, 0xff, 0xee][..]);
//!
//! // Decode it back
//! let decoded = message.decode(encoded).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(
//!     decoded.as_record().unwrap().get("id").and_then(Value::as_u64),
//!     Some(0x0102)
//! );
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod instance;
pub mod types;
pub mod validator;
pub mod value;

// Re-export main types and traits
pub use codec::{Codec, Layout, Metadata};
pub use config::{Bounds, Config};
pub use error::{Error, SchemaError};
pub use instance::Instance;
pub use types::{
    array::{padding, Array, Repr},
    enumeration::Enum,
    scalar::{self, Endian, Kind, Scalar},
    structure::{Field, Struct},
};
pub use validator::Validator;
pub use value::{Record, Value};
