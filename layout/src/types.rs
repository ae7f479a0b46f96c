//! Layout kinds implementing [crate::Codec].

pub mod array;
pub mod enumeration;
pub mod scalar;
pub mod structure;
