//! I/O utilities
//!
//! Byte-level primitives used by the native raster readers.

pub mod byte_order;

pub use byte_order::ByteOrder;
