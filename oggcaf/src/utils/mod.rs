//! Utility functions and supporting infrastructure.
//!
//! Provides byte-stream I/O, primitive field decoders, CRC validation,
//! and error handling shared by both container pipelines.

pub mod bytes;
pub mod bytestream_io;
pub mod crc;
pub mod errors;
