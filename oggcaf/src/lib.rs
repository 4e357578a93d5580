//! Decoders for two binary audio container formats.
//!
//! ## Technical Overview
//!
//! Two independent read paths over a forward-only byte stream:
//!
//! **Chunked container**: a fixed file header followed by tagged,
//! length-delimited chunks. Known chunks (audio description, channel
//! layout, audio data, packet table) decode into typed records; unknown
//! tags are consumed and surfaced as opaque bytes.
//!
//! **Paged container**: a self-synchronizing page stream located by a
//! 4-byte capture pattern, carrying Opus codec headers in the first two
//! pages. Page checksums are verified and reported but never abort the
//! scan.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oggcaf::process::caf::CafReader;
//! use oggcaf::structs::caf::CafRecord;
//!
//! let data = std::fs::read("input.caf")?;
//! let mut reader = CafReader::new(data.as_slice());
//!
//! let header = reader.read_file_header()?;
//! println!("{} v{}", header.file_type, header.file_version);
//!
//! for chunk in reader {
//!     match chunk?.record {
//!         CafRecord::AudioFormat(desc) => println!("{} Hz", desc.sample_rate),
//!         CafRecord::PacketTable(table) => {
//!             println!("{} packets", table.packet_sizes.len());
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Stream processing engines.
///
/// 1. **Chunk traversal** ([`process::caf`]): walks the chunk sequence
///    of a chunked container and decodes known chunk bodies.
///
/// 2. **Page scanning** ([`process::ogg`]): synchronizes on page
///    boundaries, verifies checksums, and splits segment payloads.
pub mod process;

/// Data structures representing container format components.
///
/// - **Chunked container** ([`structs::caf`]): file header, chunk
///   headers, and the typed chunk records
/// - **Page stream** ([`structs::ogg`]): page header and page payloads
/// - **Codec headers** ([`structs::opus`]): identification and comment
///   packets
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Byte field decoding** ([`utils::bytes`]): fixed-width integer
///   and float readers
/// - **Stream I/O** ([`utils::bytestream_io`]): positioned reads over
///   any byte source
/// - **CRC Validation** ([`utils::crc`]): page checksum computation
/// - **Error Handling** ([`utils::errors`]): error types
pub mod utils;
