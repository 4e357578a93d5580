/// Chunked-container traversal.
///
/// Provides the [`CafReader`](caf::CafReader) for walking the chunk
/// sequence of a chunked file and decoding each known chunk into a
/// [`CafRecord`](crate::structs::caf::CafRecord).
pub mod caf;

/// Page-stream scanning.
///
/// Provides the [`PageScanner`](ogg::PageScanner) for synchronizing on
/// page boundaries and reading [`Page`](crate::structs::ogg::Page)
/// objects, plus [`read_stream_headers`](ogg::read_stream_headers) for
/// the leading codec header packets.
pub mod ogg;
