//! Chunked-container traversal engine.
//!
//! Reads the fixed 8-byte file header, then iterates length-delimited
//! chunks, dispatching each body to its record decoder. Traversal is
//! strictly forward-only and single-pass: every chunk body is consumed
//! in full, including unknown tags, so the stream stays aligned.

use std::io;

use anyhow::Result;
use log::debug;

use crate::structs::caf::{CafRecord, ChunkHeader, FileHeader};
use crate::utils::bytestream_io::ByteStreamReader;

/// Traversal position in the chunk stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraversalState {
    ReadingHeader,
    ReadingChunk,
    Terminal,
}

/// One decoded chunk together with its header and starting offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CafChunk {
    /// Byte offset of the chunk header within the stream.
    pub offset: u64,
    pub header: ChunkHeader,
    pub record: CafRecord,
}

/// Pull-based reader over a chunked container.
///
/// # Example
///
/// ```rust
/// use oggcaf::process::caf::CafReader;
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(b"caff");
/// bytes.extend_from_slice(&1u16.to_be_bytes());
/// bytes.extend_from_slice(&0u16.to_be_bytes());
/// bytes.extend_from_slice(b"free");
/// bytes.extend_from_slice(&4i64.to_be_bytes());
/// bytes.extend_from_slice(&[0u8; 4]);
/// bytes.extend_from_slice(b"data");
/// bytes.extend_from_slice(&0i64.to_be_bytes());
///
/// let mut reader = CafReader::new(bytes.as_slice());
/// let header = reader.read_file_header()?.clone();
/// assert_eq!(&header.file_type.0, b"caff");
///
/// for chunk in reader {
///     let chunk = chunk?;
///     println!("{} ({} bytes)", chunk.header.chunk_type, chunk.header.chunk_size);
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct CafReader<R: io::Read> {
    reader: ByteStreamReader<R>,
    state: TraversalState,
    file_header: Option<FileHeader>,
}

impl<R> CafReader<R>
where
    R: io::Read,
{
    pub fn new(read: R) -> Self {
        Self {
            reader: ByteStreamReader::new(read),
            state: TraversalState::ReadingHeader,
            file_header: None,
        }
    }

    /// Consumes the fixed 8-byte file header and enters the chunk loop.
    ///
    /// Called implicitly by the iterator if the driver has not done so;
    /// repeated calls return the cached header.
    pub fn read_file_header(&mut self) -> Result<&FileHeader> {
        if self.file_header.is_none() {
            let bytes = self.reader.read_array::<8>()?;
            self.file_header = Some(FileHeader::read(&bytes)?);
            self.state = TraversalState::ReadingChunk;
        }

        Ok(self.file_header.as_ref().unwrap())
    }

    pub fn file_header(&self) -> Option<&FileHeader> {
        self.file_header.as_ref()
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    fn next_chunk(&mut self) -> Result<Option<CafChunk>> {
        if self.state == TraversalState::ReadingHeader {
            self.read_file_header()?;
        }

        let offset = self.reader.position();
        let header = ChunkHeader::read(&self.reader.read_array::<12>()?)?;

        // The terminal sentinel consumes no further bytes.
        if header.is_terminal() {
            self.state = TraversalState::Terminal;
            return Ok(None);
        }

        let body = self.reader.read_vec(header.chunk_size as usize)?;
        let record = CafRecord::decode(header.chunk_type, body)?;

        if let CafRecord::Unknown { chunk_type, body } = &record {
            debug!("Skipping unknown chunk '{chunk_type}' ({} bytes)", body.len());
        }

        Ok(Some(CafChunk {
            offset,
            header,
            record,
        }))
    }
}

impl<R> Iterator for CafReader<R>
where
    R: io::Read,
{
    type Item = Result<CafChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == TraversalState::Terminal {
            return None;
        }

        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                // Fatal: partial chunks are never reported.
                self.state = TraversalState::Terminal;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::caf::FourCc;
    use crate::utils::errors::DecodeError;

    fn file_header_bytes() -> Vec<u8> {
        let mut bytes = b"caff".to_vec();
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes
    }

    fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut bytes = tag.to_vec();
        bytes.extend_from_slice(&(body.len() as i64).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    fn desc_body() -> Vec<u8> {
        let mut body = 44100f64.to_be_bytes().to_vec();
        body.extend_from_slice(b"opus");
        for field in [0u32, 0, 960, 2, 0] {
            body.extend_from_slice(&field.to_be_bytes());
        }
        body
    }

    #[test]
    fn single_desc_chunk_then_terminal() {
        let mut stream = file_header_bytes();
        stream.extend_from_slice(&chunk(b"desc", &desc_body()));
        stream.extend_from_slice(&chunk(b"data", &[])); // zero size: terminal
        stream.extend_from_slice(&[0xEE; 8]); // must never be consumed

        let mut reader = CafReader::new(stream.as_slice());
        let header = reader.read_file_header().unwrap();
        assert_eq!(header.file_type, FourCc(*b"caff"));
        assert_eq!(header.file_version, 1);
        assert_eq!(header.file_flags, 0);

        let chunks = reader
            .by_ref()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0].record, CafRecord::AudioFormat(_)));
        assert_eq!(chunks[0].offset, 8);

        // Terminal header is 8 (file header) + 12 + 32 + 12 bytes in.
        assert_eq!(reader.position(), 64);
        assert!(reader.next().is_none());
    }

    #[test]
    fn iterator_reads_file_header_implicitly() {
        let mut stream = file_header_bytes();
        stream.extend_from_slice(&chunk(b"data", &0i64.to_be_bytes()[4..]));
        stream.extend_from_slice(&chunk(b"free", &[]));

        let mut reader = CafReader::new(stream.as_slice());
        let first = reader.next().unwrap().unwrap();
        assert!(matches!(first.record, CafRecord::Data(_)));
        assert_eq!(reader.file_header().unwrap().file_type, FourCc(*b"caff"));
    }

    #[test]
    fn unknown_chunks_are_consumed_not_errors() {
        let mut stream = file_header_bytes();
        stream.extend_from_slice(&chunk(b"info", &[1, 2, 3]));
        stream.extend_from_slice(&chunk(b"desc", &desc_body()));
        stream.extend_from_slice(&chunk(b"pakt", &{
            let mut body = vec![0u8; 24];
            body[7] = 1; // one packet
            body.push(0x82);
            body.push(0x2C);
            body
        }));

        let mut reader = CafReader::new(stream.as_slice());
        let unknown = reader.next().unwrap().unwrap();
        assert_eq!(
            unknown.record,
            CafRecord::Unknown {
                chunk_type: FourCc(*b"info"),
                body: vec![1, 2, 3],
            }
        );

        let desc = reader.next().unwrap().unwrap();
        assert!(matches!(desc.record, CafRecord::AudioFormat(_)));
        // 8-byte file header + 12-byte header + 3-byte unknown body.
        assert_eq!(desc.offset, 23);

        let pakt = reader.next().unwrap().unwrap();
        let CafRecord::PacketTable(table) = pakt.record else {
            panic!("expected packet table");
        };
        assert_eq!(table.packet_sizes, vec![300]);
    }

    #[test]
    fn eof_mid_chunk_is_fatal() {
        let mut stream = file_header_bytes();
        stream.extend_from_slice(b"data");
        stream.extend_from_slice(&100i64.to_be_bytes());
        stream.extend_from_slice(&[0u8; 10]); // 90 bytes short

        let mut reader = CafReader::new(stream.as_slice());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::UnexpectedEndOfStream { needed: 100, .. })
        ));

        // Fatal errors end iteration.
        assert!(reader.next().is_none());
    }

    #[test]
    fn eof_mid_file_header_is_fatal() {
        let mut reader = CafReader::new(&b"caf"[..]);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::UnexpectedEndOfStream { needed: 8, .. })
        ));
    }
}
