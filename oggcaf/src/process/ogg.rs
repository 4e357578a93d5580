//! Paged-container scanning engine.
//!
//! Byte-synchronizes on the page capture pattern, then reads the page
//! header, lacing table and segment payloads, verifying the trailing
//! checksum against the page's own raw bytes. The scanner has no
//! intrinsic stop condition: the driver decides when to stop, and a
//! clean end of stream between pages ends iteration normally.

use std::io;

use anyhow::{Result, bail};
use log::{debug, trace};

use crate::structs::ogg::{CAPTURE_PATTERN, Page, PageHeader};
use crate::structs::opus::{OpusComments, OpusIdentification};
use crate::utils::bytes::{uint32_le, uint64_le};
use crate::utils::bytestream_io::ByteStreamReader;
use crate::utils::crc::{CRC_PAGE_ALG, Crc32};
use crate::utils::errors::DecodeError;

/// Scanner position within the page framing.
///
/// `Seeking` discards bytes until the capture pattern; end of stream is
/// fatal in every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Seeking,
    ReadingHeader,
    ReadingLacing,
    ReadingSegments,
    Done,
}

/// Raw-byte accumulation for exactly one page.
///
/// Created empty when synchronization succeeds, consumed for checksum
/// verification, and dropped with the page report. A new page never
/// sees a previous page's bytes.
#[derive(Debug, Default)]
struct PageContext {
    raw: Vec<u8>,
}

/// Pull-based scanner over a paged byte stream.
///
/// # Example
///
/// ```rust,no_run
/// use oggcaf::process::ogg::PageScanner;
///
/// let data = std::fs::read("stream.opus")?;
/// for page in PageScanner::new(data.as_slice()) {
///     let page = page?;
///     println!(
///         "page {} ({} segments, checksum ok: {})",
///         page.header.page_sequence_number,
///         page.segments.len(),
///         page.checksum_passed,
///     );
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct PageScanner<R: io::Read> {
    reader: ByteStreamReader<R>,
    state: ScanState,
    crc: Crc32,
    pages_read: u64,
    bytes_skipped: u64,
}

impl<R> PageScanner<R>
where
    R: io::Read,
{
    pub fn new(read: R) -> Self {
        Self {
            reader: ByteStreamReader::new(read),
            state: ScanState::Seeking,
            crc: Crc32::new(&CRC_PAGE_ALG),
            pages_read: 0,
            bytes_skipped: 0,
        }
    }

    /// Pages reported so far.
    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Garbage bytes discarded while resynchronizing.
    pub fn bytes_skipped(&self) -> u64 {
        self.bytes_skipped
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Scans forward until the last four bytes read equal the capture
    /// pattern. Skipped bytes are discarded silently; a clean end of
    /// stream here means no further pages.
    fn seek_capture_pattern(&mut self) -> Result<bool> {
        self.state = ScanState::Seeking;

        let start = self.reader.position();
        let mut window = [0u8; 4];
        let mut filled = 0usize;

        loop {
            let Some(byte) = self.reader.try_read_u8()? else {
                self.state = ScanState::Done;
                self.bytes_skipped += self.reader.position() - start;
                return Ok(false);
            };

            window.rotate_left(1);
            window[3] = byte;
            filled += 1;

            if filled >= 4 && window == CAPTURE_PATTERN {
                let skipped = self.reader.position() - start - 4;
                if skipped > 0 {
                    trace!("Skipped {skipped} bytes before capture pattern");
                    self.bytes_skipped += skipped;
                }
                return Ok(true);
            }
        }
    }

    fn next_page(&mut self) -> Result<Option<Page>> {
        if !self.seek_capture_pattern()? {
            return Ok(None);
        }

        // Fresh per-page accumulation buffer, starting at the pattern.
        let mut ctx = PageContext::default();
        ctx.raw.extend_from_slice(&CAPTURE_PATTERN);

        self.state = ScanState::ReadingHeader;
        let fields = self.reader.read_array::<22>()?;
        ctx.raw.extend_from_slice(&fields);

        let page_checksum = uint32_le(&fields[18..22])?;

        // The checksum covers the raw bytes up to and including the
        // stored checksum field exactly as received. The field is not
        // zeroed first; see the module notes in structs::ogg.
        let computed_checksum = self.crc.checksum(&ctx.raw);
        let checksum_passed = computed_checksum == page_checksum;
        if !checksum_passed {
            debug!(
                "Page checksum mismatch at offset {}: computed {computed_checksum:#010X}, stored {page_checksum:#010X}",
                self.reader.position(),
            );
        }

        self.state = ScanState::ReadingLacing;
        let page_segments = self.reader.read_u8()?;
        ctx.raw.push(page_segments);

        let lacing_table = self.reader.read_vec(page_segments as usize)?;
        ctx.raw.extend_from_slice(&lacing_table);

        let header = PageHeader {
            structure_version: fields[0],
            header_type: fields[1],
            absolute_granule_position: uint64_le(&fields[2..10])?,
            stream_serial_number: uint32_le(&fields[10..14])?,
            page_sequence_number: uint32_le(&fields[14..18])?,
            page_checksum,
            page_segments,
        };

        self.state = ScanState::ReadingSegments;
        let mut segments = Vec::with_capacity(lacing_table.len());
        for &len in &lacing_table {
            let segment = self.reader.read_vec(len as usize)?;
            ctx.raw.extend_from_slice(&segment);
            segments.push(segment);
        }

        self.state = ScanState::Seeking;
        self.pages_read += 1;

        Ok(Some(Page {
            header,
            lacing_table,
            segments,
            computed_checksum,
            checksum_passed,
        }))
    }
}

impl<R> Iterator for PageScanner<R>
where
    R: io::Read,
{
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ScanState::Done {
            return None;
        }

        match self.next_page() {
            Ok(Some(page)) => Some(Ok(page)),
            Ok(None) => None,
            Err(e) => {
                self.state = ScanState::Done;
                Some(Err(e))
            }
        }
    }
}

/// Codec headers decoded from the first two pages of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusHeaders {
    pub identification: OpusIdentification,
    pub comments: OpusComments,
}

/// Reads the next two pages and decodes their first segments as the
/// identification and comment headers.
///
/// The pages themselves are discarded; only the header packets survive.
pub fn read_stream_headers<R: io::Read>(scanner: &mut PageScanner<R>) -> Result<OpusHeaders> {
    let identification = OpusIdentification::read(&first_segment(scanner)?)?;
    let comments = OpusComments::read(&first_segment(scanner)?)?;

    Ok(OpusHeaders {
        identification,
        comments,
    })
}

fn first_segment<R: io::Read>(scanner: &mut PageScanner<R>) -> Result<Vec<u8>> {
    let Some(page) = scanner.next().transpose()? else {
        bail!(DecodeError::UnexpectedEndOfStream {
            needed: 1,
            offset: PageScanner::position(scanner),
        });
    };

    let Some(segment) = page.segments.into_iter().next() else {
        bail!(DecodeError::TruncatedRecord {
            needed: 1,
            available: 0,
        });
    };

    Ok(segment)
}
