//! Paged-container (Ogg) format structures.
//!
//! ## Capture pattern
//!
//! Pages are located by scanning for the fixed 4-byte marker `OggS`; any
//! bytes before it are interleaved garbage and skipped silently.
//!
//! ## Checksum
//!
//! The page checksum recorded here is computed over the raw bytes from
//! the start of the capture pattern through the stored checksum field
//! *as received* — the field is not zeroed first, which diverges from
//! RFC 3533 and systematically fails on compliant streams. The
//! computation is preserved on purpose; `checksum_passed` is data, not
//! an error.

/// Fixed 4-byte page capture pattern ("OggS").
pub const CAPTURE_PATTERN: [u8; 4] = *b"OggS";

const HEADER_TYPE_CONTINUED: u8 = 0x01;
const HEADER_TYPE_BOS: u8 = 0x02;
const HEADER_TYPE_EOS: u8 = 0x04;

/// Page header fields following the capture pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub structure_version: u8,
    pub header_type: u8,
    pub absolute_granule_position: u64,
    pub stream_serial_number: u32,
    pub page_sequence_number: u32,
    pub page_checksum: u32,
    pub page_segments: u8,
}

impl PageHeader {
    /// Bit 0 clear: the first segment starts a fresh logical packet.
    pub fn is_fresh_packet(&self) -> bool {
        self.header_type & HEADER_TYPE_CONTINUED == 0
    }

    pub fn is_beginning_of_stream(&self) -> bool {
        self.header_type & HEADER_TYPE_BOS != 0
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.header_type & HEADER_TYPE_EOS != 0
    }
}

/// One complete page: header, lacing table, and the segment payloads.
///
/// Pages are ephemeral; the scanner produces one per iteration step and
/// nothing retains it afterward except the first two pages' first
/// segments, which feed the codec header decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub header: PageHeader,
    pub lacing_table: Vec<u8>,
    pub segments: Vec<Vec<u8>>,
    pub computed_checksum: u32,
    pub checksum_passed: bool,
}

impl Page {
    /// Total payload bytes, equal to the lacing table sum.
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_type_bits() {
        let header = PageHeader {
            structure_version: 0,
            header_type: HEADER_TYPE_BOS,
            absolute_granule_position: 0,
            stream_serial_number: 1,
            page_sequence_number: 0,
            page_checksum: 0,
            page_segments: 0,
        };
        assert!(header.is_fresh_packet());
        assert!(header.is_beginning_of_stream());
        assert!(!header.is_end_of_stream());

        let continued = PageHeader {
            header_type: HEADER_TYPE_CONTINUED | HEADER_TYPE_EOS,
            ..header
        };
        assert!(!continued.is_fresh_packet());
        assert!(continued.is_end_of_stream());
    }
}
