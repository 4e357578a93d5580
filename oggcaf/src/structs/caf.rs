//! Chunked-container (CAF) format structures.
//!
//! One struct per record kind, each constructed from exactly one chunk's
//! bytes and immutable afterward. Decoders are purely structural: field
//! values are surfaced as read, never range-checked. The declared chunk
//! size bounds every decoder; nothing here reads past it.

use std::fmt;

use anyhow::{Result, bail};

use crate::utils::bytes::{float64_be, int32_be, int64_be, uint16_be, uint32_be};
use crate::utils::errors::DecodeError;

/// A 4-character chunk or format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(tag: [u8; 4]) -> Self {
        Self(tag)
    }
}

/// Fixed 8-byte file header at the start of a chunked container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: FourCc,
    pub file_version: u16,
    pub file_flags: u16,
}

impl FileHeader {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 8 {
            bail!(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            file_type: FourCc(bytes[0..4].try_into()?),
            file_version: uint16_be(&bytes[4..6])?,
            file_flags: uint16_be(&bytes[6..8])?,
        })
    }
}

/// 12-byte chunk header: 4-character tag plus signed 64-bit body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_type: FourCc,
    pub chunk_size: i64,
}

impl ChunkHeader {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 12 {
            bail!(DecodeError::InvalidFieldLength {
                expected: 12,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            chunk_type: FourCc(bytes[0..4].try_into()?),
            chunk_size: int64_be(&bytes[4..12])?,
        })
    }

    /// A non-positive size is the terminal sentinel: zero, or the
    /// format's -1 "unknown size" value on a trailing chunk.
    pub fn is_terminal(&self) -> bool {
        self.chunk_size <= 0
    }
}

/// Known chunk kinds, dispatched by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    AudioFormat,
    ChannelLayout,
    Data,
    PacketTable,
    Unknown,
}

impl ChunkKind {
    pub fn from_tag(tag: FourCc) -> Self {
        match &tag.0 {
            b"desc" => Self::AudioFormat,
            b"chan" => Self::ChannelLayout,
            b"data" => Self::Data,
            b"pakt" => Self::PacketTable,
            _ => Self::Unknown,
        }
    }
}

/// Audio format description, fixed 32 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFormat {
    pub sample_rate: f64,
    pub format_id: FourCc,
    pub format_flags: u32,
    pub bytes_per_packet: u32,
    pub frames_per_packet: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
}

impl AudioFormat {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            bail!(DecodeError::InvalidFieldLength {
                expected: 32,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            sample_rate: float64_be(&bytes[0..8])?,
            format_id: FourCc(bytes[8..12].try_into()?),
            format_flags: uint32_be(&bytes[12..16])?,
            bytes_per_packet: uint32_be(&bytes[16..20])?,
            frames_per_packet: uint32_be(&bytes[20..24])?,
            channels_per_frame: uint32_be(&bytes[24..28])?,
            bits_per_channel: uint32_be(&bytes[28..32])?,
        })
    }
}

/// One channel position record, fixed 32 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescription {
    pub channel_label: u32,
    pub channel_flags: u32,
    pub coordinates: [f64; 3],
}

impl ChannelDescription {
    fn read(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            channel_label: uint32_be(&bytes[0..4])?,
            channel_flags: uint32_be(&bytes[4..8])?,
            coordinates: [
                float64_be(&bytes[8..16])?,
                float64_be(&bytes[16..24])?,
                float64_be(&bytes[24..32])?,
            ],
        })
    }
}

/// Channel layout: 12-byte header followed by `description_count`
/// contiguous 32-byte [`ChannelDescription`] records.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    pub channel_layout_tag: u32,
    pub channel_bitmap: u32,
    pub descriptions: Vec<ChannelDescription>,
}

impl ChannelLayout {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 {
            bail!(DecodeError::TruncatedRecord {
                needed: 12,
                available: bytes.len(),
            });
        }

        let channel_layout_tag = uint32_be(&bytes[0..4])?;
        let channel_bitmap = uint32_be(&bytes[4..8])?;
        let description_count = uint32_be(&bytes[8..12])? as usize;

        let needed = 12 + 32 * description_count;
        if bytes.len() < needed {
            bail!(DecodeError::TruncatedRecord {
                needed,
                available: bytes.len(),
            });
        }

        let descriptions = bytes[12..needed]
            .chunks_exact(32)
            .map(ChannelDescription::read)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            channel_layout_tag,
            channel_bitmap,
            descriptions,
        })
    }
}

/// Audio data chunk: edit count plus an opaque payload.
///
/// The payload is sample data the core does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    pub edit_count: u32,
    pub payload: Vec<u8>,
}

impl DataBlock {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            bail!(DecodeError::TruncatedRecord {
                needed: 4,
                available: bytes.len(),
            });
        }

        Ok(Self {
            edit_count: uint32_be(&bytes[0..4])?,
            payload: bytes[4..].to_vec(),
        })
    }
}

/// Fixed 24-byte packet table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTableHeader {
    pub number_packets: i64,
    pub number_valid_frames: i64,
    pub priming_frames: i32,
    pub remainder_frames: i32,
}

/// Packet table: fixed header plus per-packet sizes decoded from the
/// remaining chunk bytes as big-endian base-128 variable-length integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketTable {
    pub header: PacketTableHeader,
    pub packet_sizes: Vec<u64>,
}

impl PacketTable {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 24 {
            bail!(DecodeError::TruncatedRecord {
                needed: 24,
                available: bytes.len(),
            });
        }

        let header = PacketTableHeader {
            number_packets: int64_be(&bytes[0..8])?,
            number_valid_frames: int64_be(&bytes[8..16])?,
            priming_frames: int32_be(&bytes[16..20])?,
            remainder_frames: int32_be(&bytes[20..24])?,
        };

        Ok(Self {
            header,
            packet_sizes: decode_packet_sizes(&bytes[24..]),
        })
    }
}

/// Decodes a back-to-back sequence of big-endian base-128 integers.
///
/// Bit 7 of each byte marks continuation; a clear bit 7 completes the
/// value. A trailing value whose terminating byte never arrives is
/// dropped, not an error: the chunk boundary already cut it off.
pub fn decode_packet_sizes(bytes: &[u8]) -> Vec<u64> {
    let mut sizes = Vec::new();
    let mut acc = 0u64;

    for &byte in bytes {
        acc = (acc << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            sizes.push(acc);
            acc = 0;
        }
    }

    sizes
}

/// A decoded chunk body, tagged by kind.
///
/// Unrecognized tags are surfaced as [`CafRecord::Unknown`] with the body
/// consumed to preserve stream alignment; they are not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CafRecord {
    AudioFormat(AudioFormat),
    ChannelLayout(ChannelLayout),
    Data(DataBlock),
    PacketTable(PacketTable),
    Unknown { chunk_type: FourCc, body: Vec<u8> },
}

impl CafRecord {
    pub fn decode(chunk_type: FourCc, body: Vec<u8>) -> Result<Self> {
        Ok(match ChunkKind::from_tag(chunk_type) {
            ChunkKind::AudioFormat => Self::AudioFormat(AudioFormat::read(&body)?),
            ChunkKind::ChannelLayout => Self::ChannelLayout(ChannelLayout::read(&body)?),
            ChunkKind::Data => Self::Data(DataBlock::read(&body)?),
            ChunkKind::PacketTable => Self::PacketTable(PacketTable::read(&body)?),
            ChunkKind::Unknown => Self::Unknown { chunk_type, body },
        })
    }
}
