//! Opus codec header packets carried in the first two pages of a stream.
//!
//! Only the identification and comment packets are decoded; audio
//! packets stay opaque.

use anyhow::{Result, bail};

use crate::utils::bytes::{text, uint16_le, uint32_le};
use crate::utils::errors::DecodeError;

/// Magic prefix of the identification header packet.
pub const IDENTIFICATION_MAGIC: [u8; 8] = *b"OpusHead";

/// Magic prefix of the comment header packet.
pub const COMMENT_MAGIC: [u8; 8] = *b"OpusTags";

/// Fixed identification header length without the mapping extension.
const IDENTIFICATION_FIXED_LEN: usize = 19;

/// Channel mapping extension, present only when the identification
/// payload is longer than the fixed 19 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMapping {
    pub stream_count: u8,
    pub coupled_count: u8,
    /// One entry per output channel.
    pub mapping: Vec<u8>,
}

/// Identification header from the first logical packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusIdentification {
    pub version: u8,
    pub channel_count: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: u16,
    pub mapping_family: u8,
    pub channel_mapping: Option<ChannelMapping>,
}

impl OpusIdentification {
    pub fn read(payload: &[u8]) -> Result<Self> {
        // Magic is checked before anything else; a short or mismatched
        // prefix is a signature failure regardless of the remainder.
        if payload.len() < 8 || payload[0..8] != IDENTIFICATION_MAGIC {
            bail!(DecodeError::InvalidMagicSignature {
                expected: &IDENTIFICATION_MAGIC,
            });
        }

        if payload.len() < IDENTIFICATION_FIXED_LEN {
            bail!(DecodeError::TruncatedRecord {
                needed: IDENTIFICATION_FIXED_LEN,
                available: payload.len(),
            });
        }

        let channel_count = payload[9];

        let channel_mapping = if payload.len() > IDENTIFICATION_FIXED_LEN {
            let needed = IDENTIFICATION_FIXED_LEN + 2 + channel_count as usize;
            if payload.len() < needed {
                bail!(DecodeError::TruncatedRecord {
                    needed,
                    available: payload.len(),
                });
            }

            Some(ChannelMapping {
                stream_count: payload[19],
                coupled_count: payload[20],
                mapping: payload[21..needed].to_vec(),
            })
        } else {
            None
        };

        Ok(Self {
            version: payload[8],
            channel_count,
            pre_skip: uint16_le(&payload[10..12])?,
            input_sample_rate: uint32_le(&payload[12..16])?,
            output_gain: uint16_le(&payload[16..18])?,
            mapping_family: payload[18],
            channel_mapping,
        })
    }
}

/// Comment header from the second logical packet: a vendor string and a
/// list of user comments, all length-prefixed little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusComments {
    pub vendor: String,
    pub user_comments: Vec<String>,
}

impl OpusComments {
    pub fn read(payload: &[u8]) -> Result<Self> {
        if payload.len() < 8 || payload[0..8] != COMMENT_MAGIC {
            bail!(DecodeError::InvalidMagicSignature {
                expected: &COMMENT_MAGIC,
            });
        }

        let mut cursor = Cursor {
            payload,
            offset: 8,
        };

        let vendor_len = cursor.read_u32_le()? as usize;
        let vendor = text(cursor.read_bytes(vendor_len)?);

        // The value after the vendor string is a cumulative byte budget
        // for the comment list, not an entry count.
        let comment_budget = cursor.read_u32_le()? as usize;
        let list_start = cursor.offset;

        let mut user_comments = Vec::new();
        while cursor.offset - list_start < comment_budget {
            let len = cursor.read_u32_le()? as usize;
            user_comments.push(text(cursor.read_bytes(len)?));
        }

        Ok(Self {
            vendor,
            user_comments,
        })
    }
}

struct Cursor<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(n).unwrap_or(usize::MAX);
        if end > self.payload.len() {
            bail!(DecodeError::TruncatedRecord {
                needed: end,
                available: self.payload.len(),
            });
        }

        let bytes = &self.payload[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(uint32_le(self.read_bytes(4)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identification_payload(extra: &[u8]) -> Vec<u8> {
        let mut payload = IDENTIFICATION_MAGIC.to_vec();
        payload.push(1); // version
        payload.push(2); // channel count
        payload.extend_from_slice(&312u16.to_le_bytes()); // pre-skip
        payload.extend_from_slice(&48000u32.to_le_bytes()); // input rate
        payload.extend_from_slice(&0u16.to_le_bytes()); // output gain
        payload.push(0); // mapping family
        payload.extend_from_slice(extra);
        payload
    }

    #[test]
    fn identification_without_mapping_extension() {
        let id = OpusIdentification::read(&identification_payload(&[])).unwrap();
        assert_eq!(id.version, 1);
        assert_eq!(id.channel_count, 2);
        assert_eq!(id.pre_skip, 312);
        assert_eq!(id.input_sample_rate, 48000);
        assert_eq!(id.mapping_family, 0);
        assert_eq!(id.channel_mapping, None);
    }

    #[test]
    fn identification_with_mapping_extension() {
        // 19 fixed bytes + stream/coupled counts + one entry per channel.
        let id = OpusIdentification::read(&identification_payload(&[2, 1, 0, 1])).unwrap();
        let mapping = id.channel_mapping.unwrap();
        assert_eq!(mapping.stream_count, 2);
        assert_eq!(mapping.coupled_count, 1);
        assert_eq!(mapping.mapping, vec![0, 1]);
    }

    #[test]
    fn identification_rejects_bad_magic() {
        let mut payload = identification_payload(&[]);
        payload[0..8].copy_from_slice(b"OpusHeat");

        let err = OpusIdentification::read(&payload).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DecodeError>(),
            Some(&DecodeError::InvalidMagicSignature {
                expected: &IDENTIFICATION_MAGIC,
            })
        );

        // Too short to even hold the magic.
        let err = OpusIdentification::read(b"Opus").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::InvalidMagicSignature { .. })
        ));
    }

    #[test]
    fn identification_truncated_mapping() {
        // Extension introduced but mapping table short of channel_count.
        let err = OpusIdentification::read(&identification_payload(&[2, 1, 0])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DecodeError>(),
            Some(&DecodeError::TruncatedRecord {
                needed: 23,
                available: 22
            })
        );
    }

    fn comment_payload(vendor: &str, comments: &[&str]) -> Vec<u8> {
        let mut payload = COMMENT_MAGIC.to_vec();
        payload.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        payload.extend_from_slice(vendor.as_bytes());

        let budget: usize = comments.iter().map(|c| 4 + c.len()).sum();
        payload.extend_from_slice(&(budget as u32).to_le_bytes());
        for comment in comments {
            payload.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            payload.extend_from_slice(comment.as_bytes());
        }
        payload
    }

    #[test]
    fn comments_vendor_only() {
        let payload = comment_payload("acme1", &[]);
        // Magic + length prefix + vendor + budget field.
        assert_eq!(payload.len(), 12 + 5 + 4);

        let comments = OpusComments::read(&payload).unwrap();
        assert_eq!(comments.vendor, "acme1");
        assert!(comments.user_comments.is_empty());
    }

    #[test]
    fn comments_budget_bounds_the_list() {
        let payload = comment_payload("enc", &["TITLE=a", "ARTIST=bc"]);
        let comments = OpusComments::read(&payload).unwrap();
        assert_eq!(comments.user_comments, vec!["TITLE=a", "ARTIST=bc"]);

        // Bytes past the declared budget are not consumed as comments.
        let mut padded = payload.clone();
        padded.extend_from_slice(&[0xDE, 0xAD]);
        let comments = OpusComments::read(&padded).unwrap();
        assert_eq!(comments.user_comments.len(), 2);
    }

    #[test]
    fn comments_length_past_payload_end() {
        let mut payload = COMMENT_MAGIC.to_vec();
        payload.extend_from_slice(&100u32.to_le_bytes());
        payload.extend_from_slice(b"short");

        let err = OpusComments::read(&payload).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::TruncatedRecord { .. })
        ));
    }
}
