/// Structural decode failures shared by both container pipelines.
///
/// Every variant is unrecoverable for the current parsing run and
/// propagates to the caller. Checksum mismatches in Ogg pages are not
/// errors; they are reported on the page itself.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid field length: expected {expected} bytes, got {actual}")]
    InvalidFieldLength { expected: usize, actual: usize },

    #[error("Invalid magic signature: expected {:?}", String::from_utf8_lossy(.expected.as_slice()))]
    InvalidMagicSignature { expected: &'static [u8; 8] },

    #[error("Truncated record: need {needed} bytes, only {available} available")]
    TruncatedRecord { needed: usize, available: usize },

    #[error("Unexpected end of stream while reading {needed} bytes at offset {offset}")]
    UnexpectedEndOfStream { needed: usize, offset: u64 },
}
