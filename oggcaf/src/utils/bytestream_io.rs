//! Byte-stream reading for container parsing.
//!
//! Wraps any [`io::Read`] source behind an exactly-n pull interface: each
//! request either yields the full byte count or fails with
//! [`DecodeError::UnexpectedEndOfStream`]. The engines never read ahead of
//! the field or record they are currently decoding.

use std::io;

use crate::utils::errors::DecodeError;

#[derive(Debug)]
pub struct ByteStreamReader<R: io::Read> {
    inner: R,
    position: u64,
}

pub type ByteSliceReader<'a> = ByteStreamReader<io::Cursor<&'a [u8]>>;

impl<R> ByteStreamReader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Byte offset of the next unread byte from the start of the stream.
    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads exactly `N` bytes into a fixed array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `n` bytes into a freshly allocated buffer.
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads one byte, or `None` on a clean end of stream.
    ///
    /// The page scanner uses this while seeking so that running out of
    /// input between pages terminates iteration instead of erroring.
    pub fn try_read_u8(&mut self) -> Result<Option<u8>, DecodeError> {
        let mut buf = [0u8; 1];
        let mut read = 0;

        while read < 1 {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => read += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    return Err(DecodeError::UnexpectedEndOfStream {
                        needed: 1,
                        offset: self.position,
                    });
                }
            }
        }

        self.position += 1;
        Ok(Some(buf[0]))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let needed = buf.len();
        let mut read = 0;

        while read < needed {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => {
                    return Err(DecodeError::UnexpectedEndOfStream {
                        needed,
                        offset: self.position,
                    });
                }
                Ok(n) => read += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    return Err(DecodeError::UnexpectedEndOfStream {
                        needed,
                        offset: self.position,
                    });
                }
            }
        }

        self.position += needed as u64;
        Ok(())
    }
}

impl<'a> ByteSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::new(io::Cursor::new(buf))
    }
}

impl Default for ByteSliceReader<'_> {
    fn default() -> Self {
        Self::from_slice(&[])
    }
}
