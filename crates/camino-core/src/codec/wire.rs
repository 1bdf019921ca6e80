//! Big-endian binary reader/writer shared by every wire type.

use crate::{Error, Result};

/// Append-only big-endian byte writer.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Write one byte
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Write a big-endian `u16`
    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a big-endian `u32`
    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a big-endian `u64`
    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a bool as a single byte
    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    /// Write raw bytes with no prefix
    pub fn put_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Write a `u32` length prefix followed by the bytes
    pub fn put_blob(&mut self, b: &[u8]) {
        self.put_len(b.len());
        self.buf.extend_from_slice(b);
    }

    /// Write a `u16` length prefix followed by UTF-8 bytes
    pub fn put_str(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len())
            .map_err(|_| Error::InvalidTransaction(format!("string of {} bytes exceeds u16 prefix", s.len())))?;
        self.put_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Write a list count (`u32`)
    pub fn put_len(&mut self, len: usize) {
        // Lists are bounded far below u32::MAX by every caller.
        self.put_u32(len as u32);
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked big-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    b: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at offset 0
    pub fn new(b: &'a [u8]) -> Self {
        Self { b, off: 0 }
    }

    /// Start reading at an arbitrary offset
    pub fn at(b: &'a [u8], off: usize) -> Result<Self> {
        if off > b.len() {
            return Err(Error::Decode(format!(
                "offset {} beyond buffer of {} bytes",
                off,
                b.len()
            )));
        }
        Ok(Self { b, off })
    }

    /// Current offset
    pub fn offset(&self) -> usize {
        self.off
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.b.len() - self.off
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Decode(format!(
                "unexpected end of buffer reading {} at offset {} (need {}, have {})",
                what,
                self.off,
                n,
                self.remaining()
            )));
        }
        let v = &self.b[self.off..self.off + n];
        self.off += n;
        Ok(v)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    /// Read a big-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    /// Read a big-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    /// Read a big-endian `u64`
    /// Next `u32` without consuming it
    pub fn peek_u32(&self) -> Result<u32> {
        self.clone().read_u32()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array::<8>()?))
    }

    /// Read a strict 0/1 bool
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Decode(format!("invalid bool byte {other}"))),
        }
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, "fixed bytes")?);
        Ok(out)
    }

    /// Read `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n, "bytes")
    }

    /// Read a `u32` length-prefixed byte blob
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len, "blob")?.to_vec())
    }

    /// Read a `u16` length-prefixed UTF-8 string
    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len, "string")?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Decode(format!("invalid UTF-8 string: {e}")))
    }

    /// Read a list count, rejecting counts that cannot fit in the buffer
    /// given each element occupies at least `min_item_size` bytes.
    pub fn read_len(&mut self, min_item_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(min_item_size.max(1)) > self.remaining() {
            return Err(Error::Decode(format!(
                "list of {} items cannot fit in {} remaining bytes",
                count,
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// Fail if any bytes remain
    pub fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(Error::Decode(format!(
                "trailing {} bytes after offset {}",
                self.remaining(),
                self.off
            )));
        }
        Ok(())
    }
}

/// Context-free binary serialization.
///
/// Types whose decoding depends on a type registry implement their own
/// `read(reg, r)` instead.
pub trait Wire: Sized {
    /// Append the canonical bytes
    fn write(&self, w: &mut Writer);

    /// Parse from the reader's current position
    fn read(r: &mut Reader<'_>) -> Result<Self>;

    /// Canonical bytes
    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    /// Parse a buffer holding exactly one value
    fn from_bytes(b: &[u8]) -> Result<Self> {
        let mut r = Reader::new(b);
        let v = Self::read(&mut r)?;
        r.finish()?;
        Ok(v)
    }

    /// Parse starting at `offset`, returning the value and the new offset
    fn from_bytes_at(b: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::at(b, offset)?;
        let v = Self::read(&mut r)?;
        Ok((v, r.offset()))
    }
}
