// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte sources and primitive reads for the object record stream.
//!
//! Every multi-byte integer in the stream is little-endian. Names are NUL-terminated and string
//! constants are fixed-width blobs. The record decoder only talks to a [`ByteSource`], so the same
//! logic runs over an in-memory slice ([`Reader`]) or, with the `std` feature, a buffered
//! [`std::io::BufRead`] ([`IoSource`]).

use alloc::vec::Vec;
use core::fmt;

/// A byte-level read failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadError {
    /// Input ended in the middle of a field.
    UnexpectedEof,
    /// The underlying reader failed.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            #[cfg(feature = "std")]
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

impl core::error::Error for ReadError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            kind => Self::Io(kind),
        }
    }
}

/// A sequential source of stream bytes.
///
/// Reads are blocking and strictly forward; nothing is ever pushed back.
pub trait ByteSource {
    /// Returns the number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Returns `true` if no bytes remain.
    ///
    /// Used to tell a clean end of stream (at a record boundary) from a truncated record.
    fn at_end(&mut self) -> Result<bool, ReadError>;

    /// Reads one byte.
    fn read_u8(&mut self) -> Result<u8, ReadError>;

    /// Fills `buf` completely.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError>;

    /// Reads through the next NUL byte, appending everything before it to `out`.
    ///
    /// The terminator is consumed but not stored.
    fn read_cstr(&mut self, out: &mut Vec<u8>) -> Result<(), ReadError>;

    /// Reads a little-endian `u16`.
    fn read_u16_le(&mut self) -> Result<u16, ReadError> {
        let mut b = [0; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    /// Reads a little-endian `u32`.
    fn read_u32_le(&mut self) -> Result<u32, ReadError> {
        let mut b = [0; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_le_bytes(b))
    }

    /// Reads a little-endian `u64`.
    fn read_u64_le(&mut self) -> Result<u64, ReadError> {
        let mut b = [0; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn position(&self) -> u64 {
        (**self).position()
    }

    fn at_end(&mut self) -> Result<bool, ReadError> {
        (**self).at_end()
    }

    fn read_u8(&mut self) -> Result<u8, ReadError> {
        (**self).read_u8()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        (**self).read_exact(buf)
    }

    fn read_cstr(&mut self, out: &mut Vec<u8>) -> Result<(), ReadError> {
        (**self).read_cstr(out)
    }
}

/// A simple byte reader with bounds checks.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Returns the current cursor offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes.get(self.offset..).unwrap_or_default()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(ReadError::UnexpectedEof)?;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(ReadError::UnexpectedEof)?;
        self.offset = end;
        Ok(slice)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        self.take(len)
    }
}

impl ByteSource for Reader<'_> {
    fn position(&self) -> u64 {
        self.offset as u64
    }

    fn at_end(&mut self) -> Result<bool, ReadError> {
        Ok(self.offset >= self.bytes.len())
    }

    fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        buf.copy_from_slice(self.take(buf.len())?);
        Ok(())
    }

    fn read_cstr(&mut self, out: &mut Vec<u8>) -> Result<(), ReadError> {
        let rest = self.remaining();
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            // Consume the tail so the position reflects how far the read got.
            self.offset = self.bytes.len();
            out.extend_from_slice(rest);
            return Err(ReadError::UnexpectedEof);
        };
        out.extend_from_slice(&rest[..nul]);
        self.offset += nul + 1;
        Ok(())
    }
}

/// A [`ByteSource`] over a buffered standard reader.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    position: u64,
}

#[cfg(feature = "std")]
impl<R: std::io::BufRead> IoSource<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::BufRead> ByteSource for IoSource<R> {
    fn position(&self) -> u64 {
        self.position
    }

    fn at_end(&mut self) -> Result<bool, ReadError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_u8(&mut self) -> Result<u8, ReadError> {
        let mut b = [0; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        std::io::Read::read_exact(&mut self.inner, buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn read_cstr(&mut self, out: &mut Vec<u8>) -> Result<(), ReadError> {
        let start = out.len();
        let n = self.inner.read_until(0, out)?;
        self.position += n as u64;
        if out.len() == start || out.last() != Some(&0) {
            return Err(ReadError::UnexpectedEof);
        }
        out.pop();
        Ok(())
    }
}

/// A simple byte writer.
///
/// Used to assemble stream fixtures; the crate does not re-encode decoded records.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Returns a reference to the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the writer and returns the underlying byte buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Appends a `u8`.
    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    /// Appends a little-endian `u16`.
    pub fn write_u16_le(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends a little-endian `u32`.
    pub fn write_u32_le(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends a little-endian `u64`.
    pub fn write_u64_le(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    /// Appends `s` followed by a NUL terminator.
    pub fn write_cstr(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
    }
}
