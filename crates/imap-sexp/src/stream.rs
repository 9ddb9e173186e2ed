//! Buffered byte stream with one byte of lookahead.
//!
//! Wraps any [`BufRead`] and exposes the handful of primitives the grammar
//! readers need: peek, consume one byte, read an exact count, and scan up to
//! a delimiter with a length limit. The reader's own buffer provides the
//! lookahead, so nothing is ever read ahead beyond what `fill_buf` returns.

#![allow(clippy::missing_errors_doc)]

use std::io::{self, BufRead, Read};

use crate::Result;

/// Upper bound on the buffer reserved up front by `read_exact`.
const INITIAL_READ_CAPACITY: usize = 64 * 1024;

/// Buffered input stream used by the parser.
#[derive(Debug)]
pub struct ByteStream<R> {
    reader: R,
    pos: usize,
}

impl<R: BufRead> ByteStream<R> {
    /// Creates a new stream over the given reader.
    pub const fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Returns the number of bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Peeks at the next byte without consuming it.
    pub fn peek(&mut self) -> Result<u8> {
        let buf = self.reader.fill_buf()?;
        buf.first().copied().ok_or_else(|| unexpected_eof().into())
    }

    /// Consumes and returns the next byte.
    pub fn next_byte(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.reader.consume(1);
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `len` bytes.
    ///
    /// The buffer grows with the bytes actually received, not with `len`.
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(len.min(INITIAL_READ_CAPACITY));
        let limit = u64::try_from(len).unwrap_or(u64::MAX);
        (&mut self.reader).take(limit).read_to_end(&mut data)?;
        self.pos += data.len();

        if data.len() < len {
            return Err(unexpected_eof().into());
        }
        Ok(data)
    }

    /// Consumes bytes up to and including `delim`.
    ///
    /// Returns the bytes read, delimiter included. If `limit` bytes are
    /// scanned without finding the delimiter, returns `Ok(None)`; those bytes
    /// stay consumed.
    pub fn read_until(&mut self, delim: u8, limit: Option<usize>) -> Result<Option<Vec<u8>>> {
        let mut out = Vec::new();

        loop {
            let allowed = limit.map_or(usize::MAX, |limit| limit - out.len());
            if allowed == 0 {
                return Ok(None);
            }

            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Err(unexpected_eof().into());
            }

            let window = &buf[..buf.len().min(allowed)];
            let (taken, found) = match window.iter().position(|&b| b == delim) {
                Some(i) => (i + 1, true),
                None => (window.len(), false),
            };
            out.extend_from_slice(&window[..taken]);
            self.reader.consume(taken);
            self.pos += taken;

            if found {
                return Ok(Some(out));
            }
        }
    }

    /// Gets a reference to the underlying reader.
    pub const fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gets a mutable reference to the underlying reader.
    ///
    /// Reading from it directly desynchronizes [`position`](Self::position).
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consumes the stream and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn unexpected_eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended")
}
