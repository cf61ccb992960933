//! Buffered pull-reader over the transport.
//!
//! IMAP responses interleave CRLF-terminated lines with length-prefixed
//! literals, so the reader exposes peeking, conditional skips and
//! delimiter scans on top of an append-only buffer. Any operation may
//! block on the transport until enough bytes arrive.

use std::io;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Result;

/// Read chunk size for buffer refills.
const READ_CHUNK: usize = 8192;

/// Maximum buffered response size to prevent memory exhaustion.
const MAX_BUFFER_SIZE: usize = 100 * 1024 * 1024; // 100 MB

/// Buffered reader (and pass-through writer) over a byte stream.
///
/// Returned slices are owned copies, so buffer compaction never
/// invalidates data handed to the caller.
pub struct ByteStream<S> {
    inner: S,
    buf: BytesMut,
    /// Total bytes consumed since construction, for error positions.
    offset: usize,
}

impl<S> ByteStream<S> {
    /// Wraps a transport stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK),
            offset: 0,
        }
    }

    /// Returns the total number of bytes consumed so far.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the inner stream, discarding buffered data.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn consume(&mut self, n: usize) -> Vec<u8> {
        let data = self.buf.split_to(n).to_vec();
        self.offset += n;
        data
    }
}

impl<S> ByteStream<S>
where
    S: AsyncRead + Unpin,
{
    /// Reads more bytes from the transport into the buffer.
    ///
    /// Returns the number of bytes read; zero means EOF.
    async fn fill(&mut self) -> Result<usize> {
        if self.buf.len() >= MAX_BUFFER_SIZE {
            return Err(crate::Error::Protocol("response too large".to_string()));
        }
        self.buf.reserve(READ_CHUNK);
        let n = self.inner.read_buf(&mut self.buf).await?;
        Ok(n)
    }

    /// Fills the buffer until it holds at least `n` bytes.
    async fn fill_at_least(&mut self, n: usize) -> Result<()> {
        while self.buf.len() < n {
            if self.fill().await? == 0 {
                return Err(crate::Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed mid-response",
                )));
            }
        }
        Ok(())
    }

    /// Returns the first `n` bytes without consuming them.
    ///
    /// # Errors
    ///
    /// Fails if the transport closes before `n` bytes are available.
    pub async fn peek(&mut self, n: usize) -> Result<Vec<u8>> {
        self.fill_at_least(n).await?;
        Ok(self.buf[..n].to_vec())
    }

    /// Returns up to `n` bytes without consuming them.
    ///
    /// A short result at EOF is not an error.
    pub async fn peek_up_to(&mut self, n: usize) -> Result<Vec<u8>> {
        while self.buf.len() < n {
            if self.fill().await? == 0 {
                break;
            }
        }
        let len = n.min(self.buf.len());
        Ok(self.buf[..len].to_vec())
    }

    /// Probes for EOF without consuming anything.
    pub async fn is_empty(&mut self) -> Result<bool> {
        if !self.buf.is_empty() {
            return Ok(false);
        }
        Ok(self.fill().await? == 0)
    }

    /// Returns true if the buffered stream starts with `prefix`.
    pub async fn starts_with(&mut self, prefix: &[u8]) -> Result<bool> {
        let head = self.peek(prefix.len()).await?;
        Ok(head == prefix)
    }

    /// Consumes exactly `n` bytes.
    pub async fn skip(&mut self, n: usize) -> Result<()> {
        self.fill_at_least(n).await?;
        self.buf.advance(n);
        self.offset += n;
        Ok(())
    }

    /// Consumes `seq` if the stream starts with it.
    ///
    /// Returns whether the match was consumed.
    pub async fn skip_bytes(&mut self, seq: &[u8]) -> Result<bool> {
        if self.starts_with(seq).await? {
            self.buf.advance(seq.len());
            self.offset += seq.len();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes a single byte if it matches `b`.
    ///
    /// Returns whether the match was consumed.
    pub async fn skip_byte(&mut self, b: u8) -> Result<bool> {
        self.skip_bytes(&[b]).await
    }

    /// Reads exactly `n` bytes (literal payloads).
    pub async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        self.fill_at_least(n).await?;
        Ok(self.consume(n))
    }

    /// Returns the bytes preceding the first occurrence of `delim`,
    /// consuming them but leaving the delimiter in place.
    pub async fn read_until(&mut self, delim: &[u8]) -> Result<Vec<u8>> {
        loop {
            if let Some(idx) = find(&self.buf, delim) {
                return Ok(self.consume(idx));
            }
            if self.fill().await? == 0 {
                return Err(crate::Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before delimiter",
                )));
            }
        }
    }

    /// Like [`read_until`](Self::read_until), but also consumes the
    /// delimiter.
    pub async fn read_until_and_skip(&mut self, delim: &[u8]) -> Result<Vec<u8>> {
        let data = self.read_until(delim).await?;
        self.buf.advance(delim.len());
        self.offset += delim.len();
        Ok(data)
    }

    /// Greedily reads bytes while `pred` holds.
    ///
    /// Stops at the first non-matching byte or at EOF.
    pub async fn read_while<F>(&mut self, pred: F) -> Result<Vec<u8>>
    where
        F: Fn(u8) -> bool,
    {
        let mut scanned = 0;
        loop {
            if let Some(rel) = self.buf[scanned..].iter().position(|&b| !pred(b)) {
                return Ok(self.consume(scanned + rel));
            }
            scanned = self.buf.len();
            if self.fill().await? == 0 {
                return Ok(self.consume(scanned));
            }
        }
    }
}

impl<S> ByteStream<S>
where
    S: AsyncWrite + Unpin,
{
    /// Writes all bytes to the transport.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).await?;
        Ok(())
    }

    /// Flushes the transport.
    pub async fn flush(&mut self) -> Result<()> {
        self.inner.flush().await?;
        Ok(())
    }
}

/// Finds the position of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() == 1 {
        return haystack.iter().position(|&b| b == needle[0]);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
