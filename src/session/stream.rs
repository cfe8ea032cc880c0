//! Line-oriented output stream with a non-blocking readiness check.

use std::fmt;
use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::io::{AsyncRead, ReadBuf};

/// Size of a single read from the underlying reader.
const READ_CHUNK_SIZE: usize = 4096;

/// Outcome of reading one line from an [`OutputStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A line of text without its terminator.
    Line(String),
    /// The writing end of the stream has been closed.
    EndOfStream,
}

/// One output channel (stdout or stderr) of a privileged session.
///
/// Bytes pulled from the reader are kept in an internal buffer, so polling
/// for readiness never loses data even when the waiting future is dropped.
pub struct OutputStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    buf: Vec<u8>,
    eof: bool,
    eof_reported: bool,
}

impl OutputStream {
    /// Wrap an async reader.
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            reader: Box::new(reader),
            buf: Vec::new(),
            eof: false,
            eof_reported: false,
        }
    }

    /// Whether anything can be read right now without waiting.
    ///
    /// Performs at most one non-blocking read on the underlying reader.
    /// A pending end-of-stream counts as available data, exactly once.
    pub fn is_ready(&mut self) -> io::Result<bool> {
        if !self.has_pending() {
            if let Some(res) = self.fill().now_or_never() {
                res?;
            }
        }
        Ok(self.has_pending())
    }

    /// Wait until [`is_ready`](Self::is_ready) would return true.
    ///
    /// Once end-of-stream has been reported this never resolves; callers
    /// bound it with a timeout. Cancel safe.
    pub async fn readable(&mut self) -> io::Result<()> {
        loop {
            if self.has_pending() {
                return Ok(());
            }
            if self.eof {
                return std::future::pending().await;
            }
            self.fill().await?;
        }
    }

    /// Read one line.
    ///
    /// A buffered fragment with no terminator is given `grace` to complete;
    /// if nothing more arrives it is returned as a line of its own. Meant
    /// to be called after [`is_ready`](Self::is_ready) returned true.
    pub async fn read_line(&mut self, grace: Duration) -> io::Result<LineRead> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(LineRead::Line(line));
            }

            if self.eof {
                if self.buf.is_empty() {
                    self.eof_reported = true;
                    return Ok(LineRead::EndOfStream);
                }
                return Ok(LineRead::Line(self.take_fragment()));
            }

            if self.buf.is_empty() {
                self.fill().await?;
                continue;
            }

            match tokio::time::timeout(grace, self.fill()).await {
                Ok(res) => {
                    res?;
                }
                Err(_) => return Ok(LineRead::Line(self.take_fragment())),
            }
        }
    }

    fn has_pending(&self) -> bool {
        !self.buf.is_empty() || (self.eof && !self.eof_reported)
    }

    async fn fill(&mut self) -> io::Result<usize> {
        poll_fn(|cx| self.poll_fill(cx)).await
    }

    fn poll_fill(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<usize>> {
        if self.eof {
            return Poll::Ready(Ok(0));
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let mut read_buf = ReadBuf::new(&mut chunk);
        match Pin::new(&mut self.reader).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    self.eof = true;
                } else {
                    self.buf.extend_from_slice(filled);
                }
                Poll::Ready(Ok(filled.len()))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn take_fragment(&mut self) -> String {
        let mut fragment = std::mem::take(&mut self.buf);
        if fragment.last() == Some(&b'\r') {
            fragment.pop();
        }
        String::from_utf8_lossy(&fragment).into_owned()
    }
}

impl fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream")
            .field("buffered", &self.buf.len())
            .field("eof", &self.eof)
            .field("eof_reported", &self.eof_reported)
            .finish()
    }
}
