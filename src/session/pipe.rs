//! Session over caller-supplied byte streams.

use tokio::io::{AsyncRead, AsyncWrite};

use super::{OutputStream, PrivilegedSession, SessionStreams};

/// A privileged session backed by arbitrary async streams.
///
/// Useful when the privileged process is spawned elsewhere, and for
/// driving the executor against scripted streams.
pub struct PipeSession {
    granted: bool,
    input: Box<dyn AsyncWrite + Send + Unpin>,
    stdout: OutputStream,
    stderr: OutputStream,
}

impl PipeSession {
    /// Create a granted session from the process's stdin, stdout and stderr.
    pub fn new<W, O, E>(input: W, stdout: O, stderr: E) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        O: AsyncRead + Send + Unpin + 'static,
        E: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            granted: true,
            input: Box::new(input),
            stdout: OutputStream::new(stdout),
            stderr: OutputStream::new(stderr),
        }
    }

    /// Set whether permissions are granted.
    pub fn with_permissions(mut self, granted: bool) -> Self {
        self.granted = granted;
        self
    }

    /// Grant or revoke permissions in place.
    pub fn set_permissions(&mut self, granted: bool) {
        self.granted = granted;
    }

    /// Drop the input stream so the process sees end of input.
    ///
    /// Later writes are discarded.
    pub fn close_input(&mut self) {
        self.input = Box::new(tokio::io::sink());
    }
}

impl PrivilegedSession for PipeSession {
    fn has_permissions(&self) -> bool {
        self.granted
    }

    fn streams(&mut self) -> SessionStreams<'_> {
        SessionStreams {
            input: &mut *self.input,
            stdout: &mut self.stdout,
            stderr: &mut self.stderr,
        }
    }
}

impl std::fmt::Debug for PipeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeSession")
            .field("granted", &self.granted)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .finish_non_exhaustive()
    }
}
