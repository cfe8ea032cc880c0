//! Privileged session abstraction.
//!
//! A session is one long-lived shell process with an input stream and two
//! output streams. Command execution borrows it mutably, so at most one
//! execution can be in flight per session.

mod handle;
mod pipe;
mod shell;
mod stream;

pub use handle::SessionHandle;
pub use pipe::PipeSession;
pub use shell::ShellSession;
pub use stream::{LineRead, OutputStream};

use tokio::io::AsyncWrite;

/// Simultaneous mutable access to the three streams of a session.
pub struct SessionStreams<'a> {
    /// The shell's standard input.
    pub input: &'a mut (dyn AsyncWrite + Send + Unpin),
    /// The shell's standard output.
    pub stdout: &'a mut OutputStream,
    /// The shell's error output.
    pub stderr: &'a mut OutputStream,
}

/// A shell running with elevated permissions.
pub trait PrivilegedSession: Send {
    /// Whether elevated permissions are currently granted.
    fn has_permissions(&self) -> bool;

    /// Borrow the session's streams.
    fn streams(&mut self) -> SessionStreams<'_>;
}

impl<S: PrivilegedSession + ?Sized> PrivilegedSession for Box<S> {
    fn has_permissions(&self) -> bool {
        (**self).has_permissions()
    }

    fn streams(&mut self) -> SessionStreams<'_> {
        (**self).streams()
    }
}
