//! Shared, serialized access to a privileged session.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::PrivilegedSession;
use crate::execution::{CommandExecutor, CommandRequest};

/// Cloneable handle to one privileged session.
///
/// The session exposes a single input stream and a single pair of output
/// streams, so executions must not overlap. `run` holds the session lock
/// for exactly one execution; concurrent callers queue in lock order.
pub struct SessionHandle<S> {
    inner: Arc<Mutex<S>>,
    executor: CommandExecutor,
}

impl<S: PrivilegedSession> SessionHandle<S> {
    /// Wrap a session.
    pub fn new(session: S) -> Self {
        Self::with_executor(session, CommandExecutor::new())
    }

    /// Wrap a session, running requests with `executor`.
    pub fn with_executor(session: S, executor: CommandExecutor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            executor,
        }
    }

    /// Execute `request` once the session is free.
    ///
    /// The lock is held for the whole execution, including the wait for
    /// the first output. The mutex is async, so queued callers are parked
    /// tasks and no runtime thread is blocked while they wait.
    pub async fn run(&self, request: &mut CommandRequest) -> bool {
        let mut session = self.inner.lock().await;
        self.executor.execute(&mut *session, request).await
    }

    /// Whether the session currently has permissions.
    pub async fn has_permissions(&self) -> bool {
        self.inner.lock().await.has_permissions()
    }

    /// Recover the session if this is the last handle.
    pub fn into_inner(self) -> Option<S> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            executor: self.executor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PipeSession;

    fn silent() -> PipeSession {
        let (input, _) = tokio::io::duplex(64);
        let (_, stdout) = tokio::io::duplex(64);
        let (_, stderr) = tokio::io::duplex(64);
        PipeSession::new(input, stdout, stderr)
    }

    #[tokio::test]
    async fn test_has_permissions() {
        let handle = SessionHandle::new(silent().with_permissions(false));
        assert!(!handle.has_permissions().await);
    }

    #[tokio::test]
    async fn test_into_inner_requires_last_handle() {
        let handle = SessionHandle::new(silent());
        let other = handle.clone();
        assert!(handle.into_inner().is_none());
        assert!(other.into_inner().is_some());
    }

    #[tokio::test]
    async fn test_run_denied() {
        let handle = SessionHandle::new(silent().with_permissions(false));
        let mut request = CommandRequest::new("id");
        assert!(!handle.run(&mut request).await);
        assert!(!request.superuser_was_successful());
    }
}
