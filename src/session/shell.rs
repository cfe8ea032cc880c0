//! Privileged shell process management.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{PipeSession, PrivilegedSession, SessionStreams};
use crate::config::SessionSection;
use crate::error::RootShellError;
use crate::execution::CommandRequest;
use crate::Result;

/// Command used to check for elevated permissions.
const ROOT_PROBE: &str = "id -u";

/// A spawned shell process used as a privileged session.
///
/// The process is killed when the session is dropped.
pub struct ShellSession {
    child: Child,
    pipes: PipeSession,
    program: String,
    require_root: bool,
    probe_timeout: Duration,
}

impl ShellSession {
    /// Spawn the configured shell. Permissions are not granted until
    /// [`request_permissions`](Self::request_permissions) succeeds.
    pub fn spawn(config: &SessionSection) -> Result<Self> {
        let mut child = Command::new(&config.shell)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RootShellError::Spawn {
                program: config.shell.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(RootShellError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(RootShellError::MissingPipe("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(RootShellError::MissingPipe("stderr"))?;

        info!(shell = %config.shell, pid = ?child.id(), "shell spawned");

        Ok(Self {
            child,
            pipes: PipeSession::new(stdin, stdout, stderr).with_permissions(false),
            program: config.shell.clone(),
            require_root: config.require_root,
            probe_timeout: config.probe_timeout(),
        })
    }

    /// Spawn the shell and request permissions.
    pub async fn open(config: &SessionSection) -> Result<Self> {
        let mut session = Self::spawn(config)?;
        if session.request_permissions().await {
            Ok(session)
        } else {
            Err(RootShellError::PermissionDenied)
        }
    }

    /// Decide whether the shell is usable and record the grant.
    ///
    /// When root is required the shell must answer the uid probe with `0`.
    pub async fn request_permissions(&mut self) -> bool {
        self.pipes.set_permissions(true);
        if !self.require_root {
            return true;
        }

        let mut probe = CommandRequest::new(ROOT_PROBE).with_timeout(self.probe_timeout);
        probe.execute(&mut self.pipes).await;

        let granted = probe.command_was_successful()
            && probe.standard_output().first().map(|uid| uid.trim()) == Some("0");
        if granted {
            info!(shell = %self.program, "privileged session granted");
        } else {
            warn!(
                shell = %self.program,
                output = ?probe.standard_output(),
                errors = ?probe.error_output(),
                "privileged session refused"
            );
        }

        self.pipes.set_permissions(granted);
        granted
    }

    /// Process id of the shell, if it is still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Ask the shell to exit, killing it if it does not within the probe timeout.
    ///
    /// Returns the exit status if one could be collected.
    pub async fn close(mut self) -> Result<Option<ExitStatus>> {
        self.pipes.set_permissions(false);
        let input = self.pipes.streams().input;
        if let Err(e) = input.write_all(b"exit\n").await {
            debug!(error = %e, "shell input already closed");
        }
        self.pipes.close_input();

        match tokio::time::timeout(self.probe_timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(?status, "shell exited");
                Ok(Some(status))
            }
            Err(_) => {
                warn!(shell = %self.program, "shell did not exit, killing it");
                self.child.kill().await?;
                Ok(self.child.try_wait()?)
            }
        }
    }
}

impl PrivilegedSession for ShellSession {
    fn has_permissions(&self) -> bool {
        self.pipes.has_permissions()
    }

    fn streams(&mut self) -> SessionStreams<'_> {
        self.pipes.streams()
    }
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .field("pipes", &self.pipes)
            .finish()
    }
}
