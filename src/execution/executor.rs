//! Command execution engine.

use std::io;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, trace, warn};

use super::command::CommandRequest;
use super::phase::ExecutionPhase;
use crate::config::ExecutionSection;
use crate::session::{LineRead, OutputStream, PrivilegedSession, SessionStreams};

/// Default time to wait for the first output of a command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time an unterminated line gets to complete while draining.
pub const DEFAULT_LINE_GRACE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
enum Channel {
    Stdout,
    Stderr,
}

/// Runs command requests through a privileged session.
///
/// The session is shared and long-lived, and has no end-of-message marker.
/// Execution therefore waits at most the request's timeout for the first
/// output on either stream, then drains whatever is immediately available.
/// A command that prints nothing always costs the full timeout.
///
/// Output is read as it becomes available, not per command. A line written
/// in pieces further apart than the line grace is captured as separate
/// lines, and output arriving after the drain belongs to the next execution.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    line_grace: Duration,
}

impl CommandExecutor {
    /// Create an executor with default settings.
    pub fn new() -> Self {
        Self {
            line_grace: DEFAULT_LINE_GRACE,
        }
    }

    /// Create an executor from the execution config section.
    pub fn from_config(config: &ExecutionSection) -> Self {
        Self::new().with_line_grace(config.line_grace())
    }

    /// Set how long an unterminated output line may take to complete.
    pub fn with_line_grace(mut self, grace: Duration) -> Self {
        self.line_grace = grace;
        self
    }

    /// Execute `request` in `session` and store its output in the request.
    ///
    /// Returns true if the session was usable, even when the command wrote
    /// to its error stream. Returns false if the session was not granted or
    /// an I/O fault occurred; output captured before a fault is kept.
    pub async fn execute<S>(&self, session: &mut S, request: &mut CommandRequest) -> bool
    where
        S: PrivilegedSession + ?Sized,
    {
        let mut phase = ExecutionPhase::NotStarted;
        request.result_mut().reset();

        advance(&mut phase, ExecutionPhase::CheckingSession);
        if !session.has_permissions() {
            warn!("privileged session not granted, command not sent");
            advance(&mut phase, ExecutionPhase::SessionDenied);
            request.result_mut().set_phase(phase);
            return false;
        }

        let outcome = self
            .converse(session.streams(), request, &mut phase)
            .await;

        match outcome {
            Ok(()) => {
                advance(&mut phase, ExecutionPhase::Done);
                request.result_mut().set_phase(phase);
                true
            }
            Err(e) => {
                error!(phase = ?phase, error = %e, "privileged session fault");
                advance(&mut phase, ExecutionPhase::Faulted);
                request.result_mut().set_phase(phase);
                false
            }
        }
    }

    async fn converse(
        &self,
        streams: SessionStreams<'_>,
        request: &mut CommandRequest,
        phase: &mut ExecutionPhase,
    ) -> io::Result<()> {
        let SessionStreams {
            input,
            stdout,
            stderr,
        } = streams;

        advance(phase, ExecutionPhase::Writing);
        for line in request.lines() {
            info!("< {}", line);
            input.write_all(format!("{line}\n").as_bytes()).await?;
        }
        input.flush().await?;

        advance(phase, ExecutionPhase::Waiting);
        wait_for_output(stdout, stderr, request.timeout()).await?;

        advance(phase, ExecutionPhase::DrainingStdout);
        let result = request.result_mut();
        self.drain(stdout, result.standard_output_mut(), Channel::Stdout)
            .await?;

        advance(phase, ExecutionPhase::DrainingStderr);
        self.drain(stderr, result.error_output_mut(), Channel::Stderr)
            .await?;

        Ok(())
    }

    async fn drain(
        &self,
        stream: &mut OutputStream,
        sink: &mut Vec<String>,
        channel: Channel,
    ) -> io::Result<()> {
        while stream.is_ready()? {
            let line = match stream.read_line(self.line_grace).await? {
                LineRead::Line(line) => line,
                LineRead::EndOfStream => {
                    debug!(?channel, "end of stream");
                    break;
                }
            };

            match channel {
                Channel::Stdout => info!("> {}", line),
                Channel::Stderr => error!("> {}", line),
            }
            sink.push(line);
        }
        Ok(())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until either stream has data, or `timeout` elapses.
///
/// Stdout is polled first, so data already buffered there is drained even
/// when stderr fails. Running out of time is not an error: draining simply
/// finds nothing.
async fn wait_for_output(
    stdout: &mut OutputStream,
    stderr: &mut OutputStream,
    timeout: Duration,
) -> io::Result<()> {
    let started = Instant::now();
    let first = async {
        tokio::select! {
            biased;
            res = stdout.readable() => res.map(|()| Channel::Stdout),
            res = stderr.readable() => res.map(|()| Channel::Stderr),
        }
    };

    match tokio::time::timeout(timeout, first).await {
        Ok(res) => {
            let channel = res?;
            trace!(?channel, elapsed = ?started.elapsed(), "first output");
        }
        Err(_) => debug!(?timeout, "no output before timeout"),
    }
    Ok(())
}

fn advance(phase: &mut ExecutionPhase, next: ExecutionPhase) {
    match phase.transition_to(next) {
        Ok(()) => trace!(phase = ?next, "execution phase"),
        Err(e) => {
            error!(error = %e, "execution phase left unchanged");
            debug_assert!(false, "{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PipeSession;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_from_config() {
        let section = ExecutionSection {
            line_grace_ms: 25,
            ..ExecutionSection::default()
        };
        let executor = CommandExecutor::from_config(&section);
        assert_eq!(executor.line_grace, Duration::from_millis(25));
    }

    #[test]
    fn test_advance_follows_valid_transitions() {
        let mut phase = ExecutionPhase::NotStarted;
        advance(&mut phase, ExecutionPhase::CheckingSession);
        advance(&mut phase, ExecutionPhase::Writing);
        assert_eq!(phase, ExecutionPhase::Writing);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid phase transition")]
    fn test_advance_rejects_invalid_transition() {
        let mut phase = ExecutionPhase::Done;
        advance(&mut phase, ExecutionPhase::Writing);
    }

    #[tokio::test]
    async fn test_denied_session_writes_nothing() {
        let (input, mut input_peer) = tokio::io::duplex(1024);
        let (_stdout_peer, stdout) = tokio::io::duplex(1024);
        let (_stderr_peer, stderr) = tokio::io::duplex(1024);
        let mut session = PipeSession::new(input, stdout, stderr).with_permissions(false);

        let mut request = CommandRequest::new("reboot");
        assert!(!CommandExecutor::new().execute(&mut session, &mut request).await);
        assert_eq!(request.result().final_phase(), ExecutionPhase::SessionDenied);

        drop(session);
        let mut written = Vec::new();
        input_peer.read_to_end(&mut written).await.unwrap();
        assert!(written.is_empty());
    }

    #[tokio::test]
    async fn test_stdout_and_stderr_are_separated() {
        let input = tokio_test::io::Builder::new()
            .write(b"ls /data /missing\n")
            .build();
        let (mut stdout_peer, stdout) = tokio::io::duplex(1024);
        let (mut stderr_peer, stderr) = tokio::io::duplex(1024);
        stdout_peer.write_all(b"/data:\napp\n").await.unwrap();
        stderr_peer
            .write_all(b"ls: /missing: No such file or directory\n")
            .await
            .unwrap();
        let mut session = PipeSession::new(input, stdout, stderr);

        let mut request =
            CommandRequest::new("ls /data /missing").with_timeout(Duration::from_secs(5));
        assert!(CommandExecutor::new().execute(&mut session, &mut request).await);

        assert_eq!(request.standard_output(), ["/data:", "app"]);
        assert_eq!(
            request.error_output(),
            ["ls: /missing: No such file or directory"]
        );
        assert!(!request.command_was_successful());
        assert_eq!(request.result().final_phase(), ExecutionPhase::Done);
    }

    #[tokio::test]
    async fn test_write_fault_marks_session_failed() {
        let input = tokio_test::io::Builder::new()
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "shell exited"))
            .build();
        let (_stdout_peer, stdout) = tokio::io::duplex(1024);
        let (_stderr_peer, stderr) = tokio::io::duplex(1024);
        let mut session = PipeSession::new(input, stdout, stderr);

        let mut request = CommandRequest::new("id");
        assert!(!CommandExecutor::new().execute(&mut session, &mut request).await);
        assert!(!request.superuser_was_successful());
        assert_eq!(request.result().final_phase(), ExecutionPhase::Faulted);
    }
}
