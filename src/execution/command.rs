//! Command request representation.

use std::time::Duration;

use super::executor::{CommandExecutor, DEFAULT_TIMEOUT};
use super::result::CommandResult;
use crate::session::PrivilegedSession;

/// One or more shell command lines to run in a privileged session, plus the
/// output captured by the last execution.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    lines: Vec<String>,
    timeout: Duration,
    result: CommandResult,
}

impl CommandRequest {
    /// Create a request with a single command line.
    pub fn new(line: impl Into<String>) -> Self {
        let line: String = line.into();
        Self::from_lines([line])
    }

    /// Create a request from command lines, fed to the shell in order.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
            result: CommandResult::default(),
        }
    }

    /// Set how long to wait for the first output.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the wait timeout in place.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// The command lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// How long execution waits for the first output.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Output of the last execution.
    pub fn result(&self) -> &CommandResult {
        &self.result
    }

    pub(crate) fn result_mut(&mut self) -> &mut CommandResult {
        &mut self.result
    }

    /// Captured standard output lines.
    pub fn standard_output(&self) -> &[String] {
        self.result.standard_output()
    }

    /// Captured error output lines.
    pub fn error_output(&self) -> &[String] {
        self.result.error_output()
    }

    /// Session usable and the command wrote nothing to its error stream.
    pub fn command_was_successful(&self) -> bool {
        self.result.command_succeeded()
    }

    /// Session usable, even if the command reported errors.
    pub fn superuser_was_successful(&self) -> bool {
        self.result.session_succeeded()
    }

    /// Execute with a default [`CommandExecutor`].
    ///
    /// Returns false only if the session was denied or faulted.
    pub async fn execute<S>(&mut self, session: &mut S) -> bool
    where
        S: PrivilegedSession + ?Sized,
    {
        CommandExecutor::new().execute(session, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let request = CommandRequest::new("id -u");
        assert_eq!(request.lines(), ["id -u"]);
        assert_eq!(request.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_lines_keeps_order() {
        let request = CommandRequest::from_lines(["mount -o rw,remount /system", "ls /system"]);
        assert_eq!(
            request.lines(),
            ["mount -o rw,remount /system", "ls /system"]
        );
    }

    #[test]
    fn test_from_empty_lines() {
        let request = CommandRequest::from_lines(Vec::<String>::new());
        assert!(request.lines().is_empty());
    }

    #[test]
    fn test_timeout_overrides() {
        let mut request = CommandRequest::new("true").with_timeout(Duration::from_secs(1));
        assert_eq!(request.timeout(), Duration::from_secs(1));

        request.set_timeout(Duration::from_millis(250));
        assert_eq!(request.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_fresh_request_has_no_output() {
        let request = CommandRequest::new("true");
        assert!(request.standard_output().is_empty());
        assert!(request.error_output().is_empty());
        assert!(request.superuser_was_successful());
    }
}
