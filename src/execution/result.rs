//! Execution result types.

use super::phase::ExecutionPhase;

/// How an execution ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The session was denied or faulted. Output is not authoritative.
    SessionFailed,
    /// The session stayed usable but the command wrote to its error stream.
    CommandError,
    /// The session stayed usable and the error stream stayed empty.
    Succeeded,
}

/// Output captured by one execution of a [`CommandRequest`](super::CommandRequest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    standard_output: Vec<String>,
    error_output: Vec<String>,
    session_failed: bool,
    phase: ExecutionPhase,
}

impl CommandResult {
    /// Lines captured from the standard output stream, in emission order.
    pub fn standard_output(&self) -> &[String] {
        &self.standard_output
    }

    /// Lines captured from the error output stream, in emission order.
    pub fn error_output(&self) -> &[String] {
        &self.error_output
    }

    /// Whether the session could not be used at all.
    pub fn session_failed(&self) -> bool {
        self.session_failed
    }

    /// Session usable and nothing written to the error stream.
    pub fn command_succeeded(&self) -> bool {
        !self.session_failed && self.error_output.is_empty()
    }

    /// Session usable, regardless of what the command reported.
    pub fn session_succeeded(&self) -> bool {
        !self.session_failed
    }

    /// Classify the result.
    pub fn outcome(&self) -> Outcome {
        if self.session_failed {
            Outcome::SessionFailed
        } else if self.error_output.is_empty() {
            Outcome::Succeeded
        } else {
            Outcome::CommandError
        }
    }

    /// The phase the last execution ended in.
    ///
    /// Distinguishes a denied session from a faulted one for diagnostics.
    pub fn final_phase(&self) -> ExecutionPhase {
        self.phase
    }

    pub(crate) fn reset(&mut self) {
        self.standard_output.clear();
        self.error_output.clear();
        self.session_failed = false;
        self.phase = ExecutionPhase::NotStarted;
    }

    pub(crate) fn set_phase(&mut self, phase: ExecutionPhase) {
        self.session_failed = phase.is_failure();
        self.phase = phase;
    }

    pub(crate) fn standard_output_mut(&mut self) -> &mut Vec<String> {
        &mut self.standard_output
    }

    pub(crate) fn error_output_mut(&mut self) -> &mut Vec<String> {
        &mut self.error_output
    }
}
