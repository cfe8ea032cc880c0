//! Execution phase state machine.

/// Progress of a single command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPhase {
    /// Nothing has happened yet.
    #[default]
    NotStarted,
    /// Checking whether the session is granted.
    CheckingSession,
    /// The session was not granted; no I/O was attempted.
    SessionDenied,
    /// Writing command lines to the session's input.
    Writing,
    /// Waiting for the first output on either stream.
    Waiting,
    /// Draining the standard output stream.
    DrainingStdout,
    /// Draining the error output stream.
    DrainingStderr,
    /// Execution finished without an I/O fault.
    Done,
    /// An I/O fault interrupted the execution.
    Faulted,
}

impl ExecutionPhase {
    /// Check if transition to target phase is valid.
    ///
    /// Valid transitions:
    /// - NotStarted -> CheckingSession
    /// - CheckingSession -> SessionDenied | Writing
    /// - Writing -> Waiting -> DrainingStdout -> DrainingStderr -> Done
    /// - Writing | Waiting | DrainingStdout | DrainingStderr -> Faulted
    pub fn can_transition_to(&self, target: ExecutionPhase) -> bool {
        use ExecutionPhase::*;
        matches!(
            (*self, target),
            (NotStarted, CheckingSession)
                | (CheckingSession, SessionDenied)
                | (CheckingSession, Writing)
                | (Writing, Waiting)
                | (Waiting, DrainingStdout)
                | (DrainingStdout, DrainingStderr)
                | (DrainingStderr, Done)
                | (Writing | Waiting | DrainingStdout | DrainingStderr, Faulted)
        )
    }

    /// Attempt to transition to a new phase.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ExecutionPhase) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::RootShellError::InvalidPhaseTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionPhase::SessionDenied | ExecutionPhase::Done | ExecutionPhase::Faulted
        )
    }

    /// Check if the session was unusable in this phase.
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionPhase::SessionDenied | ExecutionPhase::Faulted)
    }
}
