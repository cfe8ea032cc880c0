//! # rootshell
//!
//! Run shell command lines through one long-lived, privileged shell.
//!
//! A privileged session (for example `su`) is started once and then fed
//! command lines. Each execution captures standard output and error output
//! separately and tells three outcomes apart:
//!
//! - the privileged session could not be used (denied or faulted),
//! - the session worked but the command wrote to its error stream,
//! - the command succeeded cleanly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rootshell::{CommandRequest, SessionSection, ShellSession};
//!
//! #[tokio::main]
//! async fn main() -> rootshell::Result<()> {
//!     rootshell::logging::try_init("rootshell=info").ok();
//!
//!     let mut session = ShellSession::open(&SessionSection::default()).await?;
//!
//!     let mut request = CommandRequest::new("id");
//!     request.execute(&mut session).await;
//!
//!     if !request.superuser_was_successful() {
//!         eprintln!("no privileged session");
//!     } else if request.command_was_successful() {
//!         println!("{}", request.standard_output().join("\n"));
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Limitations
//!
//! There is no end-of-command marker. Execution waits for the first output
//! up to the request timeout and then reads what is immediately available,
//! so a command that prints nothing always takes the full timeout.

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use config::{Config, ExecutionSection, SessionSection};
pub use error::{Result, RootShellError};
pub use execution::{CommandExecutor, CommandRequest, CommandResult, ExecutionPhase, Outcome};
pub use session::{
    LineRead, OutputStream, PipeSession, PrivilegedSession, SessionHandle, SessionStreams,
    ShellSession,
};
