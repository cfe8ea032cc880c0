//! Command execution engine.
//!
//! This module runs command lines through a privileged session:
//! - Writing the lines to the session's input
//! - Waiting, with a timeout, for the first output
//! - Draining stdout and stderr into a [`CommandResult`]
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use rootshell::{CommandRequest, SessionSection, ShellSession};
//!
//! # async fn run() -> rootshell::Result<()> {
//! let mut session = ShellSession::open(&SessionSection::default()).await?;
//!
//! let mut request = CommandRequest::from_lines(["cd /data", "ls"])
//!     .with_timeout(Duration::from_secs(5));
//!
//! if request.execute(&mut session).await {
//!     for line in request.standard_output() {
//!         println!("{line}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod command;
mod executor;
mod phase;
mod result;

pub use command::CommandRequest;
pub use executor::{CommandExecutor, DEFAULT_LINE_GRACE, DEFAULT_TIMEOUT};
pub use phase::ExecutionPhase;
pub use result::{CommandResult, Outcome};
