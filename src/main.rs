//! rootshell binary entry point.

use std::process::ExitCode;

use rootshell::cli::{self, Args};
use rootshell::{logging, CommandExecutor, CommandRequest, Config, Outcome, ShellSession};
use tracing::{debug, error};

const EXIT_COMMAND_ERROR: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_SESSION_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("rootshell: {e}");
            eprintln!("Try 'rootshell --help' for more information.");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rootshell: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    logging::init(&config.log_filter());
    debug!(?config, "configuration loaded");

    run(args, config).await
}

async fn run(args: Args, config: Config) -> ExitCode {
    if args.commands.is_empty() {
        eprintln!("rootshell: no command given");
        return ExitCode::from(EXIT_USAGE);
    }

    let mut session = match ShellSession::open(&config.session).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "could not open privileged session");
            eprintln!("rootshell: {e}");
            return ExitCode::from(EXIT_SESSION_FAILED);
        }
    };

    let mut request =
        CommandRequest::from_lines(args.commands).with_timeout(config.execution.timeout());
    CommandExecutor::from_config(&config.execution)
        .execute(&mut session, &mut request)
        .await;

    for line in request.standard_output() {
        println!("{line}");
    }
    for line in request.error_output() {
        eprintln!("{line}");
    }

    if let Err(e) = session.close().await {
        debug!(error = %e, "shell shutdown failed");
    }

    match request.result().outcome() {
        Outcome::Succeeded => ExitCode::SUCCESS,
        Outcome::CommandError => ExitCode::from(EXIT_COMMAND_ERROR),
        Outcome::SessionFailed => {
            eprintln!("rootshell: privileged session failed");
            ExitCode::from(EXIT_SESSION_FAILED)
        }
    }
}
