//! Command-line interface for rootshell.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Command lines to execute, in order.
    pub commands: Vec<String>,
    /// Program that starts the privileged shell.
    pub shell: Option<String>,
    /// Arguments for the shell program.
    pub shell_args: Vec<String>,
    /// Wait timeout for the first output, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Skip the uid 0 check.
    pub no_root_check: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('a') | Long("shell-arg") => {
                result.shell_args.push(parser.value()?.parse()?);
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                result.timeout_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("timeout", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("no-root-check") => {
                result.no_root_check = true;
            }
            Value(val) => {
                result.commands.push(val.string()?);
                for rest in parser.raw_args()? {
                    result.commands.push(
                        rest.into_string()
                            .map_err(|v| ArgsError::NotUnicode(v.to_string_lossy().into()))?,
                    );
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"rootshell {version}
Run shell command lines through a privileged shell session

USAGE:
    rootshell [OPTIONS] <COMMAND>...

Each COMMAND is written to the shell as one line, in order. Everything
after the first COMMAND is treated as a command line too.

OPTIONS:
    -s, --shell <PROGRAM>   Program that starts the privileged shell [default: su]
    -a, --shell-arg <ARG>   Argument for the shell program (repeatable)
    -t, --timeout <MS>      Wait for the first output at most MS milliseconds [default: 30000]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --no-root-check     Use the shell without checking for uid 0
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    ROOTSHELL_SHELL         Shell program (overrides config)
    ROOTSHELL_TIMEOUT_MS    Wait timeout (overrides config)
    ROOTSHELL_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXIT STATUS:
    0  command succeeded
    1  command wrote to its error stream
    2  invalid usage or configuration
    3  privileged session denied or failed

EXAMPLES:
    # Remount /system read-write and list it
    rootshell "mount -o rw,remount /system" "ls /system"

    # Use sudo instead of su
    rootshell -s sudo -a -n -a sh "id"

    # Commands that print nothing wait for the full timeout
    rootshell -t 500 "sync"
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("rootshell {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Command line is not valid unicode.
    NotUnicode(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::NotUnicode(arg) => {
                write!(f, "command is not valid unicode: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
