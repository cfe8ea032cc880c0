//! Configuration management for rootshell.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::{DEFAULT_LINE_GRACE, DEFAULT_TIMEOUT};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Privileged shell settings.
    pub session: SessionSection,
    /// Command execution settings.
    pub execution: ExecutionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Privileged shell configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Program that starts the privileged shell.
    pub shell: String,
    /// Arguments passed to the shell program.
    pub args: Vec<String>,
    /// Require the shell to report uid 0 before it is used.
    pub require_root: bool,
    /// Timeout for the permission probe and for shutdown, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            shell: "su".to_string(),
            args: Vec::new(),
            require_root: true,
            probe_timeout_ms: 5000,
        }
    }
}

impl SessionSection {
    /// Probe timeout as a duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Command execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// How long to wait for the first output, in milliseconds.
    pub timeout_ms: u64,
    /// How long an unterminated line may take to complete, in milliseconds.
    pub line_grace_ms: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            line_grace_ms: DEFAULT_LINE_GRACE.as_millis() as u64,
        }
    }
}

impl ExecutionSection {
    /// Wait timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Line grace as a duration.
    pub fn line_grace(&self) -> Duration {
        Duration::from_millis(self.line_grace_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(shell) = std::env::var("ROOTSHELL_SHELL") {
            if !shell.is_empty() {
                self.session.shell = shell;
            }
        }

        if let Ok(timeout) = std::env::var("ROOTSHELL_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse() {
                self.execution.timeout_ms = timeout;
            }
        }

        if let Ok(level) = std::env::var("ROOTSHELL_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref shell) = args.shell {
            self.session.shell = shell.clone();
        }

        if !args.shell_args.is_empty() {
            self.session.args = args.shell_args.clone();
        }

        if args.no_root_check {
            self.session.require_root = false;
        }

        if let Some(timeout) = args.timeout_ms {
            self.execution.timeout_ms = timeout;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> String {
        let level = self.logging.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("rootshell={level}")
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.shell, "su");
        assert!(config.session.args.is_empty());
        assert!(config.session.require_root);
        assert_eq!(config.execution.timeout(), Duration::from_secs(30));
        assert_eq!(config.execution.line_grace(), Duration::from_millis(10));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "session": {
                "shell": "sudo",
                "args": ["-n", "sh"],
                "require_root": false
            },
            "execution": {
                "timeout_ms": 1500
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.session.shell, "sudo");
        assert_eq!(config.session.args, ["-n", "sh"]);
        assert!(!config.session.require_root);
        assert_eq!(config.execution.timeout_ms, 1500);
        assert_eq!(config.execution.line_grace_ms, 10); // Default
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            shell: Some("/system/xbin/su".to_string()),
            shell_args: vec!["-c".to_string(), "sh".to_string()],
            timeout_ms: Some(200),
            no_root_check: true,
            log_level: Some("debug".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.session.shell, "/system/xbin/su");
        assert_eq!(config.session.args, ["-c", "sh"]);
        assert!(!config.session.require_root);
        assert_eq!(config.execution.timeout_ms, 200);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_args_keep_config() {
        let mut config = Config::default();
        config.session.args = vec!["-".to_string()];

        config.apply_args(&Args::default());
        assert_eq!(config.session.args, ["-"]);
        assert!(config.session.require_root);
    }

    #[test]
    fn test_log_filter() {
        let mut config = Config::default();
        assert_eq!(config.log_filter(), "rootshell=warn");

        config.logging.level = "rootshell=trace,tokio=warn".to_string();
        assert_eq!(config.log_filter(), "rootshell=trace,tokio=warn");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"shell\""));
        assert!(json.contains("\"timeout_ms\""));
    }
}
