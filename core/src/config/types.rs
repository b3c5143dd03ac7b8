use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub switch: SwitchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr. Stdout carries the switched stream and stays
    /// untouched.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or ~/.standin/logs if
    /// unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "standin_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Treat an input holding only a leading newline sequence as empty.
    #[serde(default = "default_ignore_leading_newline")]
    pub ignore_leading_newline: bool,

    /// Switch immediately when the input is an interactive terminal.
    #[serde(default = "default_by_terminal")]
    pub by_terminal: bool,
}

fn default_ignore_leading_newline() -> bool {
    true
}

fn default_by_terminal() -> bool {
    true
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            ignore_leading_newline: default_ignore_leading_newline(),
            by_terminal: default_by_terminal(),
        }
    }
}
