//! Error types for the NetApp direct driver
//!
//! Every failure the driver can report is a variant of [`Error`]. Callers
//! pattern-match on the variant (or on [`ErrorKind`]) instead of inspecting
//! message text.

use thiserror::Error;

/// Unified error type for the driver
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Command Errors
    // =========================================================================
    /// A command ran but its output did not satisfy the success predicate.
    #[error("{message}\nCommand: {command}\nstdout: >{stdout}<\n stderr: >{stderr}<")]
    CommandVerification {
        message: String,
        command: String,
        stdout: String,
        stderr: String,
    },

    /// Identifier extraction found no usable value in the command output.
    #[error("Failed to parse output of `{command}`: {reason}")]
    Parse {
        command: String,
        reason: String,
        output: String,
    },

    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Transport failure talking to {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Command `{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Verification,
    Parse,
    NotSupported,
    Transport,
    Configuration,
    Internal,
}

impl ErrorKind {
    /// Label used for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Verification => "verification",
            ErrorKind::Parse => "parse",
            ErrorKind::NotSupported => "not_supported",
            ErrorKind::Transport => "transport",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CommandVerification { .. } => ErrorKind::Verification,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::NotSupported { .. } => ErrorKind::NotSupported,
            Error::Transport { .. } | Error::Timeout { .. } => ErrorKind::Transport,
            Error::Configuration(_) | Error::YamlParse(_) | Error::Io(_) => {
                ErrorKind::Configuration
            }
            Error::JsonParse(_) | Error::Metrics(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is transient
    ///
    /// Only channel-level failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Timeout { .. })
    }

    /// The command string attached to this error, if any
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::CommandVerification { command, .. }
            | Error::Parse { command, .. }
            | Error::Timeout { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Result type alias for the driver
pub type Result<T> = std::result::Result<T, Error>;
