//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: nest error (invalid config range, bad dimensions, host refusal)
//! - 11: I/O error (snapshot write)
//! - 12: input error (bad color, bad pointer position, bad JSON config)
//! - 13: serialization error

use canvas_nest_core::NestError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// A nest-level error (config out of range, bad dimensions).
    Nest(NestError),
    /// An I/O error (snapshot rendering).
    Io(String),
    /// A user input error (unparsable flag value or JSON).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Nest(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Nest(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<NestError> for CliError {
    fn from(e: NestError) -> Self {
        match e {
            NestError::Io(msg) => CliError::Io(msg),
            e @ NestError::InvalidColor(_) => CliError::Input(e.to_string()),
            other => CliError::Nest(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
