//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: solver error (invalid search configuration)
//! - 12: input error (bad hex color, bad filter string, bad JSON params)
//! - 13: serialization error
//!
//! `SolverError::InvalidColor` and `SolverError::InvalidFilter` describe
//! what the user typed and exit with 12; `SolverError::InvalidConfig` means
//! the `--params` overrides leave the search unable to run and exits with 10.

use filter_solver_core::SolverError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    /// The solver refused its configuration.
    Solver(SolverError),
    /// A user input error (bad color, bad filter, bad JSON params).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Solver(_) => 10,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Solver(e) => write!(f, "{e}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<SolverError> for CliError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidColor(_) | SolverError::InvalidFilter(_) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Solver(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
