//! Error types for the filter-solver core.
//!
//! Only the boundaries fail: parsing a color or a filter description and
//! validating a configuration. The search itself always produces a result.

use thiserror::Error;

/// Errors produced at the edges of the solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// A color string was not a 3- or 6-digit hex color.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A filter description could not be parsed.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A solver configuration value is out of its usable range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
