#![deny(unsafe_code)]
//! Core of the filter-solver.
//!
//! Given a target color, finds a CSS filter chain
//! (`invert sepia saturate hue-rotate brightness contrast`) that turns black
//! into that color. Provides the `Rgb`/`Hsl` color model, the `Transform`
//! set, `FilterValues`/`FilterChain`, the SPSA `Solver`, its `SolverConfig`,
//! and the seedable `Xorshift64` sign source.

pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod params;
pub mod prng;
pub mod solver;
pub mod transform;

pub use color::{Hsl, Rgb};
pub use config::{SolverConfig, SpsaSettings};
pub use error::SolverError;
pub use filter::{FilterChain, FilterStep, FilterValues};
pub use prng::{SignSource, Xorshift64};
pub use solver::{solve_hex, Candidate, Solution, Solver};
pub use transform::{Transform, Unit};
