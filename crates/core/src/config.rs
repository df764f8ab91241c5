//! Tunable constants of the two-phase search.
//!
//! [`SolverConfig::default`] reproduces the stock search: three 1000-step wide
//! attempts from a fixed start, stopping early once the loss drops to 25,
//! then one 500-step narrow refinement whose gains scale with the wide loss.

use crate::error::SolverError;
use crate::filter::DIMENSIONS;
use crate::params::{param_f64, param_f64_array, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_WIDE_ITERATIONS: usize = 1000;
const DEFAULT_WIDE_STABILITY: f64 = 5.0;
const DEFAULT_WIDE_PERTURBATION: f64 = 15.0;
const DEFAULT_WIDE_GAINS: [f64; DIMENSIONS] = [60.0, 180.0, 18000.0, 600.0, 1.2, 1.2];
const DEFAULT_INITIAL: [f64; DIMENSIONS] = [50.0, 20.0, 3750.0, 50.0, 100.0, 100.0];
const DEFAULT_MAX_WIDE_ATTEMPTS: usize = 3;
const DEFAULT_RESTART_THRESHOLD: f64 = 25.0;
const DEFAULT_NARROW_ITERATIONS: usize = 500;
const DEFAULT_NARROW_PERTURBATION: f64 = 2.0;
const DEFAULT_NARROW_GAIN_FACTORS: [f64; DIMENSIONS] = [0.25, 0.25, 1.0, 0.25, 0.2, 0.2];

/// Inputs of one SPSA run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpsaSettings {
    /// Number of iterations `N`.
    pub iterations: usize,
    /// Stability offset `A` in the gain denominator `(A + k + 1)`.
    pub stability: f64,
    /// Perturbation constant `c`.
    pub perturbation: f64,
    /// Gain numerators `a`, one per dimension.
    pub gains: [f64; DIMENSIONS],
}

/// Full configuration of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub wide_iterations: usize,
    pub wide_stability: f64,
    pub wide_perturbation: f64,
    pub wide_gains: [f64; DIMENSIONS],
    /// Starting point of every wide attempt.
    pub initial: [f64; DIMENSIONS],
    pub max_wide_attempts: usize,
    /// Wide attempts stop once the best loss is at or below this.
    pub restart_threshold: f64,
    pub narrow_iterations: usize,
    pub narrow_perturbation: f64,
    /// Narrow gains are these factors times `(wide loss + 1)`.
    pub narrow_gain_factors: [f64; DIMENSIONS],
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            wide_iterations: DEFAULT_WIDE_ITERATIONS,
            wide_stability: DEFAULT_WIDE_STABILITY,
            wide_perturbation: DEFAULT_WIDE_PERTURBATION,
            wide_gains: DEFAULT_WIDE_GAINS,
            initial: DEFAULT_INITIAL,
            max_wide_attempts: DEFAULT_MAX_WIDE_ATTEMPTS,
            restart_threshold: DEFAULT_RESTART_THRESHOLD,
            narrow_iterations: DEFAULT_NARROW_ITERATIONS,
            narrow_perturbation: DEFAULT_NARROW_PERTURBATION,
            narrow_gain_factors: DEFAULT_NARROW_GAIN_FACTORS,
        }
    }
}

impl SolverConfig {
    /// Builds a config from a flat JSON object, falling back to defaults per key.
    pub fn from_json(params: &Value) -> Self {
        Self {
            wide_iterations: param_usize(params, "wide_iterations", DEFAULT_WIDE_ITERATIONS),
            wide_stability: param_f64(params, "wide_stability", DEFAULT_WIDE_STABILITY),
            wide_perturbation: param_f64(params, "wide_perturbation", DEFAULT_WIDE_PERTURBATION),
            wide_gains: param_f64_array(params, "wide_gains", DEFAULT_WIDE_GAINS),
            initial: param_f64_array(params, "initial", DEFAULT_INITIAL),
            max_wide_attempts: param_usize(params, "max_wide_attempts", DEFAULT_MAX_WIDE_ATTEMPTS),
            restart_threshold: param_f64(params, "restart_threshold", DEFAULT_RESTART_THRESHOLD),
            narrow_iterations: param_usize(params, "narrow_iterations", DEFAULT_NARROW_ITERATIONS),
            narrow_perturbation: param_f64(
                params,
                "narrow_perturbation",
                DEFAULT_NARROW_PERTURBATION,
            ),
            narrow_gain_factors: param_f64_array(
                params,
                "narrow_gain_factors",
                DEFAULT_NARROW_GAIN_FACTORS,
            ),
        }
    }

    /// Rejects settings under which the search cannot produce a result.
    pub fn validate(&self) -> Result<(), SolverError> {
        let fail = |msg: &str| Err(SolverError::InvalidConfig(msg.to_owned()));
        if self.wide_iterations == 0 {
            return fail("wide_iterations must be non-zero");
        }
        if self.narrow_iterations == 0 {
            return fail("narrow_iterations must be non-zero");
        }
        if self.max_wide_attempts == 0 {
            return fail("max_wide_attempts must be non-zero");
        }
        if !(self.wide_perturbation > 0.0 && self.wide_perturbation.is_finite()) {
            return fail("wide_perturbation must be positive and finite");
        }
        if !(self.narrow_perturbation > 0.0 && self.narrow_perturbation.is_finite()) {
            return fail("narrow_perturbation must be positive and finite");
        }
        if !(self.wide_stability >= 0.0 && self.wide_stability.is_finite()) {
            return fail("wide_stability must be non-negative and finite");
        }
        let all_finite = self
            .wide_gains
            .iter()
            .chain(&self.initial)
            .chain(&self.narrow_gain_factors)
            .chain([&self.restart_threshold])
            .all(|v| v.is_finite());
        if !all_finite {
            return fail("gains, initial values and restart_threshold must be finite");
        }
        Ok(())
    }

    /// Settings for one wide attempt.
    pub fn wide_settings(&self) -> SpsaSettings {
        SpsaSettings {
            iterations: self.wide_iterations,
            stability: self.wide_stability,
            perturbation: self.wide_perturbation,
            gains: self.wide_gains,
        }
    }

    /// Settings for the narrow run, derived from the best wide loss.
    ///
    /// The wide loss becomes the stability offset `A`, and every gain is its
    /// factor times `A + 1`.
    pub fn narrow_settings(&self, wide_loss: f64) -> SpsaSettings {
        let scale = wide_loss + 1.0;
        SpsaSettings {
            iterations: self.narrow_iterations,
            stability: wide_loss,
            perturbation: self.narrow_perturbation,
            gains: self.narrow_gain_factors.map(|f| f * scale),
        }
    }

    /// Schema describing every key accepted by [`SolverConfig::from_json`].
    pub fn param_schema() -> Value {
        json!({
            "wide_iterations": {
                "type": "integer",
                "default": DEFAULT_WIDE_ITERATIONS,
                "min": 1,
                "description": "SPSA iterations per wide attempt"
            },
            "wide_stability": {
                "type": "number",
                "default": DEFAULT_WIDE_STABILITY,
                "min": 0.0,
                "description": "Stability offset A of the wide gain sequence"
            },
            "wide_perturbation": {
                "type": "number",
                "default": DEFAULT_WIDE_PERTURBATION,
                "min": 0.0,
                "description": "Perturbation constant c of the wide phase"
            },
            "wide_gains": {
                "type": "array",
                "default": DEFAULT_WIDE_GAINS,
                "description": "Gain numerators a, one per searched dimension in application order"
            },
            "initial": {
                "type": "array",
                "default": DEFAULT_INITIAL,
                "description": "Starting vector of every wide attempt"
            },
            "max_wide_attempts": {
                "type": "integer",
                "default": DEFAULT_MAX_WIDE_ATTEMPTS,
                "min": 1,
                "description": "Upper limit on wide restarts"
            },
            "restart_threshold": {
                "type": "number",
                "default": DEFAULT_RESTART_THRESHOLD,
                "min": 0.0,
                "description": "Stop restarting once the best wide loss is at or below this"
            },
            "narrow_iterations": {
                "type": "integer",
                "default": DEFAULT_NARROW_ITERATIONS,
                "min": 1,
                "description": "SPSA iterations of the narrow refinement"
            },
            "narrow_perturbation": {
                "type": "number",
                "default": DEFAULT_NARROW_PERTURBATION,
                "min": 0.0,
                "description": "Perturbation constant c of the narrow phase"
            },
            "narrow_gain_factors": {
                "type": "array",
                "default": DEFAULT_NARROW_GAIN_FACTORS,
                "description": "Narrow gains as multiples of (wide loss + 1)"
            }
        })
    }
}
