//! SPSA search for a filter chain that turns black into a target color.
//!
//! The loss of a [`FilterValues`] point is the L1 distance between the color
//! it renders from black and the target, measured over both the RGB channels
//! and the 0–100 scaled HSL triple. The search runs in two phases:
//!
//! 1. **Wide**: up to `max_wide_attempts` independent SPSA runs from a fixed
//!    start, stopping early once the best loss is within `restart_threshold`.
//! 2. **Narrow**: one shorter SPSA run from the best wide point, with gains
//!    and stability offset scaled by the wide loss.
//!
//! Each SPSA iteration probes the loss at `x ± c_k·Δ` for a random ±1 vector
//! Δ, estimates the gradient from the two evaluations, steps, and projects
//! back into bounds. A run returns the best point it visited, not its last.

use crate::color::{Hsl, Rgb};
use crate::config::{SolverConfig, SpsaSettings};
use crate::error::SolverError;
use crate::filter::{FilterChain, FilterValues, DIMENSIONS};
use crate::prng::SignSource;
use serde::{Deserialize, Serialize};

/// Gain decay exponent (alpha).
const GAIN_DECAY: f64 = 1.0;
/// Perturbation decay exponent (gamma).
const PERTURBATION_DECAY: f64 = 1.0 / 6.0;

/// A point of the search and its loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub values: FilterValues,
    pub loss: f64,
}

/// Outcome of a full solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Best point of the narrow phase, unrounded.
    pub values: FilterValues,
    /// Loss of `values`; 0 is an exact match.
    pub loss: f64,
    /// CSS filter description with rounded magnitudes.
    pub filter: FilterChain,
}

impl Solution {
    /// Color the rounded filter description produces from black.
    pub fn rendered(&self) -> Rgb {
        self.filter.render_from_black()
    }
}

/// Fits a filter chain to one target color.
///
/// Owns a scratch color reused by every loss evaluation, so one `Solver`
/// must not be shared between concurrent solves; create one per target.
#[derive(Debug, Clone)]
pub struct Solver {
    target: Rgb,
    target_hsl: Hsl,
    scratch: Rgb,
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver for `target` with the given search configuration.
    ///
    /// Returns `SolverError::InvalidConfig` if the configuration fails
    /// [`SolverConfig::validate`].
    pub fn new(target: Rgb, config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            target,
            target_hsl: target.to_hsl(),
            scratch: Rgb::BLACK,
            config,
        })
    }

    /// Creates a solver with the stock search configuration.
    pub fn with_defaults(target: Rgb) -> Self {
        Self {
            target,
            target_hsl: target.to_hsl(),
            scratch: Rgb::BLACK,
            config: SolverConfig::default(),
        }
    }

    pub fn target(&self) -> Rgb {
        self.target
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the wide and narrow phases and formats the result.
    pub fn solve<R: SignSource>(&mut self, rng: &mut R) -> Solution {
        let wide = self.solve_wide(rng);
        let narrow = self.solve_narrow(&wide, rng);
        tracing::info!(
            target_color = %self.target.to_hex(),
            wide_loss = wide.loss,
            loss = narrow.loss,
            "solved filter"
        );
        Solution {
            values: narrow.values,
            loss: narrow.loss,
            filter: narrow.values.to_filter(),
        }
    }

    /// Restarted exploration from the configured start; keeps the best attempt.
    pub fn solve_wide<R: SignSource>(&mut self, rng: &mut R) -> Candidate {
        let settings = self.config.wide_settings();
        let start = FilterValues::new(self.config.initial);
        let mut best = Candidate {
            values: start,
            loss: f64::INFINITY,
        };
        let mut attempts = 0;
        while best.loss > self.config.restart_threshold && attempts < self.config.max_wide_attempts
        {
            let result = self.spsa(&settings, start, rng);
            tracing::debug!(attempt = attempts, loss = result.loss, "wide attempt finished");
            if result.loss < best.loss {
                best = result;
            }
            attempts += 1;
        }
        best
    }

    /// Local refinement seeded from a wide result.
    pub fn solve_narrow<R: SignSource>(&mut self, wide: &Candidate, rng: &mut R) -> Candidate {
        let settings = self.config.narrow_settings(wide.loss);
        let result = self.spsa(&settings, wide.values, rng);
        tracing::debug!(loss = result.loss, "narrow phase finished");
        result
    }

    /// One SPSA run; returns the lowest-loss point visited.
    pub fn spsa<R: SignSource>(
        &mut self,
        settings: &SpsaSettings,
        start: FilterValues,
        rng: &mut R,
    ) -> Candidate {
        let mut values = *start.as_array();
        let mut best = Candidate {
            values: start,
            loss: f64::INFINITY,
        };
        let mut deltas = [0.0; DIMENSIONS];
        let mut high = [0.0; DIMENSIONS];
        let mut low = [0.0; DIMENSIONS];

        for k in 0..settings.iterations {
            let ck = perturbation_at(settings, k);
            for i in 0..DIMENSIONS {
                deltas[i] = rng.next_sign();
                high[i] = values[i] + ck * deltas[i];
                low[i] = values[i] - ck * deltas[i];
            }

            let loss_diff = self.loss(&high.into()) - self.loss(&low.into());
            for i in 0..DIMENSIONS {
                let gradient = loss_diff / (2.0 * ck) * deltas[i];
                let ak = gain_at(settings, i, k);
                values[i] = FilterValues::project(values[i] - ak * gradient, i);
            }

            let current = FilterValues::new(values);
            let loss = self.loss(&current);
            if loss < best.loss {
                best = Candidate {
                    values: current,
                    loss,
                };
            }
        }
        best
    }

    /// Distance from the color `values` renders on black to the target.
    ///
    /// Sum of absolute RGB channel differences plus absolute differences of
    /// the scaled HSL components, all weighted equally.
    pub fn loss(&mut self, values: &FilterValues) -> f64 {
        let color = &mut self.scratch;
        color.set(0.0, 0.0, 0.0);
        values.apply_to(color);

        let hsl = color.to_hsl();
        (color.r - self.target.r).abs()
            + (color.g - self.target.g).abs()
            + (color.b - self.target.b).abs()
            + (hsl.h - self.target_hsl.h).abs()
            + (hsl.s - self.target_hsl.s).abs()
            + (hsl.l - self.target_hsl.l).abs()
    }
}

/// Perturbation size `c / (k + 1)^gamma` for zero-based iteration `k`.
fn perturbation_at(settings: &SpsaSettings, k: usize) -> f64 {
    settings.perturbation / ((k + 1) as f64).powf(PERTURBATION_DECAY)
}

/// Step size `a_i / (A + k + 1)^alpha` for dimension `i` at iteration `k`.
fn gain_at(settings: &SpsaSettings, i: usize, k: usize) -> f64 {
    settings.gains[i] / (settings.stability + (k + 1) as f64).powf(GAIN_DECAY)
}

/// Parses `hex` and solves it with `config`.
///
/// Malformed colors and invalid configurations are reported before any
/// search work happens.
pub fn solve_hex<R: SignSource>(
    hex: &str,
    config: SolverConfig,
    rng: &mut R,
) -> Result<Solution, SolverError> {
    let target = Rgb::from_hex(hex)?;
    let mut solver = Solver::new(target, config)?;
    Ok(solver.solve(rng))
}
