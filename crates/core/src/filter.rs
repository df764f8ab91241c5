//! Search parameter vectors and textual filter descriptions.
//!
//! [`FilterValues`] is the 6-dimension point the optimizer moves through, one
//! intensity per transform of [`Transform::SEARCH_ORDER`]. [`FilterChain`] is
//! the CSS `filter` value it serializes to, e.g.
//! `invert(50%) sepia(20%) saturate(3750%) hue-rotate(180deg) brightness(100%) contrast(100%)`.

use crate::color::Rgb;
use crate::error::SolverError;
use crate::transform::{Transform, Unit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Number of searched dimensions.
pub const DIMENSIONS: usize = 6;

/// Index of the hue dimension, the only one that wraps instead of clamping.
pub const HUE_INDEX: usize = 3;

/// Inclusive upper bound per dimension (exclusive for hue, which wraps).
/// Every lower bound is 0.
pub const UPPER_BOUNDS: [f64; DIMENSIONS] = [100.0, 100.0, 7500.0, 360.0, 200.0, 200.0];

/// Converts the hue parameter into `hue-rotate` degrees.
///
/// The parameter shares the 0–100 "fraction of a turn" scale used by
/// [`Hsl::h`](crate::color::Hsl), so one unit is 3.6 degrees.
pub const HUE_DEGREES_PER_UNIT: f64 = 3.6;

/// Intensities for invert, sepia, saturate, hue, brightness, contrast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues([f64; DIMENSIONS]);

impl FilterValues {
    pub fn new(values: [f64; DIMENSIONS]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f64; DIMENSIONS] {
        &self.0
    }

    /// Projects `value` into the bounds of dimension `index`.
    ///
    /// Hue wraps into [0, 360); every other dimension clamps into [0, max].
    pub fn project(value: f64, index: usize) -> f64 {
        let max = UPPER_BOUNDS[index];
        if index == HUE_INDEX {
            // `rem_euclid` can round a tiny negative up to exactly `max`.
            ((value % max) + max) % max
        } else {
            value.clamp(0.0, max)
        }
    }

    /// Whether every component satisfies its dimension's bound.
    pub fn is_within_bounds(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| {
            if i == HUE_INDEX {
                (0.0..UPPER_BOUNDS[i]).contains(&v)
            } else {
                (0.0..=UPPER_BOUNDS[i]).contains(&v)
            }
        })
    }

    /// CSS magnitude of dimension `index`: percent for all but hue, degrees for hue.
    pub fn css_magnitude(&self, index: usize) -> f64 {
        if index == HUE_INDEX {
            self.0[index] * HUE_DEGREES_PER_UNIT
        } else {
            self.0[index]
        }
    }

    /// Each component rounded to the nearest integer.
    pub fn rounded(&self) -> FilterValues {
        FilterValues(self.0.map(f64::round))
    }

    /// Applies the six transforms, in search order, to `color`.
    pub fn apply_to(&self, color: &mut Rgb) {
        for (i, transform) in Transform::SEARCH_ORDER.into_iter().enumerate() {
            transform.apply(color, self.css_magnitude(i));
        }
    }

    /// The filter description with every CSS magnitude rounded to an integer.
    pub fn to_filter(&self) -> FilterChain {
        FilterChain {
            steps: Transform::SEARCH_ORDER
                .into_iter()
                .enumerate()
                .map(|(i, transform)| FilterStep {
                    transform,
                    magnitude: self.css_magnitude(i).round(),
                })
                .collect(),
        }
    }
}

impl Index<usize> for FilterValues {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<[f64; DIMENSIONS]> for FilterValues {
    fn from(values: [f64; DIMENSIONS]) -> Self {
        Self(values)
    }
}

/// One `name(magnitude unit)` entry of a filter description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStep {
    pub transform: Transform,
    /// Magnitude in the transform's [`Unit`].
    pub magnitude: f64,
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}{})",
            self.transform.css_name(),
            self.magnitude,
            self.transform.unit().suffix()
        )
    }
}

/// An ordered chain of CSS filter functions.
///
/// `Display` renders the CSS `filter` value; `FromStr` parses one back. The
/// empty chain renders as `none`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterChain {
    steps: Vec<FilterStep>,
}

impl FilterChain {
    pub fn new(steps: Vec<FilterStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Magnitudes in chain order.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.magnitude).collect()
    }

    /// Replays the chain on `color`, step by step.
    pub fn apply_to(&self, color: &mut Rgb) {
        for step in &self.steps {
            step.transform.apply(color, step.magnitude);
        }
    }

    /// Color produced by applying the chain to black.
    pub fn render_from_black(&self) -> Rgb {
        let mut color = Rgb::BLACK;
        self.apply_to(&mut color);
        color
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("none");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Parses a function argument like `40%`, `0.4`, `90deg`, `0.5turn`.
fn parse_magnitude(transform: Transform, arg: &str) -> Result<f64, SolverError> {
    let arg = arg.trim();
    let number = |s: &str| {
        s.trim().parse::<f64>().map_err(|e| {
            SolverError::InvalidFilter(format!("bad argument '{arg}' for {transform}: {e}"))
        })
    };
    let wrong_unit = || SolverError::InvalidFilter(format!("bad unit in '{arg}' for {transform}"));

    match transform.unit() {
        Unit::Percent => {
            if let Some(n) = arg.strip_suffix('%') {
                number(n)
            } else if arg.ends_with(|c: char| c.is_ascii_alphabetic()) {
                Err(wrong_unit())
            } else {
                // Bare numbers are fractions: `0.5` is `50%`.
                Ok(number(arg)? * 100.0)
            }
        }
        Unit::Degrees => {
            if let Some(n) = arg.strip_suffix("deg") {
                number(n)
            } else if let Some(n) = arg.strip_suffix("turn") {
                Ok(number(n)? * 360.0)
            } else if let Some(n) = arg.strip_suffix("rad") {
                Ok(number(n)?.to_degrees())
            } else {
                match number(arg) {
                    Ok(n) if n == 0.0 => Ok(0.0),
                    _ => Err(wrong_unit()),
                }
            }
        }
    }
}

impl FromStr for FilterChain {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(SolverError::InvalidFilter("empty filter".into()));
        }
        if rest.eq_ignore_ascii_case("none") {
            return Ok(FilterChain::default());
        }

        let mut steps = Vec::new();
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| SolverError::InvalidFilter(format!("expected '(' in '{rest}'")))?;
            let close = rest
                .find(')')
                .filter(|&close| close > open)
                .ok_or_else(|| SolverError::InvalidFilter(format!("unclosed '(' in '{rest}'")))?;
            let name = rest[..open].trim();
            let transform = Transform::from_css_name(name).ok_or_else(|| {
                SolverError::InvalidFilter(format!("unknown filter function '{name}'"))
            })?;
            let magnitude = parse_magnitude(transform, &rest[open + 1..close])?;
            steps.push(FilterStep {
                transform,
                magnitude,
            });
            rest = rest[close + 1..].trim_start();
        }
        Ok(FilterChain { steps })
    }
}

impl Serialize for FilterChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FilterChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
