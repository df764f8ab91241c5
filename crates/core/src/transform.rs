//! The closed set of CSS filter functions the solver understands.
//!
//! Each [`Transform`] knows its CSS name, its unit, and how to apply a CSS
//! magnitude (percent or degrees) to an [`Rgb`]. Both the search parameter
//! vector and the textual filter description enumerate transforms through
//! this type, so the application order lives in exactly one place:
//! [`Transform::SEARCH_ORDER`].

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a transform's CSS magnitude is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// `%`; 100% is an amount of 1.
    Percent,
    /// `deg`.
    Degrees,
}

impl Unit {
    /// CSS suffix for this unit.
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Degrees => "deg",
        }
    }
}

/// A single CSS filter function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    Invert,
    Sepia,
    Saturate,
    HueRotate,
    Brightness,
    Contrast,
    Grayscale,
}

impl Transform {
    /// The six transforms searched over, in application order.
    pub const SEARCH_ORDER: [Transform; 6] = [
        Transform::Invert,
        Transform::Sepia,
        Transform::Saturate,
        Transform::HueRotate,
        Transform::Brightness,
        Transform::Contrast,
    ];

    /// Every transform a filter description may contain.
    pub const ALL: [Transform; 7] = [
        Transform::Invert,
        Transform::Sepia,
        Transform::Saturate,
        Transform::HueRotate,
        Transform::Brightness,
        Transform::Contrast,
        Transform::Grayscale,
    ];

    /// CSS function name, e.g. `"hue-rotate"`.
    pub fn css_name(self) -> &'static str {
        match self {
            Transform::Invert => "invert",
            Transform::Sepia => "sepia",
            Transform::Saturate => "saturate",
            Transform::HueRotate => "hue-rotate",
            Transform::Brightness => "brightness",
            Transform::Contrast => "contrast",
            Transform::Grayscale => "grayscale",
        }
    }

    /// Looks a transform up by its CSS function name (case insensitive).
    pub fn from_css_name(name: &str) -> Option<Transform> {
        Transform::ALL
            .into_iter()
            .find(|t| t.css_name().eq_ignore_ascii_case(name))
    }

    pub fn unit(self) -> Unit {
        match self {
            Transform::HueRotate => Unit::Degrees,
            _ => Unit::Percent,
        }
    }

    /// Magnitude (in this transform's unit) that leaves a color unchanged.
    pub fn neutral(self) -> f64 {
        match self {
            Transform::Invert | Transform::Sepia | Transform::Grayscale | Transform::HueRotate => {
                0.0
            }
            Transform::Saturate | Transform::Brightness | Transform::Contrast => 100.0,
        }
    }

    /// Applies this transform with a magnitude given in [`Transform::unit`].
    pub fn apply(self, color: &mut Rgb, magnitude: f64) {
        let amount = match self.unit() {
            Unit::Percent => magnitude / 100.0,
            Unit::Degrees => magnitude,
        };
        match self {
            Transform::Invert => color.invert(amount),
            Transform::Sepia => color.sepia(amount),
            Transform::Saturate => color.saturate(amount),
            Transform::HueRotate => color.hue_rotate(amount),
            Transform::Brightness => color.brightness(amount),
            Transform::Contrast => color.contrast(amount),
            Transform::Grayscale => color.grayscale(amount),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}
