//! Channel color model for the filter solver.
//!
//! [`Rgb`] holds three `f64` channels in [0, 255] and mutates itself in place
//! under the CSS filter operations (`invert`, `sepia`, `saturate`,
//! `hue-rotate`, `brightness`, `contrast`, `grayscale`). Every mutation clamps
//! each channel back into [0, 255], so out-of-range amounts never fail; they
//! flow through the arithmetic and get absorbed by the clamp.
//!
//! [`Hsl`] is the perceptual triple used by the loss. All three components are
//! scaled into 0–100 (hue is a fraction of a full turn times 100, not degrees).

use crate::error::SolverError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Row-major 3×3 channel mixing matrix.
type Matrix3 = [f64; 9];

/// Largest channel value.
const CHANNEL_MAX: f64 = 255.0;

/// Three-channel color with each channel clamped to [0, 255].
///
/// Serializes as a hex string `"#rrggbb"` (channels rounded to 8 bits).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue / saturation / lightness, each scaled into [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

fn clamp_channel(value: f64) -> f64 {
    value.clamp(0.0, CHANNEL_MAX)
}

impl Rgb {
    /// Black, the base every filter chain is applied to.
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Creates a color, clamping each channel into [0, 255].
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        let mut color = Self::BLACK;
        color.set(r, g, b);
        color
    }

    /// Assigns all three channels, clamping each into [0, 255].
    pub fn set(&mut self, r: f64, g: f64, b: f64) {
        self.r = clamp_channel(r);
        self.g = clamp_channel(g);
        self.b = clamp_channel(b);
    }

    /// Parses `#rgb` or `#rrggbb` (the `#` is optional, digits are case
    /// insensitive). The 3-digit form duplicates each digit.
    ///
    /// Returns `SolverError::InvalidColor` for anything else.
    pub fn from_hex(hex: &str) -> Result<Rgb, SolverError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SolverError::InvalidColor(format!(
                "'{hex}' contains non-hex characters"
            )));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            n => {
                return Err(SolverError::InvalidColor(format!(
                    "expected 3 or 6 hex digits, got {n}"
                )))
            }
        };
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&expanded[range], 16)
                .map(f64::from)
                .map_err(|e| SolverError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Rgb::new(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Formats the color as `"#rrggbb"`, rounding each channel.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.rounded();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels rounded to the nearest 8-bit value.
    pub fn rounded(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| clamp_channel(c).round() as u8)
    }

    /// Converts to the 0–100 scaled hue/saturation/lightness triple.
    ///
    /// Achromatic colors (max channel equals min channel) have hue and
    /// saturation of exactly 0.
    pub fn to_hsl(self) -> Hsl {
        let r = self.r / CHANNEL_MAX;
        let g = self.g / CHANNEL_MAX;
        let b = self.b / CHANNEL_MAX;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl {
            h: h / 6.0 * 100.0,
            s: s * 100.0,
            l: l * 100.0,
        }
    }

    /// Inverts by `amount` (0 = unchanged, 1 = full inversion).
    pub fn invert(&mut self, amount: f64) {
        let scale = 1.0 - 2.0 * amount;
        let offset = amount * CHANNEL_MAX;
        self.r = clamp_channel(offset + self.r * scale);
        self.g = clamp_channel(offset + self.g * scale);
        self.b = clamp_channel(offset + self.b * scale);
    }

    /// Per-channel affine map `c * slope + intercept * 255`.
    pub fn linear(&mut self, slope: f64, intercept: f64) {
        let offset = intercept * CHANNEL_MAX;
        self.r = clamp_channel(self.r * slope + offset);
        self.g = clamp_channel(self.g * slope + offset);
        self.b = clamp_channel(self.b * slope + offset);
    }

    /// Scales every channel by `amount` (1 = unchanged).
    pub fn brightness(&mut self, amount: f64) {
        self.linear(amount, 0.0);
    }

    /// Stretches channels around mid-gray by `amount` (1 = unchanged).
    pub fn contrast(&mut self, amount: f64) {
        self.linear(amount, -0.5 * amount + 0.5);
    }

    /// Desaturates toward luma by `amount` (0 = unchanged, 1 = gray).
    pub fn grayscale(&mut self, amount: f64) {
        self.multiply(&grayscale_matrix(amount));
    }

    /// Tones toward sepia by `amount` (0 = unchanged, 1 = full sepia).
    pub fn sepia(&mut self, amount: f64) {
        self.multiply(&sepia_matrix(amount));
    }

    /// Scales saturation by `amount` (1 = unchanged, 0 = gray).
    pub fn saturate(&mut self, amount: f64) {
        self.multiply(&saturate_matrix(amount));
    }

    /// Rotates hue by `degrees`.
    pub fn hue_rotate(&mut self, degrees: f64) {
        self.multiply(&hue_rotate_matrix(degrees));
    }

    /// Mixes all three channels from their current values at once, then clamps.
    fn multiply(&mut self, m: &Matrix3) {
        let (r, g, b) = (self.r, self.g, self.b);
        self.set(
            r * m[0] + g * m[1] + b * m[2],
            r * m[3] + g * m[4] + b * m[5],
            r * m[6] + g * m[7] + b * m[8],
        );
    }
}

fn grayscale_matrix(amount: f64) -> Matrix3 {
    let v = 1.0 - amount;
    [
        0.2126 + 0.7874 * v,
        0.7152 - 0.7152 * v,
        0.0722 - 0.0722 * v,
        0.2126 - 0.2126 * v,
        0.7152 + 0.2848 * v,
        0.0722 - 0.0722 * v,
        0.2126 - 0.2126 * v,
        0.7152 - 0.7152 * v,
        0.0722 + 0.9278 * v,
    ]
}

fn sepia_matrix(amount: f64) -> Matrix3 {
    let v = 1.0 - amount;
    [
        0.393 + 0.607 * v,
        0.769 - 0.769 * v,
        0.189 - 0.189 * v,
        0.349 - 0.349 * v,
        0.686 + 0.314 * v,
        0.168 - 0.168 * v,
        0.272 - 0.272 * v,
        0.534 - 0.534 * v,
        0.131 + 0.869 * v,
    ]
}

fn saturate_matrix(amount: f64) -> Matrix3 {
    [
        0.213 + 0.787 * amount,
        0.715 - 0.715 * amount,
        0.072 - 0.072 * amount,
        0.213 - 0.213 * amount,
        0.715 + 0.285 * amount,
        0.072 - 0.072 * amount,
        0.213 - 0.213 * amount,
        0.715 - 0.715 * amount,
        0.072 + 0.928 * amount,
    ]
}

fn hue_rotate_matrix(degrees: f64) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        0.213 + cos * 0.787 - sin * 0.213,
        0.715 - cos * 0.715 - sin * 0.715,
        0.072 - cos * 0.072 + sin * 0.928,
        0.213 - cos * 0.213 + sin * 0.143,
        0.715 + cos * 0.285 + sin * 0.140,
        0.072 - cos * 0.072 - sin * 0.283,
        0.213 - cos * 0.213 - sin * 0.787,
        0.715 - cos * 0.715 + sin * 0.715,
        0.072 + cos * 0.928 + sin * 0.072,
    ]
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.rounded();
        write!(f, "rgb({r}, {g}, {b})")
    }
}

impl std::str::FromStr for Rgb {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn assert_rgb_near(actual: Rgb, expected: Rgb, tolerance: f64) {
        assert!(
            (actual.r - expected.r).abs() < tolerance
                && (actual.g - expected.g).abs() < tolerance
                && (actual.b - expected.b).abs() < tolerance,
            "expected {expected:?}, got {actual:?}"
        );
    }

    // -- Construction and clamping --

    #[test]
    fn new_clamps_out_of_range_channels() {
        let c = Rgb::new(-20.0, 300.0, 128.0);
        assert_eq!(c, Rgb::new(0.0, 255.0, 128.0));
    }

    #[test]
    fn set_overwrites_all_channels() {
        let mut c = Rgb::new(10.0, 20.0, 30.0);
        c.set(0.0, 0.0, 0.0);
        assert_eq!(c, Rgb::BLACK);
    }

    // -- Hex parsing --

    #[test]
    fn from_hex_parses_shorthand_red() {
        assert_eq!(Rgb::from_hex("#f00").unwrap(), Rgb::new(255.0, 0.0, 0.0));
    }

    #[test]
    fn from_hex_parses_full_form() {
        assert_eq!(
            Rgb::from_hex("#336699").unwrap(),
            Rgb::new(51.0, 102.0, 153.0)
        );
    }

    #[test]
    fn from_hex_accepts_missing_hash() {
        assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0.0, 255.0, 0.0));
        assert_eq!(Rgb::from_hex("00f").unwrap(), Rgb::new(0.0, 0.0, 255.0));
    }

    #[test]
    fn from_hex_is_case_insensitive() {
        assert_eq!(
            Rgb::from_hex("#C0FFEE").unwrap(),
            Rgb::from_hex("#c0ffee").unwrap()
        );
        assert_eq!(Rgb::from_hex("#AbC").unwrap(), Rgb::from_hex("#aabbcc").unwrap());
    }

    #[test]
    fn from_hex_rejects_wrong_lengths() {
        for input in ["", "#", "#ff", "#ffff", "#fffff", "#fffffff", "#ffffffff"] {
            assert!(
                matches!(Rgb::from_hex(input), Err(SolverError::InvalidColor(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn from_hex_rejects_non_hex_digits() {
        for input in ["#ggg", "#12345z", "+ff", "#+fffff", "##fff", " #fff", "#éff"] {
            assert!(
                Rgb::from_hex(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn from_str_delegates_to_from_hex() {
        let c: Rgb = "#123".parse().unwrap();
        assert_eq!(c, Rgb::new(17.0, 34.0, 51.0));
    }

    // -- Formatting --

    #[test]
    fn to_hex_rounds_channels() {
        assert_eq!(Rgb::new(127.5, 0.4, 254.6).to_hex(), "#8000ff");
    }

    #[test]
    fn display_uses_rgb_function_syntax() {
        assert_eq!(Rgb::new(255.0, 127.6, 0.2).to_string(), "rgb(255, 128, 0)");
    }

    #[test]
    fn rgb_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255.0, 0.0, 0.0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
    }

    #[test]
    fn rgb_deserializes_from_shorthand_hex() {
        let c: Rgb = serde_json::from_str("\"#0f0\"").unwrap();
        assert_eq!(c, Rgb::new(0.0, 255.0, 0.0));
    }

    #[test]
    fn rgb_deserialize_rejects_invalid_hex() {
        let result: Result<Rgb, _> = serde_json::from_str("\"not-a-color\"");
        assert!(result.is_err());
    }

    // -- HSL --

    #[test]
    fn hsl_of_black_is_all_zero() {
        assert_eq!(Rgb::BLACK.to_hsl(), Hsl::default());
    }

    #[test]
    fn hsl_of_white_has_full_lightness_and_no_hue() {
        let hsl = Rgb::new(255.0, 255.0, 255.0).to_hsl();
        assert!(approx_eq(hsl.h, 0.0));
        assert!(approx_eq(hsl.s, 0.0));
        assert!(approx_eq(hsl.l, 100.0));
    }

    #[test]
    fn hsl_of_gray_is_achromatic() {
        let hsl = Rgb::new(51.0, 51.0, 51.0).to_hsl();
        assert!(approx_eq(hsl.h, 0.0));
        assert!(approx_eq(hsl.s, 0.0));
        assert!(approx_eq(hsl.l, 20.0));
    }

    #[test]
    fn hsl_primaries_land_on_thirds_of_the_hue_scale() {
        let red = Rgb::new(255.0, 0.0, 0.0).to_hsl();
        let green = Rgb::new(0.0, 255.0, 0.0).to_hsl();
        let blue = Rgb::new(0.0, 0.0, 255.0).to_hsl();
        assert!(approx_eq(red.h, 0.0));
        assert!(approx_eq(green.h, 100.0 / 3.0));
        assert!(approx_eq(blue.h, 200.0 / 3.0));
        for hsl in [red, green, blue] {
            assert!(approx_eq(hsl.s, 100.0));
            assert!(approx_eq(hsl.l, 50.0));
        }
    }

    #[test]
    fn hsl_red_dominant_with_more_blue_wraps_hue() {
        // Magenta-ish: max is red, g < b, so the +6 branch applies.
        let hsl = Rgb::new(255.0, 0.0, 128.0).to_hsl();
        assert!(hsl.h > 90.0 && hsl.h < 100.0, "hue {}", hsl.h);
    }

    #[test]
    fn hsl_saturation_uses_upper_formula_above_half_lightness() {
        // l = (1.0 + 0.6) / 2 = 0.8, d = 0.4, s = 0.4 / (2 - 1.6) = 1.0
        let hsl = Rgb::new(255.0, 153.0, 153.0).to_hsl();
        assert!(approx_eq(hsl.l, 80.0));
        assert!(approx_eq(hsl.s, 100.0));
    }

    // -- Transforms --

    #[test]
    fn invert_full_twice_restores_color() {
        let original = Rgb::new(12.0, 200.0, 99.5);
        let mut c = original;
        c.invert(1.0);
        assert_rgb_near(c, Rgb::new(243.0, 55.0, 155.5), EPSILON);
        c.invert(1.0);
        assert_rgb_near(c, original, EPSILON);
    }

    #[test]
    fn invert_half_of_black_is_mid_gray() {
        let mut c = Rgb::BLACK;
        c.invert(0.5);
        assert_rgb_near(c, Rgb::new(127.5, 127.5, 127.5), EPSILON);
    }

    #[test]
    fn neutral_amounts_are_no_ops() {
        let original = Rgb::new(30.0, 140.0, 220.0);
        let mut c = original;
        c.brightness(1.0);
        assert_rgb_near(c, original, EPSILON);
        c.contrast(1.0);
        assert_rgb_near(c, original, EPSILON);
        c.saturate(1.0);
        assert_rgb_near(c, original, 1e-6);
        c.invert(0.0);
        c.sepia(0.0);
        c.grayscale(0.0);
        c.hue_rotate(0.0);
        assert_rgb_near(c, original, 1e-6);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let mut c = Rgb::new(100.0, 200.0, 50.0);
        c.brightness(2.0);
        assert_rgb_near(c, Rgb::new(200.0, 255.0, 100.0), EPSILON);
    }

    #[test]
    fn contrast_zero_collapses_to_mid_gray() {
        let mut c = Rgb::new(0.0, 100.0, 255.0);
        c.contrast(0.0);
        assert_rgb_near(c, Rgb::new(127.5, 127.5, 127.5), EPSILON);
    }

    #[test]
    fn linear_applies_slope_and_intercept() {
        let mut c = Rgb::new(100.0, 0.0, 200.0);
        c.linear(0.5, 0.1);
        assert_rgb_near(c, Rgb::new(75.5, 25.5, 125.5), EPSILON);
    }

    #[test]
    fn grayscale_full_equalizes_channels() {
        let mut c = Rgb::new(255.0, 0.0, 0.0);
        c.grayscale(1.0);
        assert!(approx_eq(c.r, c.g) && approx_eq(c.g, c.b), "{c:?}");
        assert!(approx_eq(c.r, 0.2126 * 255.0));
    }

    #[test]
    fn sepia_full_of_white_clamps_to_warm_tone() {
        let mut c = Rgb::new(255.0, 255.0, 255.0);
        c.sepia(1.0);
        assert!(approx_eq(c.r, 255.0));
        assert!(approx_eq(c.g, 255.0));
        assert!(approx_eq(c.b, (0.272 + 0.534 + 0.131) * 255.0));
    }

    #[test]
    fn saturate_zero_desaturates() {
        let mut c = Rgb::new(0.0, 255.0, 0.0);
        c.saturate(0.0);
        assert!(approx_eq(c.r, 0.715 * 255.0));
        assert!(approx_eq(c.g, 0.715 * 255.0));
        assert!(approx_eq(c.b, 0.715 * 255.0));
    }

    #[test]
    fn hue_rotate_full_turn_is_identity() {
        let original = Rgb::new(40.0, 180.0, 90.0);
        let mut c = original;
        c.hue_rotate(360.0);
        assert_rgb_near(c, original, 1e-6);
    }

    #[test]
    fn hue_rotate_moves_red_toward_other_channels() {
        let mut c = Rgb::new(255.0, 0.0, 0.0);
        c.hue_rotate(120.0);
        assert!(c.g > c.r, "expected green to dominate after 120deg: {c:?}");
    }

    #[test]
    fn matrix_uses_channels_simultaneously() {
        // Sequential per-channel mixing would feed the new red into green.
        let mut c = Rgb::new(200.0, 0.0, 0.0);
        c.saturate(0.0);
        assert!(approx_eq(c.r, 0.213 * 200.0));
        assert!(approx_eq(c.g, 0.213 * 200.0));
        assert!(approx_eq(c.b, 0.213 * 200.0));
    }

    #[test]
    fn negative_amounts_are_absorbed_by_clamping() {
        let mut c = Rgb::new(100.0, 150.0, 200.0);
        c.brightness(-3.0);
        assert_eq!(c, Rgb::BLACK);
        c.invert(-1.0);
        assert_eq!(c, Rgb::BLACK);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn channel() -> impl Strategy<Value = f64> {
            0.0..=255.0_f64
        }

        fn in_range(c: Rgb) -> bool {
            [c.r, c.g, c.b].iter().all(|v| (0.0..=255.0).contains(v))
        }

        proptest! {
            #[test]
            fn six_digit_hex_decodes_exactly(r: u8, g: u8, b: u8) {
                let hex = format!("#{r:02x}{g:02x}{b:02x}");
                let c = Rgb::from_hex(&hex).unwrap();
                prop_assert_eq!(c.rounded(), [r, g, b]);
                prop_assert_eq!(c.to_hex(), hex);
            }

            #[test]
            fn three_digit_hex_duplicates_digits(r in 0u8..16, g in 0u8..16, b in 0u8..16) {
                let c = Rgb::from_hex(&format!("{r:x}{g:x}{b:X}")).unwrap();
                prop_assert_eq!(c.rounded(), [r * 17, g * 17, b * 17]);
            }

            #[test]
            fn invert_is_an_involution(r in channel(), g in channel(), b in channel()) {
                let original = Rgb::new(r, g, b);
                let mut c = original;
                c.invert(1.0);
                c.invert(1.0);
                prop_assert!((c.r - original.r).abs() < 1e-9);
                prop_assert!((c.g - original.g).abs() < 1e-9);
                prop_assert!((c.b - original.b).abs() < 1e-9);
            }

            #[test]
            fn every_transform_keeps_channels_in_range(
                r in channel(),
                g in channel(),
                b in channel(),
                amount in -10.0..80.0_f64,
                degrees in -720.0..720.0_f64,
            ) {
                let mut c = Rgb::new(r, g, b);
                c.invert(amount);
                prop_assert!(in_range(c));
                c.sepia(amount);
                prop_assert!(in_range(c));
                c.saturate(amount);
                prop_assert!(in_range(c));
                c.hue_rotate(degrees);
                prop_assert!(in_range(c));
                c.brightness(amount);
                prop_assert!(in_range(c));
                c.contrast(amount);
                prop_assert!(in_range(c));
                c.grayscale(amount);
                prop_assert!(in_range(c));
            }

            #[test]
            fn hsl_components_stay_in_percent_range(
                r in channel(),
                g in channel(),
                b in channel(),
            ) {
                let hsl = Rgb::new(r, g, b).to_hsl();
                prop_assert!((0.0..=100.0 + 1e-9).contains(&hsl.h), "h = {}", hsl.h);
                prop_assert!((0.0..=100.0 + 1e-9).contains(&hsl.s), "s = {}", hsl.s);
                prop_assert!((0.0..=100.0 + 1e-9).contains(&hsl.l), "l = {}", hsl.l);
            }
        }
    }
}
