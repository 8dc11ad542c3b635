use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};

/// Parameters shared by every effect variant
///
/// Missing fields in a config file fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Width of the first streak; later streaks grow from it
    pub min_streak_width: f32,

    /// Caps the growth base at `max / min`; individual streaks may exceed it
    pub max_streak_width: f32,

    /// Shortest streak as a fraction of surface height
    pub min_streak_height_frac: f32,

    /// Longest streak as a fraction of surface height
    pub max_streak_height_frac: f32,

    /// Bound on vertical band shifts, in pixels
    pub max_vertical_offset: u32,

    /// Bound on horizontal band shifts, in pixels
    pub max_horizontal_offset: u32,

    /// Number of vertical displacement ops; the horizontal pass runs half as many
    pub num_slices: u32,

    /// Range the per-pass exponential growth base is drawn from
    pub growth_base_range: (f32, f32),

    /// Range of streak alpha values
    pub alpha_range: (u8, u8),

    /// How far above the top edge a streak may start
    pub streak_overshoot: f32,

    /// Exclusive upper bound on band thickness
    pub max_band_thickness: u32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            min_streak_width: 2.0,
            max_streak_width: 8.0,
            min_streak_height_frac: 0.3,
            max_streak_height_frac: 1.0,
            max_vertical_offset: 50,
            max_horizontal_offset: 50,
            num_slices: 300,
            growth_base_range: (1.05, 1.25),
            alpha_range: (150, 255),
            streak_overshoot: 100.0,
            max_band_thickness: 5,
        }
    }
}

impl EffectParams {
    /// Number of horizontal displacement ops
    pub fn horizontal_slices(&self) -> u32 {
        self.num_slices / 2
    }

    /// Reject anything that would make generation hang or sample from an
    /// empty range.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_streak_width.is_finite() && self.min_streak_width > 0.0) {
            return Err(ParameterError::invalid(
                "min_streak_width",
                self.min_streak_width,
                "must be a positive number",
            )
            .into());
        }

        if !(self.max_streak_width.is_finite() && self.max_streak_width >= self.min_streak_width) {
            return Err(ParameterError::invalid(
                "max_streak_width",
                self.max_streak_width,
                "must be at least min_streak_width",
            )
            .into());
        }

        let (min_frac, max_frac) = (self.min_streak_height_frac, self.max_streak_height_frac);
        if !(min_frac.is_finite() && min_frac > 0.0) {
            return Err(ParameterError::invalid(
                "min_streak_height_frac",
                min_frac,
                "must be a positive number",
            )
            .into());
        }
        if !(max_frac.is_finite() && max_frac >= min_frac) {
            return Err(ParameterError::invalid(
                "max_streak_height_frac",
                max_frac,
                "must be at least min_streak_height_frac",
            )
            .into());
        }

        let (base_lo, base_hi) = self.growth_base_range;
        if !(base_lo.is_finite() && base_lo > 1.0) {
            return Err(ParameterError::NonTerminating { base: base_lo }.into());
        }
        if !(base_hi.is_finite() && base_hi >= base_lo) {
            return Err(ParameterError::invalid(
                "growth_base_range",
                format!("{}-{}", base_lo, base_hi),
                "upper bound must not be below lower bound",
            )
            .into());
        }

        if self.alpha_range.0 > self.alpha_range.1 {
            return Err(ParameterError::invalid(
                "alpha_range",
                format!("{}-{}", self.alpha_range.0, self.alpha_range.1),
                "lower bound exceeds upper bound",
            )
            .into());
        }

        if !(self.streak_overshoot.is_finite() && self.streak_overshoot >= 0.0) {
            return Err(ParameterError::invalid(
                "streak_overshoot",
                self.streak_overshoot,
                "must be zero or positive",
            )
            .into());
        }

        if self.max_band_thickness < 2 {
            return Err(ParameterError::invalid(
                "max_band_thickness",
                self.max_band_thickness,
                "must be at least 2",
            )
            .into());
        }

        Ok(())
    }
}

/// Halo pass settings for the blur-halo variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloParams {
    /// Gaussian sigma applied to the offscreen streak layer
    pub blur_radius: f32,

    /// Global opacity of the blurred layer
    pub opacity: u8,
}

impl Default for HaloParams {
    fn default() -> Self {
        Self {
            blur_radius: 3.0,
            opacity: 120,
        }
    }
}

impl HaloParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.blur_radius.is_finite() && self.blur_radius >= 0.0) {
            return Err(ParameterError::invalid(
                "halo.blur_radius",
                self.blur_radius,
                "must be zero or positive",
            )
            .into());
        }
        Ok(())
    }
}

/// Fixed-width palette bars for the color-bars variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarParams {
    pub bar_width: u32,

    /// Bar height as a fraction of surface height
    pub height_ratio: f32,

    pub min_spacing: u32,
    pub max_spacing: u32,

    /// Hex colors, `#RRGGBB`
    pub palette: Vec<String>,
}

impl Default for BarParams {
    fn default() -> Self {
        Self {
            bar_width: 4,
            height_ratio: 0.6,
            min_spacing: 8,
            max_spacing: 32,
            palette: vec!["#FFC470".to_string(), "#DD5746".to_string()],
        }
    }
}

impl BarParams {
    pub fn validate(&self) -> Result<()> {
        if self.bar_width == 0 {
            return Err(ParameterError::invalid("bars.bar_width", 0, "must be positive").into());
        }
        if !(self.height_ratio > 0.0 && self.height_ratio <= 1.0) {
            return Err(ParameterError::invalid(
                "bars.height_ratio",
                self.height_ratio,
                "must be in (0, 1]",
            )
            .into());
        }
        if self.min_spacing > self.max_spacing {
            return Err(ParameterError::invalid(
                "bars.spacing",
                format!("{}-{}", self.min_spacing, self.max_spacing),
                "min_spacing exceeds max_spacing",
            )
            .into());
        }
        self.colors().map(|_| ())
    }

    /// Parsed palette; never empty on success
    pub fn colors(&self) -> Result<Vec<[u8; 3]>> {
        if self.palette.is_empty() {
            return Err(
                ParameterError::invalid("bars.palette", "[]", "needs at least one color").into(),
            );
        }
        self.palette.iter().map(|hex| parse_hex_color(hex)).collect()
    }
}

/// How the mask-reveal variant lays out its white windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskLayout {
    /// Exponentially widening streaks that tile the width
    #[default]
    Tiled,
    /// Thin windows separated by random gaps
    Windows,
}

/// Mask-reveal layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    pub layout: MaskLayout,

    /// Cursor advance between window starts, windows layout only
    pub min_step: f32,
    pub max_step: f32,

    /// Window width range, windows layout only
    pub min_window_width: f32,
    pub max_window_width: f32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            layout: MaskLayout::Tiled,
            min_step: 2.0,
            max_step: 8.0,
            min_window_width: 1.0,
            max_window_width: 4.0,
        }
    }
}

impl MaskParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(ParameterError::invalid(
                "mask.min_step",
                self.min_step,
                "must be a positive number",
            )
            .into());
        }
        if !(self.max_step.is_finite() && self.max_step >= self.min_step) {
            return Err(ParameterError::invalid(
                "mask.max_step",
                self.max_step,
                "must be at least min_step",
            )
            .into());
        }
        if !(self.min_window_width.is_finite() && self.min_window_width > 0.0) {
            return Err(ParameterError::invalid(
                "mask.min_window_width",
                self.min_window_width,
                "must be a positive number",
            )
            .into());
        }
        if !(self.max_window_width.is_finite() && self.max_window_width >= self.min_window_width) {
            return Err(ParameterError::invalid(
                "mask.max_window_width",
                self.max_window_width,
                "must be at least min_window_width",
            )
            .into());
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` (leading `#` optional)
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || ParameterError::invalid("bars.palette", hex, "expected #RRGGBB");

    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid().into());
    }

    let mut color = [0u8; 3];
    for (i, channel) in color.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(EffectParams::default().validate().is_ok());
        assert!(HaloParams::default().validate().is_ok());
        assert!(BarParams::default().validate().is_ok());
        assert!(MaskParams::default().validate().is_ok());
    }

    #[test]
    fn test_horizontal_slices_is_half() {
        let params = EffectParams {
            num_slices: 7,
            ..EffectParams::default()
        };
        assert_eq!(params.horizontal_slices(), 3);
    }

    #[test]
    fn test_growth_base_at_or_below_one_rejected() {
        let params = EffectParams {
            growth_base_range: (1.0, 1.2),
            ..EffectParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(crate::error::GlitchError::Parameter(ParameterError::NonTerminating { .. }))
        ));
    }

    #[test]
    fn test_non_positive_bounds_rejected() {
        let zero_width = EffectParams {
            min_streak_width: 0.0,
            ..EffectParams::default()
        };
        assert!(zero_width.validate().is_err());

        let nan_width = EffectParams {
            min_streak_width: f32::NAN,
            ..EffectParams::default()
        };
        assert!(nan_width.validate().is_err());

        let inverted_heights = EffectParams {
            min_streak_height_frac: 0.8,
            max_streak_height_frac: 0.2,
            ..EffectParams::default()
        };
        assert!(inverted_heights.validate().is_err());

        let thin_bands = EffectParams {
            max_band_thickness: 1,
            ..EffectParams::default()
        };
        assert!(thin_bands.validate().is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFC470").unwrap(), [0xFF, 0xC4, 0x70]);
        assert_eq!(parse_hex_color("dd5746").unwrap(), [0xDD, 0x57, 0x46]);
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }

    #[test]
    fn test_empty_palette_rejected() {
        let bars = BarParams {
            palette: vec![],
            ..BarParams::default()
        };
        assert!(bars.validate().is_err());
    }

    #[test]
    fn test_mask_params_reject_stalled_cursor() {
        let zero_step = MaskParams {
            min_step: 0.0,
            ..MaskParams::default()
        };
        assert!(zero_step.validate().is_err());

        let inverted_windows = MaskParams {
            min_window_width: 5.0,
            max_window_width: 2.0,
            ..MaskParams::default()
        };
        assert!(inverted_windows.validate().is_err());
    }
}
