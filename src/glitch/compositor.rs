use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ConfigError, GlitchError, Result},
    glitch::params::HaloParams,
    surface::{Surface, BLACK, WHITE},
};

/// Which glitch look a render produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectVariant {
    /// Sharp black streaks with a soft blurred fringe
    #[default]
    BlurHalo,
    /// Source visible only through streak-shaped windows
    MaskReveal,
    /// Palette-colored bars laid over the source
    ColorBars,
}

impl EffectVariant {
    pub const ALL: [EffectVariant; 3] = [Self::BlurHalo, Self::MaskReveal, Self::ColorBars];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BlurHalo => "blur-halo",
            Self::MaskReveal => "mask-reveal",
            Self::ColorBars => "color-bars",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BlurHalo => {
                "Opaque black streaks with a low-opacity blurred halo, then torn scanlines"
            }
            Self::MaskReveal => {
                "The image shows only through streak windows on black, then torn scanlines"
            }
            Self::ColorBars => "Torn fixed-width palette bars over the untouched image",
        }
    }
}

impl fmt::Display for EffectVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectVariant {
    type Err = GlitchError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownVariant { name: s.to_string() }.into())
    }
}

/// Merges a streak layer with the visible surface.
///
/// Each variant maps to exactly one strategy. `compose` runs once per render,
/// after the streak passes and before displacement, and decides coverage from
/// the layer alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Compositor {
    BlurHalo { blur_sigma: f32, opacity: u8 },
    MaskReveal,
    ColorBars,
}

impl Compositor {
    pub fn new(variant: EffectVariant, halo: &HaloParams) -> Self {
        match variant {
            EffectVariant::BlurHalo => Self::BlurHalo {
                blur_sigma: halo.blur_radius,
                opacity: halo.opacity,
            },
            EffectVariant::MaskReveal => Self::MaskReveal,
            EffectVariant::ColorBars => Self::ColorBars,
        }
    }

    pub fn variant(&self) -> EffectVariant {
        match self {
            Self::BlurHalo { .. } => EffectVariant::BlurHalo,
            Self::MaskReveal => EffectVariant::MaskReveal,
            Self::ColorBars => EffectVariant::ColorBars,
        }
    }

    /// Blank offscreen layer the streaks are drawn into
    pub fn streak_layer(&self, width: u32, height: u32) -> Surface {
        match self {
            Self::MaskReveal => Surface::new_filled(width, height, BLACK),
            Self::BlurHalo { .. } | Self::ColorBars => Surface::new_transparent(width, height),
        }
    }

    /// Paint color for exponential streaks
    pub fn streak_color(&self) -> [u8; 3] {
        match self {
            Self::MaskReveal => WHITE,
            Self::BlurHalo { .. } | Self::ColorBars => BLACK,
        }
    }

    /// Alpha range forced on streaks, if the strategy needs one
    pub fn streak_alpha_override(&self) -> Option<(u8, u8)> {
        match self {
            // Mask windows are fully open.
            Self::MaskReveal => Some((255, 255)),
            Self::BlurHalo { .. } | Self::ColorBars => None,
        }
    }

    pub fn compose(
        &self,
        mut layer: Surface,
        source: &Surface,
        visible: &mut Surface,
    ) -> Result<()> {
        if (layer.width(), layer.height()) != (visible.width(), visible.height()) {
            return Err(GlitchError::generic(format!(
                "streak layer is {}x{} but canvas is {}x{}",
                layer.width(),
                layer.height(),
                visible.width(),
                visible.height()
            )));
        }

        match *self {
            Self::BlurHalo { blur_sigma, opacity } => {
                debug!("Compositing halo: blur sigma {}, opacity {}", blur_sigma, opacity);
                layer.blur(blur_sigma);
                visible.draw_surface(&layer, opacity);
            }
            Self::MaskReveal => {
                debug!("Compositing mask reveal");
                let scratch = Self::reveal(source, &layer);
                visible.fill(BLACK);
                visible.draw_surface(&scratch, 255);
            }
            Self::ColorBars => {
                debug!("Compositing palette bars");
                visible.draw_surface(&layer, 255);
            }
        }
        Ok(())
    }

    /// Source alpha-masked by `mask` luminance, on a scratch copy
    pub fn reveal(source: &Surface, mask: &Surface) -> Surface {
        let mut scratch = source.clone();
        scratch.apply_mask(mask);
        scratch
    }
}
