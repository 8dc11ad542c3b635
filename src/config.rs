use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    glitch::{BarParams, EffectParams, EffectVariant, HaloParams, MaskParams},
    surface::CanvasPolicy,
};

/// Main configuration for a glitch render
///
/// Every section may be omitted from a config file; missing values take
/// the preset of the file's variant (see [`Config::for_variant`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which effect to render
    pub variant: EffectVariant,

    /// Seed for the random stream; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Streak geometry and displacement settings
    pub effect: EffectParams,

    /// Blur-halo settings
    pub halo: HaloParams,

    /// Color-bars settings
    pub bars: BarParams,

    /// Mask-reveal window layout
    pub mask: MaskParams,

    /// Canvas sizing
    pub canvas: CanvasPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_variant(EffectVariant::default())
    }
}

impl Config {
    /// Preset configuration for a variant
    pub fn for_variant(variant: EffectVariant) -> Self {
        let base = Self {
            variant,
            seed: None,
            effect: EffectParams::default(),
            halo: HaloParams::default(),
            bars: BarParams::default(),
            mask: MaskParams::default(),
            canvas: CanvasPolicy::Native,
        };

        match variant {
            EffectVariant::BlurHalo => base,
            EffectVariant::MaskReveal => Self {
                effect: EffectParams {
                    num_slices: 100,
                    max_vertical_offset: 100,
                    max_horizontal_offset: 40,
                    ..base.effect
                },
                canvas: CanvasPolicy::Fixed {
                    width: 512,
                    height: 791,
                },
                ..base
            },
            EffectVariant::ColorBars => Self {
                effect: EffectParams {
                    max_vertical_offset: 100,
                    ..base.effect
                },
                ..base
            },
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_variant(path, None)
    }

    /// Load configuration from a TOML file, optionally forcing the variant.
    ///
    /// Whatever the file leaves out comes from the forced variant's preset,
    /// so `--variant mask-reveal` with a sparse file still gets the
    /// mask-reveal canvas.
    pub fn from_file_with_variant<P: AsRef<Path>>(
        path: P,
        variant: Option<EffectVariant>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        Self::from_toml_str(&content, variant)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() }.into())
    }

    /// Parse TOML text over a variant preset.
    ///
    /// The variant is `variant` when given, else the text's own `variant`
    /// key, else the default. Sections merge key by key, except `canvas`,
    /// which replaces the preset's canvas whole.
    pub fn from_toml_str(content: &str, variant: Option<EffectVariant>) -> Result<Self> {
        let mut file: toml::Table = toml::from_str(content).map_err(invalid_toml)?;

        let file_variant = match file.remove("variant") {
            Some(value) => Some(value.try_into::<EffectVariant>().map_err(invalid_toml)?),
            None => None,
        };
        let variant = variant.or(file_variant).unwrap_or_default();

        let mut merged = match toml::Value::try_from(Self::for_variant(variant)) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => toml::Table::new(),
            Err(e) => return Err(invalid_toml(e)),
        };
        merge_tables(&mut merged, file);

        let config = toml::Value::Table(merged).try_into::<Config>().map_err(invalid_toml)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.effect.validate()?;
        self.halo.validate()?;
        match self.variant {
            EffectVariant::ColorBars => self.bars.validate()?,
            EffectVariant::MaskReveal => self.mask.validate()?,
            EffectVariant::BlurHalo => {}
        }
        self.canvas.validate()?;
        Ok(())
    }
}

fn invalid_toml<E: std::fmt::Display>(e: E) -> crate::error::GlitchError {
    ConfigError::InvalidValue {
        key: "config".to_string(),
        value: e.to_string(),
    }
    .into()
}

/// Overlay `overlay` onto `base`, recursing into sections present in both
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(section) if key != "canvas" => match base.get_mut(&key) {
                Some(toml::Value::Table(target)) => merge_tables(target, section),
                _ => {
                    base.insert(key, toml::Value::Table(section));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
