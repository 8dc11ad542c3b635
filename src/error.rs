use thiserror::Error;

use crate::glitch::EffectVariant;

/// Main error type for the Glitch-Compositor library
#[derive(Error, Debug)]
pub enum GlitchError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Source image errors. Always raised before any surface exists.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to load image file: {path} ({reason})")]
    LoadFailed { path: String, reason: String },

    #[error("Image has no pixels: {path}")]
    EmptyImage { path: String },
}

/// Effect parameters that would make generation undefined or non-terminating
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("Invalid parameter: {key} = {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Streak growth base {base} must be finite and greater than 1")]
    NonTerminating { base: f32 },

    #[error("Streak pass exceeded {limit} streaks")]
    StreakLimit { limit: usize },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown effect variant: {name}")]
    UnknownVariant { name: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using GlitchError
pub type Result<T> = std::result::Result<T, GlitchError>;

impl ParameterError {
    pub(crate) fn invalid<K: Into<String>, V: ToString, R: Into<String>>(
        key: K,
        value: V,
        reason: R,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl GlitchError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    ///
    /// Renders are stateless, so only failures caused by the environment are
    /// worth retrying. Bad parameters fail the same way every time.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Asset(AssetError::LoadFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Asset(AssetError::LoadFailed { path, .. }) => {
                format!(
                    "Could not load image '{}'. Please check the file exists and is a PNG or JPEG.",
                    path
                )
            }
            Self::Config(ConfigError::UnknownVariant { name }) => {
                format!(
                    "Effect variant '{}' not found. Available variants: {}",
                    name,
                    EffectVariant::ALL.map(|v| v.name()).join(", ")
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_errors_are_recoverable() {
        let err: GlitchError = AssetError::LoadFailed {
            path: "missing.png".to_string(),
            reason: "not found".to_string(),
        }
        .into();
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("missing.png"));
    }

    #[test]
    fn test_parameter_errors_are_permanent() {
        let err: GlitchError = ParameterError::NonTerminating { base: 1.0 }.into();
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("greater than 1"));
    }

    #[test]
    fn test_unknown_variant_lists_choices() {
        let err: GlitchError = ConfigError::UnknownVariant { name: "sepia".to_string() }.into();
        let message = err.user_message();
        assert!(message.contains("'sepia'"));
        assert!(message.ends_with("blur-halo, mask-reveal, color-bars"));
    }
}
