use std::path::{Path, PathBuf};

use image::{imageops, imageops::FilterType, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AssetError, ConfigError, Result};
use crate::surface::types::Surface;

/// How the render canvas is sized relative to the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CanvasPolicy {
    /// Canvas takes the source image's own dimensions
    Native,
    /// Source is resampled into a caller-fixed canvas
    Fixed { width: u32, height: u32 },
}

impl Default for CanvasPolicy {
    fn default() -> Self {
        Self::Native
    }
}

impl CanvasPolicy {
    /// Canvas dimensions for a source of the given size
    pub fn dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match *self {
            Self::Native => (source_width, source_height),
            Self::Fixed { width, height } => (width, height),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Self::Fixed { width, height } = *self {
            if width == 0 || height == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "canvas.size".to_string(),
                    value: format!("{}x{}", width, height),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// A decoded source image, ready to be fitted onto a canvas
///
/// Holding one of these is proof the asset loaded; a render cannot be
/// started without it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: RgbaImage,
    origin: Option<PathBuf>,
}

impl SourceImage {
    /// Decode an image file (PNG or JPEG)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let decoded = image::open(path).map_err(|e| AssetError::LoadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        let image = decoded.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(AssetError::EmptyImage { path: path_str }.into());
        }

        info!("Loaded source image {:?} ({}x{})", path, image.width(), image.height());
        Ok(Self {
            image,
            origin: Some(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory image
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AssetError::EmptyImage {
                path: "<memory>".to_string(),
            }
            .into());
        }
        Ok(Self { image, origin: None })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Produce a fresh surface holding the source fitted to the canvas
    pub fn fit_canvas(&self, policy: CanvasPolicy) -> Surface {
        let (width, height) = policy.dimensions(self.width(), self.height());

        if (width, height) == (self.width(), self.height()) {
            return Surface::new(self.image.clone());
        }

        debug!(
            "Resampling source {}x{} into {}x{} canvas",
            self.width(),
            self.height(),
            width,
            height
        );
        Surface::new(imageops::resize(&self.image, width, height, FilterType::Triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_asset_error() {
        let err = SourceImage::open("definitely/not/here.png").unwrap_err();
        assert!(matches!(
            err,
            crate::error::GlitchError::Asset(AssetError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_is_asset_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();

        assert!(SourceImage::open(&path).is_err());
    }

    #[test]
    fn test_png_round_trip_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.png");
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();

        let source = SourceImage::open(&path).unwrap();
        assert_eq!((source.width(), source.height()), (3, 2));
        assert_eq!(source.origin(), Some(path.as_path()));
    }

    #[test]
    fn test_fit_canvas_policies() {
        let pixels = RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255]));
        let source = SourceImage::from_image(pixels).unwrap();

        let native = source.fit_canvas(CanvasPolicy::Native);
        assert_eq!((native.width(), native.height()), (8, 4));

        let fixed = source.fit_canvas(CanvasPolicy::Fixed { width: 5, height: 9 });
        assert_eq!((fixed.width(), fixed.height()), (5, 9));
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(SourceImage::from_image(RgbaImage::new(0, 3)).is_err());
        assert!(CanvasPolicy::Fixed { width: 0, height: 10 }.validate().is_err());
    }
}
