//! # Raster Surfaces
//!
//! RGBA drawing surfaces and source image loading. Every render owns its
//! surfaces; none outlive a single render call.

pub mod loader;
pub mod types;

pub use loader::{CanvasPolicy, SourceImage};
pub use types::{Surface, BLACK, WHITE};
