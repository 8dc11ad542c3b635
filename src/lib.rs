//! # Glitch-Compositor
//!
//! Procedural "data glitch" effects over still images: randomized streaks,
//! a blurred halo pass, and torn-scanline pixel displacement.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glitch_compositor::{Config, GlitchEngine};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn main() -> glitch_compositor::Result<()> {
//! let engine = GlitchEngine::new(Config::default())?;
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let frame = engine.render_file("photo.jpg", &mut rng)?;
//! frame.save_png("glitched.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`surface`] - RGBA surfaces and source image loading
//! - [`glitch`] - Streak generation, compositing and pixel displacement
//! - [`render`] - The render engine tying the stages together
//! - [`config`] - Configuration management
//!
//! All randomness comes from the `rand::Rng` handle passed into a render, so
//! a seeded generator reproduces the same frame.

pub mod config;
pub mod error;
pub mod glitch;
pub mod render;
pub mod surface;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{GlitchError, Result},
    glitch::{EffectParams, EffectVariant},
    render::GlitchEngine,
    surface::{SourceImage, Surface},
};
