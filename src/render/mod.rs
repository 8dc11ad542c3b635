//! # Render Engine
//!
//! Orchestrates a single glitch render from source image to final surface.

pub mod engine;

pub use engine::GlitchEngine;
