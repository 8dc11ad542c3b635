//! # Glitch Effect Pipeline
//!
//! The three stages of a glitch render, in the order they run:
//!
//! - **Streaks**: randomized bars tiling the canvas width, with
//!   exponentially growing widths (or fixed-width palette bars)
//! - **Compositor**: merges the streak layer with the canvas, either as a
//!   blurred halo, an alpha mask, or opaque bars
//! - **Displacer**: shifts thin pixel bands to fake a torn signal
//!
//! ## Usage
//!
//! ```rust,no_run
//! use glitch_compositor::glitch::{EffectParams, PixelDisplacer, StreakGenerator};
//! use glitch_compositor::surface::{Surface, BLACK};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn main() -> glitch_compositor::Result<()> {
//! let params = EffectParams::default();
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut canvas = Surface::new_filled(640, 480, [200, 200, 200]);
//!
//! let streaks = StreakGenerator::new(&params)?;
//! let base = streaks.draw_growth_base(&mut rng);
//! streaks.paint(&mut canvas, base, BLACK, &mut rng)?;
//!
//! PixelDisplacer::new(&params)?.apply(&mut canvas, &mut rng);
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod displacer;
pub mod params;
pub mod streaks;

pub use compositor::{Compositor, EffectVariant};
pub use displacer::{Axis, DisplacementOp, DisplacementReport, PixelDisplacer};
pub use params::{parse_hex_color, BarParams, EffectParams, HaloParams, MaskLayout, MaskParams};
pub use streaks::{Streak, StreakGenerator, MAX_STREAKS_PER_PASS};
