use rand::Rng;
use tracing::debug;

use crate::{
    error::{ParameterError, Result},
    glitch::params::{BarParams, EffectParams, MaskParams},
    surface::Surface,
};

/// Hard ceiling on streaks in a single pass.
///
/// A growth base barely above 1 eventually stops moving the cursor once
/// `x + step == x` in f32, so the loop needs a bound besides `x < width`.
pub const MAX_STREAKS_PER_PASS: usize = 100_000;

/// One rectangle of a streak pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    pub x: f32,
    pub width: f32,
    pub y: f32,
    pub height: f32,
    pub color: [u8; 3],
    pub alpha: u8,
}

impl Streak {
    /// Right edge of the streak; the next streak's `x`
    pub fn end(&self) -> f32 {
        self.x + self.width
    }

    pub fn draw(&self, surface: &mut Surface) -> usize {
        surface.fill_rect(self.x, self.y, self.width, self.height, self.color, self.alpha)
    }
}

/// Generates exponentially widening streaks that tile a surface's width
#[derive(Debug, Clone)]
pub struct StreakGenerator {
    min_width: f32,
    max_width: f32,
    min_height_frac: f32,
    max_height_frac: f32,
    growth_base_range: (f32, f32),
    alpha_range: (u8, u8),
    overshoot: f32,
}

impl StreakGenerator {
    pub fn new(params: &EffectParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            min_width: params.min_streak_width,
            max_width: params.max_streak_width,
            min_height_frac: params.min_streak_height_frac,
            max_height_frac: params.max_streak_height_frac,
            growth_base_range: params.growth_base_range,
            alpha_range: params.alpha_range,
            overshoot: params.streak_overshoot,
        })
    }

    /// Range the growth base is actually drawn from.
    ///
    /// The upper end is capped at `max_width / min_width` but never pushed
    /// below the lower end, so the base stays above 1.
    pub fn growth_base_bounds(&self) -> (f32, f32) {
        let (lo, hi) = self.growth_base_range;
        let cap = self.max_width / self.min_width;
        (lo, hi.min(cap).max(lo))
    }

    pub fn draw_growth_base<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = self.growth_base_bounds();
        rng.gen_range(lo..=hi)
    }

    /// Lay out one pass of streaks across a `width`×`height` surface.
    ///
    /// Fails fast when `base` cannot make the cursor advance.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        width: u32,
        height: u32,
        base: f32,
        color: [u8; 3],
        rng: &mut R,
    ) -> Result<Vec<Streak>> {
        if !(base.is_finite() && base > 1.0) {
            return Err(ParameterError::NonTerminating { base }.into());
        }

        let surface_w = width as f32;
        let surface_h = height as f32;
        let height_range = (surface_h * self.min_height_frac)..=(surface_h * self.max_height_frac);
        let (alpha_lo, alpha_hi) = self.alpha_range;

        let mut streaks = Vec::new();
        let mut x = 0.0f32;
        let mut n = 0i32;

        while x < surface_w {
            if streaks.len() >= MAX_STREAKS_PER_PASS {
                return Err(ParameterError::StreakLimit {
                    limit: MAX_STREAKS_PER_PASS,
                }
                .into());
            }

            let step = self.min_width * base.powi(n);
            let streak_height = rng.gen_range(height_range.clone());
            let y = rng.gen_range(-self.overshoot..=surface_h);
            let alpha = rng.gen_range(alpha_lo..=alpha_hi);

            streaks.push(Streak {
                x,
                width: step,
                y,
                height: streak_height,
                color,
                alpha,
            });

            x += step;
            n += 1;
        }

        debug!("Generated {} streaks (base {:.3}) across {}px", streaks.len(), base, width);
        Ok(streaks)
    }

    /// Generate one pass and rasterize it into `surface`
    pub fn paint<R: Rng + ?Sized>(
        &self,
        surface: &mut Surface,
        base: f32,
        color: [u8; 3],
        rng: &mut R,
    ) -> Result<usize> {
        let streaks = self.generate(surface.width(), surface.height(), base, color, rng)?;
        for streak in &streaks {
            streak.draw(surface);
        }
        Ok(streaks.len())
    }

    /// Lay out thin opaque mask windows separated by random gaps.
    ///
    /// Heights and y-starts follow the same ranges as [`generate`](Self::generate);
    /// widths and cursor steps come from `mask`, so windows may overlap or
    /// leave black gaps.
    pub fn generate_windows<R: Rng + ?Sized>(
        &self,
        width: u32,
        height: u32,
        mask: &MaskParams,
        color: [u8; 3],
        rng: &mut R,
    ) -> Result<Vec<Streak>> {
        mask.validate()?;

        let surface_w = width as f32;
        let surface_h = height as f32;
        let height_range = (surface_h * self.min_height_frac)..=(surface_h * self.max_height_frac);

        let mut streaks = Vec::new();
        let mut x = 0.0f32;

        while x < surface_w {
            if streaks.len() >= MAX_STREAKS_PER_PASS {
                return Err(ParameterError::StreakLimit {
                    limit: MAX_STREAKS_PER_PASS,
                }
                .into());
            }

            let streak_height = rng.gen_range(height_range.clone());
            let y = rng.gen_range(-self.overshoot..=surface_h);
            let window = rng.gen_range(mask.min_window_width..=mask.max_window_width);

            streaks.push(Streak {
                x,
                width: window,
                y,
                height: streak_height,
                color,
                alpha: 255,
            });

            x += rng.gen_range(mask.min_step..=mask.max_step);
        }

        debug!("Generated {} mask windows across {}px", streaks.len(), width);
        Ok(streaks)
    }

    pub fn paint_windows<R: Rng + ?Sized>(
        &self,
        surface: &mut Surface,
        mask: &MaskParams,
        color: [u8; 3],
        rng: &mut R,
    ) -> Result<usize> {
        let streaks = self.generate_windows(surface.width(), surface.height(), mask, color, rng)?;
        for streak in &streaks {
            streak.draw(surface);
        }
        Ok(streaks.len())
    }

    /// Lay out fixed-width palette bars separated by random gaps
    pub fn generate_bars<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        bars: &BarParams,
        rng: &mut R,
    ) -> Result<Vec<Streak>> {
        bars.validate()?;
        let palette = bars.colors()?;

        let bar_height = ((height as f32 * bars.height_ratio) as u32).min(height);
        let mut streaks = Vec::new();
        let mut x = 0u32;

        while x < width {
            let y = rng.gen_range(0..=height - bar_height);
            let color = palette[rng.gen_range(0..palette.len())];

            streaks.push(Streak {
                x: x as f32,
                width: bars.bar_width as f32,
                y: y as f32,
                height: bar_height as f32,
                color,
                alpha: 255,
            });

            x += bars.bar_width + rng.gen_range(bars.min_spacing..=bars.max_spacing);
        }

        debug!("Generated {} palette bars across {}px", streaks.len(), width);
        Ok(streaks)
    }

    pub fn paint_bars<R: Rng + ?Sized>(
        surface: &mut Surface,
        bars: &BarParams,
        rng: &mut R,
    ) -> Result<usize> {
        let streaks = Self::generate_bars(surface.width(), surface.height(), bars, rng)?;
        for streak in &streaks {
            streak.draw(surface);
        }
        Ok(streaks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glitch::params::MaskLayout;
    use crate::surface::{BLACK, WHITE};
    use rand::{rngs::StdRng, SeedableRng};

    fn generator() -> StreakGenerator {
        StreakGenerator::new(&EffectParams::default()).unwrap()
    }

    #[test]
    fn test_streaks_tile_width_without_gaps() {
        let mut rng = StdRng::seed_from_u64(7);
        let gen = generator();

        for &width in &[1u32, 17, 100, 640, 1920] {
            let base = gen.draw_growth_base(&mut rng);
            let streaks = gen.generate(width, 300, base, BLACK, &mut rng).unwrap();

            assert_eq!(streaks[0].x, 0.0);
            for pair in streaks.windows(2) {
                assert!(pair[1].x > pair[0].x);
                assert_eq!(pair[1].x, pair[0].end());
            }
            let last = streaks.last().unwrap();
            assert!(last.x < width as f32);
            assert!(last.end() >= width as f32);
        }
    }

    #[test]
    fn test_iteration_count_is_logarithmic() {
        let mut rng = StdRng::seed_from_u64(11);
        let gen = generator();
        let min_width = EffectParams::default().min_streak_width;

        for &base in &[1.05f32, 1.1, 1.25] {
            for &width in &[2u32, 50, 1000, 4096] {
                let streaks = gen.generate(width, 100, base, BLACK, &mut rng).unwrap();
                let bound = ((width as f32 / min_width).ln() / base.ln()).ceil() as usize + 1;
                assert!(
                    streaks.len() <= bound.max(1),
                    "{} streaks for width {} base {} (bound {})",
                    streaks.len(),
                    width,
                    base,
                    bound
                );
            }
        }
    }

    #[test]
    fn test_alpha_and_height_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = EffectParams {
            min_streak_height_frac: 0.25,
            max_streak_height_frac: 0.5,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();
        let height = 400u32;

        for _ in 0..20 {
            let base = gen.draw_growth_base(&mut rng);
            for streak in gen.generate(800, height, base, BLACK, &mut rng).unwrap() {
                assert!((150..=255).contains(&streak.alpha));
                assert!(streak.height >= height as f32 * 0.25);
                assert!(streak.height <= height as f32 * 0.5);
                assert!(streak.y >= -100.0 && streak.y <= height as f32);
            }
        }
    }

    #[test]
    fn test_base_at_or_below_one_fails_fast() {
        let mut rng = StdRng::seed_from_u64(1);
        let gen = generator();

        for &base in &[1.0f32, 0.5, -2.0, f32::NAN, f32::INFINITY] {
            let result = gen.generate(100, 100, base, BLACK, &mut rng);
            assert!(matches!(
                result,
                Err(crate::error::GlitchError::Parameter(ParameterError::NonTerminating { .. }))
            ));
        }
    }

    #[test]
    fn test_stalled_cursor_hits_streak_limit() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = EffectParams {
            min_streak_width: 0.001,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();

        let result = gen.generate(u32::MAX, 10, 1.000_000_1, BLACK, &mut rng);
        assert!(matches!(
            result,
            Err(crate::error::GlitchError::Parameter(ParameterError::StreakLimit { .. }))
        ));
    }

    #[test]
    fn test_max_width_caps_growth_base() {
        let params = EffectParams {
            min_streak_width: 4.0,
            max_streak_width: 4.4,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();
        let (lo, hi) = gen.growth_base_bounds();
        assert_eq!(lo, 1.05);
        assert_eq!(hi, 1.1);

        let tight = StreakGenerator::new(&EffectParams {
            min_streak_width: 4.0,
            max_streak_width: 4.0,
            ..EffectParams::default()
        })
        .unwrap();
        assert_eq!(tight.growth_base_bounds(), (1.05, 1.05));

        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(tight.draw_growth_base(&mut rng), 1.05);
    }

    #[test]
    fn test_single_wide_streak_covers_surface() {
        let mut rng = StdRng::seed_from_u64(9);
        let params = EffectParams {
            min_streak_width: 100.0,
            max_streak_width: 200.0,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();
        let streaks = gen.generate(100, 100, 1.1, BLACK, &mut rng).unwrap();

        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].width, 100.0);
    }

    #[test]
    fn test_paint_draws_black_pixels() {
        let mut rng = StdRng::seed_from_u64(21);
        let params = EffectParams {
            min_streak_height_frac: 1.0,
            max_streak_height_frac: 1.0,
            alpha_range: (255, 255),
            streak_overshoot: 0.0,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();
        let mut surface = Surface::new_transparent(50, 20);

        let count = gen.paint(&mut surface, 1.2, BLACK, &mut rng).unwrap();
        assert!(count > 1);

        let pixels: Vec<[u8; 4]> = surface.as_image().pixels().map(|p| p.0).collect();
        assert!(pixels.iter().all(|p| *p == [0, 0, 0, 0] || *p == [0, 0, 0, 255]));
        assert!(pixels.iter().any(|p| *p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_bars_use_palette_and_spacing() {
        let mut rng = StdRng::seed_from_u64(13);
        let bars = BarParams::default();
        let palette = bars.colors().unwrap();

        let streaks = StreakGenerator::generate_bars(300, 100, &bars, &mut rng).unwrap();
        assert!(!streaks.is_empty());

        for pair in streaks.windows(2) {
            let gap = pair[1].x - pair[0].end();
            assert!(gap >= bars.min_spacing as f32 && gap <= bars.max_spacing as f32);
        }
        for streak in &streaks {
            assert!(palette.contains(&streak.color));
            assert_eq!(streak.height, 60.0);
            assert!(streak.y >= 0.0 && streak.y + streak.height <= 100.0);
            assert_eq!(streak.alpha, 255);
        }
    }

    #[test]
    fn test_mask_windows_leave_gaps() {
        let mut rng = StdRng::seed_from_u64(17);
        let gen = generator();
        let mask = MaskParams {
            layout: MaskLayout::Windows,
            ..MaskParams::default()
        };

        let windows = gen.generate_windows(400, 200, &mask, WHITE, &mut rng).unwrap();
        assert!(windows.len() >= 400 / 8);
        assert_eq!(windows[0].x, 0.0);

        for pair in windows.windows(2) {
            let step = pair[1].x - pair[0].x;
            assert!(step >= mask.min_step - 1e-3 && step <= mask.max_step + 1e-3);
        }
        for window in &windows {
            assert!(window.x < 400.0);
            assert!(window.width >= 1.0 && window.width <= 4.0);
            assert!(window.height >= 60.0 && window.height <= 200.0);
            assert!(window.y >= -100.0 && window.y <= 200.0);
            assert_eq!(window.alpha, 255);
            assert_eq!(window.color, WHITE);
        }
        // Steps up to 8px against windows at most 4px wide leave gaps.
        assert!(windows.windows(2).any(|pair| pair[1].x > pair[0].end()));
    }

    #[test]
    fn test_paint_windows_on_black_mask() {
        let mut rng = StdRng::seed_from_u64(4);
        let params = EffectParams {
            min_streak_height_frac: 1.0,
            max_streak_height_frac: 1.0,
            streak_overshoot: 0.0,
            ..EffectParams::default()
        };
        let gen = StreakGenerator::new(&params).unwrap();
        let mask = MaskParams {
            min_step: 6.0,
            max_step: 6.0,
            min_window_width: 2.0,
            max_window_width: 2.0,
            ..MaskParams::default()
        };
        let mut surface = Surface::new_filled(30, 10, BLACK);

        assert_eq!(gen.paint_windows(&mut surface, &mask, WHITE, &mut rng).unwrap(), 5);
        // Windows sit at 0, 6, 12, 18, 24; the gaps between them stay black.
        let lit = |x: u32| (0..10).any(|y| surface.get_pixel(x, y) == [255, 255, 255, 255]);
        for x in (0..30u32).filter(|x| x % 6 >= 2) {
            assert!(!lit(x), "gap column {} was painted", x);
        }
        assert!((0..30u32).any(lit));
    }
}
