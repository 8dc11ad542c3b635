use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    glitch::{
        Compositor, DisplacementReport, EffectParams, EffectVariant, MaskLayout, PixelDisplacer,
        StreakGenerator,
    },
    surface::{SourceImage, Surface},
};

/// Main render engine that turns a source image into one glitched frame
///
/// The engine follows a fixed one-way pipeline:
/// 1. Canvas - Fit the source image to the canvas policy
/// 2. Streaks - Draw the variant's streak passes
/// 3. Compositing - Merge the streak layer with the canvas
/// 4. Displacement - Tear the finished canvas with band shifts
///
/// Color bars swap steps 3 and 4: the bar layer is torn before it lands on
/// the canvas, so the source between bars stays intact.
pub struct GlitchEngine {
    config: Config,
    compositor: Compositor,
    streaks: StreakGenerator,
    displacer: PixelDisplacer,
}

impl GlitchEngine {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let compositor = Compositor::new(config.variant, &config.halo);
        let streak_params = match compositor.streak_alpha_override() {
            Some(alpha_range) => EffectParams {
                alpha_range,
                ..config.effect.clone()
            },
            None => config.effect.clone(),
        };
        let streaks = StreakGenerator::new(&streak_params)?;
        let displacer = PixelDisplacer::new(&config.effect)?;

        Ok(Self {
            config,
            compositor,
            streaks,
            displacer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn variant(&self) -> EffectVariant {
        self.compositor.variant()
    }

    /// Decode the source image. Fails before any surface is created.
    pub fn load_source<P: AsRef<Path>>(&self, path: P) -> Result<SourceImage> {
        SourceImage::open(path)
    }

    /// Load `path` and render it
    pub fn render_file<P, R>(&self, path: P, rng: &mut R) -> Result<Surface>
    where
        P: AsRef<Path>,
        R: Rng + ?Sized,
    {
        let source = self.load_source(path)?;
        self.render(&source, rng)
    }

    /// Render one glitched frame from a loaded source
    pub fn render<R: Rng + ?Sized>(&self, source: &SourceImage, rng: &mut R) -> Result<Surface> {
        info!(
            "Rendering {} glitch over {}x{} source",
            self.variant(),
            source.width(),
            source.height()
        );

        // Pipeline Step 1: Canvas
        let fitted = source.fit_canvas(self.config.canvas);
        let (width, height) = (fitted.width(), fitted.height());
        debug!("Canvas is {}x{}", width, height);

        // Pipeline Step 2: Streaks
        let mut layer = self.compositor.streak_layer(width, height);
        let mut visible = fitted.clone();
        self.draw_streaks(&mut layer, &mut visible, rng)?;

        // Pipeline Steps 3 and 4: Compositing and Displacement
        let report = match self.compositor {
            Compositor::ColorBars => {
                let report = self.displace(&mut layer, rng);
                self.compositor.compose(layer, &fitted, &mut visible)?;
                report
            }
            _ => {
                self.compositor.compose(layer, &fitted, &mut visible)?;
                self.displace(&mut visible, rng)
            }
        };

        info!(
            "Render complete: {} vertical / {} horizontal band shifts",
            report.vertical_ops, report.horizontal_ops
        );
        Ok(visible)
    }

    fn draw_streaks<R: Rng + ?Sized>(
        &self,
        layer: &mut Surface,
        visible: &mut Surface,
        rng: &mut R,
    ) -> Result<()> {
        match self.compositor {
            Compositor::BlurHalo { .. } => {
                // Both passes share the growth base so the halo lines up
                // horizontally with the sharp bars; heights and offsets differ.
                let base = self.streaks.draw_growth_base(rng);
                let color = self.compositor.streak_color();
                let halo_count = self.streaks.paint(layer, base, color, rng)?;
                let sharp_count = self.streaks.paint(visible, base, color, rng)?;
                debug!(
                    "Drew {} halo streaks and {} sharp streaks (base {:.3})",
                    halo_count, sharp_count, base
                );
            }
            Compositor::MaskReveal => {
                let color = self.compositor.streak_color();
                match self.config.mask.layout {
                    MaskLayout::Tiled => {
                        let base = self.streaks.draw_growth_base(rng);
                        let count = self.streaks.paint(layer, base, color, rng)?;
                        debug!("Drew {} mask streaks (base {:.3})", count, base);
                    }
                    MaskLayout::Windows => {
                        let count =
                            self.streaks.paint_windows(layer, &self.config.mask, color, rng)?;
                        debug!("Drew {} mask windows", count);
                    }
                }
            }
            Compositor::ColorBars => {
                let count = StreakGenerator::paint_bars(layer, &self.config.bars, rng)?;
                debug!("Drew {} palette bars", count);
            }
        }
        Ok(())
    }

    fn displace<R: Rng + ?Sized>(&self, target: &mut Surface, rng: &mut R) -> DisplacementReport {
        self.displacer.apply(target, rng)
    }
}
