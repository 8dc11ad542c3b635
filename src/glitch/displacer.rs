use rand::Rng;
use tracing::debug;

use crate::{error::Result, glitch::params::EffectParams, surface::Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Full-height column band shifted up or down
    Vertical,
    /// Full-width row band shifted left or right
    Horizontal,
}

/// One band shift. Applied immediately, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplacementOp {
    pub axis: Axis,
    /// Column (vertical) or row (horizontal) where the band starts
    pub origin: u32,
    pub thickness: u32,
    /// Shift along the band's length
    pub offset: i32,
}

impl DisplacementOp {
    /// Copy the band onto itself shifted by `offset`; returns pixels written
    pub fn apply(&self, surface: &mut Surface) -> usize {
        let origin = self.origin as i64;
        let offset = self.offset as i64;
        let (width, height) = (surface.width(), surface.height());

        match self.axis {
            Axis::Vertical => {
                surface.copy_region(origin, 0, self.thickness, height, origin, offset)
            }
            Axis::Horizontal => {
                surface.copy_region(0, origin, width, self.thickness, offset, origin)
            }
        }
    }
}

/// Summary of one displacement batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplacementReport {
    pub vertical_ops: u32,
    pub horizontal_ops: u32,
    pub pixels_written: usize,
}

/// Tears the finished raster by shifting thin bands of pixels
#[derive(Debug, Clone)]
pub struct PixelDisplacer {
    vertical_slices: u32,
    horizontal_slices: u32,
    max_vertical_offset: i32,
    max_horizontal_offset: i32,
    max_band_thickness: u32,
}

impl PixelDisplacer {
    pub fn new(params: &EffectParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            vertical_slices: params.num_slices,
            horizontal_slices: params.horizontal_slices(),
            max_vertical_offset: clamp_offset(params.max_vertical_offset),
            max_horizontal_offset: clamp_offset(params.max_horizontal_offset),
            max_band_thickness: params.max_band_thickness,
        })
    }

    /// Draw a column band op; `width` must be non-zero
    pub fn vertical_op<R: Rng + ?Sized>(&self, width: u32, rng: &mut R) -> DisplacementOp {
        DisplacementOp {
            axis: Axis::Vertical,
            origin: rng.gen_range(0..width),
            thickness: rng.gen_range(1..self.max_band_thickness),
            offset: rng.gen_range(-self.max_vertical_offset..=self.max_vertical_offset),
        }
    }

    /// Draw a row band op; `height` must be non-zero
    pub fn horizontal_op<R: Rng + ?Sized>(&self, height: u32, rng: &mut R) -> DisplacementOp {
        DisplacementOp {
            axis: Axis::Horizontal,
            origin: rng.gen_range(0..height),
            thickness: rng.gen_range(1..self.max_band_thickness),
            offset: rng.gen_range(-self.max_horizontal_offset..=self.max_horizontal_offset),
        }
    }

    /// Run the vertical pass, then the horizontal pass.
    ///
    /// Every op reads the surface as left by the previous one.
    pub fn apply<R: Rng + ?Sized>(&self, surface: &mut Surface, rng: &mut R) -> DisplacementReport {
        let (width, height) = (surface.width(), surface.height());
        let mut report = DisplacementReport::default();

        if width == 0 || height == 0 {
            return report;
        }

        for _ in 0..self.vertical_slices {
            let op = self.vertical_op(width, rng);
            report.pixels_written += op.apply(surface);
            report.vertical_ops += 1;
        }

        for _ in 0..self.horizontal_slices {
            let op = self.horizontal_op(height, rng);
            report.pixels_written += op.apply(surface);
            report.horizontal_ops += 1;
        }

        debug!(
            "Displaced {} vertical and {} horizontal bands ({} pixels)",
            report.vertical_ops, report.horizontal_ops, report.pixels_written
        );
        report
    }
}

fn clamp_offset(offset: u32) -> i32 {
    offset.min(i32::MAX as u32) as i32
}
