use image::{imageops, ImageBuffer, ImageFormat, Rgba, RgbaImage};

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// An RGBA raster that effects draw into
///
/// This is a thin wrapper around an RGBA image buffer that provides the
/// drawing primitives the glitch pipeline needs. All geometry is clipped
/// silently against the surface bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    buffer: RgbaImage,
}

impl Surface {
    /// Create a new surface from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a fully transparent surface
    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a surface filled with an opaque color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| {
            Rgba([color[0], color[1], color[2], 255])
        });
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Overwrite every pixel with an opaque color
    pub fn fill(&mut self, color: [u8; 3]) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgba([color[0], color[1], color[2], 255]);
        }
    }

    /// Blend a rectangle of `color` at `alpha` over the surface.
    ///
    /// Edges are rounded to the nearest pixel boundary, so rectangles that
    /// share an edge in float space share it in pixel space too. Returns the
    /// number of pixels touched after clipping.
    pub fn fill_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: [u8; 3],
        alpha: u8,
    ) -> usize {
        let (x0, x1) = pixel_span(x, width, self.width());
        let (y0, y1) = pixel_span(y, height, self.height());
        let src = [color[0], color[1], color[2], alpha];

        for py in y0..y1 {
            for px in x0..x1 {
                blend_over(self.buffer.get_pixel_mut(px, py), src, 255);
            }
        }

        (x1 - x0) as usize * (y1 - y0) as usize
    }

    /// Gaussian blur the whole surface in place, alpha included
    pub fn blur(&mut self, sigma: f32) {
        if sigma <= 0.0 {
            return;
        }
        self.buffer = imageops::blur(&self.buffer, sigma);
    }

    /// Draw `other` on top of this surface at the origin, scaling its alpha
    /// by a global `opacity`.
    pub fn draw_surface(&mut self, other: &Surface, opacity: u8) {
        let width = self.width().min(other.width());
        let height = self.height().min(other.height());

        for y in 0..height {
            for x in 0..width {
                let src = other.get_pixel(x, y);
                blend_over(self.buffer.get_pixel_mut(x, y), src, opacity);
            }
        }
    }

    /// Copy the `width`×`height` block at (`src_x`, `src_y`) to
    /// (`dst_x`, `dst_y`) within this surface.
    ///
    /// The source block is snapshotted before anything is written, so
    /// overlapping source and destination never read overwritten pixels.
    /// Source pixels outside the surface contribute nothing and destination
    /// pixels outside the surface are dropped. Returns the number of pixels
    /// written.
    pub fn copy_region(
        &mut self,
        src_x: i64,
        src_y: i64,
        width: u32,
        height: u32,
        dst_x: i64,
        dst_y: i64,
    ) -> usize {
        let surface_w = self.width() as i64;
        let surface_h = self.height() as i64;

        let sx0 = src_x.max(0);
        let sy0 = src_y.max(0);
        let sx1 = (src_x + width as i64).min(surface_w);
        let sy1 = (src_y + height as i64).min(surface_h);
        if sx0 >= sx1 || sy0 >= sy1 {
            return 0;
        }

        let snapshot: Vec<(i64, i64, Rgba<u8>)> = (sy0..sy1)
            .flat_map(|sy| (sx0..sx1).map(move |sx| (sx, sy)))
            .map(|(sx, sy)| (sx, sy, *self.buffer.get_pixel(sx as u32, sy as u32)))
            .collect();

        let mut written = 0;
        for (sx, sy, pixel) in snapshot {
            let tx = sx - src_x + dst_x;
            let ty = sy - src_y + dst_y;
            if tx < 0 || ty < 0 || tx >= surface_w || ty >= surface_h {
                continue;
            }
            self.buffer.put_pixel(tx as u32, ty as u32, pixel);
            written += 1;
        }
        written
    }

    /// Multiply this surface's alpha by the luminance of `mask`.
    ///
    /// White mask pixels keep the pixel untouched, black ones make it fully
    /// transparent. Pixels beyond the mask's extent count as black.
    pub fn apply_mask(&mut self, mask: &Surface) {
        let (mask_w, mask_h) = (mask.width(), mask.height());

        for (x, y, pixel) in self.buffer.enumerate_pixels_mut() {
            let coverage = if x < mask_w && y < mask_h {
                let m = mask.get_pixel(x, y);
                mul_div255(luminance(m), m[3])
            } else {
                0
            };
            pixel.0[3] = mul_div255(pixel.0[3], coverage);
        }
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Save the surface as a PNG file, whatever the path's extension
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, ImageFormat::Png)
    }
}

/// Rec. 601 luma, exact for pure white and pure black
pub(crate) fn luminance(pixel: [u8; 4]) -> u8 {
    let [r, g, b, _] = pixel;
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

fn pixel_span(start: f32, length: f32, limit: u32) -> (u32, u32) {
    let lo = start.round().clamp(0.0, limit as f32) as u32;
    let hi = (start + length).round().clamp(0.0, limit as f32) as u32;
    (lo, hi.max(lo))
}

/// Source-over compositing of `src` onto `dst` with a global opacity
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4], opacity: u8) {
    let src_alpha = mul_div255(src[3], opacity);
    if src_alpha == 0 {
        return;
    }
    if src_alpha == 255 {
        *dst = Rgba([src[0], src[1], src[2], 255]);
        return;
    }

    let sa = src_alpha as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_alpha = sa + da * (1.0 - sa);

    for c in 0..3 {
        let blended = (src[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_alpha;
        dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}
