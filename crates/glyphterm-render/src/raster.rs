#![forbid(unsafe_code)]

//! Flat RGB pixel buffer with alpha-blended writes.
//!
//! The raster is allocated once per surface size and never grows; every
//! drawing operation clips against its bounds and silently drops pixels that
//! fall outside. Coordinates are signed because glyph layout can start above
//! the visible area when the view is scrolled.

use crate::color::Rgb;

/// Row-major pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Create a raster filled with pure black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::ZERO; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Row-major pixels, `width * height` long.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// One row of pixels. Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[Rgb] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(x + y * self.width)
        } else {
            None
        }
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Pixel at `(x, y)`, or [`Rgb::ZERO`] outside the raster.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Rgb {
        self.index(x, y).map_or(Rgb::ZERO, |i| self.pixels[i])
    }

    /// Blend `color` into `(x, y)` with coverage `alpha`.
    ///
    /// `alpha <= 0` is a no-op, `alpha >= 1` overwrites, anything between
    /// blends linearly per channel.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if alpha.is_nan() || alpha <= 0.0 {
            return;
        }
        let Some(i) = self.index(x, y) else {
            return;
        };
        self.pixels[i] = if alpha >= 1.0 {
            color
        } else {
            color.blend_over(self.pixels[i], alpha)
        };
    }

    /// Replace every pixel `p` in the rectangle with `0xFFFFFF - p`.
    pub fn invert_rect(&mut self, x: i32, y: i32, w: usize, h: usize) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        for yy in y0..y1 {
            let row = yy * self.width;
            for px in &mut self.pixels[row + x0..row + x1] {
                *px = px.inverse();
            }
        }
    }

    /// Stamp a glyph coverage mask with its top-left corner at `(x, y)`.
    ///
    /// `coverage` is row-major with `width` samples per row; each sample is
    /// the blend alpha for `color` (or `1 - sample` when `invert` is set).
    pub fn blit_coverage(
        &mut self,
        x: i32,
        y: i32,
        width: usize,
        coverage: &[f32],
        color: Rgb,
        invert: bool,
    ) {
        if width == 0 {
            return;
        }
        for (row, samples) in coverage.chunks_exact(width).enumerate() {
            let py = y + row as i32;
            if py < 0 || py as usize >= self.height {
                continue;
            }
            for (col, &value) in samples.iter().enumerate() {
                let alpha = if invert { 1.0 - value } else { value };
                self.put(x + col as i32, py, color, alpha);
            }
        }
    }

    /// Blend a filled rectangle with rounded corners.
    ///
    /// Corner edges are anti-aliased by scaling `alpha` with the pixel's
    /// distance to the corner arc. `radius` is clamped to half the shorter side.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_round_rect(
        &mut self,
        x: i32,
        y: i32,
        w: usize,
        h: usize,
        radius: f32,
        color: Rgb,
        alpha: f32,
    ) {
        if w == 0 || h == 0 {
            return;
        }
        let r = radius.max(0.0).min(w.min(h) as f32 / 2.0);
        let (wf, hf) = (w as f32, h as f32);
        for oy in 0..h {
            let cy = oy as f32 + 0.5;
            for ox in 0..w {
                let cx = ox as f32 + 0.5;
                // Nearest corner-circle center (only matters inside a corner box).
                let dx = if cx < r {
                    r - cx
                } else if cx > wf - r {
                    cx - (wf - r)
                } else {
                    0.0
                };
                let dy = if cy < r {
                    r - cy
                } else if cy > hf - r {
                    cy - (hf - r)
                } else {
                    0.0
                };
                let coverage = if dx > 0.0 && dy > 0.0 {
                    (r + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.put(x + ox as i32, y + oy as i32, color, alpha * coverage);
            }
        }
    }

    /// Clip a rectangle to the raster, returning `(x0, y0, x1, y1)` with
    /// exclusive upper bounds, or `None` if nothing is visible.
    fn clip(&self, x: i32, y: i32, w: usize, h: usize) -> Option<(usize, usize, usize, usize)> {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + w as i64).min(self.width as i64);
        let y1 = (i64::from(y) + h as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}
