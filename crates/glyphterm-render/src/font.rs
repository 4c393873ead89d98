#![forbid(unsafe_code)]

//! Bitmap font contract.
//!
//! A font is a fixed-height set of glyph coverage masks. Each glyph has its
//! own advance width; coverage samples are row-major, `width * cell_height`
//! long, with values in `[0, 1]`. Characters the font does not carry render
//! as the space glyph.
//!
//! Decoding font files is left to the host; [`BitmapFont`] is built either
//! from a grayscale atlas strip or from explicit coverage samples.

use std::fmt;

/// Borrowed coverage mask for one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphCoverage<'a> {
    /// Advance width in pixels.
    pub width: usize,
    /// Row-major samples, `width * cell_height` long.
    pub coverage: &'a [f32],
}

impl GlyphCoverage<'_> {
    /// Sample at `(x, y)` inside the glyph cell, 0 outside.
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        if x >= self.width {
            return 0.0;
        }
        self.coverage.get(x + y * self.width).copied().unwrap_or(0.0)
    }
}

/// Font as seen by the renderer.
pub trait Font: Send + Sync {
    /// Height of every glyph cell in pixels.
    fn cell_height(&self) -> usize;

    /// Coverage for `ch`, falling back to the space glyph.
    fn glyph(&self, ch: char) -> GlyphCoverage<'_>;

    /// Advance width of `ch` in pixels.
    fn width_of(&self, ch: char) -> usize {
        self.glyph(ch).width
    }

    /// Total width of `chars` laid out with `spacing` pixels between glyphs.
    fn width_of_chars(&self, chars: &[char], spacing: usize) -> usize {
        let glyphs: usize = chars.iter().map(|&c| self.width_of(c)).sum();
        glyphs + spacing * chars.len().saturating_sub(1)
    }

    /// Total width of `text` laid out with `spacing` pixels between glyphs.
    fn width_of_str(&self, text: &str, spacing: usize) -> usize {
        let mut count = 0usize;
        let mut glyphs = 0usize;
        for ch in text.chars() {
            glyphs += self.width_of(ch);
            count += 1;
        }
        glyphs + spacing * count.saturating_sub(1)
    }
}

/// Errors raised while assembling a [`BitmapFont`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// The font has no glyphs or zero cell height.
    Empty,
    /// The glyph range does not include the space fallback.
    MissingSpace,
    /// The glyph range runs past the last Unicode scalar value.
    RangeOverflow,
    /// Atlas pixel count does not match `glyphs * cell_width * cell_height`.
    AtlasSize { expected: usize, actual: usize },
    /// A glyph is wider than its atlas cell.
    WidthExceedsCell { ch: char, width: usize, cell_width: usize },
    /// A glyph's coverage does not hold `width * cell_height` samples.
    CoverageSize { ch: char, expected: usize, actual: usize },
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "font has no glyphs"),
            Self::MissingSpace => write!(f, "font range does not include the space glyph"),
            Self::RangeOverflow => write!(f, "font range exceeds the unicode scalar range"),
            Self::AtlasSize { expected, actual } => {
                write!(f, "atlas holds {actual} pixels, expected {expected}")
            }
            Self::WidthExceedsCell {
                ch,
                width,
                cell_width,
            } => write!(
                f,
                "glyph {ch:?} is {width}px wide but atlas cells are {cell_width}px"
            ),
            Self::CoverageSize {
                ch,
                expected,
                actual,
            } => write!(
                f,
                "glyph {ch:?} has {actual} coverage samples, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for FontError {}

#[derive(Debug, Clone, PartialEq)]
struct GlyphData {
    width: usize,
    coverage: Vec<f32>,
}

/// A font covering a contiguous character range.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapFont {
    first: u32,
    cell_height: usize,
    glyphs: Vec<GlyphData>,
    space: usize,
}

impl BitmapFont {
    /// Slice an 8-bit grayscale atlas strip into glyphs.
    ///
    /// The strip is `widths.len() * cell_width` pixels wide and
    /// `cell_height` tall; glyph `i` (character `first_char + i`) occupies
    /// the leftmost `widths[i]` columns of cell `i`. Pixel values map to
    /// coverage as `value / 255`.
    pub fn from_atlas(
        first_char: char,
        cell_width: usize,
        cell_height: usize,
        widths: &[usize],
        pixels: &[u8],
    ) -> Result<Self, FontError> {
        if widths.is_empty() || cell_height == 0 {
            return Err(FontError::Empty);
        }
        let stride = widths.len() * cell_width;
        let expected = stride * cell_height;
        if pixels.len() != expected {
            return Err(FontError::AtlasSize {
                expected,
                actual: pixels.len(),
            });
        }

        let mut glyphs = Vec::with_capacity(widths.len());
        for (i, &width) in widths.iter().enumerate() {
            if width > cell_width {
                return Err(FontError::WidthExceedsCell {
                    ch: char_at(first_char, i)?,
                    width,
                    cell_width,
                });
            }
            let left = i * cell_width;
            let mut coverage = Vec::with_capacity(width * cell_height);
            for row in 0..cell_height {
                let start = row * stride + left;
                coverage.extend(
                    pixels[start..start + width]
                        .iter()
                        .map(|&p| f32::from(p) / 255.0),
                );
            }
            glyphs.push(GlyphData { width, coverage });
        }

        let font = Self::assemble(first_char, cell_height, glyphs)?;
        glyphterm_core::debug!(
            first = ?first_char,
            glyphs = font.glyphs.len(),
            cell_height,
            "font sliced from atlas"
        );
        Ok(font)
    }

    /// Build a font from explicit `(width, coverage)` pairs for consecutive
    /// characters starting at `first_char`.
    pub fn from_glyphs(
        first_char: char,
        cell_height: usize,
        glyphs: Vec<(usize, Vec<f32>)>,
    ) -> Result<Self, FontError> {
        if glyphs.is_empty() || cell_height == 0 {
            return Err(FontError::Empty);
        }
        let mut data = Vec::with_capacity(glyphs.len());
        for (i, (width, coverage)) in glyphs.into_iter().enumerate() {
            let expected = width * cell_height;
            if coverage.len() != expected {
                return Err(FontError::CoverageSize {
                    ch: char_at(first_char, i)?,
                    expected,
                    actual: coverage.len(),
                });
            }
            let coverage = coverage.into_iter().map(|v| v.clamp(0.0, 1.0)).collect();
            data.push(GlyphData { width, coverage });
        }
        Self::assemble(first_char, cell_height, data)
    }

    fn assemble(
        first_char: char,
        cell_height: usize,
        glyphs: Vec<GlyphData>,
    ) -> Result<Self, FontError> {
        let first = first_char as u32;
        let last = first
            .checked_add(glyphs.len() as u32 - 1)
            .filter(|&last| last <= char::MAX as u32)
            .ok_or(FontError::RangeOverflow)?;
        let space = ' ' as u32;
        if space < first || space > last {
            return Err(FontError::MissingSpace);
        }
        Ok(Self {
            first,
            cell_height,
            glyphs,
            space: (space - first) as usize,
        })
    }

    /// First character carried by the font.
    pub fn first_char(&self) -> char {
        char::from_u32(self.first).unwrap_or(' ')
    }

    /// Number of glyphs in the range.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Whether `ch` has its own glyph (rather than the space fallback).
    pub fn contains(&self, ch: char) -> bool {
        self.index_of(ch).is_some()
    }

    #[inline]
    fn index_of(&self, ch: char) -> Option<usize> {
        let code = (ch as u32).checked_sub(self.first)? as usize;
        (code < self.glyphs.len()).then_some(code)
    }
}

impl Font for BitmapFont {
    fn cell_height(&self) -> usize {
        self.cell_height
    }

    fn glyph(&self, ch: char) -> GlyphCoverage<'_> {
        let data = &self.glyphs[self.index_of(ch).unwrap_or(self.space)];
        GlyphCoverage {
            width: data.width,
            coverage: &data.coverage,
        }
    }
}

fn char_at(first: char, offset: usize) -> Result<char, FontError> {
    (first as u32)
        .checked_add(offset as u32)
        .and_then(char::from_u32)
        .ok_or(FontError::RangeOverflow)
}
