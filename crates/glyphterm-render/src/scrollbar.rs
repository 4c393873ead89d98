#![forbid(unsafe_code)]

//! Vertical scrollbar overlay.
//!
//! The scrollbar is a translucent rounded thumb along the right edge of the
//! raster. The track spans the raster height minus a margin of half the bar
//! width at the top and bottom; the thumb's length is proportional to the
//! visible fraction of the scrollback and its position to the scroll offset.

use crate::color::Rgb;
use crate::raster::Raster;

/// Scroll state the thumb is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollbarState {
    /// Total lines in the scrollback.
    pub line_count: usize,
    /// Lines that fit on screen.
    pub lines_on_screen: usize,
    /// Current (eased) scroll offset in lines.
    pub offset: f64,
}

impl ScrollbarState {
    pub fn new(line_count: usize, lines_on_screen: usize, offset: f64) -> Self {
        Self {
            line_count,
            lines_on_screen,
            offset,
        }
    }
}

/// Thumb placement in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbRect {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

/// Scrollbar appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrollbar {
    width: usize,
    color: Rgb,
    alpha: f32,
}

impl Default for Scrollbar {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Scrollbar {
    /// A white, half-transparent bar `width` pixels wide.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            color: Rgb::WHITE,
            alpha: 0.5,
        }
    }

    /// Set the thumb color.
    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Set the thumb opacity.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Margin between the thumb and the raster edges.
    pub fn margin(&self) -> usize {
        self.width / 2
    }

    /// Thumb rectangle for a raster of `raster_width x raster_height`, or
    /// `None` when there is no room for a track.
    pub fn thumb(
        &self,
        state: &ScrollbarState,
        raster_width: usize,
        raster_height: usize,
    ) -> Option<ThumbRect> {
        let margin = self.margin();
        if self.width == 0 || raster_width < self.width + margin {
            return None;
        }
        let track = raster_height.checked_sub(margin * 2).filter(|&t| t > 0)?;

        let visible = state.lines_on_screen as f64;
        let total = state.line_count.max(state.lines_on_screen) as f64;
        let ratio = if total > 0.0 { visible / total } else { 1.0 };
        let height = ((track as f64 * ratio) as usize).min(track);

        let max_offset = state.line_count as f64 - visible;
        let pos_ratio = if max_offset > 0.0 && state.offset.is_finite() {
            (state.offset / max_offset).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let travel = track.saturating_sub(height) as f64;
        let y = margin + (travel * pos_ratio) as usize;

        Some(ThumbRect {
            x: (raster_width - self.width - margin) as i32,
            y: y as i32,
            width: self.width,
            height,
        })
    }

    /// Composite the thumb onto `raster`.
    pub fn render(&self, state: &ScrollbarState, raster: &mut Raster) {
        let Some(thumb) = self.thumb(state, raster.width(), raster.height()) else {
            return;
        };
        raster.fill_round_rect(
            thumb.x,
            thumb.y,
            thumb.width,
            thumb.height,
            self.width as f32 / 2.0,
            self.color,
            self.alpha,
        );
    }
}
