#![forbid(unsafe_code)]

//! Styled glyphs.

use glyphterm_render::Rgb;

use crate::effect::Effect;

/// Per-tick derived state of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Appearance {
    pub color: Rgb,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// One character with its effect instance and derived appearance.
///
/// Character, effect configuration and inversion are fixed at construction;
/// only the effect's internal state and the [`Appearance`] change as the
/// glyph is updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    ch: char,
    effect: Effect,
    invert: bool,
    look: Appearance,
}

impl Glyph {
    pub fn new(ch: char, effect: Effect, invert: bool) -> Self {
        Self {
            ch,
            effect,
            invert,
            look: Appearance::default(),
        }
    }

    /// Glyphs for every character of `text`, each with a fresh copy of `effect`.
    pub fn run(text: &str, effect: &Effect, invert: bool) -> Vec<Glyph> {
        text.chars()
            .map(|ch| Glyph::new(ch, effect.fresh(), invert))
            .collect()
    }

    #[inline]
    pub fn ch(&self) -> char {
        self.ch
    }

    #[inline]
    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    #[inline]
    pub fn appearance(&self) -> Appearance {
        self.look
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.look.color
    }

    /// `(offset_x, offset_y)` in pixels.
    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        (self.look.offset_x, self.look.offset_y)
    }

    /// Newlines and tabs only move the layout cursor.
    #[inline]
    pub fn is_layout(&self) -> bool {
        matches!(self.ch, '\n' | '\t')
    }

    /// Advance the effect by `delta` ticks.
    #[inline]
    pub fn update(&mut self, delta: f64) {
        self.effect.apply(&mut self.look, delta);
    }
}
