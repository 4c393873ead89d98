#![forbid(unsafe_code)]

//! Glyph styling: per-tick effects, styled glyphs, and regex highlight rules.

pub mod effect;
pub mod error;
pub mod glyph;
pub mod rng;
pub mod rule;

pub use effect::{Axis, Effect};
pub use error::StyleError;
pub use glyph::{Appearance, Glyph};
pub use rng::Rng;
pub use rule::{Rule, RuleSet};
