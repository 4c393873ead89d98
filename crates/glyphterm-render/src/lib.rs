#![forbid(unsafe_code)]

//! Render kernel: colors, the pixel compositor, the font contract, and the
//! scrollbar overlay.

pub mod color;
pub mod font;
pub mod raster;
pub mod scrollbar;

pub use color::Rgb;
pub use font::{BitmapFont, Font, FontError, GlyphCoverage};
pub use raster::Raster;
pub use scrollbar::{Scrollbar, ScrollbarState, ThumbRect};
