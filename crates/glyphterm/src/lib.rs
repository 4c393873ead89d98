#![forbid(unsafe_code)]

//! glyphterm public facade crate.
//!
//! Re-exports the types an embedding host needs from the internal crates
//! and offers a prelude for day-to-day use.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use glyphterm_core::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, WheelEvent};

// --- Render re-exports -----------------------------------------------------

pub use glyphterm_render::{
    BitmapFont, Font, FontError, GlyphCoverage, Raster, Rgb, Scrollbar, ScrollbarState,
};

// --- Style re-exports ------------------------------------------------------

pub use glyphterm_style::{Axis, Effect, Glyph, Rule, RuleSet, StyleError};

// --- Runtime re-exports ----------------------------------------------------

pub use glyphterm_runtime::{
    Bell, Clipboard, Console, ConsoleConfig, ConsoleError, MemoryClipboard, NoClipboard,
    SilentBell, Surface, SystemClipboard, TerminalBell,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for glyphterm hosts.
#[derive(Debug)]
pub enum Error {
    /// Malformed font data.
    Font(FontError),
    /// Rejected effect or rule.
    Style(StyleError),
    /// Console lifecycle or configuration failure.
    Console(ConsoleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font(err) => write!(f, "{err}"),
            Self::Style(err) => write!(f, "{err}"),
            Self::Console(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Font(err) => Some(err),
            Self::Style(err) => Some(err),
            Self::Console(err) => Some(err),
        }
    }
}

impl From<FontError> for Error {
    fn from(err: FontError) -> Self {
        Self::Font(err)
    }
}

impl From<StyleError> for Error {
    fn from(err: StyleError) -> Self {
        Self::Style(err)
    }
}

impl From<ConsoleError> for Error {
    fn from(err: ConsoleError) -> Self {
        Self::Console(err)
    }
}

/// Standard result type for glyphterm APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BitmapFont, Console, ConsoleConfig, Effect, Error, Event, Font, KeyCode, KeyEvent,
        Modifiers, Result, Rgb, Rule, Surface,
    };
    pub use crate::{core, render, runtime, style};
}

pub use glyphterm_core as core;
pub use glyphterm_render as render;
pub use glyphterm_runtime as runtime;
pub use glyphterm_style as style;
