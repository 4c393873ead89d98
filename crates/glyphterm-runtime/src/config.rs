#![forbid(unsafe_code)]

//! Console configuration.
//!
//! [`ConsoleConfig`] is a plain struct with builder setters. Hosts can start
//! from [`ConsoleConfig::default`] or [`ConsoleConfig::from_env`], which
//! applies these overrides:
//!
//! | Variable                  | Field          |
//! |---------------------------|----------------|
//! | `GLYPHTERM_FRAME_RATE`    | `frame_rate`   |
//! | `GLYPHTERM_CURSOR_SPEED`  | `cursor_speed` |
//! | `GLYPHTERM_SCROLL_SPEED`  | `scroll_speed` |
//! | `GLYPHTERM_TAB_SIZE`      | `tab_size`     |
//!
//! Values that fail to parse are ignored with a warning.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use glyphterm_render::Rgb;

use crate::error::ConsoleError;

pub const ENV_FRAME_RATE: &str = "GLYPHTERM_FRAME_RATE";
pub const ENV_CURSOR_SPEED: &str = "GLYPHTERM_CURSOR_SPEED";
pub const ENV_SCROLL_SPEED: &str = "GLYPHTERM_SCROLL_SPEED";
pub const ENV_TAB_SIZE: &str = "GLYPHTERM_TAB_SIZE";

/// Console configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsoleConfig {
    /// Surface width used when the surface reports no size.
    pub width: usize,
    /// Surface height used when the surface reports no size.
    pub height: usize,
    /// Ambient text color, also used for the key-wait placeholder.
    pub foreground: Rgb,
    /// Clear color.
    pub background: Rgb,
    /// Horizontal gap between glyphs and left margin, in pixels.
    pub x_space: usize,
    /// Vertical gap between lines and top margin, in pixels.
    pub y_space: usize,
    /// Tab width in space cells.
    pub tab_size: usize,
    /// Update ticks per second.
    pub frame_rate: f64,
    /// Fraction of the remaining scroll distance covered per tick.
    pub scroll_speed: f64,
    /// Scrollbar width in pixels.
    pub scroll_bar_width: usize,
    /// Cursor blink half-period in seconds.
    pub cursor_speed: f64,
    /// Separator used to split lines into tokens.
    pub input_delimiter: String,
    /// Initial prompt.
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            foreground: Rgb::WHITE,
            background: Rgb::from_u32(0x2E2C2B),
            x_space: 0,
            y_space: 0,
            tab_size: 4,
            frame_rate: 60.0,
            scroll_speed: 0.25,
            scroll_bar_width: 8,
            cursor_speed: 0.5,
            input_delimiter: " ".to_string(),
            prompt: String::new(),
        }
    }
}

impl ConsoleConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides to `self`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = parse_override(&lookup, ENV_FRAME_RATE) {
            self.frame_rate = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_CURSOR_SPEED) {
            self.cursor_speed = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_SCROLL_SPEED) {
            self.scroll_speed = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_TAB_SIZE) {
            self.tab_size = v;
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_foreground(mut self, color: Rgb) -> Self {
        self.foreground = color;
        self
    }

    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = color;
        self
    }

    pub fn with_spacing(mut self, x_space: usize, y_space: usize) -> Self {
        self.x_space = x_space;
        self.y_space = y_space;
        self
    }

    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_scroll_speed(mut self, scroll_speed: f64) -> Self {
        self.scroll_speed = scroll_speed;
        self
    }

    pub fn with_scroll_bar_width(mut self, width: usize) -> Self {
        self.scroll_bar_width = width;
        self
    }

    pub fn with_cursor_speed(mut self, seconds: f64) -> Self {
        self.cursor_speed = seconds;
        self
    }

    pub fn with_input_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.input_delimiter = delimiter.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Duration of one update tick.
    pub fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(invalid("frame_rate", "must be a positive number"));
        }
        if !(self.scroll_speed.is_finite() && self.scroll_speed >= 0.0) {
            return Err(invalid("scroll_speed", "must not be negative"));
        }
        if !(self.cursor_speed.is_finite() && self.cursor_speed >= 0.0) {
            return Err(invalid("cursor_speed", "must not be negative"));
        }
        if self.tab_size == 0 {
            return Err(invalid("tab_size", "must be at least 1"));
        }
        if self.input_delimiter.is_empty() {
            return Err(invalid("input_delimiter", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConsoleError {
    ConsoleError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config override");
            None
        }
    }
}
