#![forbid(unsafe_code)]

//! Console errors.

use std::fmt;
use std::io;

use glyphterm_style::StyleError;

/// Errors returned by [`Console`](crate::Console) operations.
#[derive(Debug)]
pub enum ConsoleError {
    /// `open` was called on a running console.
    AlreadyOpen,
    /// No highlight rule has this name.
    UnknownRule(String),
    /// A configuration value is out of range.
    InvalidConfig { field: &'static str, reason: String },
    /// The engine thread could not be spawned.
    Spawn(io::Error),
    /// The engine thread panicked and the surface went with it.
    SurfaceLost,
    /// An effect or rule was rejected.
    Style(StyleError),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyOpen => write!(f, "console is already open"),
            Self::UnknownRule(name) => write!(f, "no highlight rule named {name:?}"),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid console config `{field}`: {reason}")
            }
            Self::Spawn(err) => write!(f, "failed to spawn engine thread: {err}"),
            Self::SurfaceLost => write!(f, "engine thread panicked; surface lost"),
            Self::Style(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Style(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StyleError> for ConsoleError {
    fn from(err: StyleError) -> Self {
        Self::Style(err)
    }
}
