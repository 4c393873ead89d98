#![forbid(unsafe_code)]

//! Style construction errors.

use std::fmt;

/// Rejected effect or rule parameters.
#[derive(Debug, Clone)]
pub enum StyleError {
    /// A rule's pattern failed to compile.
    InvalidPattern { name: String, source: regex::Error },
    /// A cycle effect was given no colors.
    EmptyPalette,
    /// A numeric effect parameter was NaN or infinite.
    NonFinite { field: &'static str },
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { name, source } => {
                write!(f, "rule {name:?} has an invalid pattern: {source}")
            }
            Self::EmptyPalette => write!(f, "cycle effect needs at least one color"),
            Self::NonFinite { field } => write!(f, "effect parameter `{field}` must be finite"),
        }
    }
}

impl std::error::Error for StyleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}
