#![forbid(unsafe_code)]

//! Core: host input events and logging shared by every glyphterm crate.

pub mod event;
pub mod logging;

pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, WheelEvent};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
