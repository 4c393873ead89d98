#![forbid(unsafe_code)]

//! glyphterm runtime
//!
//! Ties the render kernel and the style engine into a working console.
//!
//! # Key Components
//!
//! - [`Console`] - Public handle: lifecycle, output, styling, blocking reads
//! - [`ConsoleConfig`] - Sizes, colors, timing and input settings
//! - [`Slot`] - Capacity-1 blocking handoff used by the read protocol
//! - [`History`] - Move-to-front list of submitted input
//! - [`Scroll`] - Eased scroll position
//! - [`Surface`], [`Clipboard`], [`Bell`] - Host collaborators
//!
//! # How it fits
//! The host owns the window or canvas. It hands the console a [`Surface`] to
//! present frames to and forwards input with [`Console::dispatch`]. The
//! engine thread spawned by [`Console::open`] runs the fixed-timestep
//! update/render/poll loop; caller threads write output and block in reads.

pub mod bell;
pub mod clipboard;
pub mod config;
pub mod console;
pub mod editor;
pub mod error;
pub mod history;
pub mod scroll;
pub mod slot;
pub mod surface;

mod engine;
mod shared;

pub use bell::{Bell, SilentBell, TerminalBell};
pub use clipboard::{Clipboard, ExternalBackend, MemoryClipboard, NoClipboard, SystemClipboard};
pub use config::ConsoleConfig;
pub use console::Console;
pub use editor::{Editor, Outcome, ScrollRequest};
pub use error::ConsoleError;
pub use history::History;
pub use scroll::Scroll;
pub use slot::Slot;
pub use surface::Surface;
