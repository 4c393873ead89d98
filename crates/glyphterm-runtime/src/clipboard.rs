#![forbid(unsafe_code)]

//! Clipboard access for paste.
//!
//! [`SystemClipboard`] shells out to the platform's paste tool. Detection can
//! be overridden with `GLYPHTERM_CLIPBOARD_BACKEND` set to one of `macos`,
//! `windows`, `wayland`, `x11` or `none`.

use std::env;
use std::path::Path;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

pub const ENV_CLIPBOARD_BACKEND: &str = "GLYPHTERM_CLIPBOARD_BACKEND";

/// Source of pasted text.
pub trait Clipboard: Send + Sync {
    /// Current clipboard text, or `None` when unavailable.
    fn text(&self) -> Option<String>;
}

impl<C: Clipboard + ?Sized> Clipboard for std::sync::Arc<C> {
    fn text(&self) -> Option<String> {
        (**self).text()
    }
}

/// External paste tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalBackend {
    MacOS,
    Windows,
    Wayland,
    X11,
}

/// Clipboard backed by an external paste command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClipboard {
    backend: Option<ExternalBackend>,
}

impl SystemClipboard {
    /// Pick a backend from the environment override or by probing for tools.
    pub fn detect() -> Self {
        let backend = match env::var(ENV_CLIPBOARD_BACKEND) {
            Ok(value) => parse_override(&value).unwrap_or_else(detect_backend),
            Err(_) => detect_backend(),
        };
        tracing::debug!(?backend, "clipboard backend selected");
        Self { backend }
    }

    /// Use `backend` without probing.
    pub const fn with_backend(backend: Option<ExternalBackend>) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> Option<ExternalBackend> {
        self.backend
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::detect()
    }
}

impl Clipboard for SystemClipboard {
    fn text(&self) -> Option<String> {
        let backend = self.backend?;
        let result = match backend {
            ExternalBackend::MacOS => run_command_output("pbpaste", &[]),
            ExternalBackend::Windows => {
                run_command_output("powershell", &["-NoProfile", "-Command", "Get-Clipboard"])
            }
            ExternalBackend::Wayland => run_command_output("wl-paste", &["--no-newline"]),
            ExternalBackend::X11 => run_command_output("xclip", &["-selection", "clipboard", "-o"])
                .or_else(|_| run_command_output("xsel", &["--clipboard", "--output"])),
        };
        match result {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(?backend, error = %err, "clipboard read failed");
                None
            }
        }
    }
}

/// In-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
        }
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.into());
    }

    pub fn clear(&self) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Clipboard for MemoryClipboard {
    fn text(&self) -> Option<String> {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Clipboard that never has text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn text(&self) -> Option<String> {
        None
    }
}

/// `Some(choice)` for a recognized override (`Some(None)` for `none`).
fn parse_override(value: &str) -> Option<Option<ExternalBackend>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "macos" => Some(Some(ExternalBackend::MacOS)),
        "windows" => Some(Some(ExternalBackend::Windows)),
        "wayland" => Some(Some(ExternalBackend::Wayland)),
        "x11" => Some(Some(ExternalBackend::X11)),
        "none" => Some(None),
        _ => None,
    }
}

fn detect_backend() -> Option<ExternalBackend> {
    [
        ExternalBackend::MacOS,
        ExternalBackend::Windows,
        ExternalBackend::Wayland,
        ExternalBackend::X11,
    ]
    .into_iter()
    .find(|&backend| backend_available(backend))
}

fn backend_available(backend: ExternalBackend) -> bool {
    match backend {
        ExternalBackend::MacOS => cfg!(target_os = "macos") && command_exists("pbpaste"),
        ExternalBackend::Windows => cfg!(target_os = "windows") && command_exists("powershell"),
        ExternalBackend::Wayland => {
            env::var_os("WAYLAND_DISPLAY").is_some() && command_exists("wl-paste")
        }
        ExternalBackend::X11 => {
            env::var_os("DISPLAY").is_some() && (command_exists("xclip") || command_exists("xsel"))
        }
    }
}

fn command_exists(command: &str) -> bool {
    if command.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(command).is_file();
    }
    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path_var).any(|dir| {
        dir.join(command).is_file()
            || (cfg!(target_os = "windows") && dir.join(format!("{command}.exe")).is_file())
    })
}

fn run_command_output(cmd: &str, args: &[&str]) -> std::io::Result<String> {
    let output = Command::new(cmd).args(args).output()?;
    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "{cmd} exited with {}",
            output.status
        )));
    }
    String::from_utf8(output.stdout).map_err(std::io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_values() {
        assert_eq!(parse_override("macos"), Some(Some(ExternalBackend::MacOS)));
        assert_eq!(parse_override(" X11 "), Some(Some(ExternalBackend::X11)));
        assert_eq!(parse_override("none"), Some(None));
        assert_eq!(parse_override("osc52"), None);
    }

    #[test]
    fn memory_clipboard_roundtrip() {
        let clip = MemoryClipboard::default();
        assert_eq!(clip.text(), None);
        clip.set("hello");
        assert_eq!(clip.text().as_deref(), Some("hello"));
        clip.clear();
        assert_eq!(clip.text(), None);
    }

    #[test]
    fn no_clipboard_is_empty() {
        assert_eq!(NoClipboard.text(), None);
    }

    #[test]
    fn system_clipboard_without_backend() {
        let clip = SystemClipboard::with_backend(None);
        assert_eq!(clip.backend(), None);
        assert_eq!(clip.text(), None);
    }

    #[test]
    fn missing_command_is_not_found() {
        assert!(!command_exists("glyphterm-definitely-not-a-command"));
    }
}
