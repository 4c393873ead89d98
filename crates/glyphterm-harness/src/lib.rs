#![forbid(unsafe_code)]

//! Test harness for glyphterm consoles.
//!
//! - **Headless surface**: captures presented frames for inspection.
//! - **Fixture fonts**: tiny solid-block fonts with predictable pixels.
//! - **Input helpers**: build key events and type whole strings.
//!
//! # Quick Start
//!
//! ```ignore
//! use glyphterm_harness::{Harness, type_line};
//!
//! let h = Harness::new(ConsoleConfig::default());
//! h.console.open().unwrap();
//! let reader = h.spawn_read_line();
//! type_line(&h.console, "hi");
//! assert_eq!(reader.join().unwrap().as_deref(), Some("hi"));
//! ```

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glyphterm_core::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
use glyphterm_render::{BitmapFont, Raster, Rgb};
use glyphterm_runtime::{Bell, Console, ConsoleConfig, MemoryClipboard, Surface};

pub use glyphterm_runtime as runtime;

/// Default timeout for [`wait_until`] in tests.
pub const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Headless Surface
// ============================================================================

#[derive(Debug, Default)]
struct Capture {
    size: (usize, usize),
    last: Option<Raster>,
    frames: usize,
    fail: bool,
}

/// Surface that keeps the last presented frame in memory.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    inner: Arc<Mutex<Capture>>,
}

impl HeadlessSurface {
    /// A surface reporting `(0, 0)`, so the console's configured size is used.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface reporting a fixed size.
    pub fn with_size(width: usize, height: usize) -> Self {
        let surface = Self::new();
        surface.set_size(width, height);
        surface
    }

    fn capture(&self) -> MutexGuard<'_, Capture> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the reported size; the engine picks it up on its next frame.
    pub fn set_size(&self, width: usize, height: usize) {
        self.capture().size = (width, height);
    }

    /// Make every following present fail.
    pub fn fail_presents(&self, fail: bool) {
        self.capture().fail = fail;
    }

    pub fn last_frame(&self) -> Option<Raster> {
        self.capture().last.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.capture().frames
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (usize, usize) {
        self.capture().size
    }

    fn present(&mut self, frame: &Raster) -> io::Result<()> {
        let mut capture = self.capture();
        if capture.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface detached"));
        }
        capture.last = Some(frame.clone());
        capture.frames += 1;
        Ok(())
    }
}

// ============================================================================
// Raster → Text
// ============================================================================

/// Render a raster as rows of `#` (differs from `background`) and `.`.
pub fn raster_to_text(raster: &Raster, background: Rgb) -> String {
    let mut out = String::with_capacity((raster.width() + 1) * raster.height());
    for y in 0..raster.height() {
        if y > 0 {
            out.push('\n');
        }
        out.extend(
            raster
                .row(y)
                .iter()
                .map(|&px| if px == background { '.' } else { '#' }),
        );
    }
    out
}

// ============================================================================
// Fixture Fonts
// ============================================================================

/// Printable ASCII font with `width x height` cells: space is empty, every
/// other glyph is a solid block.
pub fn block_font(width: usize, height: usize) -> BitmapFont {
    let glyphs = (' '..='~')
        .map(|c| {
            let fill = if c == ' ' { 0.0 } else { 1.0 };
            (width, vec![fill; width * height])
        })
        .collect();
    match BitmapFont::from_glyphs(' ', height, glyphs) {
        Ok(font) => font,
        Err(err) => panic!("fixture font is invalid: {err}"),
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Bell that counts rings.
#[derive(Debug, Default)]
pub struct RecordingBell {
    rings: AtomicUsize,
}

impl RecordingBell {
    pub fn rings(&self) -> usize {
        self.rings.load(Ordering::Acquire)
    }
}

impl Bell for RecordingBell {
    fn ring(&self) {
        self.rings.fetch_add(1, Ordering::AcqRel);
    }
}

/// A console wired to a headless surface, a counting bell and an in-memory
/// clipboard, using a 2x2 [`block_font`].
pub struct Harness {
    pub console: Arc<Console>,
    pub surface: HeadlessSurface,
    pub bell: Arc<RecordingBell>,
    pub clipboard: Arc<MemoryClipboard>,
}

impl Harness {
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_font(config, block_font(2, 2))
    }

    pub fn with_font(config: ConsoleConfig, font: BitmapFont) -> Self {
        let surface = HeadlessSurface::new();
        let bell = Arc::new(RecordingBell::default());
        let clipboard = Arc::new(MemoryClipboard::default());
        let console = Console::with_parts(
            config,
            Arc::new(font),
            Box::new(surface.clone()),
            Box::new(Arc::clone(&clipboard)),
            Box::new(Arc::clone(&bell)),
        );
        Self {
            console: Arc::new(console),
            surface,
            bell,
            clipboard,
        }
    }

    /// Run `read` on a new thread and wait until it is blocked in a line read.
    pub fn spawn_line_reader<T, F>(&self, read: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&Console) -> T + Send + 'static,
    {
        let console = Arc::clone(&self.console);
        let handle = thread::spawn(move || read(&console));
        wait_until(TIMEOUT, || self.console.is_reading_line() || handle.is_finished());
        handle
    }

    /// Block a new thread in `read_line`.
    pub fn spawn_read_line(&self) -> JoinHandle<Option<String>> {
        self.spawn_line_reader(Console::read_line)
    }

    /// Block a new thread in `read_key(on_press)`.
    pub fn spawn_read_key(&self, on_press: bool) -> JoinHandle<Option<KeyEvent>> {
        let console = Arc::clone(&self.console);
        let handle = thread::spawn(move || console.read_key(on_press));
        wait_until(TIMEOUT, || self.console.is_reading_key() || handle.is_finished());
        handle
    }

    /// Wait until the engine has merged everything written so far and
    /// the scrollback reads `expected`.
    pub fn wait_for_scrollback(&self, expected: &str) -> bool {
        wait_until(TIMEOUT, || self.console.scrollback_text() == expected)
    }
}

// ============================================================================
// Input Helpers
// ============================================================================

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code))
}

pub fn ctrl(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code).with_modifiers(Modifiers::CTRL))
}

pub fn release(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code).with_kind(KeyEventKind::Release))
}

/// Dispatch a press for every character of `text`; `'\n'` presses Enter.
pub fn type_str(console: &Console, text: &str) {
    for c in text.chars() {
        let code = match c {
            '\n' => KeyCode::Enter,
            c => KeyCode::Char(c),
        };
        console.dispatch(key(code));
    }
}

/// Type `text` and press Enter.
pub fn type_line(console: &Console, text: &str) {
    type_str(console, text);
    console.dispatch(key(KeyCode::Enter));
}

/// Poll `done` every millisecond until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_text_marks_foreground() {
        let mut raster = Raster::new(3, 2);
        raster.put(1, 0, Rgb::WHITE, 1.0);
        assert_eq!(raster_to_text(&raster, Rgb::ZERO), ".#.\n...");
    }

    #[test]
    fn headless_surface_captures_frames() {
        let surface = HeadlessSurface::with_size(4, 3);
        let mut presenter = surface.clone();
        assert_eq!(presenter.size(), (4, 3));
        presenter.present(&Raster::new(4, 3)).unwrap();
        assert_eq!(surface.frame_count(), 1);
        assert_eq!(surface.last_frame().map(|r| r.dims()), Some((4, 3)));
        surface.fail_presents(true);
        assert!(presenter.present(&Raster::new(4, 3)).is_err());
        assert_eq!(surface.frame_count(), 1);
    }

    #[test]
    fn block_font_shape() {
        use glyphterm_render::Font;
        let font = block_font(3, 2);
        assert_eq!(font.cell_height(), 2);
        assert_eq!(font.glyph('x').coverage, &[1.0; 6]);
        assert_eq!(font.glyph(' ').coverage, &[0.0; 6]);
    }

    #[test]
    fn wait_until_times_out() {
        assert!(!wait_until(Duration::from_millis(5), || false));
        assert!(wait_until(Duration::from_millis(5), || true));
    }
}
