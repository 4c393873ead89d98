#![forbid(unsafe_code)]

//! State shared by the engine thread and console callers.
//!
//! Each mutex guards one concern and no code path holds two guards at once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use glyphterm_core::KeyEvent;
use glyphterm_render::Font;
use glyphterm_style::{Effect, Glyph, RuleSet};

use crate::bell::Bell;
use crate::clipboard::Clipboard;
use crate::config::ConsoleConfig;
use crate::editor::Editor;
use crate::scroll::Scroll;
use crate::slot::Slot;

/// Lock `mutex`, recovering the guard if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scrollback and output written since the last poll.
#[derive(Debug, Default)]
pub(crate) struct Output {
    pub scrollback: Vec<Glyph>,
    pub pending: Vec<Glyph>,
    /// Newlines in `scrollback`.
    pub newlines: usize,
}

impl Output {
    /// Move pending output into the scrollback. Returns the drained count.
    pub fn drain(&mut self) -> usize {
        let drained = self.pending.len();
        self.newlines += self.pending.iter().filter(|g| g.ch() == '\n').count();
        self.scrollback.append(&mut self.pending);
        drained
    }

    pub fn clear(&mut self) {
        self.scrollback.clear();
        self.pending.clear();
        self.newlines = 0;
    }
}

/// Ambient style and highlight rules.
#[derive(Debug)]
pub(crate) struct Style {
    pub effect: Effect,
    pub invert: bool,
    pub rules: RuleSet,
    pub rules_enabled: bool,
}

impl Style {
    fn new(foreground: glyphterm_render::Rgb) -> Self {
        Self {
            effect: Effect::color(foreground),
            invert: false,
            rules: RuleSet::new(),
            rules_enabled: true,
        }
    }

    /// Style `text` with the active rules, or just the ambient style.
    pub fn styled(&self, text: &str) -> Vec<Glyph> {
        if self.rules_enabled {
            self.rules.styled(text, &self.effect, self.invert)
        } else {
            Glyph::run(text, &self.effect, self.invert)
        }
    }
}

pub(crate) struct Shared {
    pub config: ConsoleConfig,
    pub font: Arc<dyn Font>,
    pub output: Mutex<Output>,
    pub input: Mutex<Editor>,
    pub style: Mutex<Style>,
    pub scroll: Mutex<Scroll>,
    pub lines: Slot<String>,
    pub keys: Slot<KeyEvent>,
    /// Callers blocked in a line or token read.
    pub line_readers: AtomicUsize,
    /// Callers blocked in a key read.
    pub key_readers: AtomicUsize,
    /// Whether the pending key read wants presses (`true`) or releases.
    pub key_on_press: AtomicBool,
    pub running: AtomicBool,
    pub clipboard: Box<dyn Clipboard>,
    pub bell: Box<dyn Bell>,
    /// Tokens left over from the last line split by `read_token`.
    pub tokens: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl Shared {
    pub fn new(
        config: ConsoleConfig,
        font: Arc<dyn Font>,
        clipboard: Box<dyn Clipboard>,
        bell: Box<dyn Bell>,
    ) -> Self {
        let prompts = if config.prompt.is_empty() {
            Vec::new()
        } else {
            vec![config.prompt.clone()]
        };
        Self {
            font,
            output: Mutex::new(Output::default()),
            input: Mutex::new(Editor::new(Instant::now())),
            style: Mutex::new(Style::new(config.foreground)),
            scroll: Mutex::new(Scroll::new(config.scroll_speed)),
            lines: Slot::new(),
            keys: Slot::new(),
            line_readers: AtomicUsize::new(0),
            key_readers: AtomicUsize::new(0),
            key_on_press: AtomicBool::new(true),
            running: AtomicBool::new(false),
            clipboard,
            bell,
            tokens: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(prompts),
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn reading_line(&self) -> bool {
        self.line_readers.load(Ordering::Acquire) > 0
    }

    pub fn reading_key(&self) -> bool {
        self.key_readers.load(Ordering::Acquire) > 0
    }

    /// Style `text` and queue it for the next poll.
    pub fn write(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let glyphs = lock(&self.style).styled(text);
        lock(&self.output).pending.extend(glyphs);
    }

    /// Decrement `counter` unless it is already zero.
    pub fn release(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Stop the loop and wake everything blocked on a slot.
    pub fn shut_down(&self) {
        self.running.store(false, Ordering::Release);
        self.lines.close();
        self.keys.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphterm_render::{BitmapFont, Rgb};
    use glyphterm_style::Rule;

    use crate::bell::SilentBell;
    use crate::clipboard::NoClipboard;

    fn shared() -> Shared {
        let glyphs = (' '..='~').map(|_| (1, vec![1.0])).collect();
        let font = BitmapFont::from_glyphs(' ', 1, glyphs).unwrap();
        Shared::new(
            ConsoleConfig::default(),
            Arc::new(font),
            Box::new(NoClipboard),
            Box::new(SilentBell),
        )
    }

    #[test]
    fn writes_wait_for_drain() {
        let s = shared();
        s.write("a\nb\n");
        let mut out = lock(&s.output);
        assert!(out.scrollback.is_empty());
        assert_eq!(out.drain(), 4);
        assert_eq!(out.newlines, 2);
        assert_eq!(out.drain(), 0);
    }

    #[test]
    fn disabled_rules_use_ambient_style() {
        let s = shared();
        {
            let mut style = lock(&s.style);
            style
                .rules
                .insert(Rule::new("x", "x", Effect::RED, false).unwrap());
            style.rules_enabled = false;
        }
        s.write("x");
        let mut out = lock(&s.output);
        out.drain();
        out.scrollback[0].update(1.0);
        assert_eq!(out.scrollback[0].color(), Rgb::WHITE);
    }

    #[test]
    fn release_stops_at_zero() {
        let counter = AtomicUsize::new(1);
        assert!(Shared::release(&counter));
        assert!(!Shared::release(&counter));
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn shut_down_closes_slots() {
        let s = shared();
        s.running.store(true, Ordering::Release);
        s.shut_down();
        assert!(!s.is_running());
        assert!(s.lines.is_closed());
        assert!(s.keys.is_closed());
    }

    #[test]
    fn initial_prompt_is_stacked() {
        let glyphs = (' '..='~').map(|_| (1, vec![1.0])).collect();
        let font = BitmapFont::from_glyphs(' ', 1, glyphs).unwrap();
        let s = Shared::new(
            ConsoleConfig::default().with_prompt("> "),
            Arc::new(font),
            Box::new(NoClipboard),
            Box::new(SilentBell),
        );
        assert_eq!(*lock(&s.prompts), vec!["> ".to_string()]);
    }
}
