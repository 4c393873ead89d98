#![forbid(unsafe_code)]

//! Line editor state machine.
//!
//! The editor owns the pending input line, the queue of keystrokes not yet
//! merged into it, the cursor, the history and the cursor blink state. It
//! never touches other console state: every key returns an [`Outcome`]
//! describing the scroll, bell, and submission side effects for the caller
//! to carry out after releasing the input lock.
//!
//! Typed characters are queued and merged into the line when the engine
//! polls. Editing keys merge the queue first so that they act on everything
//! typed before them.

use std::time::{Duration, Instant};

use glyphterm_core::{KeyCode, KeyEvent};
use glyphterm_style::{Effect, Glyph};

use crate::history::History;

/// Deletes the glyph before the cursor when merged.
pub const BACKSPACE: char = '\u{8}';
/// Deletes the glyph at the cursor when merged.
pub const DELETE: char = '\u{7f}';

/// Scroll side effect of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    PageUp,
    PageDown,
    Home,
    End,
}

/// Side effects of one key.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub scroll: Option<ScrollRequest>,
    /// A line the user submitted with Enter.
    pub submitted: Option<String>,
    /// How many times to ring the bell.
    pub bells: usize,
}

impl Outcome {
    fn scroll(request: ScrollRequest) -> Self {
        Self {
            scroll: Some(request),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Editor {
    line: Vec<Glyph>,
    queued: Vec<Glyph>,
    cursor: usize,
    history: History,
    cursor_visible: bool,
    blink_timer: Instant,
}

impl Editor {
    pub fn new(now: Instant) -> Self {
        Self {
            line: Vec::new(),
            queued: Vec::new(),
            cursor: 0,
            history: History::new(),
            cursor_visible: false,
            blink_timer: now,
        }
    }

    pub fn line(&self) -> &[Glyph] {
        &self.line
    }

    pub fn line_text(&self) -> String {
        self.line.iter().map(Glyph::ch).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Queue a typed glyph (including the backspace/delete controls).
    pub fn queue(&mut self, glyph: Glyph, now: Instant) {
        self.queued.push(glyph);
        self.blink(now);
    }

    /// Queue the printable characters of `text`.
    pub fn paste(&mut self, text: &str, effect: &Effect, invert: bool, now: Instant) {
        self.queued.extend(
            text.chars()
                .filter(|c| !c.is_control())
                .map(|c| Glyph::new(c, effect.fresh(), invert)),
        );
        self.blink(now);
    }

    /// Merge queued keystrokes into the line at the cursor. Returns the
    /// number of rejected deletions.
    pub fn merge(&mut self) -> usize {
        let mut rejected = 0;
        for glyph in self.queued.drain(..) {
            match glyph.ch() {
                BACKSPACE => {
                    if self.cursor > 0 {
                        self.cursor -= 1;
                        self.line.remove(self.cursor);
                    } else {
                        rejected += 1;
                    }
                }
                DELETE => {
                    if self.cursor < self.line.len() {
                        self.line.remove(self.cursor);
                    } else {
                        rejected += 1;
                    }
                }
                c if c.is_control() => {}
                _ => {
                    self.line.insert(self.cursor, glyph);
                    self.cursor += 1;
                }
            }
        }
        rejected
    }

    /// Drop the line and anything queued.
    pub fn discard(&mut self) {
        self.line.clear();
        self.queued.clear();
        self.cursor = 0;
        self.history.reset();
    }

    /// Advance line glyph effects and the cursor blink.
    pub fn update(
        &mut self,
        delta: f64,
        animate_line: bool,
        waiting: bool,
        blink_period: Duration,
        now: Instant,
    ) {
        if animate_line {
            for glyph in &mut self.line {
                glyph.update(delta);
            }
        }
        if now.saturating_duration_since(self.blink_timer) >= blink_period {
            self.cursor_visible = waiting && !self.cursor_visible;
            self.blink_timer += blink_period;
        }
    }

    fn blink(&mut self, now: Instant) {
        self.blink_timer = now;
        self.cursor_visible = true;
    }

    fn replace_line(&mut self, text: &str, effect: &Effect, invert: bool) {
        self.line = Glyph::run(text, effect, invert);
        self.queued.clear();
        self.cursor = self.line.len();
    }

    /// Handle a key press while a line read is pending.
    ///
    /// `paste` is the clipboard text for Ctrl+V, fetched by the caller.
    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        effect: &Effect,
        invert: bool,
        paste: Option<&str>,
        now: Instant,
    ) -> Outcome {
        if key.ctrl() && matches!(key.code, KeyCode::Char('v' | 'V')) {
            if let Some(text) = paste {
                self.paste(text, effect, invert, now);
            }
            return Outcome::default();
        }

        let typed = match key.code {
            KeyCode::Char(c) if !key.ctrl() && !key.alt() => Some(c),
            KeyCode::Backspace => Some(BACKSPACE),
            KeyCode::Delete => Some(DELETE),
            _ => None,
        };
        if let Some(c) = typed {
            self.queue(Glyph::new(c, effect.fresh(), invert), now);
            return Outcome::scroll(ScrollRequest::End);
        }

        let mut outcome = Outcome {
            bells: self.merge(),
            ..Outcome::default()
        };

        match key.code {
            KeyCode::Enter => {
                let line = self.line_text();
                self.discard();
                outcome.submitted = Some(line);
            }
            KeyCode::Up | KeyCode::Down => {
                let entry = if key.code == KeyCode::Up {
                    self.history.older().map(str::to_owned)
                } else {
                    self.history.newer().map(str::to_owned)
                };
                match entry {
                    Some(entry) => {
                        tracing::debug!(index = ?self.history.index(), "history recalled");
                        outcome.scroll = Some(ScrollRequest::End);
                        self.replace_line(&entry, effect, invert);
                        self.blink(now);
                    }
                    None => outcome.bells += 1,
                }
            }
            KeyCode::PageUp => outcome.scroll = Some(ScrollRequest::PageUp),
            KeyCode::PageDown => outcome.scroll = Some(ScrollRequest::PageDown),
            KeyCode::Home if key.ctrl() => {
                outcome.scroll = Some(ScrollRequest::End);
                self.cursor = 0;
                self.blink(now);
            }
            KeyCode::Home => outcome.scroll = Some(ScrollRequest::Home),
            KeyCode::End if key.ctrl() => {
                outcome.scroll = Some(ScrollRequest::End);
                self.cursor = self.line.len();
                self.blink(now);
            }
            KeyCode::End => outcome.scroll = Some(ScrollRequest::End),
            KeyCode::Left => {
                outcome.scroll = Some(ScrollRequest::End);
                self.cursor = self.cursor.saturating_sub(1);
                if key.ctrl() {
                    while self.cursor > 0 && self.line[self.cursor - 1].ch() != ' ' {
                        self.cursor -= 1;
                    }
                }
                self.blink(now);
            }
            KeyCode::Right => {
                outcome.scroll = Some(ScrollRequest::End);
                self.cursor = (self.cursor + 1).min(self.line.len());
                if key.ctrl() {
                    while self.cursor < self.line.len() && self.line[self.cursor - 1].ch() != ' ' {
                        self.cursor += 1;
                    }
                }
                self.blink(now);
            }
            KeyCode::Escape => {
                outcome.scroll = Some(ScrollRequest::End);
                self.discard();
                self.blink(now);
            }
            _ => outcome.scroll = Some(ScrollRequest::End),
        }
        outcome
    }
}
