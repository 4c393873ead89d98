#![forbid(unsafe_code)]

//! Public console handle.
//!
//! A [`Console`] is shared by reference between the host's event thread,
//! which feeds it through [`Console::dispatch`], and any number of caller
//! threads that write output and block in reads. Opening starts the engine
//! thread; closing stops it and wakes every blocked reader with `None`.
//!
//! # Example
//!
//! ```ignore
//! let console = Console::new(ConsoleConfig::default(), font, surface);
//! console.open()?;
//! console.write_line("What is your name?");
//! if let Some(name) = console.read_line() {
//!     writeln!(console, "Hello, {name}!");
//! }
//! console.close();
//! ```

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glyphterm_core::{Event, KeyCode, KeyEvent};
use glyphterm_render::{Font, Rgb};
use glyphterm_style::{Effect, Rule};
use tracing::{error, info};

use crate::bell::{self, Bell, TerminalBell};
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::ConsoleConfig;
use crate::editor::ScrollRequest;
use crate::engine;
use crate::error::ConsoleError;
use crate::shared::{Shared, lock};
use crate::surface::Surface;

const PAUSE_MESSAGE: &str = "Press enter to continue...";
const OPTION_PROMPT: &str = "> ";
const NOT_A_NUMBER: &str = "Please enter a number.\n";
const NOT_A_CHOICE: &str = "Please enter a valid choice.\n";

struct Lifecycle {
    surface: Option<Box<dyn Surface>>,
    thread: Option<JoinHandle<Box<dyn Surface>>>,
}

/// A pseudo-terminal rendered into a pixel surface.
pub struct Console {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("open", &self.is_open())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Console using the system clipboard and the terminal bell.
    pub fn new(config: ConsoleConfig, font: Arc<dyn Font>, surface: impl Surface + 'static) -> Self {
        Self::with_parts(
            config,
            font,
            Box::new(surface),
            Box::new(SystemClipboard::detect()),
            Box::new(TerminalBell),
        )
    }

    /// Console with explicit collaborators.
    pub fn with_parts(
        config: ConsoleConfig,
        font: Arc<dyn Font>,
        surface: Box<dyn Surface>,
        clipboard: Box<dyn Clipboard>,
        bell: Box<dyn Bell>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, font, clipboard, bell)),
            lifecycle: Mutex::new(Lifecycle {
                surface: Some(surface),
                thread: None,
            }),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.shared.config
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Start the engine thread.
    pub fn open(&self) -> Result<(), ConsoleError> {
        let shared = &self.shared;
        shared.config.validate()?;
        let mut life = lock(&self.lifecycle);
        if shared.is_running() {
            return Err(ConsoleError::AlreadyOpen);
        }
        // An engine that stopped itself still holds the surface.
        if let Some(handle) = life.thread.take() {
            match handle.join() {
                Ok(surface) => life.surface = Some(surface),
                Err(_) => error!("engine thread panicked"),
            }
        }
        let surface = life.surface.take().ok_or(ConsoleError::SurfaceLost)?;

        shared.line_readers.store(0, Ordering::Release);
        shared.key_readers.store(0, Ordering::Release);
        shared.lines.reopen();
        shared.keys.reopen();
        shared.running.store(true, Ordering::Release);

        match engine::spawn(Arc::clone(shared), surface) {
            Ok(handle) => {
                life.thread = Some(handle);
                info!(
                    width = shared.config.width,
                    height = shared.config.height,
                    frame_rate = shared.config.frame_rate,
                    "console opened"
                );
                Ok(())
            }
            Err(err) => {
                shared.shut_down();
                Err(ConsoleError::Spawn(err))
            }
        }
    }

    /// Stop the engine and release every blocked reader. Idempotent.
    pub fn close(&self) {
        let shared = &self.shared;
        let mut life = lock(&self.lifecycle);
        shared.shut_down();
        shared.line_readers.store(0, Ordering::Release);
        shared.key_readers.store(0, Ordering::Release);
        lock(&shared.tokens).clear();
        lock(&shared.input).discard();

        if let Some(handle) = life.thread.take() {
            match handle.join() {
                Ok(surface) => life.surface = Some(surface),
                Err(_) => error!("engine thread panicked"),
            }
            info!("console closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_running()
    }

    /// Drop all scrollback and unpolled output.
    pub fn clear(&self) {
        lock(&self.shared.output).clear();
        let mut scroll = lock(&self.shared.scroll);
        scroll.set_line_count(1);
        scroll.settle();
    }

    // ── Output ─────────────────────────────────────────────────────────

    /// Queue `text` for display, styled by the current rules and effect.
    ///
    /// Writes are accepted while closed and appear once the console opens.
    pub fn write(&self, text: impl AsRef<str>) {
        self.shared.write(text.as_ref());
    }

    pub fn write_line(&self, text: impl AsRef<str>) {
        let mut line = text.as_ref().to_owned();
        line.push('\n');
        self.shared.write(&line);
    }

    /// Formatted write, so `write!`/`writeln!` work on a console.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.shared.write(text),
            None => self.shared.write(&args.to_string()),
        }
    }

    /// Characters in the scrollback (output merged by the engine so far).
    pub fn scrollback_text(&self) -> String {
        lock(&self.shared.output)
            .scrollback
            .iter()
            .map(|g| g.ch())
            .collect()
    }

    // ── Style ──────────────────────────────────────────────────────────

    /// Add or replace the rule `name`.
    pub fn add_rule(
        &self,
        name: impl Into<String>,
        pattern: &str,
        effect: Effect,
        invert: bool,
    ) -> Result<(), ConsoleError> {
        let rule = Rule::new(name, pattern, effect, invert)?;
        lock(&self.shared.style).rules.insert(rule);
        Ok(())
    }

    pub fn add_rules(&self, rules: impl IntoIterator<Item = Rule>) {
        lock(&self.shared.style).rules.extend(rules);
    }

    pub fn remove_rule(&self, name: &str) -> bool {
        lock(&self.shared.style).rules.remove(name).is_some()
    }

    /// Remove every named rule. Returns how many existed.
    pub fn remove_rules<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> usize {
        let mut style = lock(&self.shared.style);
        names
            .into_iter()
            .filter(|name| style.rules.remove(name.as_ref()).is_some())
            .count()
    }

    pub fn has_rule(&self, name: &str) -> bool {
        lock(&self.shared.style).rules.contains(name)
    }

    pub fn rule(&self, name: &str) -> Option<Rule> {
        lock(&self.shared.style).rules.get(name).cloned()
    }

    pub fn clear_rules(&self) {
        lock(&self.shared.style).rules.clear();
    }

    /// Replace the effect of rule `name`.
    pub fn rule_color(&self, name: &str, effect: Effect) -> Result<(), ConsoleError> {
        self.with_rule(name, |rule| rule.set_effect(effect))
    }

    /// Compose `effect` onto rule `name`'s effect.
    pub fn rule_and_color(&self, name: &str, effect: Effect) -> Result<(), ConsoleError> {
        self.with_rule(name, |rule| rule.and_effect(effect))
    }

    fn with_rule(&self, name: &str, f: impl FnOnce(&mut Rule)) -> Result<(), ConsoleError> {
        let mut style = lock(&self.shared.style);
        let rule = style
            .rules
            .get_mut(name)
            .ok_or_else(|| ConsoleError::UnknownRule(name.to_owned()))?;
        f(rule);
        Ok(())
    }

    /// Ambient effect for text no rule matches.
    pub fn set_effect(&self, effect: Effect) {
        lock(&self.shared.style).effect = effect;
    }

    pub fn effect(&self) -> Effect {
        lock(&self.shared.style).effect.clone()
    }

    /// Set a plain ambient color.
    pub fn set_color(&self, color: Rgb) {
        self.set_effect(Effect::color(color));
    }

    /// The ambient color, if the ambient effect is a plain color.
    pub fn color(&self) -> Option<Rgb> {
        match lock(&self.shared.style).effect {
            Effect::Color(color) => Some(color),
            _ => None,
        }
    }

    pub fn set_invert(&self, invert: bool) {
        lock(&self.shared.style).invert = invert;
    }

    pub fn invert(&self) -> bool {
        lock(&self.shared.style).invert
    }

    pub fn set_rules_enabled(&self, enabled: bool) {
        lock(&self.shared.style).rules_enabled = enabled;
    }

    pub fn rules_enabled(&self) -> bool {
        lock(&self.shared.style).rules_enabled
    }

    // ── Prompt ─────────────────────────────────────────────────────────

    pub fn push_prompt(&self, prompt: impl Into<String>) {
        lock(&self.shared.prompts).push(prompt.into());
    }

    pub fn pop_prompt(&self) -> Option<String> {
        lock(&self.shared.prompts).pop()
    }

    /// Replace the innermost prompt.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let mut prompts = lock(&self.shared.prompts);
        prompts.pop();
        prompts.push(prompt.into());
    }

    /// Every stacked prompt, outermost first, concatenated.
    pub fn prompt(&self) -> String {
        lock(&self.shared.prompts).concat()
    }

    // ── Input ──────────────────────────────────────────────────────────

    /// Submitted lines, most recent first.
    pub fn history(&self) -> Vec<String> {
        lock(&self.shared.input).history().entries().to_vec()
    }

    pub fn is_reading_line(&self) -> bool {
        self.shared.reading_line()
    }

    pub fn is_reading_key(&self) -> bool {
        self.shared.reading_key()
    }

    /// Block until a key is pressed (`on_press`) or released.
    ///
    /// Returns `None` if the console is closed before or while waiting.
    pub fn read_key(&self, on_press: bool) -> Option<KeyEvent> {
        let shared = &*self.shared;
        if !shared.is_running() {
            return None;
        }
        shared.key_on_press.store(on_press, Ordering::Release);
        shared.key_readers.fetch_add(1, Ordering::AcqRel);
        let key = shared.keys.take();
        if key.is_none() {
            Shared::release(&shared.key_readers);
        }
        key
    }

    /// Block until the user submits a line.
    pub fn read_line(&self) -> Option<String> {
        self.write_prompt();
        let line = self.take_line()?;
        lock(&self.shared.input).history_mut().push(&line);
        Some(line)
    }

    /// Next delimiter-separated token, reading a new line when none are left.
    pub fn read_token(&self) -> Option<String> {
        loop {
            let next = lock(&self.shared.tokens).pop_front();
            if let Some(token) = next {
                lock(&self.shared.input).history_mut().push(&token);
                return Some(token);
            }
            self.write_prompt();
            let line = self.take_line()?;
            let delimiter = self.shared.config.input_delimiter.as_str();
            lock(&self.shared.tokens).extend(line.split(delimiter).map(str::to_owned));
        }
    }

    /// List `options` numbered from 1 and read until a valid number is given.
    pub fn read_option(&self, options: &[&str]) -> Option<String> {
        if !self.is_open() || options.is_empty() {
            return None;
        }
        let mut listing = String::new();
        for (i, option) in options.iter().enumerate() {
            listing.push_str(&format!("({}) {option}\n", i + 1));
        }
        self.write(listing);

        loop {
            self.write(OPTION_PROMPT);
            let input = self.take_line()?;
            match input.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => {
                    lock(&self.shared.input).history_mut().push(&input);
                    return Some(options[n - 1].to_owned());
                }
                Ok(_) => self.write(NOT_A_CHOICE),
                Err(_) => self.write(NOT_A_NUMBER),
            }
        }
    }

    /// Sleep for `seconds`, or wait for Enter when `seconds` is zero.
    pub fn pause(&self, seconds: f64) {
        if !self.is_open() {
            return;
        }
        match Duration::try_from_secs_f64(seconds) {
            Ok(duration) if !duration.is_zero() => thread::sleep(duration),
            _ => {
                self.write(PAUSE_MESSAGE);
                while let Some(key) = self.read_key(true) {
                    if key.code == KeyCode::Enter {
                        break;
                    }
                }
            }
        }
    }

    fn write_prompt(&self) {
        let prompt = self.prompt();
        if !prompt.is_empty() && self.is_open() {
            self.shared.write(&prompt);
        }
    }

    fn take_line(&self) -> Option<String> {
        let shared = &*self.shared;
        if !shared.is_running() {
            return None;
        }
        shared.line_readers.fetch_add(1, Ordering::AcqRel);
        let line = shared.lines.take();
        if line.is_none() {
            Shared::release(&shared.line_readers);
        }
        line
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Feed one host event to the console.
    pub fn dispatch(&self, event: Event) {
        let shared = &*self.shared;
        match event {
            Event::Wheel(wheel) => lock(&shared.scroll).by(i64::from(wheel.rotation)),
            Event::Paste(text) => {
                if shared.reading_line() {
                    let (effect, invert) = self.ambient();
                    lock(&shared.input).paste(&text, &effect, invert, Instant::now());
                }
            }
            Event::Key(key) => self.dispatch_key(key),
        }
    }

    fn dispatch_key(&self, key: KeyEvent) {
        let shared = &*self.shared;
        if key.is_press() == shared.key_on_press.load(Ordering::Acquire)
            && Shared::release(&shared.key_readers)
        {
            // A reader that has not taken the previous key yet holds us here.
            let _ = shared.keys.put(key);
        }

        if !key.is_press() || !shared.reading_line() {
            return;
        }
        let (effect, invert) = self.ambient();
        let paste = if key.ctrl() && matches!(key.code, KeyCode::Char('v' | 'V')) {
            shared.clipboard.text()
        } else {
            None
        };
        let outcome =
            lock(&shared.input).handle_key(&key, &effect, invert, paste.as_deref(), Instant::now());

        bell::ring(&*shared.bell, outcome.bells);
        if let Some(request) = outcome.scroll {
            let mut scroll = lock(&shared.scroll);
            match request {
                ScrollRequest::PageUp => scroll.page_up(),
                ScrollRequest::PageDown => scroll.page_down(),
                ScrollRequest::Home => scroll.home(),
                ScrollRequest::End => scroll.end(),
            }
        }
        if let Some(line) = outcome.submitted {
            Shared::release(&shared.line_readers);
            shared.write(&format!("{line}\n"));
            let _ = shared.lines.put(line);
        }
    }

    fn ambient(&self) -> (Effect, bool) {
        let style = lock(&self.shared.style);
        (style.effect.clone(), style.invert)
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use glyphterm_core::{KeyEventKind, WheelEvent};
    use glyphterm_render::{BitmapFont, Raster};

    use super::*;
    use crate::bell::SilentBell;
    use crate::clipboard::NoClipboard;

    struct NullSurface;

    impl Surface for NullSurface {
        fn size(&self) -> (usize, usize) {
            (0, 0)
        }

        fn present(&mut self, _frame: &Raster) -> io::Result<()> {
            Ok(())
        }
    }

    fn console(config: ConsoleConfig) -> Console {
        let glyphs = (' '..='~').map(|_| (1, vec![1.0])).collect();
        let font = BitmapFont::from_glyphs(' ', 1, glyphs).unwrap();
        Console::with_parts(
            config.with_size(64, 16),
            Arc::new(font),
            Box::new(NullSurface),
            Box::new(NoClipboard),
            Box::new(SilentBell),
        )
    }

    #[test]
    fn reads_return_none_while_closed() {
        let c = console(ConsoleConfig::default());
        assert!(!c.is_open());
        assert_eq!(c.read_line(), None);
        assert_eq!(c.read_token(), None);
        assert_eq!(c.read_key(true), None);
        assert_eq!(c.read_option(&["a"]), None);
        c.pause(0.0);
    }

    #[test]
    fn open_twice_is_rejected() {
        let c = console(ConsoleConfig::default());
        c.open().unwrap();
        assert!(matches!(c.open(), Err(ConsoleError::AlreadyOpen)));
        c.close();
        assert!(!c.is_open());
        c.open().unwrap();
        c.close();
    }

    #[test]
    fn invalid_config_refuses_to_open() {
        let c = console(ConsoleConfig::default().with_tab_size(0));
        assert!(matches!(c.open(), Err(ConsoleError::InvalidConfig { field: "tab_size", .. })));
        assert!(!c.is_open());
    }

    #[test]
    fn rule_operations() {
        let c = console(ConsoleConfig::default());
        c.add_rule("num", r"\d+", Effect::RED, false).unwrap();
        assert!(c.has_rule("num"));
        assert!(matches!(
            c.add_rule("bad", "(", Effect::RED, false),
            Err(ConsoleError::Style(_))
        ));
        c.rule_color("num", Effect::BLUE).unwrap();
        assert_eq!(c.rule("num").map(|r| r.effect().clone()), Some(Effect::BLUE));
        c.rule_and_color("num", Effect::jitter(1, 1)).unwrap();
        assert!(matches!(c.rule("num").map(|r| r.effect().clone()), Some(Effect::Multi(_))));
        assert!(matches!(
            c.rule_color("missing", Effect::RED),
            Err(ConsoleError::UnknownRule(name)) if name == "missing"
        ));
        c.add_rule("word", "[a-z]+", Effect::GREEN, true).unwrap();
        assert_eq!(c.remove_rules(["num", "missing"]), 1);
        assert!(c.remove_rule("word"));
        assert!(!c.remove_rule("word"));
        c.add_rules([Rule::new("x", "x", Effect::RED, false).unwrap()]);
        c.clear_rules();
        assert!(!c.has_rule("x"));
    }

    #[test]
    fn ambient_style_accessors() {
        let c = console(ConsoleConfig::default());
        assert_eq!(c.color(), Some(Rgb::WHITE));
        c.set_color(Rgb::RED);
        assert_eq!(c.color(), Some(Rgb::RED));
        c.set_effect(Effect::random());
        assert_eq!(c.color(), None);
        c.set_invert(true);
        assert!(c.invert());
        c.set_rules_enabled(false);
        assert!(!c.rules_enabled());
    }

    #[test]
    fn prompt_stack() {
        let c = console(ConsoleConfig::default().with_prompt("app"));
        assert_eq!(c.prompt(), "app");
        c.push_prompt("/sub");
        c.push_prompt("> ");
        assert_eq!(c.prompt(), "app/sub> ");
        c.set_prompt("$ ");
        assert_eq!(c.prompt(), "app/sub$ ");
        assert_eq!(c.pop_prompt().as_deref(), Some("$ "));
        c.pop_prompt();
        c.pop_prompt();
        assert_eq!(c.pop_prompt(), None);
        assert_eq!(c.prompt(), "");
    }

    #[test]
    fn keys_are_ignored_without_readers() {
        let c = console(ConsoleConfig::default());
        c.dispatch(Event::Key(KeyEvent::new(KeyCode::Char('a'))));
        c.dispatch(Event::Key(
            KeyEvent::new(KeyCode::Char('a')).with_kind(KeyEventKind::Release),
        ));
        c.dispatch(Event::Paste("text".into()));
        assert!(!c.shared.keys.is_full());
        assert_eq!(lock(&c.shared.input).line_text(), "");
    }

    #[test]
    fn wheel_scrolls_in_any_state() {
        let c = console(ConsoleConfig::default());
        {
            let mut scroll = lock(&c.shared.scroll);
            scroll.set_lines_on_screen(2);
            scroll.set_line_count(10);
        }
        c.dispatch(Event::Wheel(WheelEvent::new(3)));
        assert_eq!(lock(&c.shared.scroll).target(), 3);
        c.dispatch(Event::Wheel(WheelEvent::new(-5)));
        assert_eq!(lock(&c.shared.scroll).target(), 0);
    }

    #[test]
    fn writes_before_open_are_kept() {
        let c = console(ConsoleConfig::default());
        c.write("early ");
        writeln!(c, "{}", 42);
        let pending: String = lock(&c.shared.output).pending.iter().map(|g| g.ch()).collect();
        assert_eq!(pending, "early 42\n");
        c.clear();
        assert!(lock(&c.shared.output).pending.is_empty());
    }

    #[test]
    fn close_is_idempotent() {
        let c = console(ConsoleConfig::default());
        c.close();
        c.open().unwrap();
        c.close();
        c.close();
    }
}
