#![forbid(unsafe_code)]

//! Host input events.
//!
//! The host forwards keyboard, wheel and paste input to a console as
//! [`Event`]s. A key event carries its code, the held modifiers and whether
//! it is a press, an auto-repeat or a release; the console's key reads pick
//! presses or releases, and line editing only reacts to presses.
//!
//! With the `crossterm` feature, [`Event::from_crossterm`] translates
//! crossterm's events. Resizes are not events here: the engine polls the
//! surface size every frame.

use bitflags::bitflags;
#[cfg(feature = "crossterm")]
use crossterm::event as cte;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Wheel(WheelEvent),
    /// Text handed over by the host (bracketed paste, drop).
    Paste(String),
}

impl Event {
    /// Translate a crossterm event. Focus, resize and click events give `None`.
    #[must_use]
    #[cfg(feature = "crossterm")]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => KeyEvent::from_crossterm(key).map(Self::Key),
            cte::Event::Mouse(mouse) => WheelEvent::from_crossterm(mouse).map(Self::Wheel),
            cte::Event::Paste(text) => Some(Self::Paste(text)),
            cte::Event::Resize(..) | cte::Event::FocusGained | cte::Event::FocusLost => None,
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<WheelEvent> for Event {
    fn from(wheel: WheelEvent) -> Self {
        Self::Wheel(wheel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with nothing held.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    /// The typed character, for [`KeyCode::Char`] events.
    #[must_use]
    pub const fn char(&self) -> Option<char> {
        if let KeyCode::Char(c) = self.code {
            Some(c)
        } else {
            None
        }
    }

    /// Presses and repeats both count as presses.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[cfg(feature = "crossterm")]
    fn from_crossterm(event: cte::KeyEvent) -> Option<Self> {
        let code = KeyCode::from_crossterm(event.code)?;
        let kind = match event.kind {
            cte::KeyEventKind::Press => KeyEventKind::Press,
            cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
            cte::KeyEventKind::Release => KeyEventKind::Release,
        };
        Some(Self::new(code).with_modifiers(event.modifiers.into()).with_kind(kind))
    }
}

/// Keys the console distinguishes. Everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    /// Host-specific raw key code.
    Other(u32),
}

impl KeyCode {
    #[cfg(feature = "crossterm")]
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        use cte::KeyCode as C;
        Some(match code {
            C::Char(c) => Self::Char(c),
            C::Enter => Self::Enter,
            C::Esc => Self::Escape,
            C::Backspace => Self::Backspace,
            C::Tab => Self::Tab,
            C::Delete => Self::Delete,
            C::Insert => Self::Insert,
            C::Home => Self::Home,
            C::End => Self::End,
            C::PageUp => Self::PageUp,
            C::PageDown => Self::PageDown,
            C::Up => Self::Up,
            C::Down => Self::Down,
            C::Left => Self::Left,
            C::Right => Self::Right,
            C::F(n) => Self::F(n),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Also used when the host cannot tell presses from repeats.
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        /// Super, Meta, Command or Hyper.
        const SUPER = 1 << 3;
    }
}

#[cfg(feature = "crossterm")]
impl From<cte::KeyModifiers> for Modifiers {
    fn from(held: cte::KeyModifiers) -> Self {
        let pairs = [
            (cte::KeyModifiers::SHIFT, Self::SHIFT),
            (cte::KeyModifiers::ALT, Self::ALT),
            (cte::KeyModifiers::CONTROL, Self::CTRL),
            (cte::KeyModifiers::SUPER, Self::SUPER),
            (cte::KeyModifiers::HYPER, Self::SUPER),
            (cte::KeyModifiers::META, Self::SUPER),
        ];
        pairs
            .into_iter()
            .filter(|(theirs, _)| held.contains(*theirs))
            .fold(Self::NONE, |acc, (_, ours)| acc | ours)
    }
}

/// Mouse wheel motion in notches; positive moves toward the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelEvent {
    pub rotation: i32,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    #[must_use]
    pub const fn new(rotation: i32) -> Self {
        Self {
            rotation,
            modifiers: Modifiers::NONE,
        }
    }

    #[cfg(feature = "crossterm")]
    fn from_crossterm(event: cte::MouseEvent) -> Option<Self> {
        let rotation = match event.kind {
            cte::MouseEventKind::ScrollUp => -1,
            cte::MouseEventKind::ScrollDown => 1,
            _ => return None,
        };
        Some(Self {
            rotation,
            modifiers: event.modifiers.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_accessors() {
        let q = KeyEvent::new(KeyCode::Char('q'));
        assert!(q.is_char('q'));
        assert!(!q.is_char('x'));
        assert_eq!(q.char(), Some('q'));
        assert_eq!(KeyEvent::new(KeyCode::Enter).char(), None);
    }

    #[test]
    fn modifier_queries() {
        let paste = KeyEvent::new(KeyCode::Char('v')).with_modifiers(Modifiers::CTRL);
        assert!(paste.ctrl());
        assert!(!paste.alt());
        assert!(!paste.shift());
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn repeats_count_as_presses() {
        let enter = KeyEvent::new(KeyCode::Enter);
        assert!(enter.is_press());
        assert!(enter.with_kind(KeyEventKind::Repeat).is_press());
        assert!(!enter.with_kind(KeyEventKind::Release).is_press());
    }

    #[test]
    fn conversions_into_event() {
        let left = KeyEvent::new(KeyCode::Left);
        assert_eq!(Event::from(left), Event::Key(left));
        assert_eq!(Event::from(WheelEvent::new(-3)), Event::Wheel(WheelEvent::new(-3)));
    }

    #[cfg(feature = "crossterm")]
    mod crossterm_mapping {
        use super::*;

        fn key(code: cte::KeyCode, held: cte::KeyModifiers) -> cte::Event {
            cte::Event::Key(cte::KeyEvent::new(code, held))
        }

        #[test]
        fn ctrl_char() {
            let mapped = Event::from_crossterm(key(cte::KeyCode::Char('v'), cte::KeyModifiers::CONTROL));
            assert_eq!(
                mapped,
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char('v')).with_modifiers(Modifiers::CTRL)
                ))
            );
        }

        #[test]
        fn escape_and_unknown_keys() {
            assert_eq!(
                Event::from_crossterm(key(cte::KeyCode::Esc, cte::KeyModifiers::NONE)),
                Some(Event::Key(KeyEvent::new(KeyCode::Escape)))
            );
            assert_eq!(
                Event::from_crossterm(key(cte::KeyCode::CapsLock, cte::KeyModifiers::NONE)),
                None
            );
        }

        #[test]
        fn meta_and_hyper_fold_into_super() {
            let held = cte::KeyModifiers::META | cte::KeyModifiers::SHIFT;
            assert_eq!(Modifiers::from(held), Modifiers::SUPER | Modifiers::SHIFT);
        }

        #[test]
        fn scroll_becomes_wheel() {
            let down = cte::Event::Mouse(cte::MouseEvent {
                kind: cte::MouseEventKind::ScrollDown,
                column: 0,
                row: 0,
                modifiers: cte::KeyModifiers::NONE,
            });
            assert_eq!(Event::from_crossterm(down), Some(Event::Wheel(WheelEvent::new(1))));
        }

        #[test]
        fn paste_passes_through_and_focus_is_dropped() {
            assert_eq!(
                Event::from_crossterm(cte::Event::Paste("hi".into())),
                Some(Event::Paste("hi".into()))
            );
            assert_eq!(Event::from_crossterm(cte::Event::FocusGained), None);
            assert_eq!(Event::from_crossterm(cte::Event::Resize(80, 24)), None);
        }
    }
}
