#![forbid(unsafe_code)]

//! Scroll position.
//!
//! `target` is an integer line offset kept within
//! `[0, max(0, line_count - lines_on_screen)]`; `offset` follows it
//! continuously, covering a fixed fraction of the remaining distance per
//! tick.

use glyphterm_render::ScrollbarState;

#[derive(Debug, Clone, PartialEq)]
pub struct Scroll {
    target: i64,
    offset: f64,
    line_count: usize,
    lines_on_screen: usize,
    speed: f64,
}

impl Scroll {
    pub fn new(speed: f64) -> Self {
        Self {
            target: 0,
            offset: 0.0,
            line_count: 1,
            lines_on_screen: 0,
            speed,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn lines_on_screen(&self) -> usize {
        self.lines_on_screen
    }

    /// Largest valid target.
    pub fn max_target(&self) -> i64 {
        (self.line_count as i64 - self.lines_on_screen as i64).max(0)
    }

    pub fn set_line_count(&mut self, line_count: usize) {
        self.line_count = line_count.max(1);
        self.target = self.target.clamp(0, self.max_target());
    }

    pub fn set_lines_on_screen(&mut self, lines: usize) {
        self.lines_on_screen = lines;
        self.target = self.target.clamp(0, self.max_target());
    }

    /// Move the target by `amount` lines.
    pub fn by(&mut self, amount: i64) {
        self.target = self.target.saturating_add(amount).clamp(0, self.max_target());
    }

    pub fn page_up(&mut self) {
        self.by(-(self.lines_on_screen as i64));
    }

    pub fn page_down(&mut self) {
        self.by(self.lines_on_screen as i64);
    }

    pub fn home(&mut self) {
        self.by(-(self.line_count as i64));
    }

    pub fn end(&mut self) {
        self.by(self.line_count as i64);
    }

    /// Ease `offset` toward `target` by one tick.
    pub fn ease(&mut self) {
        self.offset += (self.target as f64 - self.offset) * self.speed;
    }

    /// Jump `offset` to `target`.
    pub fn settle(&mut self) {
        self.offset = self.target as f64;
    }

    pub fn scrollbar_state(&self) -> ScrollbarState {
        ScrollbarState::new(self.line_count, self.lines_on_screen, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(lines: usize, on_screen: usize) -> Scroll {
        let mut s = Scroll::new(0.25);
        s.set_lines_on_screen(on_screen);
        s.set_line_count(lines);
        s
    }

    #[test]
    fn target_clamped_to_range() {
        let mut s = scroll(30, 10);
        s.by(100);
        assert_eq!(s.target(), 20);
        s.by(-500);
        assert_eq!(s.target(), 0);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut s = scroll(3, 10);
        s.end();
        assert_eq!(s.target(), 0);
        s.page_down();
        assert_eq!(s.target(), 0);
    }

    #[test]
    fn page_and_home_end() {
        let mut s = scroll(50, 10);
        s.page_down();
        assert_eq!(s.target(), 10);
        s.end();
        assert_eq!(s.target(), 40);
        s.page_up();
        assert_eq!(s.target(), 30);
        s.home();
        assert_eq!(s.target(), 0);
    }

    #[test]
    fn shrinking_content_reclamps() {
        let mut s = scroll(50, 10);
        s.end();
        s.set_line_count(12);
        assert_eq!(s.target(), 2);
    }

    #[test]
    fn offset_eases_toward_target() {
        let mut s = scroll(50, 10);
        s.by(8);
        s.ease();
        assert_eq!(s.offset(), 2.0);
        s.ease();
        assert_eq!(s.offset(), 3.5);
        for _ in 0..200 {
            s.ease();
        }
        assert!((s.offset() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn settle_jumps() {
        let mut s = scroll(50, 10);
        s.by(5);
        s.settle();
        assert_eq!(s.offset(), 5.0);
    }
}
