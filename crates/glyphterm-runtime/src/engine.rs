#![forbid(unsafe_code)]

//! Fixed-timestep engine loop.
//!
//! The loop accumulates elapsed wall time in ticks and runs one `update` per
//! whole tick. When at least one update ran it renders a single frame and
//! presents it. Every iteration ends with a `poll`, the only place queued
//! keystrokes and output reach the line and the scrollback.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glyphterm_render::{Raster, Rgb, Scrollbar};
use glyphterm_style::Glyph;
use tracing::{debug, error, info, trace};

use crate::bell;
use crate::shared::{Shared, lock};
use crate::surface::Surface;

/// Start the engine thread. The thread hands the surface back when it stops.
pub(crate) fn spawn(
    shared: Arc<Shared>,
    surface: Box<dyn Surface>,
) -> io::Result<JoinHandle<Box<dyn Surface>>> {
    thread::Builder::new()
        .name("glyphterm-engine".into())
        .spawn(move || {
            let _span = tracing::info_span!("glyphterm.engine").entered();
            Engine::new(shared, surface).run()
        })
}

/// Text layout position in raster pixels.
#[derive(Debug, Clone, Copy)]
struct Pen {
    x: i32,
    y: i32,
}

pub(crate) struct Engine {
    shared: Arc<Shared>,
    surface: Box<dyn Surface>,
    raster: Raster,
    scrollbar: Scrollbar,
}

impl Engine {
    pub fn new(shared: Arc<Shared>, surface: Box<dyn Surface>) -> Self {
        let scrollbar = Scrollbar::new(shared.config.scroll_bar_width);
        let mut engine = Self {
            shared,
            surface,
            raster: Raster::new(0, 0),
            scrollbar,
        };
        engine.resize_if_needed();
        engine
    }

    fn run(mut self) -> Box<dyn Surface> {
        info!("engine started");
        let tick = self.shared.config.tick().as_secs_f64();
        let throughput_every = Duration::from_secs(1);
        let mut last = Instant::now();
        let mut window_start = last;
        let mut accumulated = 0.0;
        let (mut updates, mut frames) = (0u64, 0u64);

        while self.shared.is_running() {
            let now = Instant::now();
            accumulated += now.duration_since(last).as_secs_f64() / tick;
            last = now;

            let mut updated = false;
            while accumulated >= 1.0 {
                self.update(1.0);
                accumulated -= 1.0;
                updates += 1;
                updated = true;
            }

            if updated {
                if let Err(err) = self.frame() {
                    error!(error = %err, "present failed; closing console");
                    self.shared.shut_down();
                    break;
                }
                frames += 1;
            }

            self.poll();

            if now.duration_since(window_start) >= throughput_every {
                debug!(updates, frames, "engine throughput");
                window_start = now;
                updates = 0;
                frames = 0;
            }

            if !updated {
                thread::sleep(Duration::from_secs_f64(tick * (1.0 - accumulated).max(0.0)));
            }
        }
        info!("engine stopped");
        self.surface
    }

    /// Render and present one frame.
    pub fn frame(&mut self) -> io::Result<()> {
        self.resize_if_needed();
        self.render();
        self.surface.present(&self.raster)
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    fn resize_if_needed(&mut self) {
        let config = &self.shared.config;
        let size = match self.surface.size() {
            (0, 0) => (config.width, config.height),
            size => size,
        };
        if size == self.raster.dims() {
            return;
        }
        debug!(width = size.0, height = size.1, "surface resized");
        self.raster = Raster::new(size.0, size.1);
        let line_height = self.shared.font.cell_height() + config.y_space;
        let mut scroll = lock(&self.shared.scroll);
        scroll.set_lines_on_screen(size.1 / line_height.max(1));
        scroll.end();
        scroll.settle();
    }

    /// Advance every animation by `delta` ticks.
    pub fn update(&mut self, delta: f64) {
        let shared = &*self.shared;
        let reading_line = shared.reading_line();
        let waiting = reading_line || shared.reading_key();

        {
            let mut output = lock(&shared.output);
            for glyph in &mut output.scrollback {
                glyph.update(delta);
            }
        }
        let blink = Duration::from_secs_f64(shared.config.cursor_speed);
        lock(&shared.input).update(delta, reading_line, waiting, blink, Instant::now());
        lock(&shared.scroll).ease();
    }

    /// Merge queued keystrokes and output into canonical state.
    pub fn poll(&mut self) {
        let shared = &*self.shared;
        let rejected = lock(&shared.input).merge();
        bell::ring(&*shared.bell, rejected);

        let (drained, newlines) = {
            let mut output = lock(&shared.output);
            let drained = output.drain();
            (drained, output.newlines)
        };
        if drained > 0 {
            let mut scroll = lock(&shared.scroll);
            scroll.set_line_count(newlines + 1);
            scroll.end();
        }
        trace!(drained, rejected, "poll");
    }

    /// Draw the current state into the raster.
    pub fn render(&mut self) {
        let shared = Arc::clone(&self.shared);
        let config = &shared.config;
        let scroll = lock(&shared.scroll).clone();
        self.raster.clear(config.background);

        let line_height = (shared.font.cell_height() + config.y_space) as f64;
        let origin = Pen {
            x: config.x_space as i32,
            y: (config.y_space as f64 - scroll.offset() * line_height).round() as i32,
        };

        let mut pen = {
            let output = lock(&shared.output);
            self.layout(origin, &output.scrollback, None)
        };

        let reading_line = shared.reading_line();
        if reading_line || shared.reading_key() {
            let input = lock(&shared.input);
            let visible = input.cursor_visible();
            if reading_line {
                let cursor = visible.then_some(input.cursor());
                pen = self.layout(pen, input.line(), cursor);
                if visible && input.cursor() == input.line().len() {
                    let font = &shared.font;
                    self.raster
                        .invert_rect(pen.x, pen.y, font.width_of(' '), font.cell_height());
                }
            }
            if shared.reading_key() && visible {
                self.draw_cell(pen, 'A', config.foreground, true);
            }
        }

        self.scrollbar
            .render(&scroll.scrollbar_state(), &mut self.raster);
    }

    /// Lay out `glyphs` from `pen`, returning where the next glyph goes.
    /// The glyph at `cursor` is drawn inverted.
    fn layout(&mut self, mut pen: Pen, glyphs: &[Glyph], cursor: Option<usize>) -> Pen {
        let config = &self.shared.config;
        let font = Arc::clone(&self.shared.font);
        let x_space = config.x_space as i32;
        let line_height = (font.cell_height() + config.y_space) as i32;
        let tab = ((font.width_of(' ') + config.x_space) * config.tab_size) as i32;

        for (i, glyph) in glyphs.iter().enumerate() {
            match glyph.ch() {
                '\n' => {
                    pen.x = x_space;
                    pen.y += line_height;
                }
                '\t' => pen.x += tab,
                ch => {
                    let invert = glyph.invert() || cursor == Some(i);
                    let (dx, dy) = glyph.offset();
                    let at = Pen {
                        x: pen.x + dx,
                        y: pen.y + dy,
                    };
                    let advance = self.draw_cell(at, ch, glyph.color(), invert);
                    pen.x += advance as i32 + x_space;
                }
            }
        }
        pen
    }

    /// Blit one glyph cell. Returns its advance width.
    fn draw_cell(&mut self, at: Pen, ch: char, color: Rgb, invert: bool) -> usize {
        let coverage = self.shared.font.glyph(ch);
        self.raster
            .blit_coverage(at.x, at.y, coverage.width, coverage.coverage, color, invert);
        coverage.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    use glyphterm_core::{KeyCode, KeyEvent};
    use glyphterm_render::BitmapFont;
    use glyphterm_style::Effect;

    use crate::bell::SilentBell;
    use crate::clipboard::NoClipboard;
    use crate::config::ConsoleConfig;

    const FG: Rgb = Rgb::WHITE;
    const BG: Rgb = Rgb::BLACK;

    /// 2x2 font: space and 'A' are empty, every other glyph is solid.
    fn font() -> BitmapFont {
        let glyphs = (' '..='~')
            .map(|c| (2, vec![if c == ' ' || c == 'A' { 0.0 } else { 1.0 }; 4]))
            .collect();
        BitmapFont::from_glyphs(' ', 2, glyphs).unwrap()
    }

    struct FixedSurface {
        size: Arc<Mutex<(usize, usize)>>,
        fail: bool,
    }

    impl Surface for FixedSurface {
        fn size(&self) -> (usize, usize) {
            *self.size.lock().unwrap()
        }

        fn present(&mut self, _frame: &Raster) -> io::Result<()> {
            if self.fail {
                Err(io::Error::other("gone"))
            } else {
                Ok(())
            }
        }
    }

    fn engine_with(config: ConsoleConfig, fail: bool) -> (Engine, Arc<Mutex<(usize, usize)>>) {
        let shared = Arc::new(Shared::new(
            config.with_background(BG).with_foreground(FG),
            Arc::new(font()),
            Box::new(NoClipboard),
            Box::new(SilentBell),
        ));
        let size = Arc::new(Mutex::new((0, 0)));
        let surface = FixedSurface {
            size: Arc::clone(&size),
            fail,
        };
        (Engine::new(shared, Box::new(surface)), size)
    }

    fn engine() -> Engine {
        engine_with(ConsoleConfig::default().with_size(16, 8).with_scroll_bar_width(0), false).0
    }

    fn lit(engine: &Engine, x: i32, y: i32) -> bool {
        engine.raster().get(x, y) != BG
    }

    #[test]
    fn configured_size_used_when_surface_has_none() {
        let engine = engine();
        assert_eq!(engine.raster().dims(), (16, 8));
        assert_eq!(lock(&engine.shared.scroll).lines_on_screen(), 4);
    }

    #[test]
    fn resize_rebuilds_raster() {
        let (mut engine, size) =
            engine_with(ConsoleConfig::default().with_size(16, 8), false);
        *size.lock().unwrap() = (10, 6);
        engine.frame().unwrap();
        assert_eq!(engine.raster().dims(), (10, 6));
        assert_eq!(lock(&engine.shared.scroll).lines_on_screen(), 3);
    }

    #[test]
    fn output_appears_only_after_poll() {
        let mut engine = engine();
        engine.shared.write("a");
        engine.update(1.0);
        engine.render();
        assert!(!lit(&engine, 0, 0));
        engine.poll();
        engine.update(1.0);
        engine.render();
        assert!(lit(&engine, 0, 0));
        assert!(lit(&engine, 1, 1));
        assert!(!lit(&engine, 2, 0));
    }

    #[test]
    fn newline_and_tab_layout() {
        let mut engine = engine();
        engine.shared.write("a\n\tb");
        engine.poll();
        engine.update(1.0);
        engine.render();
        assert!(lit(&engine, 0, 0));
        // Tab is tab_size (4) space widths (2).
        assert!(!lit(&engine, 0, 2));
        assert!(lit(&engine, 8, 2));
        assert!(lit(&engine, 9, 3));
    }

    #[test]
    fn poll_counts_lines_and_scrolls_to_end() {
        let mut engine = engine();
        engine.shared.write("1\n2\n3\n4\n5\n6\n");
        engine.poll();
        let scroll = lock(&engine.shared.scroll);
        assert_eq!(scroll.line_count(), 7);
        assert_eq!(scroll.target(), 3);
    }

    #[test]
    fn scrolled_view_shifts_up() {
        let mut engine = engine();
        engine.shared.write("a\n\n\n\n\nb");
        engine.poll();
        lock(&engine.shared.scroll).settle();
        engine.update(1.0);
        engine.render();
        // Six lines, four visible: the view starts at line 2.
        assert!(!lit(&engine, 0, 0));
        assert!(lit(&engine, 0, 6));
    }

    #[test]
    fn end_cursor_reads_as_inverted_space() {
        let mut engine = engine();
        engine.shared.line_readers.store(1, Ordering::Release);
        let period = Duration::from_secs_f64(engine.shared.config.cursor_speed);
        let later = Instant::now() + period * 2;
        lock(&engine.shared.input).update(1.0, true, true, period, later);
        assert!(lock(&engine.shared.input).cursor_visible());
        engine.render();
        assert!(lit(&engine, 0, 0));
        assert!(lit(&engine, 1, 1));
    }

    #[test]
    fn cursor_over_inverted_glyph_stays_inverted() {
        let mut engine = engine();
        engine.shared.line_readers.store(1, Ordering::Release);
        let now = Instant::now();
        let period = Duration::from_secs_f64(engine.shared.config.cursor_speed);
        {
            let mut input = lock(&engine.shared.input);
            input.handle_key(&KeyEvent::new(KeyCode::Char('a')), &Effect::WHITE, true, None, now);
            input.handle_key(&KeyEvent::new(KeyCode::Left), &Effect::WHITE, true, None, now);
            input.update(1.0, true, true, period, now);
            assert_eq!(input.cursor(), 0);
            assert!(input.cursor_visible());
        }
        engine.render();
        assert_eq!(engine.raster().get(0, 0), BG);
        assert_eq!(engine.raster().get(1, 1), BG);
    }

    #[test]
    fn end_cursor_inverts_what_is_underneath() {
        let mut engine = engine();
        engine.shared.line_readers.store(1, Ordering::Release);
        lock(&engine.shared.input).handle_key(
            &KeyEvent::new(KeyCode::Escape),
            &Effect::WHITE,
            false,
            None,
            Instant::now(),
        );
        engine.render();
        assert_eq!(engine.raster().get(0, 0), BG.inverse());
        assert_eq!(engine.raster().get(2, 0), BG);
    }

    #[test]
    fn key_placeholder_follows_pending_line() {
        let mut engine = engine();
        engine.shared.line_readers.store(1, Ordering::Release);
        engine.shared.key_readers.store(1, Ordering::Release);
        let now = Instant::now();
        {
            let mut input = lock(&engine.shared.input);
            input.handle_key(&KeyEvent::new(KeyCode::Char('a')), &Effect::WHITE, false, None, now);
            input.handle_key(&KeyEvent::new(KeyCode::Left), &Effect::WHITE, false, None, now);
        }
        engine.render();
        // Pending "a" under the cursor, then the hollow 'A' placeholder
        // inverted to a foreground block.
        assert_eq!(engine.raster().get(0, 0), BG);
        assert_eq!(engine.raster().get(2, 0), FG);
        assert_eq!(engine.raster().get(3, 1), FG);
    }

    #[test]
    fn key_wait_placeholder_only_while_visible() {
        let mut engine = engine();
        engine.shared.key_readers.store(1, Ordering::Release);
        engine.render();
        assert!(!lit(&engine, 0, 0));
    }

    #[test]
    fn present_error_is_reported() {
        let (mut engine, _) = engine_with(ConsoleConfig::default().with_size(4, 4), true);
        assert!(engine.frame().is_err());
    }

    #[test]
    fn loop_stops_after_present_error() {
        let (engine, _) =
            engine_with(ConsoleConfig::default().with_size(4, 4).with_frame_rate(500.0), true);
        let shared = Arc::clone(&engine.shared);
        shared.running.store(true, Ordering::Release);
        let handle = thread::spawn(move || engine.run());
        handle.join().unwrap();
        assert!(!shared.is_running());
        assert!(shared.lines.is_closed());
    }
}
