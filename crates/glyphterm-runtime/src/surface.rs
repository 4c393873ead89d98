#![forbid(unsafe_code)]

//! Presentation target for rendered frames.

use std::io;

use glyphterm_render::Raster;

/// A drawable the engine presents frames to.
///
/// `size` is polled once per rendered frame; when it changes the engine
/// rebuilds its raster at the new size.
pub trait Surface: Send {
    /// Drawable size in pixels. `(0, 0)` means "use the configured size".
    fn size(&self) -> (usize, usize);

    /// Show a finished frame. An error stops the console.
    fn present(&mut self, frame: &Raster) -> io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> (usize, usize) {
        (**self).size()
    }

    fn present(&mut self, frame: &Raster) -> io::Result<()> {
        (**self).present(frame)
    }
}
