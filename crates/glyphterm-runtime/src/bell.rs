#![forbid(unsafe_code)]

//! Audible feedback for rejected edits.

use std::io::Write;

/// Something that can beep.
pub trait Bell: Send + Sync {
    fn ring(&self);
}

impl<B: Bell + ?Sized> Bell for std::sync::Arc<B> {
    fn ring(&self) {
        (**self).ring();
    }
}

/// Writes BEL to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Bell for TerminalBell {
    fn ring(&self) {
        let mut stderr = std::io::stderr();
        // Best effort.
        let _ = stderr.write_all(b"\x07").and_then(|()| stderr.flush());
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBell;

impl Bell for SilentBell {
    fn ring(&self) {}
}

/// Ring `bell` `times` times, logging each ring.
pub(crate) fn ring(bell: &dyn Bell, times: usize) {
    for _ in 0..times {
        tracing::debug!("bell");
        bell.ring();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Bell for Counter {
        fn ring(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn ring_repeats_through_shared_handle() {
        let counter = Arc::new(Counter::default());
        let bell: Box<dyn Bell> = Box::new(Arc::clone(&counter));
        ring(bell.as_ref(), 3);
        ring(bell.as_ref(), 0);
        assert_eq!(counter.0.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn silent_bell_is_inert() {
        ring(&SilentBell, 2);
    }
}
