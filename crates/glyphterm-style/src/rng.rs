#![forbid(unsafe_code)]

//! Small deterministic PRNG for random effects.
//!
//! Each effect instance owns an xorshift64 state. Explicit seeds give
//! reproducible sequences; [`Rng::fresh`] draws a seed from a process-wide
//! sequence so that glyphs written together still animate independently.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);
static BASE: OnceLock<u64> = OnceLock::new();

/// xorshift64 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Generator with a reproducible sequence for `seed`.
    pub fn seeded(seed: u64) -> Self {
        let state = mix(seed);
        Self {
            // xorshift never leaves the zero state.
            state: if state == 0 { GOLDEN } else { state },
        }
    }

    /// Generator seeded from the process-wide sequence.
    pub fn fresh() -> Self {
        let base = *BASE.get_or_init(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos() as u64)
        });
        let n = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self::seeded(base ^ n.wrapping_mul(GOLDEN))
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::fresh()
    }
}

/// splitmix64 finalizer, spreads nearby seeds apart.
fn mix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(GOLDEN);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
