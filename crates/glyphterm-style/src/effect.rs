#![forbid(unsafe_code)]

//! Per-tick glyph effects.
//!
//! An [`Effect`] is a small state machine advanced once per update tick. It
//! writes a glyph's resolved color and pixel offset into an [`Appearance`]
//! and has no state shared with other glyphs. Stateful variants (cycle and
//! wave phases, random generators) are copied exactly by `Clone`;
//! [`Effect::fresh`] instead rewinds phases and reseeds generators, which is
//! what each newly written glyph receives.
//!
//! # Variants
//!
//! | Variant  | Writes            | Per tick                                          |
//! |----------|-------------------|---------------------------------------------------|
//! | `Color`  | color             | constant                                          |
//! | `Cycle`  | color             | `palette[floor(phase) mod len]`, then advance     |
//! | `Random` | color             | uniform 24-bit color                              |
//! | `Jitter` | offset x, y       | uniform in `[-max, max]` per axis                 |
//! | `Wave`   | offset on an axis | `round(amplitude * sin(frequency * phase))`, then advance |
//! | `Multi`  | members' fields   | members in order, later writes win                |

use glyphterm_render::Rgb;

use crate::error::StyleError;
use crate::glyph::Appearance;
use crate::rng::Rng;

/// Axis displaced by a [`Effect::Wave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Displace `offset_y`.
    #[default]
    Vertical,
    /// Displace `offset_x`.
    Horizontal,
}

/// Palette cycling state.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    speed: f64,
    palette: Vec<Rgb>,
    start: f64,
    phase: f64,
}

impl Cycle {
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn current(&self) -> Rgb {
        let len = self.palette.len() as i64;
        let index = (self.phase.floor() as i64).rem_euclid(len) as usize;
        self.palette[index]
    }
}

/// Sinusoidal displacement state.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    amplitude: f64,
    frequency: f64,
    speed: f64,
    axis: Axis,
    start: f64,
    phase: f64,
}

impl Wave {
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn displacement(&self) -> i32 {
        (self.amplitude * (self.frequency * self.phase).sin()).round() as i32
    }
}

/// A glyph effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Constant color.
    Color(Rgb),
    /// Step through a palette at `speed` entries per tick.
    Cycle(Cycle),
    /// A uniformly random color every tick.
    Random(Rng),
    /// Random offsets within `[-max_x, max_x]` and `[-max_y, max_y]`.
    Jitter { max_x: u16, max_y: u16, rng: Rng },
    /// Sinusoidal offset along one axis.
    Wave(Wave),
    /// Members applied in order. Never nested.
    Multi(Vec<Effect>),
}

impl Default for Effect {
    fn default() -> Self {
        Self::Color(Rgb::WHITE)
    }
}

impl From<Rgb> for Effect {
    fn from(color: Rgb) -> Self {
        Self::Color(color)
    }
}

impl Effect {
    pub const RED: Self = Self::Color(Rgb::RED);
    pub const ORANGE: Self = Self::Color(Rgb::ORANGE);
    pub const YELLOW: Self = Self::Color(Rgb::YELLOW);
    pub const GREEN: Self = Self::Color(Rgb::GREEN);
    pub const BLUE: Self = Self::Color(Rgb::BLUE);
    pub const PURPLE: Self = Self::Color(Rgb::PURPLE);
    pub const WHITE: Self = Self::Color(Rgb::WHITE);
    pub const SILVER: Self = Self::Color(Rgb::SILVER);
    pub const GRAY: Self = Self::Color(Rgb::GRAY);
    pub const SOOT: Self = Self::Color(Rgb::SOOT);
    pub const BLACK: Self = Self::Color(Rgb::BLACK);

    /// Constant color.
    pub fn color(color: impl Into<Rgb>) -> Self {
        Self::Color(color.into())
    }

    /// A constant color picked at random now (not per tick).
    pub fn random_color() -> Self {
        let mut rng = Rng::fresh();
        Self::Color(random_rgb(&mut rng))
    }

    /// Cycle through `palette`, advancing `speed` entries per tick.
    pub fn cycle(speed: f64, palette: impl Into<Vec<Rgb>>) -> Result<Self, StyleError> {
        Self::cycle_from(speed, palette, 0.0)
    }

    /// Like [`Effect::cycle`], starting at `phase` instead of the first entry.
    pub fn cycle_from(
        speed: f64,
        palette: impl Into<Vec<Rgb>>,
        phase: f64,
    ) -> Result<Self, StyleError> {
        let palette = palette.into();
        if palette.is_empty() {
            return Err(StyleError::EmptyPalette);
        }
        finite("speed", speed)?;
        finite("phase", phase)?;
        Ok(Self::Cycle(Cycle {
            speed,
            palette,
            start: phase,
            phase,
        }))
    }

    /// A random color every tick.
    pub fn random() -> Self {
        Self::Random(Rng::fresh())
    }

    /// Random displacement of up to `max_x`/`max_y` pixels every tick.
    pub fn jitter(max_x: u16, max_y: u16) -> Self {
        Self::Jitter {
            max_x,
            max_y,
            rng: Rng::fresh(),
        }
    }

    /// Sinusoidal displacement along `axis`.
    pub fn wave(
        amplitude: f64,
        frequency: f64,
        speed: f64,
        axis: Axis,
    ) -> Result<Self, StyleError> {
        Self::wave_from(amplitude, frequency, speed, axis, 0.0)
    }

    /// Like [`Effect::wave`], starting at `phase`.
    pub fn wave_from(
        amplitude: f64,
        frequency: f64,
        speed: f64,
        axis: Axis,
        phase: f64,
    ) -> Result<Self, StyleError> {
        finite("amplitude", amplitude)?;
        finite("frequency", frequency)?;
        finite("speed", speed)?;
        finite("phase", phase)?;
        Ok(Self::Wave(Wave {
            amplitude,
            frequency,
            speed,
            axis,
            start: phase,
            phase,
        }))
    }

    /// Apply `effects` in order, flattening nested `Multi`s.
    pub fn multi(effects: impl IntoIterator<Item = Effect>) -> Self {
        let mut flat = Vec::new();
        for effect in effects {
            effect.flatten_into(&mut flat);
        }
        Self::Multi(flat)
    }

    /// Compose `self` followed by `other` into one flat `Multi`.
    #[must_use]
    pub fn and(self, other: Effect) -> Self {
        Self::multi([self, other])
    }

    fn flatten_into(self, out: &mut Vec<Effect>) {
        match self {
            Self::Multi(members) => {
                for member in members {
                    member.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Replace every random generator with one seeded from `seed`.
    ///
    /// `Multi` members get consecutive seeds.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(&mut |offset| Rng::seeded(seed.wrapping_add(offset)));
        self
    }

    fn reseed(&mut self, make: &mut impl FnMut(u64) -> Rng) {
        let mut next = 0u64;
        self.reseed_from(make, &mut next);
    }

    fn reseed_from(&mut self, make: &mut impl FnMut(u64) -> Rng, next: &mut u64) {
        match self {
            Self::Random(rng) | Self::Jitter { rng, .. } => {
                *rng = make(*next);
                *next += 1;
            }
            Self::Multi(members) => {
                for member in members {
                    member.reseed_from(make, next);
                }
            }
            Self::Color(_) | Self::Cycle(_) | Self::Wave(_) => {}
        }
    }

    /// An independent instance for a newly written glyph: phases rewound to
    /// their start, random generators reseeded from the process sequence.
    #[must_use]
    pub fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.rewind();
        copy.reseed(&mut |_| Rng::fresh());
        copy
    }

    fn rewind(&mut self) {
        match self {
            Self::Cycle(cycle) => cycle.phase = cycle.start,
            Self::Wave(wave) => wave.phase = wave.start,
            Self::Multi(members) => members.iter_mut().for_each(Self::rewind),
            Self::Color(_) | Self::Random(_) | Self::Jitter { .. } => {}
        }
    }

    /// Advance one update step of `delta` ticks, writing into `look`.
    pub fn apply(&mut self, look: &mut Appearance, delta: f64) {
        match self {
            Self::Color(color) => look.color = *color,
            Self::Cycle(cycle) => {
                look.color = cycle.current();
                cycle.phase += cycle.speed * delta;
            }
            Self::Random(rng) => look.color = random_rgb(rng),
            Self::Jitter { max_x, max_y, rng } => {
                look.offset_x = jitter_offset(rng, *max_x);
                look.offset_y = jitter_offset(rng, *max_y);
            }
            Self::Wave(wave) => {
                let d = wave.displacement();
                match wave.axis {
                    Axis::Vertical => look.offset_y = d,
                    Axis::Horizontal => look.offset_x = d,
                }
                wave.phase += wave.speed * delta;
            }
            Self::Multi(members) => {
                for member in members {
                    member.apply(look, delta);
                }
            }
        }
    }

    /// Whether any member draws from a random generator.
    pub fn is_random(&self) -> bool {
        match self {
            Self::Random(_) | Self::Jitter { .. } => true,
            Self::Multi(members) => members.iter().any(Self::is_random),
            Self::Color(_) | Self::Cycle(_) | Self::Wave(_) => false,
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), StyleError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StyleError::NonFinite { field })
    }
}

fn random_rgb(rng: &mut Rng) -> Rgb {
    Rgb::from_u32((rng.next_f64() * f64::from(0x00FF_FFFF)) as u32)
}

fn jitter_offset(rng: &mut Rng, max: u16) -> i32 {
    let max = i32::from(max);
    let span = f64::from(max * 2 + 1);
    (span * rng.next_f64()) as i32 - max
}
