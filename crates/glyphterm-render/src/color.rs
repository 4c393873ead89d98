#![forbid(unsafe_code)]

//! 24-bit RGB colors and the named console palette.

use std::fmt;

/// A 24-bit `0xRRGGBB` color.
///
/// The upper byte is always zero; constructors mask it off so inversion
/// (`0xFFFFFF - c`) stays inside the 24-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct Rgb(u32);

impl Rgb {
    pub const RED: Self = Self(0xF75DB3);
    pub const ORANGE: Self = Self(0xF9642D);
    pub const YELLOW: Self = Self(0xFFF13A);
    pub const GREEN: Self = Self(0x6CB94B);
    pub const BLUE: Self = Self(0x405AB9);
    pub const PURPLE: Self = Self(0xC76EDF);
    pub const WHITE: Self = Self(0xFFFFFF);
    pub const SILVER: Self = Self(0xC4C4C4);
    pub const GRAY: Self = Self(0x7A7A7A);
    pub const SOOT: Self = Self(0x504D4B);
    pub const BLACK: Self = Self(0x2E2C2B);

    /// Pure black (`0x000000`), distinct from the palette's soft [`Rgb::BLACK`].
    pub const ZERO: Self = Self(0);

    /// Create a color from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    /// Create a color from channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Packed `0xRRGGBB` value.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// `0xFFFFFF - self`.
    #[inline]
    pub const fn inverse(self) -> Self {
        Self(0x00FF_FFFF - self.0)
    }

    /// Linear blend of `self` over `dst`: `alpha*src + (1-alpha)*dst` per
    /// channel, computed in normalized space and truncated back to 8 bits.
    ///
    /// `alpha` at or above 1 yields `self`; at or below 0 (or NaN) yields `dst`.
    #[inline]
    pub fn blend_over(self, dst: Self, alpha: f32) -> Self {
        if alpha >= 1.0 {
            return self;
        }
        if alpha.is_nan() || alpha <= 0.0 {
            return dst;
        }
        let a = alpha;
        let mix = |s: u8, d: u8| -> u8 {
            let s = f32::from(s) / 255.0;
            let d = f32::from(d) / 255.0;
            ((a * s + (1.0 - a) * d) * 255.0) as u8
        };
        Self::new(
            mix(self.r(), dst.r()),
            mix(self.g(), dst.g()),
            mix(self.b(), dst.b()),
        )
    }
}

impl From<u32> for Rgb {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}
