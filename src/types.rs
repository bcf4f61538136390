//! Shared types used across the USB pixel firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use rgb::RGB8;

/// Color of the indicator pixel
///
/// Channel values are stored as received; gamma or brightness scaling is the
/// output driver's concern.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LedColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl LedColor {
    /// All channels off
    pub const OFF: Self = Self::new(0, 0, 0);

    /// Create a color from three channel values
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value
    ///
    /// Bits above the low 24 are ignored.
    #[must_use]
    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Pack into a `0xRRGGBB` value
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Create a color from signed channel values, saturating each into 0..=255
    #[must_use]
    pub const fn saturating(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: saturate_channel(r),
            g: saturate_channel(g),
            b: saturate_channel(b),
        }
    }

    /// Check if every channel is off
    #[must_use]
    pub const fn is_off(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
const fn saturate_channel(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

impl fmt::Debug for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedColor(#{:06X})", self.packed())
    }
}

impl From<LedColor> for RGB8 {
    fn from(color: LedColor) -> Self {
        RGB8::new(color.r, color.g, color.b)
    }
}

impl From<RGB8> for LedColor {
    fn from(color: RGB8) -> Self {
        Self::new(color.r, color.g, color.b)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedColor {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "rgb({}, {}, {})", self.r, self.g, self.b);
    }
}

/// Command grammar accepted on the CDC data pipe
///
/// Exactly one grammar is active per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grammar {
    /// Six bare hex digits, `RRGGBB`, completed by digit count
    HexTriplet,
    /// `RGB:r,g,b` decimal line, completed by `\n` or `\r`
    RgbLine,
}

impl Grammar {
    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HexTriplet => "hex-triplet",
            Self::RgbLine => "rgb-line",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Grammar {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}
