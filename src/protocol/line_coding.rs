//! CDC line coding register
//!
//! Holds the serial parameters the host negotiates with `SET_LINE_CODING`.
//! The register is kept in its 7-byte wire layout so that `GET_LINE_CODING`
//! hands back exactly what the host wrote.

use crate::config::{DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS};

/// Size of the line coding record on the wire
pub const LINE_CODING_LEN: usize = 7;

/// Line coding (baud rate, etc.)
///
/// Layout: `u32` baud rate little-endian, `u8` stop bits, `u8` parity,
/// `u8` data bits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LineCoding([u8; LINE_CODING_LEN]);

impl LineCoding {
    /// Build a record from its fields
    #[must_use]
    pub const fn new(baud_rate: u32, stop_bits: u8, parity: u8, data_bits: u8) -> Self {
        let baud = baud_rate.to_le_bytes();
        Self([baud[0], baud[1], baud[2], baud[3], stop_bits, parity, data_bits])
    }

    /// Wrap a raw wire record
    #[must_use]
    pub const fn from_bytes(bytes: [u8; LINE_CODING_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw wire record
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; LINE_CODING_LEN] {
        &self.0
    }

    /// Baud rate in bits per second
    #[must_use]
    pub const fn baud_rate(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Raw `bCharFormat` field
    #[must_use]
    pub const fn stop_bits_raw(&self) -> u8 {
        self.0[4]
    }

    /// Raw `bParityType` field
    #[must_use]
    pub const fn parity_raw(&self) -> u8 {
        self.0[5]
    }

    /// Data bits (5, 6, 7, 8 or 16)
    #[must_use]
    pub const fn data_bits(&self) -> u8 {
        self.0[6]
    }

    /// Decoded stop bits, if the host sent a defined value
    #[must_use]
    pub const fn stop_bits(&self) -> Option<StopBits> {
        StopBits::from_raw(self.stop_bits_raw())
    }

    /// Decoded parity, if the host sent a defined value
    #[must_use]
    pub const fn parity(&self) -> Option<Parity> {
        Parity::from_raw(self.parity_raw())
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        Self::new(DEFAULT_BAUD_RATE, StopBits::One as u8, Parity::None as u8, DEFAULT_DATA_BITS)
    }
}

impl core::fmt::Debug for LineCoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineCoding")
            .field("baud_rate", &self.baud_rate())
            .field("stop_bits", &self.stop_bits_raw())
            .field("parity", &self.parity_raw())
            .field("data_bits", &self.data_bits())
            .finish()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LineCoding {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} baud, {} data, stop={}, parity={}",
            self.baud_rate(),
            self.data_bits(),
            self.stop_bits_raw(),
            self.parity_raw()
        );
    }
}

/// Stop bits configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum StopBits {
    /// One stop bit
    #[default]
    One = 0,
    /// One and a half stop bits
    OnePointFive = 1,
    /// Two stop bits
    Two = 2,
}

impl StopBits {
    /// Decode a `bCharFormat` value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::One),
            1 => Some(Self::OnePointFive),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

/// Parity configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Parity {
    /// No parity
    #[default]
    None = 0,
    /// Odd parity
    Odd = 1,
    /// Even parity
    Even = 2,
    /// Mark parity
    Mark = 3,
    /// Space parity
    Space = 4,
}

impl Parity {
    /// Decode a `bParityType` value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Odd),
            2 => Some(Self::Even),
            3 => Some(Self::Mark),
            4 => Some(Self::Space),
            _ => None,
        }
    }
}

/// DTR/RTS control signals
///
/// Recorded for diagnostics only; the device behaves the same whether or
/// not a terminal has asserted DTR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Data Terminal Ready
    pub dtr: bool,
    /// Request To Send
    pub rts: bool,
}

impl ControlSignals {
    /// Decode the `wValue` of `SET_CONTROL_LINE_STATE`
    #[must_use]
    pub const fn from_value(value: u16) -> Self {
        Self {
            dtr: value & 0x0001 != 0,
            rts: value & 0x0002 != 0,
        }
    }

    /// Check if host is connected (DTR set)
    #[must_use]
    pub const fn connected(&self) -> bool {
        self.dtr
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControlSignals {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DTR={} RTS={}", self.dtr, self.rts);
    }
}
