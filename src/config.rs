//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the USB pixel hardware.
//! USB identity, buffer sizing, timing and pin mappings are centralized here.

use crate::types::{Grammar, LedColor};

/// USB VID (shared V-USB vendor ID for CDC-ACM class devices)
pub const USB_VID: u16 = 0x16C0;

/// USB PID (shared V-USB product ID for CDC-ACM class devices)
pub const USB_PID: u16 = 0x05DF;

/// USB device release number (BCD)
pub const USB_DEVICE_RELEASE: u16 = 0x0100;

/// Manufacturer string descriptor
pub const USB_MANUFACTURER: &str = "Arthur";

/// Product string descriptor
pub const USB_PRODUCT: &str = "LED USB Device";

/// Serial number string descriptor
pub const USB_SERIAL: &str = "0001";

/// Maximum bus power draw in milliamps
pub const USB_MAX_POWER_MA: u16 = 100;

/// Control endpoint 0 packet size
pub const USB_EP0_PACKET_SIZE: u8 = 64;

/// CDC notification and data endpoint packet size
pub const USB_CDC_PACKET_SIZE: u16 = 8;

/// Notification endpoint polling interval in milliseconds
pub const USB_NOTIFY_INTERVAL_MS: u8 = 10;

/// Receive buffer capacity, including the terminating NUL
pub const RX_BUFFER_SIZE: usize = 64;

/// Number of hex digits in a hex triplet color token
pub const HEX_TOKEN_DIGITS: usize = 6;

/// Byte emitted on every poll tick as a liveness signal
pub const ACK_BYTE: u8 = 0x06;

/// Color shown until the first valid command arrives (dim green)
pub const BOOT_COLOR: LedColor = LedColor::new(0, 20, 0);

/// Color shown while the USB link is being brought up (dim blue)
pub const STARTUP_COLOR: LedColor = LedColor::new(0, 0, 10);

/// Poll loop period in milliseconds
pub const POLL_PERIOD_MS: u64 = 1;

/// How long D+ is held low to force the host to re-enumerate
pub const REENUMERATION_HOLD_MS: u32 = 500;

/// How long a liveness byte may wait for the host before it is abandoned
pub const ACK_WRITE_TIMEOUT_MS: u64 = 5;

/// Internal HSI oscillator feeding the PLL
pub const HSI_HZ: u32 = 16_000_000;

/// PLL input divider (M)
pub const PLL_PREDIV: u32 = 4;

/// PLL multiplier (N); VCO = 16 MHz / 4 * 72 = 288 MHz
pub const PLL_MUL: u32 = 72;

/// PLL system output divider (R)
pub const PLL_DIVR: u32 = 6;

/// System clock, also PCLK2 (APB2 undivided): 48 MHz
pub const SYSTEM_CLOCK_HZ: u32 = HSI_HZ / PLL_PREDIV * PLL_MUL / PLL_DIVR;

/// SPI clock for WS2812 symbol encoding (3 SPI bits per LED bit)
pub const WS2812_SPI_HZ: u32 = 3_000_000;

/// SPI1 baud-rate prescaler that turns PCLK2 into [`WS2812_SPI_HZ`]
pub const WS2812_SPI_PRESCALER: u32 = SYSTEM_CLOCK_HZ / WS2812_SPI_HZ;

// The SPI prescaler only divides by powers of two (2..=256); anything else
// rounds to a faster clock and shortens the WS2812 high times.
const _: () = assert!(
    SYSTEM_CLOCK_HZ % WS2812_SPI_HZ == 0
        && WS2812_SPI_PRESCALER.is_power_of_two()
        && WS2812_SPI_PRESCALER >= 2
        && WS2812_SPI_PRESCALER <= 256,
    "PCLK2 must divide exactly to the WS2812 SPI clock"
);

/// Default serial baud rate reported to the host
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default data bits reported to the host
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Command grammar compiled into this build
#[cfg(not(feature = "hex-grammar"))]
pub const DEFAULT_GRAMMAR: Grammar = Grammar::RgbLine;

/// Command grammar compiled into this build
#[cfg(feature = "hex-grammar")]
pub const DEFAULT_GRAMMAR: Grammar = Grammar::HexTriplet;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// WS2812 data line (SPI1 MOSI)
    pub const LED_DATA: &str = "PA7";

    /// SPI1 SCK (unused by the LED, required by the peripheral)
    pub const LED_SCK: &str = "PA5";

    /// USB D+ (handled by USB peripheral, driven low for re-enumeration)
    pub const USB_DP: &str = "PA12";

    /// USB D- (handled by USB peripheral)
    pub const USB_DM: &str = "PA11";
}

/// Runtime settings derived from the build configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Active command grammar
    pub grammar: Grammar,
    /// Emit [`ACK_BYTE`] on every poll tick
    pub ack_heartbeat: bool,
    /// Color held until the first command is applied
    pub boot_color: LedColor,
}

impl Settings {
    /// Settings for a given grammar
    ///
    /// The hex-token deployment announces liveness with an ACK byte per tick;
    /// the structured-line deployment stays silent.
    #[must_use]
    pub const fn for_grammar(grammar: Grammar) -> Self {
        Self {
            grammar,
            ack_heartbeat: matches!(grammar, Grammar::HexTriplet),
            boot_color: BOOT_COLOR,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_grammar(DEFAULT_GRAMMAR)
    }
}
