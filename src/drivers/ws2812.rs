//! WS2812 Pixel Driver
//!
//! Drives a WS2812 / NeoPixel data line from an SPI MOSI pin. The SPI clock
//! must be exactly 3 MHz (the board derives it as 48 MHz PCLK2 / 16); each
//! LED bit then becomes three SPI bits:
//!
//! - `0` -> `100` (~333 ns high, ~667 ns low)
//! - `1` -> `110` (~667 ns high, ~333 ns low)
//!
//! Colors go out in the pixel's native GRB order, MSB first.

use embedded_hal::spi::SpiBus;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

/// SPI bytes per encoded pixel (24 LED bits x 3 SPI bits)
pub const BYTES_PER_PIXEL: usize = 9;

/// Trailing low bytes that latch the frame (~64 us at 3 MHz)
pub const RESET_BYTES: usize = 24;

const SYMBOL_ZERO: u32 = 0b100;
const SYMBOL_ONE: u32 = 0b110;

/// Encode one channel byte into 24 SPI bits
const fn encode_channel(value: u8) -> [u8; 3] {
    let mut bits: u32 = 0;
    let mut i = 8;
    while i > 0 {
        i -= 1;
        let symbol = if value & (1 << i) != 0 { SYMBOL_ONE } else { SYMBOL_ZERO };
        bits = (bits << 3) | symbol;
    }
    let bytes = bits.to_be_bytes();
    [bytes[1], bytes[2], bytes[3]]
}

/// Encode one pixel into its SPI symbol stream
#[must_use]
pub const fn encode_grb(color: RGB8) -> [u8; BYTES_PER_PIXEL] {
    let g = encode_channel(color.g);
    let r = encode_channel(color.r);
    let b = encode_channel(color.b);
    [g[0], g[1], g[2], r[0], r[1], r[2], b[0], b[1], b[2]]
}

/// WS2812 chain on an SPI bus
pub struct Ws2812Spi<SPI> {
    spi: SPI,
}

impl<SPI: SpiBus> Ws2812Spi<SPI> {
    /// Create a driver; the bus must already run at ~3 MHz, mode 0
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Release the bus
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus> SmartLedsWrite for Ws2812Spi<SPI> {
    type Error = SPI::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        for color in iterator {
            self.spi.write(&encode_grb(color.into()))?;
        }
        self.spi.write(&[0; RESET_BYTES])?;
        self.spi.flush()
    }
}
