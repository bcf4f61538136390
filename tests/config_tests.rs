//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test config_tests

use usb_pixel::config::*;
use usb_pixel::types::{Grammar, LedColor};

// =============================================================================
// USB Identity Tests
// =============================================================================

#[test]
fn usb_ids_are_shared_cdc_pair() {
    assert_eq!(USB_VID, 0x16C0);
    assert_eq!(USB_PID, 0x05DF);
}

#[test]
fn usb_strings_present() {
    assert_eq!(USB_MANUFACTURER, "Arthur");
    assert_eq!(USB_PRODUCT, "LED USB Device");
    assert!(!USB_SERIAL.is_empty());
}

#[test]
fn usb_power_fits_descriptor() {
    // bMaxPower is in 2 mA units and must fit a byte
    assert!(USB_MAX_POWER_MA / 2 <= 255);
    assert!(USB_MAX_POWER_MA <= 500);
}

#[test]
fn usb_packet_sizes_valid() {
    // Full-speed EP0 sizes: 8, 16, 32, 64
    assert!([8, 16, 32, 64].contains(&USB_EP0_PACKET_SIZE));
    assert!(USB_CDC_PACKET_SIZE <= 64);
    assert!(USB_NOTIFY_INTERVAL_MS >= 1);
}

// =============================================================================
// Receive Path Tests
// =============================================================================

#[test]
fn rx_buffer_holds_longest_command() {
    // "RGB:-2147483648,-2147483648,-2147483648" plus the NUL
    assert!(RX_BUFFER_SIZE > 4 + 3 * 11 + 2);
    assert!(HEX_TOKEN_DIGITS < RX_BUFFER_SIZE);
}

#[test]
fn ack_byte_is_ascii_ack() {
    assert_eq!(ACK_BYTE, 0x06);
}

// =============================================================================
// Timing Tests
// =============================================================================

#[test]
fn reenumeration_hold_long_enough() {
    // Hosts need well over the 2.5 us disconnect detect time; use >= 100 ms
    assert!(REENUMERATION_HOLD_MS >= 100);
}

#[test]
fn ack_timeout_shorter_than_hold() {
    assert!(ACK_WRITE_TIMEOUT_MS < u64::from(REENUMERATION_HOLD_MS));
    assert!(POLL_PERIOD_MS >= 1);
}

#[test]
fn ws2812_spi_rate() {
    // 3 SPI bits per LED bit: 1 us bit period, inside 1.25 us +/- 600 ns
    assert_eq!(WS2812_SPI_HZ / 3, 1_000_000);
}

#[test]
fn system_clock_from_pll() {
    let vco = HSI_HZ / PLL_PREDIV * PLL_MUL;
    // G474 VCO range is 96..=344 MHz
    assert!((96_000_000..=344_000_000).contains(&vco));
    assert_eq!(SYSTEM_CLOCK_HZ, 48_000_000);
}

#[test]
fn ws2812_spi_clock_is_exact() {
    // SPI only divides PCLK2 by powers of two; a rounded divider runs fast
    assert_eq!(SYSTEM_CLOCK_HZ % WS2812_SPI_HZ, 0);
    assert_eq!(WS2812_SPI_PRESCALER, 16);
    assert!(WS2812_SPI_PRESCALER.is_power_of_two());
    assert_eq!(SYSTEM_CLOCK_HZ / WS2812_SPI_PRESCALER, WS2812_SPI_HZ);
}

#[test]
fn ws2812_high_times_in_tolerance() {
    let symbol_ns = 1_000_000_000 / WS2812_SPI_HZ;
    let t0h = symbol_ns;
    let t1h = 2 * symbol_ns;
    // WS2812B: T0H 250..=550 ns, T1H 650..=950 ns
    assert!((250..=550).contains(&t0h));
    assert!((650..=950).contains(&t1h));
}

#[test]
fn hsi_alone_cannot_reach_ws2812_clock() {
    // The reset clock (16 MHz HSI) has no exact power-of-two divider
    let ratio = HSI_HZ / WS2812_SPI_HZ;
    assert!(HSI_HZ % WS2812_SPI_HZ != 0 || !ratio.is_power_of_two());
}

// =============================================================================
// Settings Tests
// =============================================================================

#[test]
fn boot_and_startup_colors() {
    assert_eq!(BOOT_COLOR, LedColor::new(0, 20, 0));
    assert_eq!(STARTUP_COLOR, LedColor::new(0, 0, 10));
    assert_ne!(BOOT_COLOR, STARTUP_COLOR);
}

#[test]
fn hex_settings_send_heartbeat() {
    let settings = Settings::for_grammar(Grammar::HexTriplet);
    assert_eq!(settings.grammar, Grammar::HexTriplet);
    assert!(settings.ack_heartbeat);
    assert_eq!(settings.boot_color, BOOT_COLOR);
}

#[test]
fn line_settings_are_silent() {
    let settings = Settings::for_grammar(Grammar::RgbLine);
    assert_eq!(settings.grammar, Grammar::RgbLine);
    assert!(!settings.ack_heartbeat);
}

#[test]
fn default_settings_follow_build_grammar() {
    assert_eq!(Settings::default(), Settings::for_grammar(DEFAULT_GRAMMAR));
}

#[cfg(not(feature = "hex-grammar"))]
#[test]
fn default_grammar_is_rgb_line() {
    assert_eq!(DEFAULT_GRAMMAR, Grammar::RgbLine);
}

#[cfg(feature = "hex-grammar")]
#[test]
fn default_grammar_is_hex() {
    assert_eq!(DEFAULT_GRAMMAR, Grammar::HexTriplet);
}

#[test]
fn default_line_coding_values() {
    assert_eq!(DEFAULT_BAUD_RATE, 9600);
    assert_eq!(DEFAULT_DATA_BITS, 8);
}

#[test]
fn pin_assignments_distinct() {
    let all = [pins::LED_DATA, pins::LED_SCK, pins::USB_DP, pins::USB_DM];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
