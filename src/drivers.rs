//! Peripheral Drivers
//!
//! High-level drivers for external parts, written against `embedded-hal`
//! traits so they run on the target and under host tests alike.

pub mod ws2812;
