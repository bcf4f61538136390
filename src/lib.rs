//! USB Pixel Firmware Library
//!
//! This library provides the core functionality for a USB-attached
//! indicator light: the host opens a virtual serial port (USB CDC-ACM),
//! writes a color command, and a single WS2812 pixel changes color.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Poll loop  │  Indicator (color state)  │  CdcDevice         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    PROTOCOL LAYER                            │
//! │  Control dispatcher  │  Line assembler  │  Command grammars  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  USB (embassy-usb)  │  SPI -> WS2812  │  GPIO (D+ line)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Single owner per state**: line coding belongs to the control
//!   dispatcher, buffers and color to the poll loop
//! - **No allocation**: every buffer is fixed-size and lives for the process
//! - **No unsafe in application code**: All unsafe isolated in HAL crates
//! - **Functional core, imperative shell**: Pure logic separated from I/O;
//!   the core reports outcomes and the firmware shell logs them
//! - **Silent recovery**: malformed input is dropped, never reported to the host

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// Provides safe abstractions over STM32G474 peripherals.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// WS2812 pixel output over any `embedded-hal` SPI bus.
pub mod drivers;

/// USB Subsystem
///
/// `embassy-usb` binding of the CDC-ACM function.
#[cfg(feature = "embedded")]
pub mod usb;

/// Communication Protocols
///
/// Control requests, receive assembly, color command grammars.
pub mod protocol;

/// Indicator state
///
/// Receive path and current LED color, driven by the poll loop.
pub mod indicator;

/// Device context
///
/// The whole protocol state behind the bus driver's callback contract.
pub mod device;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Common traits
    pub use smart_leds_trait::SmartLedsWrite;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
