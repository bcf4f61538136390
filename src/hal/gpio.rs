//! GPIO Abstractions
//!
//! Type-safe GPIO pin wrappers for the USB pixel board.
//! Provides semantic meaning to pins through the type system.

use embassy_stm32::gpio::{Flex, Speed};

use crate::protocol::BusControl;

/// Bus attachment state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BusState {
    /// D+ released, the host can see the device
    #[default]
    Attached,
    /// D+ held low, the host sees an empty port
    Detached,
}

impl defmt::Format for BusState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Attached => defmt::write!(f, "ATTACHED"),
            Self::Detached => defmt::write!(f, "DETACHED"),
        }
    }
}

/// D+ line borrowed from the USB peripheral before it is initialized
///
/// Pulling D+ low looks like an unplugged cable to the host. Releasing the
/// pin hands it back to the USB peripheral's pull-up.
pub struct DplusLine<'d> {
    pin: Flex<'d>,
    state: BusState,
}

impl<'d> DplusLine<'d> {
    /// Wrap the D+ pin (starts released)
    #[must_use]
    pub fn new(pin: Flex<'d>) -> Self {
        Self {
            pin,
            state: BusState::Attached,
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> BusState {
        self.state
    }
}

impl BusControl for DplusLine<'_> {
    fn connect(&mut self) {
        self.pin.set_as_analog();
        self.state = BusState::Attached;
    }

    fn disconnect(&mut self) {
        self.pin.set_low();
        self.pin.set_as_output(Speed::Low);
        self.state = BusState::Detached;
    }
}
