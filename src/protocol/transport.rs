//! Bus driver contract
//!
//! The USB bus driver owns bit timing, packet framing and enumeration. It
//! calls into the protocol core through [`UsbCallbacks`] and offers two
//! control primitives, captured by [`BusControl`].

use embedded_hal::delay::DelayNs;

use super::control::{ControlReply, SetupPacket};
use crate::config::REENUMERATION_HOLD_MS;

/// Outcome of a control OUT data-stage chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// More data-stage chunks are expected
    More,
    /// The transfer is finished
    Done,
}

/// Callbacks a bus driver invokes, synchronously, from its poll routine
///
/// Every method must return within the bus driver's timing budget: no
/// blocking, no unbounded loops.
pub trait UsbCallbacks {
    /// `GET_DESCRIPTOR` for a descriptor the driver does not hold itself
    fn descriptor(&mut self, setup: &SetupPacket) -> ControlReply<'_>;

    /// Any SETUP stage not handled by the driver
    fn setup(&mut self, setup: &SetupPacket) -> ControlReply<'_>;

    /// A control OUT data-stage chunk, after [`ControlReply::Deferred`]
    fn write(&mut self, data: &[u8]) -> WriteStatus;

    /// A packet received on the bulk OUT endpoint
    fn write_out(&mut self, data: &[u8]);

    /// Fill a deferred control IN data stage, returning the byte count
    ///
    /// Nothing in the CDC-ACM function defers reads.
    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

/// Attach / detach primitives of the bus driver
pub trait BusControl {
    /// Present the device to the host
    fn connect(&mut self);

    /// Hide the device from the host
    fn disconnect(&mut self);
}

/// A callback-style bus driver serviced from the poll loop
pub trait BusDriver: BusControl {
    /// Run pending bus work, invoking `callbacks` for every transfer that
    /// completed since the last call
    fn poll<C: UsbCallbacks>(&mut self, callbacks: &mut C);

    /// Queue bytes on the bulk IN endpoint; returns `false` if the endpoint
    /// is still busy with earlier data
    fn transmit(&mut self, data: &[u8]) -> bool;
}

/// Force the host to enumerate the device from scratch
///
/// Holds the device off the bus long enough for every host to notice.
pub fn reenumerate<B: BusControl, D: DelayNs>(bus: &mut B, delay: &mut D) {
    bus.disconnect();
    delay.delay_ms(REENUMERATION_HOLD_MS);
    bus.connect();
}
