//! CDC-ACM device context
//!
//! Ties the control dispatcher and the indicator together behind the bus
//! driver's callback contract. One instance lives for the whole process and
//! is passed by reference to the bus driver on every poll.

use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::config::Settings;
use crate::indicator::{Indicator, Tick};
use crate::protocol::{
    BusDriver, ControlDispatcher, ControlReply, DataStage, SetupPacket, UsbCallbacks, WriteStatus,
};

/// Protocol state of the whole device
#[derive(Default)]
pub struct CdcDevice {
    control: ControlDispatcher,
    indicator: Indicator,
}

impl CdcDevice {
    /// Create a device in its boot state
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            control: ControlDispatcher::new(),
            indicator: Indicator::new(settings),
        }
    }

    /// One iteration of the cooperative poll loop
    ///
    /// Services the bus (which may deliver bytes and complete a command),
    /// drains at most one command, refreshes the LED and, if enabled, queues
    /// the liveness byte.
    ///
    /// # Errors
    ///
    /// Returns the LED sink's error.
    pub fn service<B, L>(&mut self, bus: &mut B, led: &mut L) -> Result<Tick, L::Error>
    where
        B: BusDriver,
        L: SmartLedsWrite<Color = RGB8>,
    {
        bus.poll(self);
        let tick = self.indicator.tick(led)?;
        if let Some(ack) = tick.ack {
            // A busy endpoint just skips this heartbeat
            let _ = bus.transmit(&[ack]);
        }
        Ok(tick)
    }

    /// Control dispatcher, for inspection
    #[must_use]
    pub const fn control(&self) -> &ControlDispatcher {
        &self.control
    }

    /// Mutable control dispatcher, for draining its events
    pub fn control_mut(&mut self) -> &mut ControlDispatcher {
        &mut self.control
    }

    /// Indicator state
    #[must_use]
    pub const fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Mutable indicator state
    pub fn indicator_mut(&mut self) -> &mut Indicator {
        &mut self.indicator
    }
}

impl UsbCallbacks for CdcDevice {
    fn descriptor(&mut self, setup: &SetupPacket) -> ControlReply<'_> {
        self.control.descriptor(setup)
    }

    fn setup(&mut self, setup: &SetupPacket) -> ControlReply<'_> {
        self.control.setup(setup)
    }

    fn write(&mut self, data: &[u8]) -> WriteStatus {
        match self.control.write(data) {
            DataStage::Consumed { complete: false } => WriteStatus::More,
            DataStage::Consumed { complete: true } => WriteStatus::Done,
            DataStage::Unclaimed => {
                self.indicator.feed(data);
                WriteStatus::Done
            }
        }
    }

    fn write_out(&mut self, data: &[u8]) {
        self.indicator.feed(data);
    }
}
