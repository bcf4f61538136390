//! Indicator state
//!
//! The data path of the firmware: receive assembler, command parser and the
//! current LED color. Owned by the poll loop; nothing else mutates it.

use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::config::{Settings, ACK_BYTE};
use crate::protocol::{AssemblerStats, CommandParser, CompletedLine, ParseError, ReceiveAssembler};
use crate::types::LedColor;

/// What one poll tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Outcome of the command drained this tick, if one was waiting
    pub command: Option<Result<LedColor, ParseError>>,
    /// Liveness byte to send to the host, if the heartbeat is enabled
    pub ack: Option<u8>,
}

impl Tick {
    /// Color applied this tick, if any
    #[must_use]
    pub fn applied(&self) -> Option<LedColor> {
        self.command.and_then(Result::ok)
    }
}

/// Receive path and LED color
pub struct Indicator {
    settings: Settings,
    assembler: ReceiveAssembler,
    parser: CommandParser,
    color: LedColor,
}

impl Indicator {
    /// Create the indicator showing the boot color
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self {
            settings,
            assembler: ReceiveAssembler::new(settings.grammar.framing()),
            parser: CommandParser::new(settings.grammar),
            color: settings.boot_color,
        }
    }

    /// Feed serial payload bytes in delivery order
    pub fn feed(&mut self, data: &[u8]) {
        self.assembler.push_slice(data);
    }

    /// One poll-loop step: drain at most one command, then refresh the LED
    ///
    /// The LED is written on every tick whether or not the color changed.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the LED write fails. The color state is
    /// updated before the write, so a failed refresh is retried next tick.
    pub fn tick<L>(&mut self, led: &mut L) -> Result<Tick, L::Error>
    where
        L: SmartLedsWrite<Color = RGB8>,
    {
        let command = self.assembler.take_line().map(|line| self.apply(&line));
        led.write(core::iter::once(self.color))?;

        Ok(Tick {
            command,
            ack: self.settings.ack_heartbeat.then_some(ACK_BYTE),
        })
    }

    /// Parse a completed command and, on success, replace the color
    ///
    /// # Errors
    ///
    /// Returns why the command was rejected; the color is left unchanged.
    pub fn apply(&mut self, line: &CompletedLine) -> Result<LedColor, ParseError> {
        let color = self.parser.parse(line)?;
        self.color = color;
        Ok(color)
    }

    /// Current color
    #[must_use]
    pub const fn color(&self) -> LedColor {
        self.color
    }

    /// Active settings
    #[must_use]
    pub const fn settings(&self) -> Settings {
        self.settings
    }

    /// Receive assembler, for inspection
    #[must_use]
    pub const fn assembler(&self) -> &ReceiveAssembler {
        &self.assembler
    }

    /// Receive diagnostics
    #[must_use]
    pub const fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
