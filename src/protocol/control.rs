//! Control-request dispatcher
//!
//! Answers the control transfers a CDC-ACM device sees: configuration
//! descriptor reads and the four ACM class requests. Every path is bounded
//! and non-blocking, since the bus driver calls in from its timing budget.

use heapless::Vec;

use super::descriptor::{kind, CONFIGURATION_DESCRIPTOR};
use super::line_coding::{ControlSignals, LineCoding, LINE_CODING_LEN};

/// ACM class request codes
pub mod request {
    /// Host writes a 7-byte line coding record in the data stage
    pub const SET_LINE_CODING: u8 = 0x20;
    /// Host reads the 7-byte line coding record
    pub const GET_LINE_CODING: u8 = 0x21;
    /// Host sets DTR/RTS in `wValue`
    pub const SET_CONTROL_LINE_STATE: u8 = 0x22;
    /// Host requests a break of `wValue` milliseconds
    pub const SEND_BREAK: u8 = 0x23;
}

/// Standard `GET_DESCRIPTOR` request code
pub const GET_DESCRIPTOR: u8 = 0x06;

/// Request type field of `bmRequestType`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Standard chapter 9 request
    Standard,
    /// Class-specific request
    Class,
    /// Vendor-specific request
    Vendor,
    /// Reserved encoding
    Reserved,
}

/// Decoded 8-byte SETUP packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetupPacket {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// `wLength`
    pub length: u16,
}

impl SetupPacket {
    /// Decode a SETUP packet from its wire bytes
    #[must_use]
    pub const fn parse(bytes: &[u8; 8]) -> Self {
        Self {
            request_type: bytes[0],
            request: bytes[1],
            value: u16::from_le_bytes([bytes[2], bytes[3]]),
            index: u16::from_le_bytes([bytes[4], bytes[5]]),
            length: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    /// Class request addressed to an interface
    #[must_use]
    pub const fn class(direction_in: bool, request: u8, value: u16, length: u16) -> Self {
        Self {
            request_type: if direction_in { 0xA1 } else { 0x21 },
            request,
            value,
            index: 0,
            length,
        }
    }

    /// Standard `GET_DESCRIPTOR` request
    #[must_use]
    pub const fn get_descriptor(descriptor_type: u8, descriptor_index: u8, length: u16) -> Self {
        Self {
            request_type: 0x80,
            request: GET_DESCRIPTOR,
            value: ((descriptor_type as u16) << 8) | descriptor_index as u16,
            index: 0,
            length,
        }
    }

    /// Request type encoded in bits 5..6
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match (self.request_type >> 5) & 0x03 {
            0 => RequestKind::Standard,
            1 => RequestKind::Class,
            2 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    /// Data stage flows device-to-host
    #[must_use]
    pub const fn is_in(&self) -> bool {
        self.request_type & 0x80 != 0
    }

    /// Descriptor type in the high byte of `wValue`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn descriptor_type(&self) -> u8 {
        (self.value >> 8) as u8
    }
}

/// Answer to a SETUP stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlReply<'a> {
    /// Send these bytes in the data stage (may be empty: zero-length success)
    Data(&'a [u8]),
    /// The data stage will be delivered through the write callback
    Deferred,
}

impl<'a> ControlReply<'a> {
    /// Zero-length success
    pub const ACK: Self = ControlReply::Data(&[]);

    /// Number of bytes in the data stage, if known now
    #[must_use]
    pub const fn data_len(&self) -> Option<usize> {
        match self {
            Self::Data(bytes) => Some(bytes.len()),
            Self::Deferred => None,
        }
    }
}

/// Result of handing a control data stage to the dispatcher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataStage {
    /// Bytes went into the armed line coding record
    Consumed {
        /// The record is complete and committed
        complete: bool,
    },
    /// No data stage was armed: the bytes are serial payload
    Unclaimed,
}

/// Events worth reporting to the firmware shell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// A new line coding record was committed
    LineCoding(LineCoding),
    /// DTR/RTS changed
    ControlLines(ControlSignals),
    /// Host asked for a break of this many milliseconds (not generated)
    Break(u16),
}

/// Owner of the line coding register and the control state machine
#[derive(Debug, Default)]
pub struct ControlDispatcher {
    line_coding: LineCoding,
    signals: ControlSignals,
    staging: Option<Vec<u8, LINE_CODING_LEN>>,
    last_event: Option<ControlEvent>,
}

impl ControlDispatcher {
    /// Create a dispatcher holding the default line coding
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current line coding
    #[must_use]
    pub const fn line_coding(&self) -> LineCoding {
        self.line_coding
    }

    /// Last DTR/RTS state reported by the host
    #[must_use]
    pub const fn control_signals(&self) -> ControlSignals {
        self.signals
    }

    /// Is a `SET_LINE_CODING` data stage armed?
    #[must_use]
    pub const fn awaiting_data(&self) -> bool {
        self.staging.is_some()
    }

    /// Take the most recent event, if any
    pub fn take_event(&mut self) -> Option<ControlEvent> {
        self.last_event.take()
    }

    /// Answer a `GET_DESCRIPTOR` request
    ///
    /// Only the configuration descriptor is supplied here; every other type
    /// gets a zero-length reply and falls back to the bus driver's tables.
    #[must_use]
    pub fn descriptor(&self, setup: &SetupPacket) -> ControlReply<'static> {
        if setup.descriptor_type() == kind::CONFIGURATION {
            ControlReply::Data(truncate(&CONFIGURATION_DESCRIPTOR, setup.length))
        } else {
            ControlReply::ACK
        }
    }

    /// Answer a SETUP stage
    pub fn setup(&mut self, setup: &SetupPacket) -> ControlReply<'_> {
        // A new SETUP always aborts an unfinished data stage
        self.staging = None;

        if setup.kind() != RequestKind::Class {
            return ControlReply::ACK;
        }

        match setup.request {
            request::SET_LINE_CODING => {
                self.staging = Some(Vec::new());
                ControlReply::Deferred
            }
            request::GET_LINE_CODING => {
                ControlReply::Data(truncate(self.line_coding.as_bytes(), setup.length))
            }
            request::SET_CONTROL_LINE_STATE => {
                let signals = ControlSignals::from_value(setup.value);
                if signals != self.signals {
                    self.signals = signals;
                    self.last_event = Some(ControlEvent::ControlLines(signals));
                }
                ControlReply::ACK
            }
            request::SEND_BREAK => {
                self.last_event = Some(ControlEvent::Break(setup.value));
                ControlReply::ACK
            }
            _ => ControlReply::ACK,
        }
    }

    /// Accept (part of) a control OUT data stage
    ///
    /// Bytes beyond the 7-byte record are ignored. The record is committed
    /// only once all 7 bytes have arrived.
    pub fn write(&mut self, data: &[u8]) -> DataStage {
        let Some(staging) = self.staging.as_mut() else {
            return DataStage::Unclaimed;
        };

        let room = LINE_CODING_LEN - staging.len();
        let take = data.len().min(room);
        // Cannot fail: `take` is bounded by the remaining capacity
        let _ = staging.extend_from_slice(&data[..take]);

        if staging.is_full() {
            let mut record = [0u8; LINE_CODING_LEN];
            record.copy_from_slice(staging);
            self.staging = None;
            self.line_coding = LineCoding::from_bytes(record);
            self.last_event = Some(ControlEvent::LineCoding(self.line_coding));
            DataStage::Consumed { complete: true }
        } else {
            DataStage::Consumed { complete: false }
        }
    }

    /// Commit a complete `SET_LINE_CODING` transfer in one step
    ///
    /// For bus drivers that deliver SETUP and data stage together. A short
    /// record is rejected and leaves no data stage armed.
    pub fn set_line_coding(&mut self, data: &[u8]) -> bool {
        self.staging = Some(Vec::new());
        let complete = matches!(self.write(data), DataStage::Consumed { complete: true });
        if !complete {
            self.staging = None;
        }
        complete
    }
}

fn truncate(bytes: &[u8], length: u16) -> &[u8] {
    &bytes[..bytes.len().min(usize::from(length))]
}
