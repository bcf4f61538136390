//! Communication Protocols
//!
//! The CDC-ACM adaptation layer: control-request handling, assembly of the
//! data-out byte stream into commands, and the color command grammars.

pub mod assembler;
pub mod command;
pub mod control;
pub mod descriptor;
pub mod line_coding;
pub mod transport;

pub use assembler::{AssemblerStats, CompletedLine, Framing, ReceiveAssembler};
pub use command::{CommandParser, ParseError};
pub use control::{ControlDispatcher, ControlEvent, ControlReply, DataStage, SetupPacket};
pub use line_coding::{ControlSignals, LineCoding};
pub use transport::{reenumerate, BusControl, BusDriver, UsbCallbacks, WriteStatus};
