//! USB Subsystem
//!
//! Binds the CDC-ACM protocol core to `embassy-usb`:
//! - control requests go to the line coding dispatcher
//! - bulk OUT packets feed the indicator's receive path

pub mod cdc;
