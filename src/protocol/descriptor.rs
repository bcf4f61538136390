//! CDC-ACM descriptor data
//!
//! The configuration descriptor is fixed wire data: two interfaces
//! (communication + data), one interrupt-IN notification endpoint and one
//! bulk IN/OUT pair. Hosts reject enumeration on any length mismatch, so the
//! image is assembled at compile time and its length checked there.

use crate::config::{USB_CDC_PACKET_SIZE, USB_MAX_POWER_MA, USB_NOTIFY_INTERVAL_MS};

/// Standard descriptor types
pub mod kind {
    /// Device descriptor
    pub const DEVICE: u8 = 0x01;
    /// Configuration descriptor
    pub const CONFIGURATION: u8 = 0x02;
    /// String descriptor
    pub const STRING: u8 = 0x03;
    /// Interface descriptor
    pub const INTERFACE: u8 = 0x04;
    /// Endpoint descriptor
    pub const ENDPOINT: u8 = 0x05;
    /// Class-specific interface descriptor
    pub const CS_INTERFACE: u8 = 0x24;
}

/// Communications device class
pub const USB_CLASS_CDC: u8 = 0x02;

/// CDC data interface class
pub const USB_CLASS_CDC_DATA: u8 = 0x0A;

/// Abstract Control Model subclass
pub const CDC_SUBCLASS_ACM: u8 = 0x02;

/// AT command protocol (V.250)
pub const CDC_PROTOCOL_AT: u8 = 0x01;

/// Communication interface number
pub const COMM_INTERFACE: u8 = 0;

/// Data interface number
pub const DATA_INTERFACE: u8 = 1;

/// Notification endpoint address (interrupt IN 1)
pub const EP_NOTIFY_IN: u8 = 0x81;

/// Data endpoint address (bulk OUT 3)
pub const EP_DATA_OUT: u8 = 0x03;

/// Data endpoint address (bulk IN 3)
pub const EP_DATA_IN: u8 = 0x83;

/// ACM capabilities: line coding and serial state
pub const ACM_CAPABILITIES: u8 = 0x02;

/// CDC Header functional descriptor body (bcdCDC 1.10)
pub const CDC_HEADER: [u8; 3] = [0x00, 0x10, 0x01];

/// CDC Call Management functional descriptor body (no call management)
pub const CDC_CALL_MANAGEMENT: [u8; 3] = [0x01, 0x00, DATA_INTERFACE];

/// CDC ACM functional descriptor body
pub const CDC_ACM: [u8; 2] = [0x02, ACM_CAPABILITIES];

/// CDC Union functional descriptor body
pub const CDC_UNION: [u8; 3] = [0x06, COMM_INTERFACE, DATA_INTERFACE];

/// Total length of the configuration descriptor image
pub const CONFIGURATION_LEN: usize = 67;

/// Configuration descriptor image returned for `GET_DESCRIPTOR(CONFIGURATION)`
pub static CONFIGURATION_DESCRIPTOR: [u8; CONFIGURATION_LEN] = build_configuration();

#[allow(clippy::cast_possible_truncation)]
const fn build_configuration() -> [u8; CONFIGURATION_LEN] {
    let [packet_lo, packet_hi] = USB_CDC_PACKET_SIZE.to_le_bytes();
    let out = [0u8; CONFIGURATION_LEN];

    let (out, pos) = put(
        out,
        0,
        &[
            9,
            kind::CONFIGURATION,
            CONFIGURATION_LEN as u8,
            (CONFIGURATION_LEN >> 8) as u8,
            2,    // bNumInterfaces
            1,    // bConfigurationValue
            0,    // iConfiguration
            0x80, // bus powered
            (USB_MAX_POWER_MA / 2) as u8,
        ],
    );

    // Interface 0: communication
    let (out, pos) = put(
        out,
        pos,
        &[9, kind::INTERFACE, COMM_INTERFACE, 0, 1, USB_CLASS_CDC, CDC_SUBCLASS_ACM, CDC_PROTOCOL_AT, 0],
    );
    let (out, pos) = put_functional(out, pos, &CDC_HEADER);
    let (out, pos) = put_functional(out, pos, &CDC_CALL_MANAGEMENT);
    let (out, pos) = put_functional(out, pos, &CDC_ACM);
    let (out, pos) = put_functional(out, pos, &CDC_UNION);
    let (out, pos) = put(
        out,
        pos,
        &[7, kind::ENDPOINT, EP_NOTIFY_IN, 0x03, packet_lo, packet_hi, USB_NOTIFY_INTERVAL_MS],
    );

    // Interface 1: data
    let (out, pos) = put(
        out,
        pos,
        &[9, kind::INTERFACE, DATA_INTERFACE, 0, 2, USB_CLASS_CDC_DATA, 0, 0, 0],
    );
    let (out, pos) = put(out, pos, &[7, kind::ENDPOINT, EP_DATA_OUT, 0x02, packet_lo, packet_hi, 0]);
    let (out, pos) = put(out, pos, &[7, kind::ENDPOINT, EP_DATA_IN, 0x02, packet_lo, packet_hi, 0]);

    assert!(pos == CONFIGURATION_LEN, "configuration descriptor length mismatch");
    out
}

const fn put(
    mut out: [u8; CONFIGURATION_LEN],
    pos: usize,
    bytes: &[u8],
) -> ([u8; CONFIGURATION_LEN], usize) {
    let mut i = 0;
    while i < bytes.len() {
        out[pos + i] = bytes[i];
        i += 1;
    }
    (out, pos + bytes.len())
}

#[allow(clippy::cast_possible_truncation)]
const fn put_functional(
    out: [u8; CONFIGURATION_LEN],
    pos: usize,
    body: &[u8],
) -> ([u8; CONFIGURATION_LEN], usize) {
    let (out, pos) = put(out, pos, &[(body.len() + 2) as u8, kind::CS_INTERFACE]);
    put(out, pos, body)
}
