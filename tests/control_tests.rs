//! Control Request Tests
//!
//! Tests for the CDC-ACM control dispatcher: configuration descriptor,
//! line coding register and the class requests.

use usb_pixel::protocol::control::{request, RequestKind};
use usb_pixel::protocol::descriptor::{kind, CONFIGURATION_DESCRIPTOR, CONFIGURATION_LEN};
use usb_pixel::protocol::line_coding::{Parity, StopBits};
use usb_pixel::protocol::{
    ControlDispatcher, ControlEvent, ControlReply, ControlSignals, DataStage, LineCoding,
    SetupPacket,
};

fn set_line_coding() -> SetupPacket {
    SetupPacket::class(false, request::SET_LINE_CODING, 0, 7)
}

fn get_line_coding(length: u16) -> SetupPacket {
    SetupPacket::class(true, request::GET_LINE_CODING, 0, length)
}

fn reply_bytes(reply: ControlReply<'_>) -> Vec<u8> {
    match reply {
        ControlReply::Data(bytes) => bytes.to_vec(),
        ControlReply::Deferred => panic!("expected an immediate reply"),
    }
}

// ============================================================================
// Configuration Descriptor Tests
// ============================================================================

#[test]
fn test_descriptor_length() {
    assert_eq!(CONFIGURATION_LEN, 67);
    assert_eq!(CONFIGURATION_DESCRIPTOR.len(), 67);
    // wTotalLength
    assert_eq!(u16::from_le_bytes([CONFIGURATION_DESCRIPTOR[2], CONFIGURATION_DESCRIPTOR[3]]), 67);
}

#[test]
fn test_descriptor_header() {
    assert_eq!(&CONFIGURATION_DESCRIPTOR[..9], &[9, 2, 67, 0, 2, 1, 0, 0x80, 50]);
}

#[test]
fn test_descriptor_interface_classes() {
    // Communication interface: CDC / ACM / AT, one endpoint
    assert_eq!(&CONFIGURATION_DESCRIPTOR[9..18], &[9, 4, 0, 0, 1, 0x02, 0x02, 0x01, 0]);
    // Data interface: CDC data, two endpoints
    assert_eq!(&CONFIGURATION_DESCRIPTOR[44..53], &[9, 4, 1, 0, 2, 0x0A, 0, 0, 0]);
}

#[test]
fn test_descriptor_functional_descriptors() {
    assert_eq!(&CONFIGURATION_DESCRIPTOR[18..23], &[5, 0x24, 0x00, 0x10, 0x01]);
    assert_eq!(&CONFIGURATION_DESCRIPTOR[23..28], &[5, 0x24, 0x01, 0x00, 1]);
    assert_eq!(&CONFIGURATION_DESCRIPTOR[28..32], &[4, 0x24, 0x02, 0x02]);
    assert_eq!(&CONFIGURATION_DESCRIPTOR[32..37], &[5, 0x24, 0x06, 0, 1]);
}

#[test]
fn test_descriptor_endpoints() {
    assert_eq!(&CONFIGURATION_DESCRIPTOR[37..44], &[7, 5, 0x81, 0x03, 8, 0, 10]);
    assert_eq!(&CONFIGURATION_DESCRIPTOR[53..60], &[7, 5, 0x03, 0x02, 8, 0, 0]);
    assert_eq!(&CONFIGURATION_DESCRIPTOR[60..67], &[7, 5, 0x83, 0x02, 8, 0, 0]);
}

#[test]
fn test_descriptor_lengths_chain() {
    // Every sub-descriptor's bLength must land exactly on the end
    let mut pos = 0;
    let mut count = 0;
    while pos < CONFIGURATION_LEN {
        let len = CONFIGURATION_DESCRIPTOR[pos] as usize;
        assert!(len > 0);
        pos += len;
        count += 1;
    }
    assert_eq!(pos, CONFIGURATION_LEN);
    assert_eq!(count, 10);
}

#[test]
fn test_get_configuration_full() {
    let dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::get_descriptor(kind::CONFIGURATION, 0, 255);
    let bytes = reply_bytes(dispatcher.descriptor(&setup));
    assert_eq!(bytes.len(), 67);
    assert_eq!(bytes, CONFIGURATION_DESCRIPTOR.to_vec());
}

#[test]
fn test_get_configuration_truncated() {
    let dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::get_descriptor(kind::CONFIGURATION, 0, 9);
    let bytes = reply_bytes(dispatcher.descriptor(&setup));
    assert_eq!(bytes, CONFIGURATION_DESCRIPTOR[..9].to_vec());
}

#[test]
fn test_get_other_descriptor_empty() {
    let dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::get_descriptor(kind::STRING, 1, 64);
    assert_eq!(dispatcher.descriptor(&setup), ControlReply::ACK);
}

// ============================================================================
// Line Coding Tests
// ============================================================================

#[test]
fn test_default_line_coding() {
    let dispatcher = ControlDispatcher::new();
    let coding = dispatcher.line_coding();
    assert_eq!(coding.baud_rate(), 9600);
    assert_eq!(coding.data_bits(), 8);
    assert_eq!(coding.stop_bits(), Some(StopBits::One));
    assert_eq!(coding.parity(), Some(Parity::None));
}

#[test]
fn test_set_then_get_line_coding() {
    let mut dispatcher = ControlDispatcher::new();
    let record = LineCoding::new(115_200, 1, 0, 7);

    assert_eq!(dispatcher.setup(&set_line_coding()), ControlReply::Deferred);
    assert!(dispatcher.awaiting_data());
    assert_eq!(dispatcher.write(record.as_bytes()), DataStage::Consumed { complete: true });
    assert!(!dispatcher.awaiting_data());

    let bytes = reply_bytes(dispatcher.setup(&get_line_coding(7)));
    assert_eq!(bytes, vec![0x00, 0xC2, 0x01, 0x00, 1, 0, 7]);
    assert_eq!(dispatcher.line_coding().baud_rate(), 115_200);
}

#[test]
fn test_line_coding_is_echoed_verbatim() {
    // Undefined stop/parity values still round-trip unchanged
    let mut dispatcher = ControlDispatcher::new();
    let raw = [0x80, 0x25, 0x00, 0x00, 7, 9, 16];

    dispatcher.setup(&set_line_coding());
    dispatcher.write(&raw);

    assert_eq!(reply_bytes(dispatcher.setup(&get_line_coding(7))), raw.to_vec());
    assert_eq!(dispatcher.line_coding().stop_bits(), None);
    assert_eq!(dispatcher.line_coding().parity(), None);
}

#[test]
fn test_set_line_coding_in_chunks() {
    let mut dispatcher = ControlDispatcher::new();
    let record = LineCoding::new(57_600, 2, 2, 8);
    let bytes = record.as_bytes();

    dispatcher.setup(&set_line_coding());
    assert_eq!(dispatcher.write(&bytes[..4]), DataStage::Consumed { complete: false });
    // Nothing committed yet
    assert_eq!(dispatcher.line_coding(), LineCoding::default());
    assert_eq!(dispatcher.write(&bytes[4..]), DataStage::Consumed { complete: true });
    assert_eq!(dispatcher.line_coding(), record);
}

#[test]
fn test_set_line_coding_extra_bytes_ignored() {
    let mut dispatcher = ControlDispatcher::new();
    let mut data = LineCoding::new(19_200, 0, 1, 8).as_bytes().to_vec();
    data.extend_from_slice(&[0xAA, 0xBB]);

    dispatcher.setup(&set_line_coding());
    assert_eq!(dispatcher.write(&data), DataStage::Consumed { complete: true });
    assert_eq!(dispatcher.line_coding().baud_rate(), 19_200);
    assert_eq!(dispatcher.line_coding().parity(), Some(Parity::Odd));
}

#[test]
fn test_short_data_stage_aborted_by_new_setup() {
    let mut dispatcher = ControlDispatcher::new();

    dispatcher.setup(&set_line_coding());
    dispatcher.write(&[0x00, 0xC2]);
    // Host moves on without finishing the data stage
    dispatcher.setup(&get_line_coding(7));

    assert!(!dispatcher.awaiting_data());
    assert_eq!(dispatcher.line_coding(), LineCoding::default());
}

#[test]
fn test_write_without_setup_is_unclaimed() {
    let mut dispatcher = ControlDispatcher::new();
    assert_eq!(dispatcher.write(b"RGB:1,2,3\n"), DataStage::Unclaimed);
    assert_eq!(dispatcher.line_coding(), LineCoding::default());
}

#[test]
fn test_get_line_coding_truncated() {
    let mut dispatcher = ControlDispatcher::new();
    let bytes = reply_bytes(dispatcher.setup(&get_line_coding(4)));
    assert_eq!(bytes, 9600u32.to_le_bytes().to_vec());
}

#[test]
fn test_set_line_coding_one_step() {
    let mut dispatcher = ControlDispatcher::new();
    assert!(dispatcher.set_line_coding(LineCoding::new(38_400, 0, 0, 8).as_bytes()));
    assert_eq!(dispatcher.line_coding().baud_rate(), 38_400);

    assert!(!dispatcher.set_line_coding(&[1, 2, 3]));
    assert_eq!(dispatcher.line_coding().baud_rate(), 38_400);
}

#[test]
fn test_short_one_step_line_coding_disarms() {
    let mut dispatcher = ControlDispatcher::new();
    assert!(!dispatcher.set_line_coding(&[0x00, 0xC2]));
    assert!(!dispatcher.awaiting_data());

    // Following writes are serial payload again
    assert_eq!(dispatcher.write(b"RGB:1,"), DataStage::Unclaimed);
    assert_eq!(dispatcher.line_coding(), LineCoding::default());
    assert_eq!(dispatcher.take_event(), None);
}

#[test]
fn test_line_coding_event() {
    let mut dispatcher = ControlDispatcher::new();
    let record = LineCoding::new(115_200, 0, 0, 8);

    dispatcher.setup(&set_line_coding());
    dispatcher.write(record.as_bytes());

    assert_eq!(dispatcher.take_event(), Some(ControlEvent::LineCoding(record)));
    assert_eq!(dispatcher.take_event(), None);
}

// ============================================================================
// Other Class Request Tests
// ============================================================================

#[test]
fn test_control_line_state() {
    let mut dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::class(false, request::SET_CONTROL_LINE_STATE, 0x0003, 0);

    assert_eq!(dispatcher.setup(&setup), ControlReply::ACK);
    let signals = dispatcher.control_signals();
    assert!(signals.dtr);
    assert!(signals.rts);
    assert!(signals.connected());
    assert_eq!(
        dispatcher.take_event(),
        Some(ControlEvent::ControlLines(ControlSignals { dtr: true, rts: true }))
    );

    // Same state again: no new event
    dispatcher.setup(&setup);
    assert_eq!(dispatcher.take_event(), None);
}

#[test]
fn test_control_line_state_does_not_touch_line_coding() {
    let mut dispatcher = ControlDispatcher::new();
    dispatcher.setup(&SetupPacket::class(false, request::SET_CONTROL_LINE_STATE, 0x0001, 0));
    assert_eq!(dispatcher.line_coding(), LineCoding::default());
    assert!(!dispatcher.awaiting_data());
}

#[test]
fn test_send_break_accepted() {
    let mut dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::class(false, request::SEND_BREAK, 250, 0);

    assert_eq!(dispatcher.setup(&setup), ControlReply::ACK);
    assert_eq!(dispatcher.take_event(), Some(ControlEvent::Break(250)));
}

#[test]
fn test_unknown_class_request() {
    let mut dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::class(true, 0x42, 0, 16);
    assert_eq!(dispatcher.setup(&setup).data_len(), Some(0));
    assert_eq!(dispatcher.take_event(), None);
}

#[test]
fn test_vendor_request_zero_length() {
    let mut dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::parse(&[0xC0, 0x01, 0, 0, 0, 0, 8, 0]);
    assert_eq!(setup.kind(), RequestKind::Vendor);
    assert_eq!(dispatcher.setup(&setup), ControlReply::ACK);
}

#[test]
fn test_standard_request_not_class() {
    // SET_LINE_CODING's code under a standard request type is not ours
    let mut dispatcher = ControlDispatcher::new();
    let setup = SetupPacket::parse(&[0x00, request::SET_LINE_CODING, 0, 0, 0, 0, 7, 0]);
    assert_eq!(dispatcher.setup(&setup), ControlReply::ACK);
    assert!(!dispatcher.awaiting_data());
}

// ============================================================================
// Setup Packet Tests
// ============================================================================

#[test]
fn test_setup_packet_parse() {
    let setup = SetupPacket::parse(&[0xA1, 0x21, 0x34, 0x12, 0x01, 0x00, 0x07, 0x00]);
    assert_eq!(setup.request_type, 0xA1);
    assert_eq!(setup.request, request::GET_LINE_CODING);
    assert_eq!(setup.value, 0x1234);
    assert_eq!(setup.index, 1);
    assert_eq!(setup.length, 7);
    assert_eq!(setup.kind(), RequestKind::Class);
    assert!(setup.is_in());
}

#[test]
fn test_setup_packet_descriptor_type() {
    let setup = SetupPacket::get_descriptor(kind::CONFIGURATION, 0, 67);
    assert_eq!(setup.kind(), RequestKind::Standard);
    assert_eq!(setup.descriptor_type(), kind::CONFIGURATION);
    assert_eq!(setup.value, 0x0200);
    assert!(setup.is_in());
}

#[test]
fn test_control_signals_decode() {
    assert_eq!(ControlSignals::from_value(0), ControlSignals::default());
    assert_eq!(ControlSignals::from_value(0x0002), ControlSignals { dtr: false, rts: true });
    assert!(!ControlSignals::from_value(0x0002).connected());
}
