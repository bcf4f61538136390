//! USB CDC ACM (Serial) Implementation
//!
//! Registers the CDC-ACM function with `embassy-usb` and bridges the
//! stack's control callbacks onto [`ControlDispatcher`]. The interface and
//! endpoint layout mirrors [`crate::protocol::descriptor`]; `embassy-usb`
//! serializes the configuration descriptor itself.

use defmt::{debug, info, trace};
use embassy_usb::control::{InResponse, OutResponse, Request};
use embassy_usb::driver::{Direction, Driver, Endpoint, EndpointError, EndpointIn, EndpointOut};
use embassy_usb::{Builder, Handler};

use crate::config::{
    USB_CDC_PACKET_SIZE, USB_DEVICE_RELEASE, USB_EP0_PACKET_SIZE, USB_MANUFACTURER,
    USB_MAX_POWER_MA, USB_NOTIFY_INTERVAL_MS, USB_PID, USB_PRODUCT, USB_SERIAL, USB_VID,
};
use crate::protocol::control::RequestKind;
use crate::protocol::descriptor::{
    kind, CDC_ACM, CDC_HEADER, CDC_PROTOCOL_AT, CDC_SUBCLASS_ACM, USB_CLASS_CDC, USB_CLASS_CDC_DATA,
};
use crate::protocol::{ControlDispatcher, ControlEvent, ControlReply, DataStage, SetupPacket};

/// USB device descriptor strings
pub struct UsbStrings {
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
}

impl Default for UsbStrings {
    fn default() -> Self {
        Self {
            manufacturer: USB_MANUFACTURER,
            product: USB_PRODUCT,
            serial: USB_SERIAL,
        }
    }
}

/// USB device info for descriptor
#[derive(Clone, Copy, Debug)]
pub struct UsbDeviceInfo {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Device release number
    pub device_release: u16,
}

impl Default for UsbDeviceInfo {
    fn default() -> Self {
        Self {
            vid: USB_VID,
            pid: USB_PID,
            device_release: USB_DEVICE_RELEASE,
        }
    }
}

impl defmt::Format for UsbDeviceInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "USB({:04X}:{:04X})", self.vid, self.pid);
    }
}

/// Build the `embassy-usb` device configuration
#[must_use]
pub fn device_config(info: UsbDeviceInfo, strings: &UsbStrings) -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(info.vid, info.pid);
    config.manufacturer = Some(strings.manufacturer);
    config.product = Some(strings.product);
    config.serial_number = Some(strings.serial);
    config.device_release = info.device_release;
    config.max_power = USB_MAX_POWER_MA;
    config.max_packet_size_0 = USB_EP0_PACKET_SIZE;

    // Plain CDC device, no interface association descriptor
    config.device_class = USB_CLASS_CDC;
    config.device_sub_class = 0x00;
    config.device_protocol = 0x00;
    config.composite_with_iads = false;
    config
}

/// Control-side half of the CDC function, owned by the USB stack
pub struct CdcControl {
    dispatcher: ControlDispatcher,
}

impl CdcControl {
    /// Create the control handler with the default line coding
    #[must_use]
    pub fn new() -> Self {
        Self {
            dispatcher: ControlDispatcher::new(),
        }
    }

    fn report(&mut self) {
        match self.dispatcher.take_event() {
            Some(ControlEvent::LineCoding(coding)) => info!("Line coding: {}", coding),
            Some(ControlEvent::ControlLines(signals)) => debug!("Control lines: {}", signals),
            Some(ControlEvent::Break(ms)) => debug!("SEND_BREAK {} ms ignored", ms),
            None => {}
        }
    }
}

impl Default for CdcControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild the raw SETUP packet the stack already decoded
fn setup_packet(req: &Request) -> SetupPacket {
    let direction = match req.direction {
        Direction::In => 0x80,
        Direction::Out => 0x00,
    };
    let request_type = req.request_type as u8;
    let recipient = req.recipient as u8;

    SetupPacket {
        request_type: direction | (request_type << 5) | recipient,
        request: req.request,
        value: req.value,
        index: req.index,
        length: req.length,
    }
}

impl Handler for CdcControl {
    fn reset(&mut self) {
        debug!("USB reset");
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        debug!("USB suspended: {}", suspended);
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let setup = setup_packet(&req);
        if setup.kind() == RequestKind::Standard {
            return None;
        }
        trace!("control OUT {:02X} len {}", setup.request, data.len());

        if self.dispatcher.setup(&setup) == ControlReply::Deferred {
            // The stack hands over the whole data stage at once
            if self.dispatcher.write(data) == (DataStage::Consumed { complete: false }) {
                debug!("short SET_LINE_CODING ({} bytes) ignored", data.len());
            }
        }
        self.report();
        Some(OutResponse::Accepted)
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        let setup = setup_packet(&req);
        if setup.kind() == RequestKind::Standard {
            return None;
        }
        trace!("control IN {:02X} len {}", setup.request, setup.length);

        match self.dispatcher.setup(&setup) {
            ControlReply::Data(bytes) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Some(InResponse::Accepted(&buf[..len]))
            }
            ControlReply::Deferred => Some(InResponse::Rejected),
        }
    }
}

/// Data-side half of the CDC function, owned by the poll loop
pub struct CdcDataPipe<'d, D: Driver<'d>> {
    _notify_ep: D::EndpointIn,
    read_ep: D::EndpointOut,
    write_ep: D::EndpointIn,
}

impl<'d, D: Driver<'d>> CdcDataPipe<'d, D> {
    /// Register the CDC-ACM function and its control handler
    pub fn new(builder: &mut Builder<'d, D>, control: &'d mut CdcControl) -> Self {
        let mut func = builder.function(USB_CLASS_CDC, CDC_SUBCLASS_ACM, CDC_PROTOCOL_AT);

        // Communication interface
        let mut iface = func.interface();
        let comm_if = iface.interface_number();
        let data_if = u8::from(comm_if) + 1;
        let mut alt = iface.alt_setting(USB_CLASS_CDC, CDC_SUBCLASS_ACM, CDC_PROTOCOL_AT, None);
        alt.descriptor(kind::CS_INTERFACE, &CDC_HEADER);
        alt.descriptor(kind::CS_INTERFACE, &[0x01, 0x00, data_if]);
        alt.descriptor(kind::CS_INTERFACE, &CDC_ACM);
        alt.descriptor(kind::CS_INTERFACE, &[0x06, comm_if.into(), data_if]);
        let notify_ep = alt.endpoint_interrupt_in(USB_CDC_PACKET_SIZE, USB_NOTIFY_INTERVAL_MS);

        // Data interface
        let mut iface = func.interface();
        let mut alt = iface.alt_setting(USB_CLASS_CDC_DATA, 0x00, 0x00, None);
        let read_ep = alt.endpoint_bulk_out(USB_CDC_PACKET_SIZE);
        let write_ep = alt.endpoint_bulk_in(USB_CDC_PACKET_SIZE);

        drop(func);
        builder.handler(control);

        Self {
            _notify_ep: notify_ep,
            read_ep,
            write_ep,
        }
    }

    /// Wait until the host has configured the device
    pub async fn wait_connection(&mut self) {
        self.read_ep.wait_enabled().await;
    }

    /// Read one bulk OUT packet
    pub async fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, EndpointError> {
        self.read_ep.read(buf).await
    }

    /// Write one bulk IN packet
    pub async fn write_packet(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        self.write_ep.write(data).await
    }

    /// Maximum packet size of the data endpoints
    #[must_use]
    pub const fn max_packet_size(&self) -> u16 {
        USB_CDC_PACKET_SIZE
    }
}
