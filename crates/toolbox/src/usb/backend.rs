//! rusb-backed implementation of the shell's USB backend
//!
//! This module wraps a libusb session (`rusb::Context`) and the device handle
//! opened through it.

use command::ControlRequest;
use common::{DeviceLocation, DeviceSummary, UsbBackend, UsbDeviceOps};
use rusb::{Context, Device, DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::debug;

/// libusb session
pub struct RusbBackend {
    context: Context,
}

impl RusbBackend {
    /// Create a new libusb session with the given library log level
    pub fn new(log_level: rusb::LogLevel) -> Result<Self, rusb::Error> {
        let mut context = Context::new()?;
        context.set_log_level(log_level);

        debug!("libusb session initialized");
        Ok(Self { context })
    }
}

impl UsbBackend for RusbBackend {
    type Device = RusbDevice;

    fn list_devices(&self) -> rusb::Result<Vec<rusb::Result<DeviceSummary>>> {
        let devices = self.context.devices()?;

        let summaries = devices
            .iter()
            .enumerate()
            .map(|(index, device)| summarize(index, &device))
            .collect::<Vec<_>>();

        debug!("Enumerated {} devices", summaries.len());
        Ok(summaries)
    }

    fn open_by_index(&self, index: usize) -> rusb::Result<Option<RusbDevice>> {
        let devices = self.context.devices()?;
        let Some(device) = devices.iter().nth(index) else {
            return Ok(None);
        };

        let handle = device.open()?;
        debug!(
            "Opened device {} (bus {:03}, address {:03})",
            index,
            device.bus_number(),
            device.address()
        );
        Ok(Some(RusbDevice { handle }))
    }

    fn open_by_id(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<RusbDevice>> {
        let handle = self.context.open_device_with_vid_pid(vendor_id, product_id);
        if handle.is_some() {
            debug!("Opened device {:04x}:{:04x}", vendor_id, product_id);
        }
        Ok(handle.map(|handle| RusbDevice { handle }))
    }
}

/// Device opened through libusb; dropping it closes the handle
pub struct RusbDevice {
    handle: DeviceHandle<Context>,
}

impl UsbDeviceOps for RusbDevice {
    fn active_configuration(&self) -> rusb::Result<u8> {
        self.handle.active_configuration()
    }

    fn set_active_configuration(&mut self, value: u8) -> rusb::Result<()> {
        self.handle.set_active_configuration(value)
    }

    fn reset(&mut self) -> rusb::Result<()> {
        self.handle.reset()
    }

    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        self.handle.read_control(
            request.request_type,
            request.request,
            request.value,
            request.index,
            buf,
            timeout,
        )
    }

    fn write_control(
        &mut self,
        request: &ControlRequest,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        self.handle.write_control(
            request.request_type,
            request.request,
            request.value,
            request.index,
            buf,
            timeout,
        )
    }

    fn location(&self) -> DeviceLocation {
        location_of(&self.handle.device())
    }

    fn parent_location(&self) -> Option<DeviceLocation> {
        self.handle
            .device()
            .get_parent()
            .map(|parent| location_of(&parent))
    }
}

/// Read the descriptor fields `list` prints
fn summarize(index: usize, device: &Device<Context>) -> rusb::Result<DeviceSummary> {
    let descriptor = device.device_descriptor()?;

    Ok(DeviceSummary {
        index,
        bus_number: device.bus_number(),
        address: device.address(),
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        class: descriptor.class_code(),
        num_configurations: descriptor.num_configurations(),
    })
}

fn location_of(device: &Device<Context>) -> DeviceLocation {
    DeviceLocation {
        bus_number: device.bus_number(),
        port_number: device.port_number(),
        address: device.address(),
    }
}
