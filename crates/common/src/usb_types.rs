//! USB type abstractions
//!
//! The shell talks to USB hardware only through [`UsbBackend`] and
//! [`UsbDeviceOps`]. The binary implements them on top of rusb; the mocks in
//! [`crate::test_utils`] implement them in memory.

use command::ControlRequest;
use std::fmt;
use std::time::Duration;

/// Summary of one enumerated device, as printed by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    /// Position in the enumeration
    pub index: usize,
    pub bus_number: u8,
    pub address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    /// bDeviceClass
    pub class: u8,
    /// bNumConfigurations
    pub num_configurations: u8,
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DEVICE {}:", self.index)?;
        writeln!(f, "Bus {:03} Device {:03}", self.bus_number, self.address)?;
        writeln!(f, "Available Configurations: {}", self.num_configurations)?;
        writeln!(f, "Device Class: {}", self.class)?;
        writeln!(f, "Vendor: 0x{:04x}", self.vendor_id)?;
        write!(f, "Product: 0x{:04x}", self.product_id)
    }
}

/// Where a device sits in the USB topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLocation {
    pub bus_number: u8,
    /// Port on the parent hub (0 for root hubs)
    pub port_number: u8,
    pub address: u8,
}

impl fmt::Display for DeviceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bus: {:03}", self.bus_number)?;
        writeln!(f, "Port: {:03}", self.port_number)?;
        write!(f, "Address: {:03}", self.address)
    }
}

/// Access to the host's USB devices
pub trait UsbBackend {
    type Device: UsbDeviceOps;

    /// Enumerate attached devices
    ///
    /// The outer error means enumeration failed as a whole; an inner error
    /// means that one device's descriptor could not be read.
    fn list_devices(&self) -> rusb::Result<Vec<rusb::Result<DeviceSummary>>>;

    /// Open the device at `index` in the current enumeration
    ///
    /// Returns `Ok(None)` when the index is out of range.
    fn open_by_index(&self, index: usize) -> rusb::Result<Option<Self::Device>>;

    /// Open the first device matching `vendor_id:product_id`
    ///
    /// Returns `Ok(None)` when no matching device could be opened.
    fn open_by_id(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<Self::Device>>;
}

/// Operations on an opened device
///
/// Dropping the value closes the device.
pub trait UsbDeviceOps {
    fn active_configuration(&self) -> rusb::Result<u8>;

    fn set_active_configuration(&mut self, value: u8) -> rusb::Result<()>;

    /// Reset the device; `Err(NotFound)` means it re-enumerated and this
    /// handle is no longer usable
    fn reset(&mut self) -> rusb::Result<()>;

    /// Device-to-host control transfer, returns the number of bytes read
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    /// Host-to-device control transfer, returns the number of bytes written
    fn write_control(
        &mut self,
        request: &ControlRequest,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    fn location(&self) -> DeviceLocation;

    /// Location of the parent hub, `None` for a root hub
    fn parent_location(&self) -> Option<DeviceLocation>;
}
