//! Test utilities for usb-toolbox
//!
//! Provides an in-memory [`UsbBackend`] so the shell can be driven without
//! USB hardware. Every call that reaches a mock device is recorded in a shared
//! [`MockLog`] that tests can inspect after handing the backend to the shell.
//!
//! # Example
//!
//! ```
//! use common::UsbBackend;
//! use common::test_utils::{MockBackend, create_mock_device};
//!
//! let backend = MockBackend::new(vec![create_mock_device(0, 0x1234, 0x5678)]);
//! let device = backend.open_by_id(0x1234, 0x5678).unwrap();
//! assert!(device.is_some());
//! assert_eq!(backend.log().borrow().opened, vec![0]);
//! ```

use crate::usb_types::{DeviceLocation, DeviceSummary, UsbBackend, UsbDeviceOps};
use command::ControlRequest;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Description of a device the mock backend pretends is attached
#[derive(Debug, Clone)]
pub struct MockDeviceSpec {
    pub summary: DeviceSummary,
    pub location: DeviceLocation,
    pub parent: Option<DeviceLocation>,
    /// Active configuration reported after opening
    pub configuration: u8,
    /// Bytes returned by IN control transfers (cut to the buffer size)
    pub control_response: Vec<u8>,
    /// Error returned instead of a descriptor by `list_devices`
    pub descriptor_error: Option<rusb::Error>,
    /// Error returned when opening
    pub open_error: Option<rusb::Error>,
    /// Error returned by `reset`
    pub reset_error: Option<rusb::Error>,
    /// Error returned by control transfers
    pub control_error: Option<rusb::Error>,
}

/// A control transfer that reached a mock device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedControl {
    pub setup: [u8; 8],
    /// Data written for OUT transfers, empty for IN
    pub data: Vec<u8>,
    pub timeout: Duration,
}

/// Calls recorded by the mock backend and its devices
#[derive(Debug, Default)]
pub struct MockLog {
    /// Indexes of devices that were opened, in order
    pub opened: Vec<usize>,
    /// Indexes of devices that were closed, in order
    pub closed: Vec<usize>,
    pub resets: usize,
    pub configurations_set: Vec<u8>,
    pub controls: Vec<RecordedControl>,
}

/// In-memory USB backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    specs: Vec<MockDeviceSpec>,
    log: Rc<RefCell<MockLog>>,
    list_error: Option<rusb::Error>,
}

impl MockBackend {
    pub fn new(specs: Vec<MockDeviceSpec>) -> Self {
        Self {
            specs,
            log: Rc::new(RefCell::new(MockLog::default())),
            list_error: None,
        }
    }

    /// Make enumeration itself fail
    pub fn with_list_error(mut self, error: rusb::Error) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Shared handle to the call log
    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        Rc::clone(&self.log)
    }

    fn open_spec(&self, spec: &MockDeviceSpec) -> rusb::Result<MockDevice> {
        if let Some(error) = spec.open_error {
            return Err(error);
        }
        self.log.borrow_mut().opened.push(spec.summary.index);
        Ok(MockDevice {
            configuration: spec.configuration,
            spec: spec.clone(),
            log: Rc::clone(&self.log),
        })
    }
}

impl UsbBackend for MockBackend {
    type Device = MockDevice;

    fn list_devices(&self) -> rusb::Result<Vec<rusb::Result<DeviceSummary>>> {
        if let Some(error) = self.list_error {
            return Err(error);
        }
        Ok(self
            .specs
            .iter()
            .map(|spec| match spec.descriptor_error {
                Some(error) => Err(error),
                None => Ok(spec.summary.clone()),
            })
            .collect())
    }

    fn open_by_index(&self, index: usize) -> rusb::Result<Option<MockDevice>> {
        match self.specs.get(index) {
            Some(spec) => self.open_spec(spec).map(Some),
            None => Ok(None),
        }
    }

    fn open_by_id(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<MockDevice>> {
        let found = self.specs.iter().find(|spec| {
            spec.summary.vendor_id == vendor_id && spec.summary.product_id == product_id
        });
        // Mirrors libusb_open_device_with_vid_pid: open failures read as "not found"
        Ok(found.and_then(|spec| self.open_spec(spec).ok()))
    }
}

/// An opened mock device
#[derive(Debug)]
pub struct MockDevice {
    spec: MockDeviceSpec,
    configuration: u8,
    log: Rc<RefCell<MockLog>>,
}

impl MockDevice {
    pub fn index(&self) -> usize {
        self.spec.summary.index
    }

    fn record(&self, request: &ControlRequest, data: &[u8], timeout: Duration) {
        self.log.borrow_mut().controls.push(RecordedControl {
            setup: request.setup_packet(),
            data: data.to_vec(),
            timeout,
        });
    }
}

impl UsbDeviceOps for MockDevice {
    fn active_configuration(&self) -> rusb::Result<u8> {
        Ok(self.configuration)
    }

    fn set_active_configuration(&mut self, value: u8) -> rusb::Result<()> {
        if value > self.spec.summary.num_configurations {
            return Err(rusb::Error::NotFound);
        }
        self.configuration = value;
        self.log.borrow_mut().configurations_set.push(value);
        Ok(())
    }

    fn reset(&mut self) -> rusb::Result<()> {
        self.log.borrow_mut().resets += 1;
        match self.spec.reset_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        self.record(request, &[], timeout);
        if let Some(error) = self.spec.control_error {
            return Err(error);
        }
        let len = buf.len().min(self.spec.control_response.len());
        buf[..len].copy_from_slice(&self.spec.control_response[..len]);
        Ok(len)
    }

    fn write_control(
        &mut self,
        request: &ControlRequest,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        self.record(request, buf, timeout);
        match self.spec.control_error {
            Some(error) => Err(error),
            None => Ok(buf.len()),
        }
    }

    fn location(&self) -> DeviceLocation {
        self.spec.location
    }

    fn parent_location(&self) -> Option<DeviceLocation> {
        self.spec.parent
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.log.borrow_mut().closed.push(self.spec.summary.index);
    }
}

/// Create a mock device on bus 1 behind a hub at address 1
///
/// # Arguments
/// * `index` - Position in the enumeration
/// * `vendor_id` - USB Vendor ID
/// * `product_id` - USB Product ID
pub fn create_mock_device(index: usize, vendor_id: u16, product_id: u16) -> MockDeviceSpec {
    let address = (index % 127) as u8 + 2;
    MockDeviceSpec {
        summary: DeviceSummary {
            index,
            bus_number: 1,
            address,
            vendor_id,
            product_id,
            class: 0x00,
            num_configurations: 1,
        },
        location: DeviceLocation {
            bus_number: 1,
            port_number: address - 1,
            address,
        },
        parent: Some(DeviceLocation {
            bus_number: 1,
            port_number: 0,
            address: 1,
        }),
        configuration: 1,
        control_response: Vec::new(),
        descriptor_error: None,
        open_error: None,
        reset_error: None,
        control_error: None,
    }
}

/// Create a mock root hub (Linux Foundation VID, hub class, no parent)
pub fn create_mock_root_hub(index: usize) -> MockDeviceSpec {
    let mut spec = create_mock_device(index, 0x1d6b, 0x0002);
    spec.summary.class = 0x09;
    spec.summary.address = 1;
    spec.location = DeviceLocation {
        bus_number: 1,
        port_number: 0,
        address: 1,
    };
    spec.parent = None;
    spec
}

/// Create a list of mock devices with distinct IDs
///
/// IDs wrap around past `0xffff`, so only the first 65536 devices are
/// guaranteed distinct.
///
/// # Example
/// ```
/// use common::test_utils::create_mock_device_list;
///
/// let devices = create_mock_device_list(3);
/// assert_eq!(devices.len(), 3);
/// assert_eq!(devices[2].summary.index, 2);
/// ```
pub fn create_mock_device_list(count: usize) -> Vec<MockDeviceSpec> {
    (0..count)
        .map(|i| {
            let offset = i as u16;
            create_mock_device(
                i,
                0x1000u16.wrapping_add(offset),
                0x2000u16.wrapping_add(offset),
            )
        })
        .collect()
}

/// Standard 18-byte device descriptor (VID 0x1234, PID 0x5678)
pub fn create_mock_device_descriptor() -> Vec<u8> {
    vec![
        0x12, // bLength
        0x01, // bDescriptorType (Device)
        0x00, 0x02, // bcdUSB (2.00)
        0x00, // bDeviceClass
        0x00, // bDeviceSubClass
        0x00, // bDeviceProtocol
        0x40, // bMaxPacketSize0 (64 bytes)
        0x34, 0x12, // idVendor (0x1234)
        0x78, 0x56, // idProduct (0x5678)
        0x00, 0x01, // bcdDevice (1.00)
        0x01, // iManufacturer
        0x02, // iProduct
        0x03, // iSerialNumber
        0x01, // bNumConfigurations
    ]
}
