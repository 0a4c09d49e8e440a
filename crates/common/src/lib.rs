//! Common utilities for usb-toolbox
//!
//! This crate provides the pieces shared by the shell and its tests:
//! the error type, logging setup, the USB backend traits the shell drives,
//! and mock backends for exercising the shell without hardware.

pub mod error;
pub mod logging;
pub mod test_utils;
pub mod usb_types;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use usb_types::{DeviceLocation, DeviceSummary, UsbBackend, UsbDeviceOps};
