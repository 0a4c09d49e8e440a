//! Command handlers
//!
//! Each handler prints its own result. Errors returned from here are either
//! write failures, [`Error::NoDeviceOpen`], or failures with no more specific
//! message, which the dispatcher reports.

use super::Shell;
use crate::usb::{ClaimedPort, ControlOutcome, execute_control, hub_path};
use command::{ControlRequest, OpenTarget, hex_dump};
use common::{Error, Result, UsbBackend, UsbDeviceOps};
use std::io::Write;
use tracing::{debug, warn};

impl<B: UsbBackend> Shell<B> {
    fn device_ref(&self) -> Result<&B::Device> {
        self.device.as_ref().ok_or(Error::NoDeviceOpen)
    }

    fn device_mut(&mut self) -> Result<&mut B::Device> {
        self.device.as_mut().ok_or(Error::NoDeviceOpen)
    }

    pub(super) fn list_devices<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let devices = self.backend.list_devices()?;

        writeln!(out, "Devices Found: {}", devices.len())?;
        for (index, device) in devices.into_iter().enumerate() {
            match device {
                Ok(summary) => writeln!(out, "\n{summary}")?,
                Err(e) => {
                    warn!("Failed to read descriptor of device {}: {}", index, e);
                    writeln!(out, "Could not get device #{index}: {e}")?;
                }
            }
        }
        Ok(())
    }

    pub(super) fn open_device<W: Write>(&mut self, target: OpenTarget, out: &mut W) -> Result<()> {
        if self.device.take().is_some() {
            writeln!(out, "Closing currently opened device")?;
        }

        let result = match target {
            OpenTarget::Index(index) => self.backend.open_by_index(index),
            OpenTarget::VidPid {
                vendor_id,
                product_id,
            } => self.backend.open_by_id(vendor_id, product_id),
        };

        match (result, target) {
            (Ok(Some(device)), _) => {
                debug!("Opened device {:?}", target);
                self.device = Some(device);
            }
            (Ok(None), OpenTarget::Index(_)) => writeln!(out, "Device index out of range.")?,
            (
                Ok(None),
                OpenTarget::VidPid {
                    vendor_id,
                    product_id,
                },
            ) => writeln!(
                out,
                "Could not open device: no device with ID {vendor_id:04x}:{product_id:04x}"
            )?,
            (Err(e), _) => {
                warn!("Failed to open device {:?}: {}", target, e);
                writeln!(out, "Could not open device: {e}")?;
            }
        }
        Ok(())
    }

    pub(super) fn close_device<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.device.take().is_none() {
            writeln!(out, "There isn't any device currently opened.")?;
        }
        Ok(())
    }

    pub(super) fn reset_device<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let result = self.device_mut()?.reset();
        match result {
            Ok(()) => debug!("Device reset"),
            Err(rusb::Error::NotFound) => {
                warn!("Device re-enumerated during reset, closing handle");
                self.device = None;
                writeln!(out, "Lost opened device while resetting.")?;
            }
            Err(e) => writeln!(out, "Could not reset device: {e}")?,
        }
        Ok(())
    }

    pub(super) fn device_info<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let device = self.device_ref()?;

        writeln!(out, "Opened Device:\n{}", device.location())?;
        match device.parent_location() {
            Some(parent) => writeln!(out, "Parent:\n{parent}")?,
            None => writeln!(out, "Parent: none (root hub)")?,
        }
        Ok(())
    }

    pub(super) fn get_configuration<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.device_ref()?.active_configuration() {
            Ok(value) => writeln!(out, "Currently active: bConfigurationValue {value}")?,
            Err(e) => writeln!(out, "Could not get active configuration: {e}")?,
        }
        Ok(())
    }

    pub(super) fn set_configuration<W: Write>(&mut self, value: u8, out: &mut W) -> Result<()> {
        let result = self.device_mut()?.set_active_configuration(value);
        match result {
            Ok(()) => debug!("Active configuration set to {}", value),
            Err(e) => writeln!(out, "Could not set configuration: {e}")?,
        }
        Ok(())
    }

    pub(super) fn send_control<W: Write>(
        &mut self,
        request: &ControlRequest,
        out: &mut W,
    ) -> Result<()> {
        if let Some(payload) = request.payload.as_deref().filter(|p| !p.is_empty()) {
            writeln!(out, "{}", hex_dump(payload))?;
        }

        let default_timeout = self.options.default_timeout;
        let device = self.device_mut()?;

        match execute_control(device, request, default_timeout) {
            Ok(ControlOutcome::Received(data)) => {
                writeln!(out, "Received response data: {}", hex_dump(&data))?
            }
            Ok(ControlOutcome::Sent(len)) => writeln!(out, "Sent {len} bytes")?,
            Err(e) => writeln!(out, "Could not send control packet: {e}")?,
        }
        Ok(())
    }

    pub(super) fn claim_port<W: Write>(
        &mut self,
        bus: u32,
        hub: u32,
        port: u32,
        out: &mut W,
    ) -> Result<()> {
        if self.port.is_some() {
            writeln!(out, "Unclaiming previously claimed hub port")?;
            self.unclaim_port(out)?;
        }

        let path = hub_path(&self.options.devfs_root, bus, hub);
        writeln!(out, "Claiming {} port {}", path.display(), port)?;

        match ClaimedPort::claim(&path, port) {
            Ok(claimed) => self.port = Some(claimed),
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }

    pub(super) fn unclaim_port<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.port.take() {
            Some(claimed) => {
                debug!(
                    "Releasing port {} on {}",
                    claimed.port(),
                    claimed.path().display()
                );
                if let Err(e) = claimed.release() {
                    writeln!(out, "{e}")?;
                }
            }
            None => writeln!(out, "There isn't any hub port currently claimed.")?,
        }
        Ok(())
    }
}
