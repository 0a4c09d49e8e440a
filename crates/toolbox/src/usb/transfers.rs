//! Control transfer execution
//!
//! Picks the data stage direction from bit 7 of `bmRequestType` and runs the
//! transfer synchronously on the opened device.

use command::ControlRequest;
use common::UsbDeviceOps;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a completed control transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// IN transfer: the bytes the device returned
    Received(Vec<u8>),
    /// OUT transfer: number of bytes written
    Sent(usize),
}

/// Execute a control transfer
///
/// IN transfers read up to `wLength` bytes. OUT transfers write the payload
/// zero-padded to `wLength`. `default_timeout` applies when the request has
/// no explicit timeout.
pub fn execute_control<D: UsbDeviceOps>(
    device: &mut D,
    request: &ControlRequest,
    default_timeout: Duration,
) -> rusb::Result<ControlOutcome> {
    let timeout = request.timeout_or(default_timeout);

    debug!(
        "Control transfer: setup={:02x?}, timeout={}ms, is_in={}",
        request.setup_packet(),
        timeout.as_millis(),
        request.is_in()
    );

    let result = if request.is_in() {
        let mut buffer = vec![0u8; usize::from(request.length)];
        device
            .read_control(request, &mut buffer, timeout)
            .map(|len| {
                buffer.truncate(len);
                ControlOutcome::Received(buffer)
            })
    } else {
        let data = request.out_data();
        device
            .write_control(request, &data, timeout)
            .map(ControlOutcome::Sent)
    };

    match &result {
        Ok(outcome) => debug!("Control transfer succeeded: {:?}", outcome),
        Err(e) => warn!("Control transfer failed: {}", e),
    }

    result
}
