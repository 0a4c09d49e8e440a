//! USB subsystem
//!
//! Everything the shell delegates to the host:
//! - Device enumeration, opening and device operations (rusb)
//! - Control transfer execution
//! - Hub port claiming through usbfs ioctls

pub mod backend;
pub mod hub;
pub mod transfers;

pub use backend::RusbBackend;
pub use hub::{ClaimedPort, hub_path};
pub use transfers::{ControlOutcome, execute_control};
