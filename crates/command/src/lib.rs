//! Command language for usb-toolbox
//!
//! This crate turns the text a user types at the `usb-toolbox` prompt into
//! typed commands. It has no USB dependencies and no side effects, which keeps
//! the shell's argument handling testable without hardware.
//!
//! # Example
//!
//! ```
//! use command::{Command, OpenTarget};
//!
//! let cmd = Command::parse_line("open 0x1d50 0x6089").unwrap().unwrap();
//! assert_eq!(
//!     cmd,
//!     Command::Open(OpenTarget::VidPid {
//!         vendor_id: 0x1d50,
//!         product_id: 0x6089,
//!     })
//! );
//! ```
//!
//! Arguments are parsed leniently: numbers accept decimal or `0x` hex and
//! fall back to zero, payloads accept quoted ASCII or hex pairs.
//!
//! ```
//! use command::{hex_dump, parse_number, parse_payload};
//!
//! assert_eq!(parse_number::<u8>("0x1ff"), 0xff);
//! assert_eq!(parse_payload("\"hi\"", 16), b"hi".to_vec());
//! assert_eq!(hex_dump(&[0xde, 0xad]), "\nde ad");
//! ```

pub mod commands;
pub mod error;
pub mod hexdump;
pub mod parse;
pub mod tokenize;

pub use commands::{Command, ControlRequest, HELP, OpenTarget};
pub use error::{CommandError, Result};
pub use hexdump::hex_dump;
pub use parse::{Truncate, parse_number, parse_payload};
pub use tokenize::tokenize;

/// Direction bit of `bmRequestType` (device-to-host when set)
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// Default control transfer timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;
