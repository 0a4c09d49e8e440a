//! Command table
//!
//! Maps the first token of a line (and its aliases) to a [`Command`] and
//! parses the remaining tokens into typed arguments.

use crate::error::{CommandError, Result};
use crate::parse::{parse_number, parse_payload};
use crate::tokenize::tokenize;
use crate::ENDPOINT_DIR_IN;
use byteorder::{ByteOrder, LittleEndian};
use std::time::Duration;

/// Help listing printed at startup and by `help`
pub const HELP: &str = "
usb-toolbox
A simple tool for testing USB devices

Available commands are:
list / l: List all connected usb devices
open {device_idx}: Open a device
open {vendor_id} {product_id}: Open a device
get-conf / gc: Get the opened device's configuration
change-conf / cc {b_config_value}: Set the opened device's configuration
send-ctrl / sc {bmRequestType} {bRequest} {wValue} {wIndex} [wLength] [data] [timeout]:
            Send a control URB to the opened device
            data is hex pairs (0a0b0c) or quoted ASCII (\"text\")
reset: Reset the opened device
close: Close the opened device
info / i: Get details about the opened device
claim {bus} {hub} {port}: Claim a hub's port
unclaim: Release claimed hub port
help / h: Displays this help
exit: Stop usb-toolbox
";

/// How `open` selects a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// Position in the current enumeration, as printed by `list`
    Index(usize),
    /// First device matching a vendor/product pair
    VidPid { vendor_id: u16, product_id: u16 },
}

/// Arguments of a `send-ctrl` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
    /// wLength
    pub length: u16,
    /// Payload argument, already capped to `length`
    pub payload: Option<Vec<u8>>,
    /// Explicit timeout argument in milliseconds
    pub timeout_ms: Option<u32>,
}

impl ControlRequest {
    /// Create a request without payload or explicit timeout
    pub fn new(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            request_type,
            request,
            value,
            index,
            length,
            payload: None,
            timeout_ms: None,
        }
    }

    /// Whether the data stage flows from device to host
    pub fn is_in(&self) -> bool {
        self.request_type & ENDPOINT_DIR_IN != 0
    }

    /// The 8-byte setup packet this request puts on the wire
    pub fn setup_packet(&self) -> [u8; 8] {
        let mut packet = [0u8; 8];
        packet[0] = self.request_type;
        packet[1] = self.request;
        LittleEndian::write_u16(&mut packet[2..4], self.value);
        LittleEndian::write_u16(&mut packet[4..6], self.index);
        LittleEndian::write_u16(&mut packet[6..8], self.length);
        packet
    }

    /// Data stage for an OUT transfer: the payload zero-padded to `length`
    pub fn out_data(&self) -> Vec<u8> {
        let mut data = self.payload.clone().unwrap_or_default();
        data.resize(usize::from(self.length), 0);
        data
    }

    /// Timeout to use, falling back to `default` when none was given
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
            .unwrap_or(default)
    }
}

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(OpenTarget),
    Close,
    Reset,
    Info,
    GetConfiguration,
    SetConfiguration(u8),
    SendControl(ControlRequest),
    Claim { bus: u32, hub: u32, port: u32 },
    Unclaim,
    Help,
    Exit,
}

impl Command {
    /// Parse a raw input line
    ///
    /// Returns `Ok(None)` for a blank line.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return Ok(None);
        }
        Self::from_tokens(&tokens).map(Some)
    }

    /// Parse already tokenized input; `tokens[0]` is the command name
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let Some(name) = tokens.first() else {
            return Err(CommandError::TooFewArguments);
        };
        let args: Vec<&str> = tokens[1..].iter().map(|t| t.as_ref()).collect();

        let command = match name.as_ref() {
            "exit" => Command::Exit,
            "list" | "l" | "ls" => Command::List,
            "open" => match args.as_slice() {
                [] => return Err(CommandError::TooFewArguments),
                [index] => Command::Open(OpenTarget::Index(parse_number(index))),
                [vendor, product, ..] => Command::Open(OpenTarget::VidPid {
                    vendor_id: parse_number(vendor),
                    product_id: parse_number(product),
                }),
            },
            "close" => Command::Close,
            "reset" => Command::Reset,
            "info" | "i" => Command::Info,
            "get-conf" | "gc" => Command::GetConfiguration,
            "change-conf" | "cc" => {
                let value = args.first().ok_or(CommandError::TooFewArguments)?;
                Command::SetConfiguration(parse_number(value))
            }
            "send-ctrl" | "sc" => Command::SendControl(parse_control(&args)?),
            "claim" => match args.as_slice() {
                [bus, hub, port, ..] => Command::Claim {
                    bus: parse_number(bus),
                    hub: parse_number(hub),
                    port: parse_number(port),
                },
                _ => return Err(CommandError::TooFewArguments),
            },
            "unclaim" => Command::Unclaim,
            "help" | "h" => Command::Help,
            other => return Err(CommandError::Unsupported(other.to_string())),
        };

        Ok(command)
    }

    /// Canonical command name, used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Open(_) => "open",
            Command::Close => "close",
            Command::Reset => "reset",
            Command::Info => "info",
            Command::GetConfiguration => "get-conf",
            Command::SetConfiguration(_) => "change-conf",
            Command::SendControl(_) => "send-ctrl",
            Command::Claim { .. } => "claim",
            Command::Unclaim => "unclaim",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }
}

fn parse_control(args: &[&str]) -> Result<ControlRequest> {
    let [request_type, request, value, index, rest @ ..] = args else {
        return Err(CommandError::TooFewArguments);
    };

    let mut control = ControlRequest::new(
        parse_number(request_type),
        parse_number(request),
        parse_number(value),
        parse_number(index),
        rest.first().map(|length| parse_number(length)).unwrap_or(0),
    );
    control.payload = rest
        .get(1)
        .map(|data| parse_payload(data, usize::from(control.length)));
    control.timeout_ms = rest.get(2).map(|timeout| parse_number(timeout));

    Ok(control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TIMEOUT_MS;

    fn parse(line: &str) -> Result<Command> {
        Command::parse_line(line).map(|c| c.expect("non-empty line"))
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parse("list").unwrap(), Command::List);
        assert_eq!(parse("l").unwrap(), Command::List);
        assert_eq!(parse("ls").unwrap(), Command::List);
        assert_eq!(parse("gc").unwrap(), Command::GetConfiguration);
        assert_eq!(parse("get-conf").unwrap(), Command::GetConfiguration);
        assert_eq!(parse("i").unwrap(), Command::Info);
        assert_eq!(parse("h").unwrap(), Command::Help);
        assert_eq!(parse("exit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_open_by_index() {
        assert_eq!(parse("open 3").unwrap(), Command::Open(OpenTarget::Index(3)));
    }

    #[test]
    fn test_open_by_vid_pid() {
        assert_eq!(
            parse("open 0x046d 0xc52b").unwrap(),
            Command::Open(OpenTarget::VidPid {
                vendor_id: 0x046d,
                product_id: 0xc52b
            })
        );
    }

    #[test]
    fn test_open_requires_argument() {
        assert_eq!(parse("open"), Err(CommandError::TooFewArguments));
    }

    #[test]
    fn test_change_conf() {
        assert_eq!(parse("cc 2").unwrap(), Command::SetConfiguration(2));
        assert_eq!(parse("change-conf"), Err(CommandError::TooFewArguments));
    }

    #[test]
    fn test_send_ctrl_minimal() {
        let Command::SendControl(control) = parse("sc 0x80 6 0x0100 0").unwrap() else {
            panic!("expected send-ctrl");
        };
        assert_eq!(control, ControlRequest::new(0x80, 6, 0x0100, 0, 0));
        assert!(control.is_in());
    }

    #[test]
    fn test_send_ctrl_full() {
        let Command::SendControl(control) =
            parse("send-ctrl 0x40 0x01 0 0 4 deadbeefcafe 250").unwrap()
        else {
            panic!("expected send-ctrl");
        };
        assert!(!control.is_in());
        assert_eq!(control.length, 4);
        assert_eq!(control.payload, Some(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(control.timeout_ms, Some(250));
    }

    #[test]
    fn test_send_ctrl_too_few() {
        assert_eq!(parse("sc 0x80 6 0"), Err(CommandError::TooFewArguments));
    }

    #[test]
    fn test_claim() {
        assert_eq!(
            parse("claim 1 2 3").unwrap(),
            Command::Claim {
                bus: 1,
                hub: 2,
                port: 3
            }
        );
        assert_eq!(parse("claim 1 2"), Err(CommandError::TooFewArguments));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(
            parse("frob 1"),
            Err(CommandError::Unsupported("frob".to_string()))
        );
    }

    #[test]
    fn test_setup_packet_little_endian() {
        let control = ControlRequest::new(0x80, 0x06, 0x0100, 0x0409, 0x0012);
        assert_eq!(
            control.setup_packet(),
            [0x80, 0x06, 0x00, 0x01, 0x09, 0x04, 0x12, 0x00]
        );
    }

    #[test]
    fn test_out_data_is_padded() {
        let mut control = ControlRequest::new(0x40, 1, 0, 0, 4);
        control.payload = Some(vec![1, 2]);
        assert_eq!(control.out_data(), vec![1, 2, 0, 0]);

        control.payload = None;
        assert_eq!(control.out_data(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_timeout_fallback() {
        let default = Duration::from_millis(u64::from(DEFAULT_TIMEOUT_MS));
        let mut control = ControlRequest::new(0x80, 0, 0, 0, 0);
        assert_eq!(control.timeout_or(default), Duration::from_secs(5));
        control.timeout_ms = Some(10);
        assert_eq!(control.timeout_or(default), Duration::from_millis(10));
    }

    #[test]
    fn test_names() {
        assert_eq!(Command::SetConfiguration(1).name(), "change-conf");
        assert_eq!(
            Command::Claim {
                bus: 0,
                hub: 0,
                port: 0
            }
            .name(),
            "claim"
        );
    }
}
