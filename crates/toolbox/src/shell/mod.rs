//! Interactive shell
//!
//! Reads one line at a time, parses it with the `command` crate and runs the
//! matching handler against the USB backend. All results and failures are
//! printed to the output writer; nothing short of `exit` (or end of input)
//! leaves the loop.

mod handlers;

use crate::config::ToolboxConfig;
use crate::usb::ClaimedPort;
use command::{Command, HELP};
use common::{Error, Result, UsbBackend};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// What the loop should do after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Shell settings taken from the configuration file
#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub prompt: String,
    pub show_help: bool,
    pub default_timeout: Duration,
    pub devfs_root: PathBuf,
}

impl From<&ToolboxConfig> for ShellOptions {
    fn from(config: &ToolboxConfig) -> Self {
        Self {
            prompt: config.shell.prompt.clone(),
            show_help: config.shell.show_help,
            default_timeout: config.transfer.default_timeout(),
            devfs_root: config.hub.devfs_root(),
        }
    }
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self::from(&ToolboxConfig::default())
    }
}

/// Shell state: the backend session, at most one opened device and at most
/// one claimed hub port
pub struct Shell<B: UsbBackend> {
    backend: B,
    device: Option<B::Device>,
    port: Option<ClaimedPort>,
    options: ShellOptions,
}

impl<B: UsbBackend> Shell<B> {
    pub fn new(backend: B, options: ShellOptions) -> Self {
        Self {
            backend,
            device: None,
            port: None,
            options,
        }
    }

    pub fn has_open_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn claimed_port(&self) -> Option<&ClaimedPort> {
        self.port.as_ref()
    }

    /// Run the read-eval-print loop until `exit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        if self.options.show_help {
            writeln!(out, "{HELP}")?;
        }

        let mut buf = Vec::new();
        loop {
            write!(out, "{}", self.options.prompt)?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                debug!("End of input, leaving shell");
                self.shutdown(out)?;
                return Ok(());
            }

            // Invalid UTF-8 is replaced rather than ending the session
            let line = String::from_utf8_lossy(&buf);
            if self.execute(&line, out)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parse and run one input line
    ///
    /// Only I/O failures on `out` are returned; everything else is printed.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let command = match Command::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                Self::report(e.into(), out)?;
                return Ok(Flow::Continue);
            }
        };

        debug!("Dispatching command: {}", command.name());

        let flow = match command {
            Command::Exit => Flow::Exit,
            _ => Flow::Continue,
        };

        if let Err(e) = self.dispatch(command, out) {
            Self::report(e, out)?;
        }

        Ok(flow)
    }

    /// Print a failed command's error, passing output failures through
    fn report<W: Write>(error: Error, out: &mut W) -> Result<()> {
        match error {
            Error::Io(e) => return Err(Error::Io(e)),
            Error::Command(_) | Error::NoDeviceOpen => writeln!(out, "{error}")?,
            e => {
                warn!("Command failed: {}", e);
                writeln!(out, "Could not execute command: {e}")?;
            }
        }
        Ok(())
    }

    fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::List => self.list_devices(out),
            Command::Open(target) => self.open_device(target, out),
            Command::Close => self.close_device(out),
            Command::Reset => self.reset_device(out),
            Command::Info => self.device_info(out),
            Command::GetConfiguration => self.get_configuration(out),
            Command::SetConfiguration(value) => self.set_configuration(value, out),
            Command::SendControl(request) => self.send_control(&request, out),
            Command::Claim { bus, hub, port } => self.claim_port(bus, hub, port, out),
            Command::Unclaim => self.unclaim_port(out),
            Command::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            Command::Exit => self.shutdown(out),
        }
    }

    /// Release the claimed port and close the opened device, if any
    fn shutdown<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.claimed_port().is_some() {
            self.unclaim_port(out)?;
        }
        if self.has_open_device() {
            self.device = None;
            debug!("Closed device on exit");
        }
        Ok(())
    }
}
