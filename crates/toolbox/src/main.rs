//! usb-toolbox
//!
//! Interactive shell for poking at USB devices on a Linux host: enumerate,
//! open, reset and reconfigure devices, send raw control transfers and claim
//! hub ports through usbfs.

mod config;
mod shell;
mod usb;

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use shell::{Shell, ShellOptions};
use std::io;
use tracing::info;
use usb::RusbBackend;

#[derive(Parser, Debug)]
#[command(name = "usb-toolbox")]
#[command(
    author,
    version,
    about = "usb-toolbox - A simple tool for testing USB devices"
)]
#[command(long_about = "
An interactive shell over libusb for testing USB devices.
Reads commands from standard input; type `help` for the command list.

EXAMPLES:
    # Start the shell
    usb-toolbox

    # List devices and exit
    usb-toolbox --list-devices

    # Drive the shell from a script
    printf 'open 0x046d 0xc52b\\nsc 0x80 6 0x0100 0 18\\nexit\\n' | usb-toolbox --quiet

    # Show every transfer's setup packet
    usb-toolbox --log-level debug

CONFIGURATION:
    The toolbox looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usb-toolbox/toolbox.toml
    3. /etc/usb-toolbox/toolbox.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Do not print the help listing on startup
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config before anything else reads the config
    if args.save_config {
        let config = config::ToolboxConfig::default();
        let path = config::ToolboxConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        config::ToolboxConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        config::ToolboxConfig::load_or_default()
    };

    // CLI log level wins over the config value
    let log_level = args.log_level.as_deref().unwrap_or(&config.shell.log_level);
    config::validate_log_level(log_level).context("Invalid --log-level")?;

    setup_logging(log_level).context("Failed to setup logging")?;

    info!("usb-toolbox v{}", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", log_level);

    let backend = RusbBackend::new(config.usb.libusb_log_level()?)
        .context("Could not initialize libusb session")?;

    let mut options = ShellOptions::from(&config);
    if args.quiet || args.list_devices {
        options.show_help = false;
    }

    let mut shell = Shell::new(backend, options);
    let mut stdout = io::stdout().lock();

    if args.list_devices {
        shell
            .execute("list", &mut stdout)
            .context("Failed to list devices")?;
        return Ok(());
    }

    shell
        .run(io::stdin().lock(), &mut stdout)
        .context("Shell terminated")?;

    info!("Exiting usb-toolbox");
    Ok(())
}
