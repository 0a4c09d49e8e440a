//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("{0}")]
    Command(#[from] command::CommandError),

    #[error("Open a device first.")]
    NoDeviceOpen,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_error_display() {
        let err = Error::from(rusb::Error::NoDevice);
        assert!(err.to_string().starts_with("USB error: "));
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err = Error::from(command::CommandError::TooFewArguments);
        assert_eq!(err.to_string(), "Too few arguments");
    }

    #[test]
    fn test_no_device_open_display() {
        assert_eq!(Error::NoDeviceOpen.to_string(), "Open a device first.");
    }
}
