//! Integration tests for configuration file layout
//!
//! Checks the TOML shapes the toolbox reads:
//! - Minimal config with only some sections
//! - Full config with every option
//! - Invalid TOML handling

const MINIMAL_CONFIG: &str = r#"
[shell]
log_level = "info"
"#;

const FULL_CONFIG: &str = r#"
[shell]
prompt = "usb> "
show_help = false
log_level = "debug"

[usb]
libusb_log_level = "warning"

[transfer]
default_timeout_ms = 1000

[hub]
devfs_root = "~/fake-usbfs"
"#;

#[test]
fn test_parse_minimal_config() {
    let config: toml::Value = toml::from_str(MINIMAL_CONFIG).unwrap();

    let shell = config.get("shell").unwrap();
    assert_eq!(shell.get("log_level").unwrap().as_str().unwrap(), "info");
    assert!(shell.get("prompt").is_none());

    assert!(config.get("usb").is_none());
    assert!(config.get("transfer").is_none());
    assert!(config.get("hub").is_none());
}

#[test]
fn test_parse_full_config() {
    let config: toml::Value = toml::from_str(FULL_CONFIG).unwrap();

    let shell = config.get("shell").unwrap();
    assert_eq!(shell.get("prompt").unwrap().as_str().unwrap(), "usb> ");
    assert!(!shell.get("show_help").unwrap().as_bool().unwrap());
    assert_eq!(shell.get("log_level").unwrap().as_str().unwrap(), "debug");

    let usb = config.get("usb").unwrap();
    assert_eq!(
        usb.get("libusb_log_level").unwrap().as_str().unwrap(),
        "warning"
    );

    let transfer = config.get("transfer").unwrap();
    assert_eq!(
        transfer
            .get("default_timeout_ms")
            .unwrap()
            .as_integer()
            .unwrap(),
        1000
    );

    let hub = config.get("hub").unwrap();
    assert_eq!(
        hub.get("devfs_root").unwrap().as_str().unwrap(),
        "~/fake-usbfs"
    );
}

#[test]
fn test_invalid_toml_is_rejected() {
    let result: Result<toml::Value, _> = toml::from_str("[shell\nprompt = ");
    assert!(result.is_err());
}

#[test]
fn test_timeout_must_be_integer() {
    let config: toml::Value = toml::from_str("[transfer]\ndefault_timeout_ms = \"soon\"").unwrap();
    let timeout = config
        .get("transfer")
        .unwrap()
        .get("default_timeout_ms")
        .unwrap();
    assert!(timeout.as_integer().is_none());
}
