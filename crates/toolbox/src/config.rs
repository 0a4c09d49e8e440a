//! Toolbox configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolboxConfig {
    #[serde(default)]
    pub shell: ShellSettings,
    #[serde(default)]
    pub usb: UsbSettings,
    #[serde(default)]
    pub transfer: TransferSettings,
    #[serde(default)]
    pub hub: HubSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellSettings {
    /// Prompt printed before each input line
    #[serde(default = "ShellSettings::default_prompt")]
    pub prompt: String,
    /// Print the help listing on startup
    #[serde(default = "ShellSettings::default_show_help")]
    pub show_help: bool,
    /// tracing filter for the toolbox itself (trace, debug, info, warn, error)
    #[serde(default = "ShellSettings::default_log_level")]
    pub log_level: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            prompt: Self::default_prompt(),
            show_help: Self::default_show_help(),
            log_level: Self::default_log_level(),
        }
    }
}

impl ShellSettings {
    fn default_prompt() -> String {
        "> ".to_string()
    }

    fn default_show_help() -> bool {
        true
    }

    fn default_log_level() -> String {
        "warn".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbSettings {
    /// libusb's own message level (none, error, warning, info, debug)
    #[serde(default = "UsbSettings::default_libusb_log_level")]
    pub libusb_log_level: String,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            libusb_log_level: Self::default_libusb_log_level(),
        }
    }
}

impl UsbSettings {
    fn default_libusb_log_level() -> String {
        "info".to_string()
    }

    /// Parse `libusb_log_level` into rusb's level
    pub fn libusb_log_level(&self) -> Result<rusb::LogLevel> {
        match self.libusb_log_level.as_str() {
            "none" => Ok(rusb::LogLevel::None),
            "error" => Ok(rusb::LogLevel::Error),
            "warning" | "warn" => Ok(rusb::LogLevel::Warning),
            "info" => Ok(rusb::LogLevel::Info),
            "debug" => Ok(rusb::LogLevel::Debug),
            other => Err(anyhow!(
                "Invalid libusb log level '{}', must be one of: none, error, warning, info, debug",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Control transfer timeout when `send-ctrl` gives none
    #[serde(default = "TransferSettings::default_timeout_ms")]
    pub default_timeout_ms: u32,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl TransferSettings {
    fn default_timeout_ms() -> u32 {
        command::DEFAULT_TIMEOUT_MS
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.default_timeout_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    /// Directory holding `<bus>/<device>` usbfs nodes; `~` is expanded
    #[serde(default = "HubSettings::default_devfs_root")]
    pub devfs_root: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            devfs_root: Self::default_devfs_root(),
        }
    }
}

impl HubSettings {
    fn default_devfs_root() -> String {
        "/dev/bus/usb".to_string()
    }

    pub fn devfs_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.devfs_root).as_ref())
    }
}

/// Levels accepted for the toolbox's own logging
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a log level from the config file or the command line
pub fn validate_log_level(level: &str) -> Result<()> {
    if !LOG_LEVELS.contains(&level) {
        return Err(anyhow!(
            "Invalid log level '{}', must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        ));
    }
    Ok(())
}

impl ToolboxConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usb-toolbox/toolbox.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ToolboxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-toolbox").join("toolbox.toml")
        } else {
            PathBuf::from(".config/usb-toolbox/toolbox.toml")
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        validate_log_level(&self.shell.log_level)?;

        self.usb.libusb_log_level()?;

        if self.transfer.default_timeout_ms == 0 {
            return Err(anyhow!(
                "default_timeout_ms must be greater than 0 (libusb treats 0 as no timeout)"
            ));
        }

        if self.hub.devfs_root.is_empty() {
            return Err(anyhow!("hub.devfs_root must not be empty"));
        }

        Ok(())
    }
}
