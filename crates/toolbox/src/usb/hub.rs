//! Hub port claiming
//!
//! Linux lets a process reserve a downstream hub port by issuing
//! `USBDEVFS_CLAIM_PORT` on the hub's usbfs node. The claim lasts until
//! `USBDEVFS_RELEASE_PORT` or until the file is closed.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

// USBDEVFS_CLAIM_PORT = _IOR('U', 24, unsigned int)
nix::ioctl_read!(usbdevfs_claim_port, b'U', 24, u32);
// USBDEVFS_RELEASE_PORT = _IOR('U', 25, unsigned int)
nix::ioctl_read!(usbdevfs_release_port, b'U', 25, u32);

#[derive(Debug, Error)]
pub enum PortError {
    #[error("Could not open hub device file: {0}")]
    Open(#[source] io::Error),

    #[error("Could not claim port: {0}")]
    Claim(#[source] nix::errno::Errno),

    #[error("Could not unclaim port: {0}")]
    Release(#[source] nix::errno::Errno),
}

/// usbfs node of hub `hub` on bus `bus`, e.g. `/dev/bus/usb/001/002`
pub fn hub_path(devfs_root: &Path, bus: u32, hub: u32) -> PathBuf {
    devfs_root.join(format!("{bus:03}")).join(format!("{hub:03}"))
}

/// A claimed hub port, held through an open handle on the hub's usbfs node
#[derive(Debug)]
pub struct ClaimedPort {
    file: File,
    path: PathBuf,
    port: u32,
}

impl ClaimedPort {
    /// Open `path` write-only and claim `port` on it
    pub fn claim(path: &Path, port: u32) -> Result<Self, PortError> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(PortError::Open)?;

        let mut number = port;
        // SAFETY: `file` is an open descriptor and `number` outlives the call
        unsafe { usbdevfs_claim_port(file.as_raw_fd(), &mut number) }.map_err(|e| {
            warn!("USBDEVFS_CLAIM_PORT on {} failed: {}", path.display(), e);
            PortError::Claim(e)
        })?;

        debug!("Claimed port {} on {}", port, path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
            port,
        })
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the port; the hub file is closed whether or not this succeeds
    pub fn release(self) -> Result<(), PortError> {
        let mut number = self.port;
        // SAFETY: `self.file` is still open and `number` outlives the call
        let result = unsafe { usbdevfs_release_port(self.file.as_raw_fd(), &mut number) };

        match result {
            Ok(_) => {
                debug!("Released port {} on {}", self.port, self.path.display());
                Ok(())
            }
            Err(e) => {
                warn!(
                    "USBDEVFS_RELEASE_PORT on {} failed: {}",
                    self.path.display(),
                    e
                );
                Err(PortError::Release(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use tempfile::tempdir;

    #[test]
    fn test_hub_path_is_zero_padded() {
        assert_eq!(
            hub_path(Path::new("/dev/bus/usb"), 1, 2),
            PathBuf::from("/dev/bus/usb/001/002")
        );
        assert_eq!(
            hub_path(Path::new("/dev/bus/usb"), 12, 127),
            PathBuf::from("/dev/bus/usb/012/127")
        );
    }

    #[test]
    fn test_claim_missing_hub_file() {
        let dir = tempdir().unwrap();
        let path = hub_path(dir.path(), 1, 1);

        let err = ClaimedPort::claim(&path, 1).unwrap_err();
        assert!(matches!(err, PortError::Open(_)));
        assert!(err.to_string().starts_with("Could not open hub device file: "));
    }

    #[test]
    fn test_claim_on_regular_file_fails_ioctl() {
        let dir = tempdir().unwrap();
        let path = hub_path(dir.path(), 1, 2);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"").unwrap();

        let err = ClaimedPort::claim(&path, 3).unwrap_err();
        assert!(matches!(err, PortError::Claim(Errno::ENOTTY)));
        assert!(err.to_string().starts_with("Could not claim port: "));
    }
}
