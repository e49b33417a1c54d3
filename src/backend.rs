//! Descriptors returned by the imaging backend.
//!
//! The backend owns device enumeration, downloads and flashing; the UI only
//! polls these snapshots. Field names follow the camelCase JSON the backend
//! commands serialize.

use serde::{Deserialize, Serialize};

/// A storage device the image can be written to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockDevice {
    /// Stable device path (e.g., "/dev/sda", "/dev/disk4" or "\\.\PhysicalDrive1").
    pub path: String,
    /// Short device name.
    pub name: String,
    /// Capacity in bytes.
    pub size: u64,
    /// Vendor model string.
    pub model: String,
    /// Whether the device reports itself as removable.
    pub is_removable: bool,
    /// Whether the device holds the running system.
    pub is_system: bool,
}

/// Whether a device with the given path appears in the list.
pub fn is_device_present(devices: &[BlockDevice], path: &str) -> bool {
    devices.iter().any(|d| d.path == path)
}

/// A progress snapshot that may carry an in-band job error.
pub trait ProgressReport {
    /// Error reported by the backend job, if it failed.
    fn error(&self) -> Option<&str>;
}

/// Download progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgress {
    pub total_bytes: u64,
    pub downloaded_bytes: u64,
    /// True once the archive is fully fetched and being decompressed.
    pub is_decompressing: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl DownloadProgress {
    pub fn percent(&self) -> f32 {
        percent_of(self.downloaded_bytes, self.total_bytes)
    }
}

impl ProgressReport for DownloadProgress {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Flash progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashProgress {
    pub total_bytes: u64,
    pub written_bytes: u64,
    pub verified_bytes: u64,
    /// True once writing finished and the read-back verification runs.
    pub is_verifying: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl FlashProgress {
    /// Progress of the current phase (writing or verifying).
    pub fn percent(&self) -> f32 {
        if self.is_verifying {
            percent_of(self.verified_bytes, self.total_bytes)
        } else {
            percent_of(self.written_bytes, self.total_bytes)
        }
    }
}

impl ProgressReport for FlashProgress {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

fn percent_of(done: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((done as f64 / total as f64) * 100.0).clamp(0.0, 100.0) as f32
}
