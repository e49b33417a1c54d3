use crate::backend::{BlockDevice, FlashProgress};

/// Builder for creating test BlockDevice instances
pub struct BlockDeviceBuilder {
    path: String,
    name: String,
    size: u64,
    model: String,
    is_removable: bool,
    is_system: bool,
}

impl BlockDeviceBuilder {
    pub fn new() -> Self {
        Self {
            path: "/dev/sda".to_string(),
            name: "sda".to_string(),
            size: 32 * 1024 * 1024 * 1024,
            model: "Generic SD Card".to_string(),
            is_removable: true,
            is_system: false,
        }
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn build(self) -> BlockDevice {
        BlockDevice {
            path: self.path,
            name: self.name,
            size: self.size,
            model: self.model,
            is_removable: self.is_removable,
            is_system: self.is_system,
        }
    }
}

impl Default for BlockDeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test FlashProgress instances
pub struct FlashProgressBuilder {
    total_bytes: u64,
    written_bytes: u64,
    verified_bytes: u64,
    is_verifying: bool,
    error: Option<String>,
}

impl FlashProgressBuilder {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            written_bytes: 0,
            verified_bytes: 0,
            is_verifying: false,
            error: None,
        }
    }

    pub fn written(mut self, bytes: u64) -> Self {
        self.written_bytes = bytes;
        self
    }

    pub fn verifying(mut self, verified_bytes: u64) -> Self {
        self.is_verifying = true;
        self.verified_bytes = verified_bytes;
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn build(self) -> FlashProgress {
        FlashProgress {
            total_bytes: self.total_bytes,
            written_bytes: self.written_bytes,
            verified_bytes: self.verified_bytes,
            is_verifying: self.is_verifying,
            error: self.error,
        }
    }
}

impl Default for FlashProgressBuilder {
    fn default() -> Self {
        Self::new(1024)
    }
}
