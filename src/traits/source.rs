use futures::future::BoxFuture;

#[cfg(test)]
use mockall::automock;

use crate::backend::BlockDevice;

/// Abstraction over the backend's device listing.
/// This allows mocking device enumeration in tests.
#[cfg_attr(test, automock)]
pub trait DeviceSource: Send + Sync {
    /// List the block devices currently attached.
    fn list_devices(&self) -> BoxFuture<'static, Result<Vec<BlockDevice>, String>>;
}
