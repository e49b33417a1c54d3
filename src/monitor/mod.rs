//! Recurring checks against the backend.
//!
//! [`IntervalMonitor`] is the generic scheduler; [`DeviceMonitor`] and
//! [`ProgressMonitor`] specialize it for device presence and job progress.

mod device;
mod interval;
mod progress;

pub use device::DeviceMonitor;
pub use interval::{CheckOutcome, IntervalMonitor, PollFence};
pub use progress::{PollingOptions, ProgressMonitor};
