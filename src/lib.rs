//! Asynchronous data synchronization core for the imager wizard.
//!
//! The wizard's screens never talk to the backend directly. They read device
//! lists, image catalogs and job progress through the primitives here:
//!
//! - **Fetching** - [`FetchCoordinator`] tracks `{data, loading, error}` for a
//!   producer and only ever applies the most recently issued reload.
//!   [`AutoFetch`] reloads on dependency changes, [`ConditionalFetchDriver`]
//!   only while a gate is open.
//! - **Monitoring** - [`IntervalMonitor`] runs a check immediately and then
//!   periodically. [`DeviceMonitor`] watches the selected device,
//!   [`ProgressMonitor`] follows a download or flash job.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use imager_sync::{DeviceMonitor, TokioScheduler};
//!
//! let scheduler = Arc::new(TokioScheduler::current()?);
//! let monitor = DeviceMonitor::new(backend.clone(), scheduler);
//! monitor.watch(Some("/dev/sdb"), true, move || selection.clear())?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod fetch;
pub mod monitor;
pub mod traits;

#[cfg(test)]
mod test_helpers;

pub use backend::{BlockDevice, DownloadProgress, FlashProgress, ProgressReport};
pub use config::PollingConfig;
pub use error::{SyncError, SyncResult};
pub use fetch::{
    AutoFetch, AutoFetchOptions, ConditionalFetchDriver, FetchCoordinator, FetchOptions,
    FetchState, Reloader,
};
pub use monitor::{
    CheckOutcome, DeviceMonitor, IntervalMonitor, PollFence, PollingOptions, ProgressMonitor,
};
pub use traits::{DeviceSource, PollHandle, Scheduler, Tick, TokioScheduler};
