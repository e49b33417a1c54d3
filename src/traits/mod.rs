pub mod scheduler;
pub mod source;

pub use scheduler::{PollHandle, Scheduler, Tick, TokioScheduler};
pub use source::DeviceSource;

#[cfg(test)]
pub use source::MockDeviceSource;
