mod calls;
mod fixtures;
mod scheduler;

pub use calls::PendingCalls;
pub use fixtures::{BlockDeviceBuilder, FlashProgressBuilder};
pub use scheduler::ManualScheduler;
