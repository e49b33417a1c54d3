//! Fetch state tracking.
//!
//! [`FetchCoordinator`] is the leaf: a producer plus last-reload-wins state.
//! [`AutoFetch`] reloads it when a dependency key changes and
//! [`ConditionalFetchDriver`] only while a gate is open.

mod auto;
mod conditional;
mod coordinator;

pub use auto::{AutoFetch, AutoFetchOptions};
pub use conditional::ConditionalFetchDriver;
pub use coordinator::{FetchCoordinator, FetchOptions, FetchState, Reloader};
