//! Parallel eligibility
//!
//! Decides whether an individual test may run concurrently with its
//! siblings, from static scope declarations and live scheduler state.

mod resolver;
mod scheduler;
mod scope;

pub use resolver::{is_parallel, ParallelResolver};
pub use scheduler::{
    Detached, DispatchSnapshot, DispatchedChild, DispatchedItem, LiveScheduler, SchedulerView,
};
pub use scope::{serde_scope, ParallelScope};
