//! Single-threaded deferral of work to a later scheduler turn.
//!
//! Tiles never do their setup work inside `request_async()`. Instead they
//! hand a closure to a [`Scheduler`], which runs it on a later turn of the
//! same thread. This keeps the LOD selection loop cheap and gives eviction
//! a window to cancel work that has not started yet.
//!
//! # Implementations
//!
//! - [`LocalScheduler`] - runs deferred work as tasks on a tokio `LocalSet`
//! - [`ManualScheduler`](crate::testing::ManualScheduler) - queues work
//!   until the caller advances it, for deterministic tests

mod local;

pub use local::LocalScheduler;

/// A unit of deferred work.
///
/// Deferred work runs on the scheduler's thread, so it may capture `Rc`
/// and `RefCell` state.
pub type Deferred = Box<dyn FnOnce() + 'static>;

/// Cooperative, single-threaded task scheduler.
///
/// Implementations must:
/// - never run `task` inside `defer` itself
/// - run deferred tasks in the order they were deferred
/// - run every task at most once
pub trait Scheduler {
    /// Queue `task` to run on a later turn.
    fn defer(&self, task: Deferred);
}
