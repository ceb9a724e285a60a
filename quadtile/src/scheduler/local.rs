//! Tokio-backed scheduler.

use std::rc::Rc;

use tokio::task::LocalSet;

use super::{Deferred, Scheduler};

/// Scheduler that runs deferred work as tasks on a tokio [`LocalSet`].
///
/// Tasks only make progress while the `LocalSet` is being driven, for
/// example through [`LocalSet::run_until`]. A `LocalSet` polls its tasks
/// in spawn order, which preserves the FIFO guarantee of [`Scheduler`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use quadtile::scheduler::{LocalScheduler, Scheduler};
/// use tokio::task::LocalSet;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let local = Rc::new(LocalSet::new());
/// let scheduler = LocalScheduler::new(Rc::clone(&local));
///
/// let ran = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&ran);
/// scheduler.defer(Box::new(move || flag.set(true)));
/// assert!(!ran.get());
///
/// runtime.block_on(local.run_until(tokio::task::yield_now()));
/// assert!(ran.get());
/// ```
#[derive(Clone)]
pub struct LocalScheduler {
    local: Rc<LocalSet>,
}

impl LocalScheduler {
    /// Creates a scheduler that spawns onto `local`.
    pub fn new(local: Rc<LocalSet>) -> Self {
        Self { local }
    }

    /// The `LocalSet` this scheduler spawns onto.
    pub fn local_set(&self) -> &Rc<LocalSet> {
        &self.local
    }
}

impl Scheduler for LocalScheduler {
    fn defer(&self, task: Deferred) {
        // The returned JoinHandle is dropped; that detaches the task.
        self.local.spawn_local(async move { task() });
    }
}
