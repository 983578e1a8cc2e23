//! Fixed-size worker pool running discrete command units.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{ConfigError, Result};

/// A unit of work executed by one worker.
pub trait Command: Send {
    fn execute(&mut self);
}

impl<F: FnMut() + Send> Command for F {
    fn execute(&mut self) {
        self()
    }
}

/// Worker pool with fork-join dispatch.
///
/// Every `dispatch*` call returns only after all of its commands finished,
/// so commands may borrow data owned by the caller.
pub struct Dispatcher {
    pool: ThreadPool,
}

impl Dispatcher {
    /// `workers == 0` uses one worker per available core.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lasp-worker-{}", i))
            .build()
            .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;
        log::debug!("dispatcher started with {} workers", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every command, one per task, and wait for all of them.
    pub fn dispatch<'c>(&self, commands: Vec<Box<dyn Command + 'c>>) {
        self.pool.scope(|scope| {
            for mut command in commands {
                scope.spawn(move |_| command.execute());
            }
        });
    }

    /// Run every job and collect the results in job order.
    pub fn dispatch_collect<T, F>(&self, jobs: Vec<F>) -> Vec<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        let mut slots: Vec<Option<T>> = jobs.iter().map(|_| None).collect();
        self.pool.scope(|scope| {
            for (slot, job) in slots.iter_mut().zip(jobs) {
                scope.spawn(move |_| *slot = Some(job()));
            }
        });
        slots.into_iter().flatten().collect()
    }

    /// Run `f` inside the pool, so rayon parallel iterators in it use these
    /// workers.
    pub fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(f)
    }
}
