//! Thread pools used by the [`BookServer`] to service client connections.
//!
//! Two implementations are provided: [`SharedQueueThreadPool`], a fixed set of worker
//! threads pulling jobs off a shared crossbeam channel, and [`RayonThreadPool`], which hands
//! jobs to a work stealing rayon pool.
//!
//! [`BookServer`]: ../struct.BookServer.html
use crate::Result;

/// A pool of threads that can run jobs (closures)
pub trait ThreadPool {
    /// creates a new pool with the given number of `threads`.
    ///
    /// # Errors
    /// returns an error if the pool could not be built, i.e. a thread could not be spawned
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// runs `job` on one of the pool's threads. This call does not wait for the job to finish.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
