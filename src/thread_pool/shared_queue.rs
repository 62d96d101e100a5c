use super::ThreadPool;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool implemented with a shared job queue (i.e. channel).
///
/// This implementation uses the MPMC [`channel`] provided by the crossbeam crate, as a single
/// producer (the pool itself) with every worker thread as a consumer.
///
/// If a job panics, the worker thread running it is replaced by a new one. A failure to spawn
/// the replacement is logged and the pool keeps running with one thread less.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    /// the sending part of the channel
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    /// create a pool with the given number of `threads`.
    /// Every thread created will have a handle to the receiving end of the channel
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for _ in 0..threads {
            spawn_worker(JobReceiver(rx.clone()))?;
        }
        debug!("created shared queue thread pool with {} threads", threads);
        Ok(SharedQueueThreadPool { tx })
    }

    /// Queues `job` for the next idle worker.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            error!("no worker threads left in the pool, dropping job");
        }
    }
}

/// receives jobs from the channel and runs them.
/// Also responsible for replacing its thread if a job panicked
#[derive(Clone)]
struct JobReceiver(Receiver<Job>);

impl Drop for JobReceiver {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker panicked, starting a replacement");
            if let Err(e) = spawn_worker(self.clone()) {
                error!("Failed to spawn a thread: {}", e);
            }
        }
    }
}

fn spawn_worker(rx: JobReceiver) -> Result<()> {
    thread::Builder::new()
        .name(String::from("books-worker"))
        .spawn(move || run_jobs(rx))?;
    Ok(())
}

/// waits for jobs to arrive on the (wrapped) receiver and runs them, until the pool is dropped
fn run_jobs(rx: JobReceiver) {
    while let Ok(job) = rx.0.recv() {
        job();
    }
    debug!("worker exiting, the thread pool was dropped");
}
