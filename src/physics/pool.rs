//! Fixed-size worker pool for the all-pairs force phase
//!
//! Pair work items travel over a bounded channel; each carries a clone of the
//! tick's [`WaitGroup`], so [`ForcePool::evaluate`] returns only after every
//! pair of the tick has been applied.

use crate::physics::body::BodyHandle;
use crate::physics::gravity::{GravityParams, apply_pair_gravity, unique_pairs};
use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::sync::WaitGroup;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::debug;

pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Pair work items buffered per worker before producers block.
const QUEUE_DEPTH_PER_WORKER: usize = 64;

struct PairJob {
    a: BodyHandle,
    b: BodyHandle,
    _done: WaitGroup,
}

pub struct ForcePool {
    sender: Option<Sender<PairJob>>,
    workers: Vec<JoinHandle<()>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl ForcePool {
    pub fn new(worker_count: usize, params: GravityParams) -> io::Result<Self> {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = channel::bounded(worker_count * QUEUE_DEPTH_PER_WORKER);
        let failure = Arc::new(Mutex::new(None));

        let workers = (0..worker_count)
            .map(|index| {
                let receiver = receiver.clone();
                let failure = failure.clone();
                thread::Builder::new()
                    .name(format!("orrery-force-{index}"))
                    .spawn(move || run_worker(receiver, params, failure))
            })
            .collect::<io::Result<Vec<_>>>()?;

        debug!(worker_count, "force pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
            failure,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Applies gravity to every unique pair of `bodies` and waits for all of
    /// them to finish. Returns the number of pairs evaluated.
    ///
    /// # Panics
    ///
    /// Re-raises, on the calling thread, the first panic any worker hit
    /// while applying a pair.
    pub fn evaluate(&self, bodies: &[BodyHandle]) -> usize {
        if bodies.len() < 2 {
            return 0;
        }

        let Some(sender) = self.sender.as_ref() else {
            panic!("force pool used after shutdown");
        };

        let done = WaitGroup::new();
        let mut pairs = 0;

        for (i, j) in unique_pairs(bodies.len()) {
            let job = PairJob {
                a: bodies[i].clone(),
                b: bodies[j].clone(),
                _done: done.clone(),
            };
            if sender.send(job).is_err() {
                panic!("all force workers have exited");
            }
            pairs += 1;
        }

        done.wait();

        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(message) = failure {
            panic!("force worker panicked: {message}");
        }

        pairs
    }
}

impl Drop for ForcePool {
    fn drop(&mut self) {
        // closing the channel ends every worker loop
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn run_worker(
    receiver: Receiver<PairJob>,
    params: GravityParams,
    failure: Arc<Mutex<Option<String>>>,
) {
    for job in receiver.iter() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            apply_pair_gravity(&job.a, &job.b, &params);
        }));

        if let Err(payload) = result {
            failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert_with(|| panic_message(payload.as_ref()));
        }
        // dropping the job releases its share of the tick's wait group
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
