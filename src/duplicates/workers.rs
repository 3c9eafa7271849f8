//! Bounded worker pool used by the hashing stages.
//!
//! Every stage is a full barrier: all jobs are queued before the first
//! worker starts, results are drained by the calling thread, and the stage
//! returns only after every worker has exited.
//!
//! ```text
//!   jobs ──► [bounded job channel] ──► worker 1..N ──► [bounded result channel] ──► caller
//!                                          │
//!                              supervisor joins workers,
//!                              then closes the result channel
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::bounded;

/// Worker count to use when the caller asks for `0`.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

/// What happened during one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOutcome {
    /// Jobs queued for the stage
    pub queued: usize,
    /// Results delivered to the caller
    pub processed: usize,
    /// Whether workers stopped early because of a shutdown request
    pub interrupted: bool,
    /// Workers that panicked
    pub panicked_workers: usize,
}

impl StageOutcome {
    /// Jobs queued but never delivered in a stage that was not interrupted.
    ///
    /// Non-zero only when a worker panicked and took its job down with it.
    #[must_use]
    pub fn lost(&self) -> usize {
        if self.interrupted {
            0
        } else {
            self.queued.saturating_sub(self.processed)
        }
    }
}

/// Run `work` over every job on a bounded pool of worker threads.
///
/// `on_result` is called on the calling thread once per processed job, in
/// completion order. When `shutdown` is set, workers stop taking new jobs;
/// the stage still waits for in-flight jobs before returning.
///
/// # Arguments
///
/// * `jobs` - Jobs to process; each is moved into exactly one worker
/// * `workers` - Thread count (`0` means [`default_workers`])
/// * `shutdown` - Optional cancellation flag
/// * `work` - Per-job function run on worker threads
/// * `on_result` - Result consumer run on the calling thread
pub fn run_stage<J, R, W, F>(
    jobs: Vec<J>,
    workers: usize,
    shutdown: Option<&AtomicBool>,
    work: W,
    mut on_result: F,
) -> StageOutcome
where
    J: Send,
    R: Send,
    W: Fn(J) -> R + Sync,
    F: FnMut(R),
{
    let mut outcome = StageOutcome {
        queued: jobs.len(),
        ..StageOutcome::default()
    };
    if jobs.is_empty() {
        return outcome;
    }

    let requested = if workers == 0 {
        default_workers()
    } else {
        workers
    };
    let worker_count = requested.min(jobs.len()).max(1);
    let is_cancelled = || shutdown.is_some_and(|flag| flag.load(Ordering::SeqCst));

    let (job_tx, job_rx) = bounded::<J>(jobs.len());
    for job in jobs {
        // Capacity equals the job count and the receiver is alive.
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);

    let (result_tx, result_rx) = bounded::<R>(outcome.queued);

    let panicked = thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let work = &work;
                let is_cancelled = &is_cancelled;
                scope.spawn(move || {
                    for job in job_rx.iter() {
                        if is_cancelled() {
                            log::debug!("Worker {}: shutdown requested, stopping", id);
                            break;
                        }
                        if result_tx.send(work(job)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        let supervisor = scope.spawn(move || {
            let mut panicked = 0;
            for handle in handles {
                if handle.join().is_err() {
                    panicked += 1;
                    log::error!("Hashing worker panicked");
                }
            }
            drop(result_tx);
            panicked
        });

        for result in result_rx.iter() {
            outcome.processed += 1;
            on_result(result);
        }

        supervisor.join().unwrap_or_else(|_| {
            log::error!("Stage supervisor panicked");
            0
        })
    });

    outcome.panicked_workers = panicked;
    outcome.interrupted = is_cancelled() && outcome.processed < outcome.queued;
    outcome
}
