//! Worker - sends one partition and reports back to the dispatcher
//!
//! Every worker owns a [`WorkerGuard`]. Whatever way the worker ends
//! (completion, cancellation, panic, abort) the guard reports an outcome for
//! each index of the partition and then signals `Done`, so the dispatcher's
//! rendezvous is always satisfied.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use contracts::{FailureReason, Notifier, Outcome, Partition};

use crate::metrics::DispatchMetrics;

/// Message from a worker to the dispatcher
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// Outcome for one recipient index
    Outcome { index: usize, outcome: Outcome },
    /// Worker finished its partition, sent exactly once per worker
    Done { worker: usize },
}

/// Completion guard for one worker
pub(crate) struct WorkerGuard {
    worker: usize,
    partition: Partition,
    /// Next index without a reported outcome
    next: usize,
    tx: mpsc::UnboundedSender<WorkerEvent>,
    cancel: CancellationToken,
}

impl WorkerGuard {
    pub(crate) fn new(
        worker: usize,
        partition: Partition,
        tx: mpsc::UnboundedSender<WorkerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            worker,
            partition,
            next: partition.begin,
            tx,
            cancel,
        }
    }

    /// Report the outcome for the next index
    fn record(&mut self, outcome: Outcome) {
        debug_assert!(self.partition.contains(self.next));
        self.emit(WorkerEvent::Outcome {
            index: self.next,
            outcome,
        });
        self.next += 1;
    }

    fn emit(&self, event: WorkerEvent) {
        // Receiver is gone only when the dispatcher stopped waiting
        let _ = self.tx.send(event);
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let remaining = self.partition.end - self.next;
        if remaining > 0 {
            let reason = if self.cancel.is_cancelled() {
                FailureReason::Cancelled
            } else {
                warn!(
                    worker = self.worker,
                    partition = %self.partition,
                    remaining,
                    "Worker exited before finishing its batch"
                );
                FailureReason::WorkerAborted(format!(
                    "worker {} exited before finishing batch {}",
                    self.worker, self.partition
                ))
            };
            while self.next < self.partition.end {
                self.record(Outcome::failed(reason.clone()));
            }
        }
        self.emit(WorkerEvent::Done {
            worker: self.worker,
        });
    }
}

/// Everything a worker needs besides its guard
pub(crate) struct WorkerContext<R, N> {
    pub recipients: Arc<[R]>,
    pub notifier: Arc<N>,
    pub limiter: Option<Arc<Semaphore>>,
    pub metrics: Arc<DispatchMetrics>,
}

/// Worker loop: one `send_one` per index, ascending
///
/// Reported failures are recorded and the loop moves on. Cancellation stops
/// the loop before the next recipient, the guard marks the rest cancelled.
#[instrument(
    name = "dispatch_worker",
    skip(guard, ctx),
    fields(worker = guard.worker, partition = %guard.partition)
)]
pub(crate) async fn run_worker<R, N>(mut guard: WorkerGuard, ctx: WorkerContext<R, N>)
where
    R: Send + Sync + 'static,
    N: Notifier<R> + Sync + 'static,
{
    let cancel = guard.cancel.clone();

    let _permit = match &ctx.limiter {
        Some(limiter) => {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                permit = Arc::clone(limiter).acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
            }
        }
        None => None,
    };

    ctx.metrics.worker_started();
    let _active = ActiveWorker(&*ctx.metrics);

    debug!(size = guard.partition.len(), "Worker started");

    for index in guard.partition.indices() {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = ctx.notifier.send_one(&ctx.recipients[index]) => result,
        };

        match result {
            Ok(()) => guard.record(Outcome::Sent),
            Err(e) => {
                warn!(
                    notifier = ctx.notifier.name(),
                    index,
                    error = %e,
                    "Notification failed"
                );
                // Continue with the rest of the batch
                guard.record(Outcome::failed(e.into()));
            }
        }
    }

    debug!("Worker finished");
}

/// Keeps the active worker gauge balanced on every exit path
struct ActiveWorker<'a>(&'a DispatchMetrics);

impl Drop for ActiveWorker<'_> {
    fn drop(&mut self) {
        self.0.worker_stopped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_guard_fills_remaining_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut guard = WorkerGuard::new(0, Partition::new(4, 7), tx, CancellationToken::new());
        guard.record(Outcome::Sent);
        drop(guard);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            WorkerEvent::Outcome { index: 4, outcome: Outcome::Sent }
        ));
        for event in &events[1..3] {
            match event {
                WorkerEvent::Outcome { outcome, .. } => assert!(matches!(
                    outcome.reason(),
                    Some(FailureReason::WorkerAborted(_))
                )),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(matches!(events[3], WorkerEvent::Done { worker: 0 }));
    }

    #[test]
    fn test_guard_marks_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let guard = WorkerGuard::new(3, Partition::new(0, 2), tx, cancel.clone());
        cancel.cancel();
        drop(guard);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        for event in &events[..2] {
            match event {
                WorkerEvent::Outcome { outcome, .. } => assert!(outcome.is_cancelled()),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(matches!(events[2], WorkerEvent::Done { worker: 3 }));
    }

    #[test]
    fn test_guard_after_full_batch_only_signals_done() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut guard = WorkerGuard::new(1, Partition::new(0, 1), tx, CancellationToken::new());
        guard.record(Outcome::Sent);
        drop(guard);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], WorkerEvent::Done { worker: 1 }));
    }
}
