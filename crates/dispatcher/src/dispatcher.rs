//! Dispatcher - bounded fan-out of notifications with ordered fan-in

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use contracts::{DispatchSettings, DispatchSummary, FailureReason, Notifier, Outcome};

use crate::error::DispatchError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::outcomes::OutcomeSequence;
use crate::planner::BatchPlanner;
use crate::worker::{run_worker, WorkerContext, WorkerEvent, WorkerGuard};

/// Dispatcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum recipients per worker
    pub max_batch_size: usize,
    /// Maximum workers running at once (None = one per partition, unbounded)
    pub max_concurrent_workers: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            max_concurrent_workers: None,
        }
    }
}

impl From<&DispatchSettings> for DispatchConfig {
    fn from(settings: &DispatchSettings) -> Self {
        Self {
            max_batch_size: settings.max_batch_size,
            max_concurrent_workers: settings.max_concurrent_workers,
        }
    }
}

/// Builder for creating a Dispatcher
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    config: DispatchConfig,
    metrics: Option<Arc<DispatchMetrics>>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.config.max_batch_size = max_batch_size;
        self
    }

    pub fn max_concurrent_workers(mut self, limit: Option<usize>) -> Self {
        self.config.max_concurrent_workers = limit;
        self
    }

    /// Share metrics with another owner (e.g. a reporter)
    pub fn metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate configuration and build the dispatcher
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let planner = BatchPlanner::new(self.config.max_batch_size)?;

        if self.config.max_concurrent_workers == Some(0) {
            return Err(DispatchError::invalid_configuration(
                "max_concurrent_workers must be > 0 when set",
            ));
        }

        Ok(Dispatcher {
            planner,
            worker_limit: self.config.max_concurrent_workers,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

/// Result of one dispatch call
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// One outcome per recipient, in input order
    pub outcomes: Vec<Outcome>,
    pub summary: DispatchSummary,
    /// Wall time from planning to rendezvous
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}

/// Sends one notification per recipient, batched across concurrent workers
///
/// Each partition from the [`BatchPlanner`] gets one worker. Workers may be
/// throttled by a semaphore; outcomes always come back in input order.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    planner: BatchPlanner,
    worker_limit: Option<usize>,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// # Errors
    /// `InvalidConfiguration` for a zero batch size or zero worker limit
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        DispatcherBuilder::new()
            .max_batch_size(config.max_batch_size)
            .max_concurrent_workers(config.max_concurrent_workers)
            .build()
    }

    pub fn planner(&self) -> &BatchPlanner {
        &self.planner
    }

    /// Get cumulative metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Send to every recipient and wait for all workers
    pub async fn send<R, N>(
        &self,
        recipients: impl Into<Arc<[R]>>,
        notifier: Arc<N>,
    ) -> Result<DispatchReport, DispatchError>
    where
        R: Send + Sync + 'static,
        N: Notifier<R> + Sync + 'static,
    {
        self.run(recipients.into(), notifier, CancellationToken::new(), None)
            .await
    }

    /// Like [`send`](Self::send), but stops waiting once `cancel` fires
    ///
    /// Recipients without an outcome at that point are `Failed(Cancelled)`.
    /// Reported outcomes are collected once, right after cancelling. A
    /// `send_one` that completes after that sweep is still reported as
    /// cancelled, so a cancelled recipient may already have been notified.
    pub async fn send_with_cancel<R, N>(
        &self,
        recipients: impl Into<Arc<[R]>>,
        notifier: Arc<N>,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, DispatchError>
    where
        R: Send + Sync + 'static,
        N: Notifier<R> + Sync + 'static,
    {
        self.run(recipients.into(), notifier, cancel.child_token(), None)
            .await
    }

    /// Like [`send`](Self::send), but cancels whatever is unfinished after `timeout`
    ///
    /// Late outcomes are handled as in [`send_with_cancel`](Self::send_with_cancel).
    pub async fn send_with_deadline<R, N>(
        &self,
        recipients: impl Into<Arc<[R]>>,
        notifier: Arc<N>,
        timeout: Duration,
    ) -> Result<DispatchReport, DispatchError>
    where
        R: Send + Sync + 'static,
        N: Notifier<R> + Sync + 'static,
    {
        let deadline = Instant::now() + timeout;
        self.run(
            recipients.into(),
            notifier,
            CancellationToken::new(),
            Some(deadline),
        )
        .await
    }

    #[instrument(
        name = "dispatcher_send",
        skip_all,
        fields(
            notifier = notifier.name(),
            recipients = recipients.len(),
            max_batch_size = self.planner.max_batch_size()
        )
    )]
    async fn run<R, N>(
        &self,
        recipients: Arc<[R]>,
        notifier: Arc<N>,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<DispatchReport, DispatchError>
    where
        R: Send + Sync + 'static,
        N: Notifier<R> + Sync + 'static,
    {
        let started = Instant::now();
        let partitions = self.planner.plan(recipients.len());
        let workers = partitions.len();
        let mut outcomes = OutcomeSequence::new(recipients.len());

        if workers == 0 {
            debug!("No recipients, nothing to dispatch");
            return self.finish(outcomes, workers, started);
        }

        // Workers stop if this future is dropped before the rendezvous
        let _stop_workers = cancel.clone().drop_guard();

        let limiter = self.worker_limit.map(|n| Arc::new(Semaphore::new(n)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (worker, partition) in partitions.into_iter().enumerate() {
            let guard = WorkerGuard::new(worker, partition, tx.clone(), cancel.clone());
            let ctx = WorkerContext {
                recipients: Arc::clone(&recipients),
                notifier: Arc::clone(&notifier),
                limiter: limiter.clone(),
                metrics: Arc::clone(&self.metrics),
            };
            tokio::spawn(run_worker(guard, ctx));
        }
        drop(tx);

        info!(workers, "Workers spawned");

        // Rendezvous: one Done per spawned worker
        let mut done = 0;
        while done < workers {
            let event = tokio::select! {
                event = rx.recv() => event,
                _ = cancel.cancelled() => break,
                _ = sleep_until(deadline) => {
                    warn!(completed = done, workers, "Dispatch deadline reached");
                    break;
                }
            };

            match event {
                Some(WorkerEvent::Outcome { index, outcome }) => outcomes.write(index, outcome)?,
                Some(WorkerEvent::Done { worker }) => {
                    done += 1;
                    debug!(worker, completed = done, workers, "Worker completed");
                }
                None => {
                    // Every guard signals before dropping its sender
                    warn!(completed = done, workers, "Report channel closed early");
                    outcomes.fill_unwritten(&FailureReason::WorkerAborted(
                        "worker vanished without reporting".to_string(),
                    ));
                    break;
                }
            }
        }

        if done < workers {
            cancel.cancel();
            // Keep outcomes that were already reported
            while let Ok(event) = rx.try_recv() {
                if let WorkerEvent::Outcome { index, outcome } = event {
                    outcomes.write(index, outcome)?;
                }
            }
            let cancelled = outcomes.fill_unwritten(&FailureReason::Cancelled);
            if cancelled > 0 {
                warn!(cancelled, "Dispatch cancelled before all workers finished");
            }
        }

        self.finish(outcomes, workers, started)
    }

    fn finish(
        &self,
        outcomes: OutcomeSequence,
        workers: usize,
        started: Instant,
    ) -> Result<DispatchReport, DispatchError> {
        let outcomes = outcomes.into_outcomes()?;
        let summary = DispatchSummary::from_outcomes(&outcomes, workers);
        self.metrics.record(&summary);

        let elapsed = started.elapsed();
        info!(
            total = summary.total,
            sent = summary.sent,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Dispatch complete"
        );

        Ok(DispatchReport {
            outcomes,
            summary,
            elapsed,
        })
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Send to every recipient with a one-off dispatcher
///
/// # Errors
/// `InvalidConfiguration` when `max_batch_size` is zero, before any worker starts
pub async fn dispatch<R, N>(
    recipients: impl Into<Arc<[R]>>,
    notifier: Arc<N>,
    max_batch_size: usize,
) -> Result<Vec<Outcome>, DispatchError>
where
    R: Send + Sync + 'static,
    N: Notifier<R> + Sync + 'static,
{
    let dispatcher = DispatcherBuilder::new()
        .max_batch_size(max_batch_size)
        .build()?;
    Ok(dispatcher.send(recipients, notifier).await?.into_outcomes())
}
