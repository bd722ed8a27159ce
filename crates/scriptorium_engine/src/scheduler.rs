//! Job and batch scheduling with progress broadcast.

use crate::{AdmissionController, AdmissionPermit, GenerationEngine, SchedulerConfig};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use scriptorium_core::{
    BatchCounts, BatchId, BatchRequest, BatchStatus, BatchView, GenerationJob, GenerationRequest,
    JobFailure, JobFailureKind, JobId, JobState, JobView, ProcessingMode, ProgressEvent,
    Transition,
};
use scriptorium_error::{GenerationErrorKind, SchedulerError, SchedulerErrorKind};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// What to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelTarget {
    /// One job
    Job(JobId),
    /// Every job of a batch
    Batch(BatchId),
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CancelAck {
    /// Queued jobs cancelled on the spot
    pub cancelled: Vec<JobId>,
    /// Running jobs told to stop at their next checkpoint
    pub signalled: Vec<JobId>,
    /// Jobs that had already finished
    pub already_terminal: usize,
}

/// Subscription to scheduler progress events.
///
/// Backed by a broadcast channel: a subscriber that falls behind skips the
/// oldest events instead of slowing the scheduler down.
#[derive(Debug)]
pub struct ProgressStream {
    receiver: broadcast::Receiver<ProgressEvent>,
}

impl ProgressStream {
    /// Next event, or `None` once the scheduler is gone.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Debug)]
struct JobHandle {
    id: JobId,
    batch: Option<BatchId>,
    job: Mutex<GenerationJob>,
    state: watch::Sender<JobState>,
    cancel: CancellationToken,
}

impl JobHandle {
    fn new(job: GenerationJob, cancel: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            id: job.id(),
            batch: job.batch(),
            state: watch::Sender::new(job.state()),
            job: Mutex::new(job),
            cancel,
        })
    }

    /// Apply a transition and publish the resulting state.
    fn update<R>(&self, transition: impl FnOnce(&mut GenerationJob) -> R) -> R {
        let mut job = self.job.lock();
        let result = transition(&mut job);
        self.state.send_replace(job.state());
        result
    }

    fn state(&self) -> JobState {
        self.job.lock().state()
    }

    fn view(&self) -> JobView {
        self.job.lock().view()
    }

    /// `queued → cancelled`; `false` if the job had left the queue.
    fn cancel_if_queued(&self) -> bool {
        let cancelled = self.update(|job| job.state() == JobState::Queued && job.cancel());
        if cancelled {
            self.cancel.cancel();
        }
        cancelled
    }
}

#[derive(Debug)]
struct BatchEntry {
    id: BatchId,
    jobs: Vec<Arc<JobHandle>>,
    mode: ProcessingMode,
    fail_fast: bool,
    admission: Arc<AdmissionController>,
    /// Parent of every job token.
    cancel: CancellationToken,
    /// Stops admitting queued jobs.
    halt: CancellationToken,
    cancel_requested: AtomicBool,
    progress: Mutex<()>,
    terminal: watch::Sender<usize>,
}

impl BatchEntry {
    fn counts(&self) -> BatchCounts {
        BatchCounts::tally(self.jobs.iter().map(|job| job.state()))
    }

    fn view(&self) -> BatchView {
        let jobs: Vec<JobView> = self.jobs.iter().map(|job| job.view()).collect();
        let counts = BatchCounts::tally(jobs.iter().map(|job| job.state));
        BatchView {
            id: self.id,
            status: BatchStatus::derive(&counts, self.fail_fast),
            counts,
            jobs,
            mode: self.mode,
            concurrency_limit: self.admission.limit(),
            cancel_requested: self.cancel_requested.load(Ordering::SeqCst),
            fail_fast: self.fail_fast,
        }
    }
}

#[derive(Debug)]
struct SchedulerInner {
    engine: Arc<GenerationEngine>,
    config: SchedulerConfig,
    standalone: Arc<AdmissionController>,
    jobs: RwLock<HashMap<JobId, Arc<JobHandle>>>,
    batches: RwLock<HashMap<BatchId, Arc<BatchEntry>>>,
    events: broadcast::Sender<ProgressEvent>,
}

/// Runs generation jobs under concurrency limits.
///
/// Standalone jobs share one limit (`max_concurrent`); each batch gets its own
/// admission controller sized by its processing mode. Jobs are admitted in
/// submission order. Every state change is broadcast as a [`ProgressEvent`],
/// and each terminal job of a batch is followed by a
/// [`Transition::BatchUpdated`] event whose counts never go backwards.
///
/// Cheap to clone; clones share the same job tables. Submission spawns Tokio
/// tasks and must happen inside a runtime.
#[derive(Debug, Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn job_not_found(id: JobId) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::JobNotFound(id.to_string()))
}

fn batch_not_found(id: BatchId) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::BatchNotFound(id.to_string()))
}

impl Scheduler {
    /// Create a scheduler.
    ///
    /// # Errors
    ///
    /// [`SchedulerErrorKind::InvalidConcurrency`] when `max_concurrent` is zero.
    pub fn new(engine: Arc<GenerationEngine>, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        if *config.max_concurrent() == 0 {
            return Err(SchedulerError::new(SchedulerErrorKind::InvalidConcurrency(0)));
        }
        let (events, _) = broadcast::channel((*config.event_capacity()).max(1));
        Ok(Self {
            inner: Arc::new(SchedulerInner {
                standalone: AdmissionController::new(*config.max_concurrent(), *config.max_concurrent()),
                engine,
                config,
                jobs: RwLock::new(HashMap::new()),
                batches: RwLock::new(HashMap::new()),
                events,
            }),
        })
    }

    /// Scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// The engine jobs run on.
    pub fn engine(&self) -> &Arc<GenerationEngine> {
        &self.inner.engine
    }

    /// Subscribe to progress events emitted from now on.
    pub fn subscribe(&self) -> ProgressStream {
        ProgressStream {
            receiver: self.inner.events.subscribe(),
        }
    }

    /// Queue a standalone job.
    #[instrument(skip(self, request), fields(content_type = %request.content_type()))]
    pub fn submit(&self, request: GenerationRequest) -> JobId {
        let id = JobId::new();
        let handle = JobHandle::new(GenerationJob::new(id, None, request), CancellationToken::new());
        self.inner.jobs.write().insert(id, Arc::clone(&handle));
        self.inner.emit(ProgressEvent::job(id, None, Transition::Queued));
        debug!(job = %id, "Job queued");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let admission = Arc::clone(&inner.standalone);
            if let Some(permit) = admission.acquire(&handle.cancel).await {
                inner.run_job(handle, None, permit).await;
            }
        });
        id
    }

    /// Queue a batch.
    ///
    /// # Errors
    ///
    /// - [`SchedulerErrorKind::EmptyBatch`] when there are no requests
    /// - [`SchedulerErrorKind::InvalidConcurrency`] when a concurrent or adaptive
    ///   batch has a zero ceiling
    #[instrument(skip(self, batch), fields(jobs = batch.requests.len(), mode = %batch.mode))]
    pub fn submit_batch(&self, batch: BatchRequest) -> Result<BatchId, SchedulerError> {
        if batch.requests.is_empty() {
            return Err(SchedulerError::new(SchedulerErrorKind::EmptyBatch));
        }
        let ceiling = match batch.mode {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Concurrent | ProcessingMode::Adaptive => batch.max_concurrent,
        };
        if ceiling == 0 {
            return Err(SchedulerError::new(SchedulerErrorKind::InvalidConcurrency(0)));
        }

        let id = BatchId::new();
        let cancel = CancellationToken::new();
        let admission = AdmissionController::new(batch.initial_limit(), ceiling);
        let jobs: Vec<Arc<JobHandle>> = batch
            .requests
            .into_iter()
            .map(|request| {
                JobHandle::new(
                    GenerationJob::new(JobId::new(), Some(id), request),
                    cancel.child_token(),
                )
            })
            .collect();

        let entry = Arc::new(BatchEntry {
            id,
            jobs,
            mode: batch.mode,
            fail_fast: batch.fail_fast,
            admission,
            cancel,
            halt: CancellationToken::new(),
            cancel_requested: AtomicBool::new(false),
            progress: Mutex::new(()),
            terminal: watch::Sender::new(0),
        });

        {
            let mut table = self.inner.jobs.write();
            for job in &entry.jobs {
                table.insert(job.id, Arc::clone(job));
            }
        }
        self.inner.batches.write().insert(id, Arc::clone(&entry));
        for job in &entry.jobs {
            self.inner
                .emit(ProgressEvent::job(job.id, Some(id), Transition::Queued));
        }
        info!(batch = %id, jobs = entry.jobs.len(), fail_fast = entry.fail_fast, "Batch queued");

        tokio::spawn(Arc::clone(&self.inner).drive_batch(entry));
        Ok(id)
    }

    /// Snapshot of a job. Stable once the job is terminal.
    pub fn get_job(&self, id: JobId) -> Result<JobView, SchedulerError> {
        self.inner
            .jobs
            .read()
            .get(&id)
            .map(|job| job.view())
            .ok_or_else(|| job_not_found(id))
    }

    /// Snapshot of a batch with its jobs.
    pub fn get_batch(&self, id: BatchId) -> Result<BatchView, SchedulerError> {
        self.inner
            .batches
            .read()
            .get(&id)
            .map(|batch| batch.view())
            .ok_or_else(|| batch_not_found(id))
    }

    /// Snapshots of every tracked batch.
    pub fn list_batches(&self) -> Vec<BatchView> {
        self.inner
            .batches
            .read()
            .values()
            .map(|batch| batch.view())
            .collect()
    }

    /// Cancel a job or a batch.
    ///
    /// Queued jobs are cancelled before this returns and never reach a
    /// provider. Running jobs are signalled and stop at their next checkpoint.
    #[instrument(skip(self))]
    pub fn cancel(&self, target: CancelTarget) -> Result<CancelAck, SchedulerError> {
        match target {
            CancelTarget::Job(id) => {
                let job = self
                    .inner
                    .jobs
                    .read()
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| job_not_found(id))?;
                let batch = job
                    .batch
                    .and_then(|batch| self.inner.batches.read().get(&batch).cloned());
                let mut ack = CancelAck::default();
                self.inner.cancel_job(&job, batch.as_deref(), &mut ack);
                Ok(ack)
            }
            CancelTarget::Batch(id) => {
                let batch = self
                    .inner
                    .batches
                    .read()
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| batch_not_found(id))?;
                batch.cancel_requested.store(true, Ordering::SeqCst);
                batch.halt.cancel();
                let mut ack = CancelAck::default();
                for job in &batch.jobs {
                    self.inner.cancel_job(job, Some(&batch), &mut ack);
                }
                batch.cancel.cancel();
                info!(
                    batch = %id,
                    cancelled = ack.cancelled.len(),
                    signalled = ack.signalled.len(),
                    "Batch cancellation requested"
                );
                Ok(ack)
            }
        }
    }

    /// Wait until a job is terminal and return its final snapshot.
    pub async fn wait_for_job(&self, id: JobId) -> Result<JobView, SchedulerError> {
        let job = self
            .inner
            .jobs
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| job_not_found(id))?;
        let mut state = job.state.subscribe();
        // The sender lives in `job`, so the wait cannot end early.
        let _ = state.wait_for(|state| state.is_terminal()).await;
        Ok(job.view())
    }

    /// Wait until every job of a batch is terminal and return its final snapshot.
    pub async fn wait_for_batch(&self, id: BatchId) -> Result<BatchView, SchedulerError> {
        let batch = self
            .inner
            .batches
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| batch_not_found(id))?;
        let total = batch.jobs.len();
        let mut terminal = batch.terminal.subscribe();
        let _ = terminal.wait_for(|terminal| *terminal >= total).await;
        Ok(batch.view())
    }

    /// Forget a finished batch and its jobs, returning its final snapshot.
    ///
    /// # Errors
    ///
    /// [`SchedulerErrorKind::BatchNotTerminal`] while any job is unfinished.
    pub fn purge_batch(&self, id: BatchId) -> Result<BatchView, SchedulerError> {
        let mut batches = self.inner.batches.write();
        let batch = batches.get(&id).ok_or_else(|| batch_not_found(id))?;
        let view = batch.view();
        if !view.status.is_terminal() {
            return Err(SchedulerError::new(SchedulerErrorKind::BatchNotTerminal {
                batch: id.to_string(),
                remaining: view.counts.total() - view.counts.terminal(),
            }));
        }

        let mut jobs = self.inner.jobs.write();
        for job in &batch.jobs {
            jobs.remove(&job.id);
        }
        batches.remove(&id);
        debug!(batch = %id, "Batch purged");
        Ok(view)
    }
}

impl SchedulerInner {
    fn emit(&self, event: ProgressEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Publish the batch aggregate. Serialized per batch so counts only grow.
    fn record_batch_progress(&self, batch: &BatchEntry) {
        let _guard = batch.progress.lock();
        let counts = batch.counts();
        let terminal = counts.terminal();
        self.emit(ProgressEvent::batch(batch.id, terminal, counts.total()));
        batch.terminal.send_replace(terminal);
        if terminal == counts.total() {
            info!(
                batch = %batch.id,
                status = %BatchStatus::derive(&counts, batch.fail_fast),
                completed = counts.completed,
                failed = counts.failed,
                cancelled = counts.cancelled,
                "Batch finished"
            );
        }
    }

    fn cancel_job(&self, job: &JobHandle, batch: Option<&BatchEntry>, ack: &mut CancelAck) {
        if job.cancel_if_queued() {
            self.emit(
                ProgressEvent::job(job.id, job.batch, Transition::Cancelled)
                    .with_detail("cancelled while queued"),
            );
            if let Some(batch) = batch {
                self.record_batch_progress(batch);
            }
            ack.cancelled.push(job.id);
            return;
        }

        match job.state() {
            JobState::Running => {
                job.cancel.cancel();
                ack.signalled.push(job.id);
            }
            _ => ack.already_terminal += 1,
        }
    }

    /// Stop admitting jobs after a hard failure and cancel the queue.
    fn halt_batch(&self, batch: &BatchEntry) {
        batch.halt.cancel();
        let mut ack = CancelAck::default();
        for job in &batch.jobs {
            if job.state() == JobState::Queued {
                self.cancel_job(job, Some(batch), &mut ack);
            }
        }
        warn!(batch = %batch.id, cancelled = ack.cancelled.len(), "Fail-fast batch halted");
    }

    /// Admit a batch's jobs in order as slots free up.
    async fn drive_batch(self: Arc<Self>, batch: Arc<BatchEntry>) {
        for job in &batch.jobs {
            if job.state() != JobState::Queued {
                continue;
            }
            let Some(permit) = batch.admission.acquire(&batch.halt).await else {
                debug!(batch = %batch.id, "Admission halted");
                break;
            };
            if job.state() != JobState::Queued {
                continue;
            }

            let inner = Arc::clone(&self);
            let job = Arc::clone(job);
            let batch = Arc::clone(&batch);
            tokio::spawn(async move { inner.run_job(job, Some(batch), permit).await });
        }
    }

    async fn run_job(
        self: &Arc<Self>,
        job: Arc<JobHandle>,
        batch: Option<Arc<BatchEntry>>,
        permit: AdmissionPermit,
    ) {
        if let Some(batch) = batch.as_deref() {
            if batch.halt.is_cancelled() {
                let mut ack = CancelAck::default();
                self.cancel_job(&job, Some(batch), &mut ack);
                return;
            }
        }
        if !job.update(|job| job.start()) {
            return;
        }
        self.emit(ProgressEvent::job(job.id, job.batch, Transition::Started));

        let request = job.job.lock().request().clone();
        let result = AssertUnwindSafe(self.engine.generate(&request, &job.cancel))
            .catch_unwind()
            .await;

        let (transition, detail) = match result {
            Ok(Ok(outcome)) => {
                let retries = outcome.retries();
                let detail = format!(
                    "{} via {} after {} draft(s), composite {:.2}",
                    if outcome.quality.passed() { "accepted" } else { "below threshold" },
                    outcome.provider,
                    outcome.drafts,
                    outcome.quality.composite()
                );
                job.update(|job| {
                    job.complete(
                        outcome.content,
                        outcome.quality,
                        outcome.provider,
                        outcome.drafts,
                        retries,
                    )
                });
                (Transition::Completed, detail)
            }
            Ok(Err(e)) if e.is_cancelled() => {
                job.update(|job| job.cancel());
                (Transition::Cancelled, "cancelled while running".to_string())
            }
            Ok(Err(e)) => {
                let (kind, attempts) = match &e.kind {
                    GenerationErrorKind::ProviderUnavailable { attempts, .. } => {
                        (JobFailureKind::ProviderUnavailable, *attempts)
                    }
                    GenerationErrorKind::Prompt(_) => (JobFailureKind::InvalidRequest, 0),
                    GenerationErrorKind::Cancelled => (JobFailureKind::Internal, 0),
                };
                let message = e.kind.to_string();
                job.update(|job| {
                    job.fail(
                        JobFailure {
                            kind,
                            message: message.clone(),
                            provider_attempts: attempts,
                        },
                        0,
                        attempts.saturating_sub(1),
                    )
                });
                (Transition::Failed, message)
            }
            Err(payload) => {
                let message = format!("job task panicked: {}", panic_message(payload.as_ref()));
                warn!(job = %job.id, %message, "Generation panicked");
                job.update(|job| {
                    job.fail(
                        JobFailure {
                            kind: JobFailureKind::Internal,
                            message: message.clone(),
                            provider_attempts: 0,
                        },
                        0,
                        0,
                    )
                });
                (Transition::Failed, message)
            }
        };

        if let Some(batch) = batch.as_deref() {
            if batch.mode == ProcessingMode::Adaptive {
                let step = *self.config.adaptive_step();
                match transition {
                    Transition::Completed => batch.admission.widen(step),
                    Transition::Failed => batch.admission.narrow(step),
                    _ => {}
                }
            }
        }

        info!(job = %job.id, %transition, detail = %detail, "Job finished");
        self.emit(ProgressEvent::job(job.id, job.batch, transition).with_detail(detail));
        drop(permit);

        if let Some(batch) = batch.as_deref() {
            if transition == Transition::Failed && batch.fail_fast {
                self.halt_batch(batch);
            }
            self.record_batch_progress(batch);
        }
    }
}
