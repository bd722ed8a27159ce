//! Progress events emitted by the scheduler.

use crate::{BatchId, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubject {
    /// A single job, optionally part of a batch
    Job {
        /// Job id
        job: JobId,
        /// Owning batch
        batch: Option<BatchId>,
    },
    /// A batch aggregate
    Batch(BatchId),
}

/// The state change being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Job accepted
    #[display("queued")]
    Queued,
    /// Job acquired a slot
    #[display("started")]
    Started,
    /// Job finished with content
    #[display("completed")]
    Completed,
    /// Job finished without content
    #[display("failed")]
    Failed,
    /// Job was cancelled
    #[display("cancelled")]
    Cancelled,
    /// Batch aggregate changed
    #[display("batch updated ({}/{})", terminal, total)]
    BatchUpdated {
        /// Jobs in a terminal state
        terminal: usize,
        /// Jobs in the batch
        total: usize,
    },
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Subject of the event
    pub subject: EventSubject,
    /// State change
    pub transition: Transition,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
    /// Optional human-readable detail
    pub detail: Option<String>,
}

impl ProgressEvent {
    /// Event about a job.
    pub fn job(job: JobId, batch: Option<BatchId>, transition: Transition) -> Self {
        Self {
            subject: EventSubject::Job { job, batch },
            transition,
            timestamp: Utc::now(),
            detail: None,
        }
    }

    /// Aggregate event about a batch.
    pub fn batch(batch: BatchId, terminal: usize, total: usize) -> Self {
        Self {
            subject: EventSubject::Batch(batch),
            transition: Transition::BatchUpdated { terminal, total },
            timestamp: Utc::now(),
            detail: None,
        }
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Job id, when the subject is a job.
    pub fn job_id(&self) -> Option<JobId> {
        match self.subject {
            EventSubject::Job { job, .. } => Some(job),
            EventSubject::Batch(_) => None,
        }
    }

    /// Batch id, for batch events and batched jobs.
    pub fn batch_id(&self) -> Option<BatchId> {
        match self.subject {
            EventSubject::Job { batch, .. } => batch,
            EventSubject::Batch(batch) => Some(batch),
        }
    }

    /// Whether this event reports a job reaching a terminal state.
    pub fn is_job_terminal(&self) -> bool {
        matches!(self.subject, EventSubject::Job { .. })
            && matches!(
                self.transition,
                Transition::Completed | Transition::Failed | Transition::Cancelled
            )
    }
}
