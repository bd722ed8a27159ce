//! Generation job state machine.

use crate::{BatchId, GenerationRequest, JobId, QualityResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
///
/// `queued → running → {completed | failed | cancelled}`, plus `queued → cancelled`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    /// Waiting for a concurrency slot
    Queued,
    /// Holding a slot, generating
    Running,
    /// Finished with content (possibly below the quality threshold)
    Completed,
    /// Finished without content
    Failed,
    /// Stopped before producing a result
    Cancelled,
}

impl JobState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Category of a hard job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JobFailureKind {
    /// Every provider attempt was exhausted
    ProviderUnavailable,
    /// The request could not be turned into a prompt
    InvalidRequest,
    /// The job task ended unexpectedly
    Internal,
}

/// Structured error carried by a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    /// Failure category
    pub kind: JobFailureKind,
    /// Human-readable detail
    pub message: String,
    /// Provider calls made before failing
    pub provider_attempts: u32,
}

/// A unit of work wrapping one request.
///
/// Transition methods return `false` and leave the job untouched when the
/// transition is not allowed, in particular once the job is terminal.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    id: JobId,
    batch: Option<BatchId>,
    request: GenerationRequest,
    state: JobState,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    provider: Option<String>,
    content: Option<String>,
    quality: Option<QualityResult>,
    error: Option<JobFailure>,
    retry_count: u32,
    drafts: u32,
}

impl GenerationJob {
    /// Create a queued job.
    pub fn new(id: JobId, batch: Option<BatchId>, request: GenerationRequest) -> Self {
        Self {
            id,
            batch,
            request,
            state: JobState::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            provider: None,
            content: None,
            quality: None,
            error: None,
            retry_count: 0,
            drafts: 0,
        }
    }

    /// Job id.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Owning batch, if any.
    pub fn batch(&self) -> Option<BatchId> {
        self.batch
    }

    /// The wrapped request.
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Current state.
    pub fn state(&self) -> JobState {
        self.state
    }

    /// `queued → running`.
    pub fn start(&mut self) -> bool {
        if self.state != JobState::Queued {
            return false;
        }
        self.state = JobState::Running;
        self.started_at = Some(Utc::now());
        true
    }

    /// `running → completed` with the accepted (or best) draft.
    pub fn complete(
        &mut self,
        content: String,
        quality: QualityResult,
        provider: String,
        drafts: u32,
        retry_count: u32,
    ) -> bool {
        if self.state != JobState::Running {
            return false;
        }
        self.state = JobState::Completed;
        self.completed_at = Some(Utc::now());
        self.content = Some(content);
        self.quality = Some(quality);
        self.provider = Some(provider);
        self.drafts = drafts;
        self.retry_count = retry_count;
        true
    }

    /// `running → failed`.
    pub fn fail(&mut self, failure: JobFailure, drafts: u32, retry_count: u32) -> bool {
        if self.state != JobState::Running {
            return false;
        }
        self.state = JobState::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(failure);
        self.drafts = drafts;
        self.retry_count = retry_count;
        true
    }

    /// `queued | running → cancelled`. No partial result is kept.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = JobState::Cancelled;
        self.completed_at = Some(Utc::now());
        true
    }

    /// Immutable snapshot for callers.
    pub fn view(&self) -> JobView {
        JobView {
            id: self.id,
            batch: self.batch,
            content_type: *self.request.content_type(),
            topic: self.request.topic().clone(),
            state: self.state,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            provider: self.provider.clone(),
            content: self.content.clone(),
            quality: self.quality.clone(),
            error: self.error.clone(),
            retry_count: self.retry_count,
            drafts: self.drafts,
        }
    }
}

/// Read-only snapshot of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    /// Job id
    pub id: JobId,
    /// Owning batch, if any
    pub batch: Option<BatchId>,
    /// Requested content type
    pub content_type: crate::ContentType,
    /// Requested topic
    pub topic: String,
    /// State at snapshot time
    pub state: JobState,
    /// When the job was queued
    pub created_at: DateTime<Utc>,
    /// When the job acquired a slot
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Provider that produced the returned draft
    pub provider: Option<String>,
    /// Returned draft
    pub content: Option<String>,
    /// Quality of the returned draft
    pub quality: Option<QualityResult>,
    /// Structured failure, when failed
    pub error: Option<JobFailure>,
    /// Failovers plus regenerations
    pub retry_count: u32,
    /// Drafts produced
    pub drafts: u32,
}

impl JobView {
    /// Completed, but the returned draft did not reach the quality threshold.
    pub fn below_threshold(&self) -> bool {
        self.state == JobState::Completed && self.quality.as_ref().is_some_and(|q| !q.passed())
    }
}
