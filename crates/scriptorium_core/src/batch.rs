//! Batch submission and aggregate views.

use crate::{BatchId, GenerationRequest, JobState, JobView};
use serde::{Deserialize, Serialize};

/// How a batch's jobs are admitted to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingMode {
    /// Up to `max_concurrent` jobs at once
    #[default]
    Concurrent,
    /// One job at a time
    Sequential,
    /// Start at one, widen on success and narrow on failure
    Adaptive,
}

fn default_max_concurrent() -> usize {
    4
}

/// A set of requests submitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Requests in submission order
    pub requests: Vec<GenerationRequest>,
    /// Admission mode
    #[serde(default)]
    pub mode: ProcessingMode,
    /// Concurrency ceiling for concurrent and adaptive modes
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Cancel queued jobs on the first hard failure
    #[serde(default)]
    pub fail_fast: bool,
}

impl BatchRequest {
    /// Concurrent batch with the default limit and partial-success policy.
    pub fn new(requests: Vec<GenerationRequest>) -> Self {
        Self {
            requests,
            mode: ProcessingMode::default(),
            max_concurrent: default_max_concurrent(),
            fail_fast: false,
        }
    }

    /// Set the processing mode.
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the concurrency ceiling.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set the fail-fast policy.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Limit the batch starts with.
    pub fn initial_limit(&self) -> usize {
        match self.mode {
            ProcessingMode::Sequential | ProcessingMode::Adaptive => 1,
            ProcessingMode::Concurrent => self.max_concurrent,
        }
    }
}

/// Number of a batch's jobs in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    /// Waiting for a slot
    pub queued: usize,
    /// Generating
    pub running: usize,
    /// Finished with content
    pub completed: usize,
    /// Finished without content
    pub failed: usize,
    /// Cancelled
    pub cancelled: usize,
}

impl BatchCounts {
    /// Tally job states.
    pub fn tally<I: IntoIterator<Item = JobState>>(states: I) -> Self {
        let mut counts = Self::default();
        for state in states {
            match state {
                JobState::Queued => counts.queued += 1,
                JobState::Running => counts.running += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
                JobState::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    /// Jobs in a terminal state.
    pub fn terminal(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }

    /// All jobs.
    pub fn total(&self) -> usize {
        self.terminal() + self.queued + self.running
    }
}

/// Aggregate batch status, always derived from job states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BatchStatus {
    /// No job has started; cancelled queued jobs do not count as started
    Queued,
    /// Some job is not terminal
    Running,
    /// Every job is terminal and the batch did not fail
    Completed,
    /// Every job is terminal, `fail_fast` was set and a job failed
    Failed,
}

impl BatchStatus {
    /// Derive the status from job counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use scriptorium_core::{BatchCounts, BatchStatus};
    ///
    /// let counts = BatchCounts { completed: 2, failed: 1, ..Default::default() };
    /// assert_eq!(BatchStatus::derive(&counts, false), BatchStatus::Completed);
    /// assert_eq!(BatchStatus::derive(&counts, true), BatchStatus::Failed);
    /// ```
    pub fn derive(counts: &BatchCounts, fail_fast: bool) -> Self {
        if counts.terminal() == counts.total() {
            if fail_fast && counts.failed > 0 {
                BatchStatus::Failed
            } else {
                BatchStatus::Completed
            }
        } else if counts.running + counts.completed + counts.failed == 0 {
            BatchStatus::Queued
        } else {
            BatchStatus::Running
        }
    }

    /// Whether every job in the batch is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Read-only snapshot of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchView {
    /// Batch id
    pub id: BatchId,
    /// Derived status
    pub status: BatchStatus,
    /// Per-state counts
    pub counts: BatchCounts,
    /// Job snapshots in submission order
    pub jobs: Vec<JobView>,
    /// Admission mode
    pub mode: ProcessingMode,
    /// Current effective concurrency limit
    pub concurrency_limit: usize,
    /// Whether cancellation was requested for the batch
    pub cancel_requested: bool,
    /// Whether the batch cancels queued jobs on failure
    pub fail_fast: bool,
}

impl BatchView {
    /// Fraction of jobs in a terminal state.
    pub fn progress(&self) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            return 1.0;
        }
        self.counts.terminal() as f64 / total as f64
    }
}
