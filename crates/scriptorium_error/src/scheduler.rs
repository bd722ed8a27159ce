//! Job scheduler error types.

/// Specific error conditions for the scheduler submission API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// No job with this id is tracked
    #[display("Job not found: {}", _0)]
    JobNotFound(String),
    /// No batch with this id is tracked
    #[display("Batch not found: {}", _0)]
    BatchNotFound(String),
    /// A batch must contain at least one request
    #[display("Batch contains no requests")]
    EmptyBatch,
    /// The batch still has non-terminal jobs
    #[display("Batch {} still has {} unfinished jobs", batch, remaining)]
    BatchNotTerminal {
        /// Batch id
        batch: String,
        /// Jobs not yet terminal
        remaining: usize,
    },
    /// A concurrency limit of zero was requested
    #[display("Invalid concurrency limit: {}", _0)]
    InvalidConcurrency(usize),
}

/// Scheduler error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at {}:{}", kind, file, line)]
pub struct SchedulerError {
    /// The specific error kind
    pub kind: SchedulerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new scheduler error.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
