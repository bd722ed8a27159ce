//! Generation engine error types.

/// Terminal failure conditions for a single generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// All provider attempts were exhausted without a draft
    #[display("All providers exhausted after {} attempts: {}", attempts, last_error)]
    ProviderUnavailable {
        /// Provider calls made before giving up
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },
    /// Cooperative cancellation was observed at a suspension point
    #[display("Generation cancelled")]
    Cancelled,
    /// The prompt could not be assembled from the request
    #[display("Prompt assembly failed: {}", _0)]
    Prompt(String),
}

/// Error type for generation operations.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Cancelled);
/// assert!(err.is_cancelled());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error represents a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::Cancelled)
    }
}
