//! Quality validation error types.

/// Reasons a validator could not produce a score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// The validator could not run (collaborator outage, missing data)
    #[display("Validator '{}' unavailable: {}", validator, reason)]
    Unavailable {
        /// Validator name
        validator: String,
        /// Why it could not run
        reason: String,
    },
    /// The knowledge base could not be queried
    #[display("Knowledge base unreachable: {}", _0)]
    KnowledgeBase(String),
    /// Validator configuration is invalid (bad pattern, bad bounds)
    #[display("Validator configuration invalid: {}", _0)]
    Configuration(String),
}

/// Validation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at {}:{}", kind, file, line)]
pub struct ValidationError {
    /// The specific error kind
    pub kind: ValidationErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
