//! Provider router error types.

/// Specific error conditions for provider routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RouterErrorKind {
    /// Every known provider is unavailable, excluded, or fails the constraints
    #[display("No provider available for {} routing ({} registered)", strategy, registered)]
    NoProviderAvailable {
        /// Strategy the selection ran under
        strategy: String,
        /// Number of registered providers
        registered: usize,
    },
    /// A provider id was not found in the health table
    #[display("Unknown provider: {}", _0)]
    UnknownProvider(String),
    /// A provider with the same id is already registered
    #[display("Provider already registered: {}", _0)]
    DuplicateProvider(String),
}

/// Error type for router operations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Router Error: {} at line {} in {}", kind, line, file)]
pub struct RouterError {
    /// The specific error condition
    pub kind: RouterErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RouterError {
    /// Create a new RouterError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RouterErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
