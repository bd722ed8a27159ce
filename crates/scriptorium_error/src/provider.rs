//! Provider adapter error types.

/// Failure conditions reported by a provider adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// The call exceeded its hard timeout
    #[display("Provider call timed out after {}ms", _0)]
    Timeout(u64),
    /// The provider throttled the request
    #[display("Provider rate limit exceeded: {}", _0)]
    RateLimited(String),
    /// The provider returned a server-side error
    #[display("Provider server error {}: {}", status, message)]
    Server {
        /// HTTP (or equivalent) status code
        status: u16,
        /// Error body or description
        message: String,
    },
    /// Network-level failure before a response arrived
    #[display("Provider transport error: {}", _0)]
    Transport(String),
    /// The provider answered with something we could not interpret
    #[display("Invalid provider response: {}", _0)]
    InvalidResponse(String),
    /// The provider refused the request (client-side error)
    #[display("Provider rejected request {}: {}", status, message)]
    Rejected {
        /// HTTP (or equivalent) status code
        status: u16,
        /// Error body or description
        message: String,
    },
}

impl ProviderErrorKind {
    /// Check if this failure is transient (timeout, throttling, 5xx, network).
    ///
    /// Transient failures feed the router's failover path. Every provider failure
    /// counts against the provider's health regardless.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited(_) | Self::Server { .. } | Self::Transport(_)
        )
    }

    /// Short label used for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::RateLimited(_) => "rate_limit",
            Self::Server { .. } => "server",
            Self::Transport(_) => "network",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Rejected { .. } => "invalid_request",
        }
    }
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Timeout(30_000));
/// assert!(err.kind.is_transient());
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at {}:{}", kind, file, line)]
pub struct ProviderError {
    /// The specific error kind
    pub kind: ProviderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
