//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, GenerationError, ProviderError, RouterError, SchedulerError,
    ValidationError,
};

/// The foundation error enum aggregating every domain error in the workspace.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{ScriptoriumError, ConfigError};
///
/// let config_err = ConfigError::new("bad threshold");
/// let err: ScriptoriumError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ScriptoriumErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Provider adapter error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Provider routing error
    #[from(RouterError)]
    Router(RouterError),
    /// Quality validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Generation engine error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Scheduler API error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Scriptorium error with kind discrimination.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{ScriptoriumResult, SchedulerError, SchedulerErrorKind};
///
/// fn might_fail() -> ScriptoriumResult<()> {
///     Err(SchedulerError::new(SchedulerErrorKind::EmptyBatch))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Scriptorium Error: {}", _0)]
pub struct ScriptoriumError(Box<ScriptoriumErrorKind>);

impl ScriptoriumError {
    /// Create a new error from a kind.
    pub fn new(kind: ScriptoriumErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScriptoriumErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ScriptoriumErrorKind
impl<T> From<T> for ScriptoriumError
where
    T: Into<ScriptoriumErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Scriptorium operations.
pub type ScriptoriumResult<T> = std::result::Result<T, ScriptoriumError>;
