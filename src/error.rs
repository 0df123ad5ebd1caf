//! Framework error taxonomy.
//!
//! Every dispatch failure is a value of [`FrameworkError`]. Each variant
//! carries two routing facts: the HTTP status fixed at the moment the
//! error is raised, and the configured error page class (if any) the
//! dispatcher may re-dispatch to. Recovery happens at most once per
//! request.

use thiserror::Error;

/// Error page classes configurable under `Site.ErrorRedirects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectClass {
    NotFound,
    Forbidden,
    SessionExpired,
    GenericError,
}

impl RedirectClass {
    /// Child element name under `Site.ErrorRedirects`.
    pub fn config_key(self) -> &'static str {
        match self {
            RedirectClass::NotFound => "NotFound",
            RedirectClass::Forbidden => "Forbidden",
            RedirectClass::SessionExpired => "SessionExpired",
            RedirectClass::GenericError => "GenericError",
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameworkError {
    /// Configuration could not be loaded or is invalid. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// No handler registered under the resolved name.
    #[error("handler \"{handler}\" not found")]
    HandlerNotFound { handler: String },

    /// Handler exists but has no action of the resolved name.
    #[error("action \"{action}\" not found on handler \"{handler}\"")]
    ActionNotFound { handler: String, action: String },

    /// Action exists but was registered as not externally invokable.
    #[error("action \"{action}\" on handler \"{handler}\" is not invokable")]
    ActionNotInvokable { handler: String, action: String },

    /// Action ran and reported failure.
    #[error("action \"{action}\" on handler \"{handler}\" failed: {reason}")]
    ActionFailed {
        handler: String,
        action: String,
        reason: String,
    },

    /// Session access level below what the handler requires.
    #[error("access denied: level {required} required, session holds {actual}")]
    Forbidden { required: u32, actual: u32 },

    /// Session invalidated: address mismatch or idle timeout.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    /// Presented form token is not outstanding for this session.
    #[error("invalid form token")]
    InvalidFormToken,

    /// Session storage failure.
    #[error("session error: {0}")]
    Session(String),

    /// Any other internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FrameworkError {
    /// HTTP status fixed when the error is raised. Survives a successful
    /// error page re-dispatch.
    pub fn status(&self) -> u16 {
        match self {
            FrameworkError::HandlerNotFound { .. }
            | FrameworkError::ActionNotFound { .. }
            | FrameworkError::ActionNotInvokable { .. }
            | FrameworkError::ActionFailed { .. } => 404,
            FrameworkError::Forbidden { .. }
            | FrameworkError::SessionExpired { .. }
            | FrameworkError::InvalidFormToken => 403,
            FrameworkError::Config(_)
            | FrameworkError::Session(_)
            | FrameworkError::Internal(_) => 500,
        }
    }

    /// Configured error page class for this error, or `None` when the
    /// failure is final.
    pub fn redirect_class(&self) -> Option<RedirectClass> {
        match self {
            FrameworkError::HandlerNotFound { .. }
            | FrameworkError::ActionNotFound { .. }
            | FrameworkError::ActionNotInvokable { .. }
            | FrameworkError::ActionFailed { .. } => Some(RedirectClass::NotFound),
            FrameworkError::Forbidden { .. } => Some(RedirectClass::Forbidden),
            FrameworkError::SessionExpired { .. } => Some(RedirectClass::SessionExpired),
            FrameworkError::Internal(_) => Some(RedirectClass::GenericError),
            FrameworkError::InvalidFormToken
            | FrameworkError::Config(_)
            | FrameworkError::Session(_) => None,
        }
    }
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;
