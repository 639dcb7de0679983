//! Errors surfaced by policy checks.

use labelgate_auth::AccessDenied;
use labelgate_hook::HookError;
use thiserror::Error;

/// Failure of a checked policy operation.
///
/// Boolean checks such as [`UserPolicy::has_permission`] only fail with
/// [`PolicyError::Hook`]. The `check_*` variants additionally turn a
/// denial into [`PolicyError::Denied`].
///
/// [`UserPolicy::has_permission`]: crate::UserPolicy::has_permission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The operation was denied.
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// An override or label hook failed.
    #[error("hook failure: {0}")]
    Hook(#[from] HookError),
}

impl PolicyError {
    /// Returns `true` for a plain denial rather than a failure.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}
