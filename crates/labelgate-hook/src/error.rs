//! Hook registration and execution errors.

use thiserror::Error;

/// Failure registering or running an override or label hook.
///
/// An override hook declining to allow is not an error; it returns
/// [`OverrideResponse::no_change`](crate::OverrideResponse::no_change).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The name is not a hook point, or the hook point does not fit the
    /// kind of hook being registered.
    #[error("not a usable hook point: {0}")]
    UnknownHookPoint(String),

    /// A hook returned an error while deciding.
    #[error("hook {hook_id} failed: {message}")]
    ExecutionFailed {
        /// Failing hook.
        hook_id: String,
        /// Reason given by the hook.
        message: String,
    },

    /// No hook is registered under the ID.
    #[error("no hook registered as {0}")]
    NotFound(String),

    /// The ID is taken by another registered hook.
    #[error("hook ID {0} is already in use")]
    Duplicate(String),
}

impl HookError {
    /// Creates an [`HookError::ExecutionFailed`].
    pub fn execution_failed(hook_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            hook_id: hook_id.into(),
            message: message.into(),
        }
    }
}
