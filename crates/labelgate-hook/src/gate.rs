//! Override gate.
//!
//! The gate is consulted only when label rules deny an operation. It can
//! turn a denial into an allow and never the reverse.
//!
//! ```text
//! LabelStatements::allow ── true ──────────────────────────► allowed
//!          │
//!        false
//!          ▼
//! OverrideGate::allow_on_object ── allow ──────────────────► allowed
//!          │                  └── Err ─────────────────────► error
//!          ▼
//!        denied
//! ```

use crate::{HookError, OverrideHook, OverrideRequest, OverrideResponse};
use std::sync::Arc;

/// Strategy consulted after a label-rule denial.
pub trait OverrideGate: Send + Sync {
    /// Decides whether the denied operation should be allowed.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing hook; the permission check fails
    /// with it.
    fn allow_on_object(&self, request: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError>;
}

/// Gate which never overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverride;

impl OverrideGate for NoOverride {
    fn allow_on_object(&self, _request: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError> {
        Ok(OverrideResponse::no_change())
    }
}

/// Snapshot of enabled override hooks, in priority order.
///
/// Produced by [`HookRegistry::resolve_gate`](crate::HookRegistry::resolve_gate).
/// Later changes to the registry do not affect an existing chain.
#[derive(Clone, Default)]
pub struct GateChain {
    hooks: Vec<Arc<dyn OverrideHook>>,
}

impl GateChain {
    pub(crate) fn new(hooks: Vec<Arc<dyn OverrideHook>>) -> Self {
        Self { hooks }
    }

    /// Number of hooks in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if the chain has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// IDs of the hooks, in call order.
    #[must_use]
    pub fn hook_ids(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.id()).collect()
    }
}

impl std::fmt::Debug for GateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateChain")
            .field("hooks", &self.hook_ids())
            .finish()
    }
}

impl OverrideGate for GateChain {
    /// Calls hooks in order until one allows.
    fn allow_on_object(&self, request: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError> {
        for hook in &self.hooks {
            let response = hook.allow_on_object(request).inspect_err(|e| {
                tracing::warn!(
                    hook_id = hook.id(),
                    principal = %request.principal,
                    operation = %request.operation,
                    error = %e,
                    "override hook failed"
                );
            })?;
            if response.allow {
                tracing::debug!(
                    hook_id = hook.id(),
                    principal = %request.principal,
                    operation = %request.operation,
                    "override hook allowed operation"
                );
                return Ok(response);
            }
        }
        Ok(OverrideResponse::no_change())
    }
}
