//! Hook registry.
//!
//! Holds override hooks and label hooks in priority order. Override hooks
//! are not called from the registry directly: a [`GateChain`] snapshot is
//! resolved once per policy context and used for every check made there.

use crate::{GateChain, HookError, HookPoint, LabelHook, LabelRequest, OverrideHook};
use labelgate_types::LabelChangeSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered hook with metadata.
struct Registered<H: ?Sized> {
    hook: Arc<H>,
    priority: i32,
    enabled: bool,
}

/// Inserts in priority order. Stable: FIFO for the same priority.
fn insert_by_priority<H: ?Sized>(entries: &mut Vec<Registered<H>>, hook: Arc<H>, priority: i32) {
    let pos = entries
        .iter()
        .position(|h| h.priority > priority)
        .unwrap_or(entries.len());
    entries.insert(
        pos,
        Registered {
            hook,
            priority,
            enabled: true,
        },
    );
}

/// Central registry for policy hooks.
///
/// # Example
///
/// ```
/// use labelgate_hook::{HookError, HookPoint, HookRegistry, LabelHook, LabelRequest};
/// use labelgate_types::{Label, LabelChangeSet};
/// use std::sync::Arc;
///
/// struct Classify;
///
/// impl LabelHook for Classify {
///     fn id(&self) -> &str {
///         "classify"
///     }
///
///     fn hook_point(&self) -> HookPoint {
///         HookPoint::LabelObject
///     }
///
///     fn label(&self, _: &LabelRequest<'_>, changes: &mut LabelChangeSet) -> Result<(), HookError> {
///         changes.add(Label::new(12));
///         Ok(())
///     }
/// }
///
/// let mut registry = HookRegistry::new();
/// registry.register_label(Arc::new(Classify))?;
/// assert_eq!(registry.len(), 1);
/// assert!(registry.resolve_gate().is_empty());
/// # Ok::<(), HookError>(())
/// ```
///
/// # Concurrency
///
/// Registration takes `&mut self`. Share with `Arc<RwLock<HookRegistry>>`
/// if hooks are registered while checks are in flight; a resolved
/// [`GateChain`] needs no lock.
#[derive(Default)]
pub struct HookRegistry {
    overrides: Vec<Registered<dyn OverrideHook>>,
    labels: HashMap<HookPoint, Vec<Registered<dyn LabelHook>>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn contains(&self, id: &str) -> bool {
        self.overrides.iter().any(|r| r.hook.id() == id)
            || self
                .labels
                .values()
                .flatten()
                .any(|r| r.hook.id() == id)
    }

    /// Registers an override hook. Returns the hook's ID.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Duplicate`] if the ID is already registered.
    pub fn register_override(&mut self, hook: Arc<dyn OverrideHook>) -> Result<String, HookError> {
        let id = hook.id().to_string();
        if self.contains(&id) {
            return Err(HookError::Duplicate(id));
        }
        let priority = hook.priority();
        insert_by_priority(&mut self.overrides, hook, priority);
        tracing::debug!(hook_id = %id, priority, "registered override hook");
        Ok(id)
    }

    /// Registers a label hook at its declared point. Returns the hook's ID.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Duplicate`] if the ID is already registered,
    /// or [`HookError::UnknownHookPoint`] if the hook declares a point
    /// which is not a label point.
    pub fn register_label(&mut self, hook: Arc<dyn LabelHook>) -> Result<String, HookError> {
        let id = hook.id().to_string();
        let point = hook.hook_point();
        if !point.is_label() {
            return Err(HookError::UnknownHookPoint(point.to_string()));
        }
        if self.contains(&id) {
            return Err(HookError::Duplicate(id));
        }
        let priority = hook.priority();
        insert_by_priority(self.labels.entry(point).or_default(), hook, priority);
        tracing::debug!(hook_id = %id, point = %point, priority, "registered label hook");
        Ok(id)
    }

    /// Unregisters a hook by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NotFound`] if no hook has the ID.
    pub fn unregister(&mut self, id: &str) -> Result<(), HookError> {
        let before = self.len();
        self.overrides.retain(|r| r.hook.id() != id);
        for hooks in self.labels.values_mut() {
            hooks.retain(|r| r.hook.id() != id);
        }
        if self.len() < before {
            Ok(())
        } else {
            Err(HookError::NotFound(id.to_string()))
        }
    }

    /// Enables or disables a hook by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NotFound`] if no hook has the ID.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), HookError> {
        if let Some(r) = self.overrides.iter_mut().find(|r| r.hook.id() == id) {
            r.enabled = enabled;
            return Ok(());
        }
        if let Some(r) = self
            .labels
            .values_mut()
            .flatten()
            .find(|r| r.hook.id() == id)
        {
            r.enabled = enabled;
            return Ok(());
        }
        Err(HookError::NotFound(id.to_string()))
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len() + self.labels.values().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots the enabled override hooks into a gate.
    #[must_use]
    pub fn resolve_gate(&self) -> GateChain {
        GateChain::new(
            self.overrides
                .iter()
                .filter(|r| r.enabled)
                .map(|r| Arc::clone(&r.hook))
                .collect(),
        )
    }

    /// Runs enabled label hooks for the request's point, in priority order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn run_label_hooks(
        &self,
        request: &LabelRequest<'_>,
        changes: &mut LabelChangeSet,
    ) -> Result<(), HookError> {
        let Some(hooks) = self.labels.get(&request.hook_point) else {
            return Ok(());
        };
        for r in hooks.iter().filter(|r| r.enabled) {
            r.hook.label(request, changes).inspect_err(|e| {
                tracing::warn!(
                    hook_id = r.hook.id(),
                    point = %request.hook_point,
                    error = %e,
                    "label hook failed"
                );
            })?;
        }
        Ok(())
    }
}
