//! Label change pipeline run on every store write.
//!
//! ```text
//! caller changes
//!      │
//!      ▼
//! label hooks (label.object / label.updated_object)   skipped for schema objects
//!      │
//!      ▼
//! LabellingPolicy                                       always last
//!      │
//!      ▼
//! final LabelChangeSet ──change(existing)──► LabelSet to store
//! ```
//!
//! The labelling policy runs after every hook so its guarantees hold
//! whatever the hooks did.

use crate::LabellingPolicy;
use labelgate_hook::{HookError, HookRegistry, LabelRequest};
use labelgate_types::{LabelChangeSet, LabelSet, StoreOperation, StoredObject};
use std::sync::Arc;

/// Runs label hooks and then the labelling policy.
#[derive(Clone)]
pub struct LabelPipeline {
    hooks: Arc<HookRegistry>,
    labelling: LabellingPolicy,
}

impl std::fmt::Debug for LabelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelPipeline")
            .field("hooks", &self.hooks.len())
            .field("labelling", &self.labelling)
            .finish()
    }
}

impl LabelPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(hooks: Arc<HookRegistry>, labelling: LabellingPolicy) -> Self {
        Self { hooks, labelling }
    }

    /// Returns the labelling policy applied last.
    #[must_use]
    pub fn labelling(&self) -> &LabellingPolicy {
        &self.labelling
    }

    /// Computes the final label changes for a write.
    ///
    /// # Errors
    ///
    /// Returns the first label hook failure. The labelling policy
    /// itself cannot fail.
    pub fn update_label_changes_for(
        &self,
        operation: StoreOperation,
        object: &StoredObject,
        previous: Option<&StoredObject>,
        is_schema_object: bool,
        mut changes: LabelChangeSet,
    ) -> Result<LabelChangeSet, HookError> {
        if !is_schema_object {
            if let Some(request) = LabelRequest::new(operation, object, previous) {
                self.hooks.run_label_hooks(&request, &mut changes)?;
            }
        }
        Ok(self
            .labelling
            .modify_changes_to_apply_labelling_policy(changes, operation, object, previous))
    }

    /// Computes the label set the object will be stored with.
    ///
    /// # Errors
    ///
    /// Same as [`LabelPipeline::update_label_changes_for`].
    pub fn apply(
        &self,
        operation: StoreOperation,
        object: &StoredObject,
        previous: Option<&StoredObject>,
        is_schema_object: bool,
        changes: LabelChangeSet,
    ) -> Result<LabelSet, HookError> {
        let changes =
            self.update_label_changes_for(operation, object, previous, is_schema_object, changes)?;
        Ok(changes.change(&object.labels))
    }
}
