//! Hooks for the labelgate policy engine.
//!
//! Plugins take part in policy decisions at two kinds of point:
//!
//! - **Label points** ([`HookPoint::LabelObject`],
//!   [`HookPoint::LabelUpdatedObject`]): a [`LabelHook`] edits the
//!   pending [`LabelChangeSet`](labelgate_types::LabelChangeSet) of an
//!   object being written.
//! - **Override point** ([`HookPoint::OperationAllowOnObject`]): an
//!   [`OverrideHook`] may allow an operation the label rules denied.
//!
//! # Crate Architecture
//!
//! ```text
//! labelgate-types / labelgate-auth
//!           ↑
//! labelgate-hook  : HookPoint, OverrideGate, LabelHook, HookRegistry  ◄── HERE
//!           ↑
//! labelgate-runtime : LabelPipeline, UserPolicy
//! ```
//!
//! # Override Gate
//!
//! [`HookRegistry::resolve_gate`] snapshots the enabled override hooks
//! into a [`GateChain`], which implements [`OverrideGate`]. The runtime
//! resolves the gate once per policy context. Hosts with no plugin
//! runtime use [`NoOverride`].
//!
//! # Example
//!
//! ```
//! use labelgate_auth::Permission;
//! use labelgate_hook::{
//!     HookError, HookRegistry, OverrideGate, OverrideHook, OverrideRequest, OverrideResponse,
//! };
//! use labelgate_types::{ObjectRef, Principal, StoredObject};
//! use std::sync::Arc;
//!
//! struct ReadEverything;
//!
//! impl OverrideHook for ReadEverything {
//!     fn id(&self) -> &str {
//!         "read-everything"
//!     }
//!
//!     fn allow_on_object(&self, req: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError> {
//!         Ok(OverrideResponse { allow: req.operation == Permission::READ })
//!     }
//! }
//!
//! let mut registry = HookRegistry::new();
//! registry.register_override(Arc::new(ReadEverything))?;
//! let gate = registry.resolve_gate();
//!
//! let object = StoredObject::of_type(ObjectRef::new(20));
//! let request = OverrideRequest {
//!     principal: Principal::System,
//!     object: &object,
//!     operation: Permission::READ,
//! };
//! assert!(gate.allow_on_object(&request)?.allow);
//! # Ok::<(), labelgate_hook::HookError>(())
//! ```

mod context;
mod error;
mod gate;
pub mod hook;
mod point;
mod registry;

// Re-export core types
pub use context::{LabelRequest, OverrideRequest, OverrideResponse};
pub use error::HookError;
pub use gate::{GateChain, NoOverride, OverrideGate};
pub use hook::{LabelHook, OverrideHook, DEFAULT_PRIORITY};
pub use point::HookPoint;
pub use registry::HookRegistry;

// Re-export testing utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the hook system.
    //!
    //! Provides [`MockOverrideHook`] and [`MockLabelHook`] for use in tests.
    pub use crate::hook::testing::{MockLabelHook, MockOverrideHook, OverrideCall};
}
