//! Labelling and per-principal policy for labelgate.
//!
//! Ties the rule evaluator and hook system to a schema and an object
//! store.
//!
//! # Crate Architecture
//!
//! ```text
//! labelgate-types   (Label, LabelSet, StoredObject)
//!        ↑
//! labelgate-auth    (Permission, LabelStatements, PolicyBitmask)
//!        ↑
//! labelgate-hook    (OverrideGate, LabelHook, HookRegistry)
//!        ↑
//! labelgate-runtime ◄── THIS CRATE
//! ```
//!
//! # Main Types
//!
//! - [`LabellingPolicy`]: labels an object's type requires
//! - [`LabelPipeline`]: label hooks, then the labelling policy
//! - [`UserPolicy`]: permission and capability checks for one principal
//! - [`PolicyContext`]: schema, store, gate and config shared by policies
//! - [`config::PolicyConfig`]: engine settings, loaded by [`config::ConfigLoader`]
//!
//! # Write Path
//!
//! ```text
//! store write ──► LabelPipeline ──► LabelSet to store
//!                    │
//!                    ├─ HookRegistry::run_label_hooks
//!                    └─ LabellingPolicy (Schema + ObjectStore)
//! ```
//!
//! # Check Path
//!
//! ```text
//! UserPolicy::has_permission
//!     ├─ LabelStatements::allow
//!     └─ OverrideGate (only on denial)
//! ```

pub mod config;
mod error;
mod labelling;
mod pipeline;
mod schema;
mod store;
mod user_policy;

pub use error::PolicyError;
pub use labelling::LabellingPolicy;
pub use pipeline::LabelPipeline;
pub use schema::{InMemorySchema, Schema, TypeBehaviours, TypeDescriptor, UiPosition};
pub use store::{InMemoryHierarchy, ObjectStore};
pub use user_policy::{PolicyContext, UserPolicy};
