//! Core types for labelgate.
//!
//! Identifiers and value types shared by every layer of the policy
//! engine. This crate has no policy logic of its own.
//!
//! # Crate Architecture
//!
//! ```text
//! labelgate-types    : Label, LabelSet, LabelChangeSet, StoredObject  ◄── HERE
//!     ↑
//! labelgate-auth     : Permission, PermissionRule, LabelStatements
//!     ↑
//! labelgate-hook     : OverrideGate, LabelHook, HookRegistry
//!     ↑
//! labelgate-runtime  : LabellingPolicy, UserPolicy, config
//! ```
//!
//! # Labels
//!
//! A [`Label`] is an opaque integer. Every stored object carries a
//! [`LabelSet`]; a mutation computes a [`LabelChangeSet`] which is
//! applied to produce the replacement set.
//!
//! # Example
//!
//! ```
//! use labelgate_types::{Label, LabelChangeSet, LabelSet, ObjectRef, StoredObject};
//!
//! let obj = StoredObject::of_type(ObjectRef::new(100))
//!     .with_labels(LabelSet::from_iter([Label::new(5)]));
//!
//! let mut changes = LabelChangeSet::new();
//! changes.add(Label::new(6));
//!
//! let labels = changes.change(&obj.labels);
//! assert!(labels.contains(Label::new(5)));
//! assert!(labels.contains(Label::new(6)));
//! ```

mod changes;
mod label;
mod label_set;
mod object;
mod principal;

pub use changes::LabelChangeSet;
pub use label::{Label, ObjectRef};
pub use label_set::LabelSet;
pub use object::{AttrDesc, AttrValue, Attribute, SearchSubset, StoreOperation, StoredObject};
pub use principal::{Principal, PrincipalId};
