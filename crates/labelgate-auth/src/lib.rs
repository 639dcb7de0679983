//! Permission rules and their evaluation for labelgate.
//!
//! Every stored object carries a set of labels. A principal's rules say,
//! per label, which operations are allowed. An operation on an object is
//! allowed only when every label on the object agrees.
//!
//! # Crate Architecture
//!
//! ```text
//! labelgate-types  (Label, LabelSet, Principal)
//!        ↑
//! labelgate-auth   ◄── THIS CRATE
//! (Permission, PermissionRule, LabelStatements, PolicyBitmask)
//!        ↑
//! labelgate-hook   (OverrideGate, LabelHook, HookRegistry)
//!        ↑
//! labelgate-runtime (LabellingPolicy, UserPolicy, PolicyConfig)
//! ```
//!
//! # Evaluation
//!
//! ```text
//! RawRule ──validate──► PermissionRule ──► RuleList (with distance)
//!                                              │ into_rule_set
//!                                              ▼
//!                                      PermissionRuleSet
//!                                              │ to_statements
//!                                              ▼
//!                         LabelStatements::allow(op, labels) -> bool
//! ```
//!
//! Global capabilities which do not depend on an object are expressed
//! separately as a [`PolicyBitmask`].

pub mod error;
pub mod permission;
pub mod policy;
pub mod rule;
pub mod rule_set;
pub mod statements;

pub use error::{AccessDenied, RuleError};
pub use permission::Permission;
pub use policy::{PolicyBitmask, PolicyGrant, PolicyKind};
pub use rule::{PermissionRule, RawRule, Statement};
pub use rule_set::{PermissionRuleSet, RuleList};
pub use statements::{
    Combine, LabelFilter, LabelStatements, RuleStatements, UntrackedLabel,
    DEFAULT_UNTRACKED_LABEL,
};
