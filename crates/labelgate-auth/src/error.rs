//! Error types for permission rules and access checks.
//!
//! A permission denial is normally a boolean `false`. [`AccessDenied`]
//! exists for callers which attempt an operation and need to turn the
//! denial into an error. [`RuleError`] is raised while building a rule
//! set, never while evaluating one.

use crate::Permission;
use labelgate_types::{LabelSet, Principal};
use thiserror::Error;

/// Invalid permission rule definition.
///
/// Raised at rule-set construction time. A dropped DENY rule would
/// silently widen access, so malformed rules are never skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule failed validation.
    #[error("invalid permission rule (label={label}, statement={statement}, mask={mask:#x}): {reason}")]
    InvalidRule {
        /// Raw label value as supplied.
        label: i64,
        /// Raw statement value as supplied.
        statement: i64,
        /// Raw permission mask as supplied.
        mask: u32,
        /// What was wrong with it.
        reason: String,
    },

    /// A statement name could not be parsed.
    #[error("unknown permission statement: {0}")]
    UnknownStatement(String),
}

impl RuleError {
    /// Creates an [`RuleError::InvalidRule`].
    pub fn invalid(label: i64, statement: i64, mask: u32, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            label,
            statement,
            mask,
            reason: reason.into(),
        }
    }
}

/// An attempted operation was denied.
///
/// # Example
///
/// ```
/// use labelgate_auth::{AccessDenied, Permission};
/// use labelgate_types::{Label, LabelSet, Principal, PrincipalId};
///
/// let err = AccessDenied::PermissionDenied {
///     principal: Principal::User(PrincipalId::new(3)),
///     operation: Permission::UPDATE,
///     labels: LabelSet::from_iter([Label::new(9)]),
/// };
/// assert!(err.to_string().contains("update"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// Label rules deny the operation and no override applied.
    #[error("permission denied: {principal} may not {operation} object labelled {labels}")]
    PermissionDenied {
        /// Who attempted the operation.
        principal: Principal,
        /// The operation attempted.
        operation: Permission,
        /// Labels on the target object.
        labels: LabelSet,
    },

    /// A global policy capability is missing.
    #[error("policy denied: {principal} lacks {policy}")]
    PolicyDenied {
        /// Who attempted the operation.
        principal: Principal,
        /// Name of the missing policy.
        policy: &'static str,
    },
}
