//! Hook points.
//!
//! Every point where the policy engine invokes registered hooks.
//! Label points let plugins contribute to an object's label changes;
//! the operation point lets a plugin grant an operation the label rules
//! denied.

use crate::HookError;
use labelgate_types::StoreOperation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All points where hooks can intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPoint {
    /// A new object is being labelled.
    LabelObject,
    /// An updated object is being relabelled.
    LabelUpdatedObject,
    /// Label rules denied an operation; a hook may allow it.
    OperationAllowOnObject,
}

impl HookPoint {
    /// Every hook point.
    pub const ALL: &'static [HookPoint] = &[
        Self::LabelObject,
        Self::LabelUpdatedObject,
        Self::OperationAllowOnObject,
    ];

    /// Label point fired for a store operation, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use labelgate_hook::HookPoint;
    /// use labelgate_types::StoreOperation;
    ///
    /// assert_eq!(HookPoint::for_operation(StoreOperation::Create), Some(HookPoint::LabelObject));
    /// assert_eq!(HookPoint::for_operation(StoreOperation::Delete), None);
    /// ```
    #[must_use]
    pub fn for_operation(operation: StoreOperation) -> Option<Self> {
        match operation {
            StoreOperation::Create => Some(Self::LabelObject),
            StoreOperation::Update => Some(Self::LabelUpdatedObject),
            StoreOperation::Delete => None,
        }
    }

    /// Returns `true` if hooks at this point modify label changes.
    #[must_use]
    pub fn is_label(&self) -> bool {
        matches!(self, Self::LabelObject | Self::LabelUpdatedObject)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelObject => "label.object",
            Self::LabelUpdatedObject => "label.updated_object",
            Self::OperationAllowOnObject => "operation.allow_on_object",
        }
    }
}

impl FromStr for HookPoint {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label.object" => Ok(Self::LabelObject),
            "label.updated_object" => Ok(Self::LabelUpdatedObject),
            "operation.allow_on_object" => Ok(Self::OperationAllowOnObject),
            _ => Err(HookError::UnknownHookPoint(s.to_string())),
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
