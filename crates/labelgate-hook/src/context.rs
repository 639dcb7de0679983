//! Data passed to hook handlers.

use crate::HookPoint;
use labelgate_auth::Permission;
use labelgate_types::{Principal, StoreOperation, StoredObject};

/// Request passed to label hooks.
///
/// Label hooks see the object being written and, for updates, the
/// version it replaces. They contribute by editing the change set they
/// are given alongside.
#[derive(Debug, Clone, Copy)]
pub struct LabelRequest<'a> {
    /// Which hook point triggered this.
    pub hook_point: HookPoint,
    /// The store operation in progress.
    pub operation: StoreOperation,
    /// The object as it will be stored.
    pub object: &'a StoredObject,
    /// The version being replaced, on update.
    pub previous: Option<&'a StoredObject>,
}

impl<'a> LabelRequest<'a> {
    /// Creates a request for the label point matching `operation`.
    ///
    /// Returns `None` for operations which fire no label hooks.
    #[must_use]
    pub fn new(
        operation: StoreOperation,
        object: &'a StoredObject,
        previous: Option<&'a StoredObject>,
    ) -> Option<Self> {
        HookPoint::for_operation(operation).map(|hook_point| Self {
            hook_point,
            operation,
            object,
            previous,
        })
    }
}

/// Request passed to override hooks after label rules denied an operation.
#[derive(Debug, Clone, Copy)]
pub struct OverrideRequest<'a> {
    /// Who attempted the operation.
    pub principal: Principal,
    /// The object the operation targets.
    pub object: &'a StoredObject,
    /// The operation denied by label rules.
    pub operation: Permission,
}

/// Decision returned by an override hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideResponse {
    /// Grant the operation despite the label rules.
    pub allow: bool,
}

impl OverrideResponse {
    /// Grants the operation.
    #[must_use]
    pub fn allow() -> Self {
        Self { allow: true }
    }

    /// Leaves the denial in place.
    #[must_use]
    pub fn no_change() -> Self {
        Self { allow: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelgate_types::ObjectRef;

    #[test]
    fn label_request_picks_point() {
        let obj = StoredObject::of_type(ObjectRef::new(10));
        let req = LabelRequest::new(StoreOperation::Update, &obj, Some(&obj)).expect("update fires");
        assert_eq!(req.hook_point, HookPoint::LabelUpdatedObject);
        assert!(LabelRequest::new(StoreOperation::Delete, &obj, None).is_none());
    }

    #[test]
    fn response_defaults_to_no_change() {
        assert_eq!(OverrideResponse::default(), OverrideResponse::no_change());
        assert!(OverrideResponse::allow().allow);
    }
}
