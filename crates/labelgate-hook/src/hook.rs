//! Hook traits and testing utilities.

use crate::{HookError, HookPoint, LabelRequest, OverrideRequest, OverrideResponse};
use labelgate_types::LabelChangeSet;

/// Default hook priority.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A hook which may grant an operation the label rules denied.
///
/// Override hooks run only after a denial, and can only turn it into an
/// allow. They never restrict.
///
/// # Thread Safety
///
/// Hooks must be `Send + Sync`: a resolved gate is shared by every
/// permission check made for a principal.
pub trait OverrideHook: Send + Sync {
    /// Unique identifier for this hook.
    fn id(&self) -> &str;

    /// Priority (lower = earlier). Default: 100.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Decides whether to allow the denied operation.
    ///
    /// # Errors
    ///
    /// A failing hook aborts the permission check.
    fn allow_on_object(&self, request: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError>;
}

/// A hook which contributes label changes for an object being written.
pub trait LabelHook: Send + Sync {
    /// Unique identifier for this hook.
    fn id(&self) -> &str;

    /// Which label point this hook fires on.
    fn hook_point(&self) -> HookPoint;

    /// Priority (lower = earlier). Default: 100.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Edits the pending label changes.
    ///
    /// # Errors
    ///
    /// A failing hook aborts the write.
    fn label(&self, request: &LabelRequest<'_>, changes: &mut LabelChangeSet)
        -> Result<(), HookError>;
}

/// Test utilities for the hook system.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use labelgate_auth::Permission;
    use labelgate_types::{Label, ObjectRef, Principal};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A call seen by [`MockOverrideHook`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OverrideCall {
        /// Principal from the request.
        pub principal: Principal,
        /// Object reference from the request, if allocated.
        pub object: Option<ObjectRef>,
        /// Operation from the request.
        pub operation: Permission,
    }

    type OverrideFn = Box<dyn Fn(&OverrideRequest<'_>) -> Result<OverrideResponse, HookError> + Send + Sync>;

    /// A mock override hook for testing.
    ///
    /// Applies a fixed decision function and records every request.
    pub struct MockOverrideHook {
        /// Hook ID.
        pub id: String,
        /// Priority.
        pub priority: i32,
        /// Decision applied to every request.
        pub decide: OverrideFn,
        /// Requests seen so far.
        pub calls: Arc<Mutex<Vec<OverrideCall>>>,
    }

    impl MockOverrideHook {
        fn with_fn(
            id: &str,
            decide: impl Fn(&OverrideRequest<'_>) -> Result<OverrideResponse, HookError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                id: id.to_string(),
                priority: DEFAULT_PRIORITY,
                decide: Box::new(decide),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Creates a mock which allows every request.
        pub fn allower(id: &str) -> Self {
            Self::with_fn(id, |_| Ok(OverrideResponse::allow()))
        }

        /// Creates a mock which leaves every denial in place.
        pub fn bystander(id: &str) -> Self {
            Self::with_fn(id, |_| Ok(OverrideResponse::no_change()))
        }

        /// Creates a mock which allows only the given operation.
        pub fn allowing(id: &str, operation: Permission) -> Self {
            Self::with_fn(id, move |req| {
                Ok(OverrideResponse {
                    allow: req.operation == operation,
                })
            })
        }

        /// Creates a mock which fails with the given message.
        pub fn failer(id: &str, message: &str) -> Self {
            let hook_id = id.to_string();
            let message = message.to_string();
            Self::with_fn(id, move |_| {
                Err(HookError::execution_failed(hook_id.clone(), message.clone()))
            })
        }

        /// Sets the priority.
        #[must_use]
        pub fn with_priority(mut self, priority: i32) -> Self {
            self.priority = priority;
            self
        }

        /// Returns the number of times this hook has been called.
        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl OverrideHook for MockOverrideHook {
        fn id(&self) -> &str {
            &self.id
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn allow_on_object(&self, request: &OverrideRequest<'_>) -> Result<OverrideResponse, HookError> {
            self.calls.lock().push(OverrideCall {
                principal: request.principal,
                object: request.object.reference,
                operation: request.operation,
            });
            (self.decide)(request)
        }
    }

    type LabelFn = Box<dyn Fn(&mut LabelChangeSet) -> Result<(), HookError> + Send + Sync>;

    /// A mock label hook for testing.
    ///
    /// Applies a fixed edit to the change set and records which points
    /// it fired on.
    pub struct MockLabelHook {
        /// Hook ID.
        pub id: String,
        /// Hook point.
        pub point: HookPoint,
        /// Priority.
        pub priority: i32,
        /// Edit applied on every call.
        pub edit: LabelFn,
        /// Points fired so far.
        pub calls: Arc<Mutex<Vec<HookPoint>>>,
    }

    impl MockLabelHook {
        fn with_fn(
            id: &str,
            point: HookPoint,
            edit: impl Fn(&mut LabelChangeSet) -> Result<(), HookError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                id: id.to_string(),
                point,
                priority: DEFAULT_PRIORITY,
                edit: Box::new(edit),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Creates a mock which adds a label.
        pub fn adder(id: &str, point: HookPoint, label: Label) -> Self {
            Self::with_fn(id, point, move |changes| {
                changes.add(label);
                Ok(())
            })
        }

        /// Creates a mock which removes a label.
        pub fn remover(id: &str, point: HookPoint, label: Label) -> Self {
            Self::with_fn(id, point, move |changes| {
                changes.remove(label);
                Ok(())
            })
        }

        /// Creates a mock which fails with the given message.
        pub fn failer(id: &str, point: HookPoint, message: &str) -> Self {
            let hook_id = id.to_string();
            let message = message.to_string();
            Self::with_fn(id, point, move |_| {
                Err(HookError::execution_failed(hook_id.clone(), message.clone()))
            })
        }

        /// Sets the priority.
        #[must_use]
        pub fn with_priority(mut self, priority: i32) -> Self {
            self.priority = priority;
            self
        }

        /// Returns the number of times this hook has been called.
        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl LabelHook for MockLabelHook {
        fn id(&self) -> &str {
            &self.id
        }

        fn hook_point(&self) -> HookPoint {
            self.point
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn label(
            &self,
            request: &LabelRequest<'_>,
            changes: &mut LabelChangeSet,
        ) -> Result<(), HookError> {
            self.calls.lock().push(request.hook_point);
            (self.edit)(changes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MockLabelHook, MockOverrideHook};
    use super::*;
    use labelgate_auth::Permission;
    use labelgate_types::{Label, ObjectRef, Principal, PrincipalId, StoreOperation, StoredObject};

    fn object() -> StoredObject {
        StoredObject::of_type(ObjectRef::new(10)).with_reference(ObjectRef::new(77))
    }

    #[test]
    fn mock_override_records_calls() {
        let hook = MockOverrideHook::allowing("h", Permission::READ);
        let obj = object();
        let req = OverrideRequest {
            principal: Principal::User(PrincipalId::new(4)),
            object: &obj,
            operation: Permission::UPDATE,
        };
        assert_eq!(hook.allow_on_object(&req), Ok(OverrideResponse::no_change()));
        assert_eq!(hook.call_count(), 1);

        let calls = hook.calls.lock();
        assert_eq!(calls[0].object, Some(ObjectRef::new(77)));
        assert_eq!(calls[0].operation, Permission::UPDATE);
    }

    #[test]
    fn mock_override_failer() {
        let hook = MockOverrideHook::failer("h", "boom");
        let obj = object();
        let req = OverrideRequest {
            principal: Principal::System,
            object: &obj,
            operation: Permission::READ,
        };
        let err = hook.allow_on_object(&req).unwrap_err();
        assert_eq!(err, HookError::execution_failed("h", "boom"));
    }

    #[test]
    fn mock_label_edits_changes() {
        let hook = MockLabelHook::adder("h", HookPoint::LabelObject, Label::new(5));
        let obj = object();
        let req = LabelRequest::new(StoreOperation::Create, &obj, None).expect("create fires");
        let mut changes = LabelChangeSet::new();
        hook.label(&req, &mut changes).expect("label");
        assert!(changes.will_add(Label::new(5)));
        assert_eq!(*hook.calls.lock(), vec![HookPoint::LabelObject]);
    }

    #[test]
    fn hook_default_priority() {
        let hook = MockOverrideHook::bystander("h");
        assert_eq!(hook.priority(), DEFAULT_PRIORITY);
        assert_eq!(hook.with_priority(5).priority(), 5);
    }
}
