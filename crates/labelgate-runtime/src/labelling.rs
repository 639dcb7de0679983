//! Labelling policy.
//!
//! Computes which labels an object must carry, given its type's
//! labelling configuration, as a final adjustment to a pending
//! [`LabelChangeSet`].
//!
//! ```text
//!               create   update   delete
//! base labels      ✓
//! default label    ✓
//! self label       ✓
//! attr labels      ✓        ✓
//! stale attrs               ✓
//! ```

use crate::{ObjectStore, Schema, TypeBehaviours, TypeDescriptor};
use labelgate_types::{Label, LabelChangeSet, LabelSet, StoreOperation, StoredObject};
use std::sync::Arc;

/// Applies type-driven labelling rules to pending label changes.
///
/// # Example
///
/// ```
/// use labelgate_runtime::{InMemoryHierarchy, InMemorySchema, LabellingPolicy, TypeDescriptor};
/// use labelgate_types::{Label, LabelChangeSet, ObjectRef, StoreOperation, StoredObject};
/// use std::sync::Arc;
///
/// let book = ObjectRef::new(100);
/// let schema = InMemorySchema::new().with_type(
///     TypeDescriptor::new(book)
///         .with_base_labels([Label::new(1)])
///         .with_applicable_labels([Label::new(20), Label::new(21)]),
/// );
/// let policy = LabellingPolicy::new(Arc::new(schema), Arc::new(InMemoryHierarchy::new()), 256);
///
/// let object = StoredObject::of_type(book);
/// let changes = policy.modify_changes_to_apply_labelling_policy(
///     LabelChangeSet::new(),
///     StoreOperation::Create,
///     &object,
///     None,
/// );
/// assert!(changes.will_add(Label::new(1)));
/// assert!(changes.will_add(Label::new(20)));
/// ```
#[derive(Clone)]
pub struct LabellingPolicy {
    schema: Arc<dyn Schema>,
    store: Arc<dyn ObjectStore>,
    max_type_depth: usize,
}

impl std::fmt::Debug for LabellingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabellingPolicy")
            .field("max_type_depth", &self.max_type_depth)
            .finish_non_exhaustive()
    }
}

impl LabellingPolicy {
    /// Creates a labelling policy over a schema and object store.
    #[must_use]
    pub fn new(schema: Arc<dyn Schema>, store: Arc<dyn ObjectStore>, max_type_depth: usize) -> Self {
        Self {
            schema,
            store,
            max_type_depth,
        }
    }

    /// Root type descriptor for an object, from its TYPE attribute.
    #[must_use]
    pub fn root_descriptor_for(&self, object: &StoredObject) -> Option<&TypeDescriptor> {
        let type_ref = object.type_ref()?;
        self.schema.root_type_descriptor(type_ref, self.max_type_depth)
    }

    /// Adjusts `changes` so the object is labelled as its type requires.
    ///
    /// Objects with no type, or whose type has no descriptor, are
    /// returned unchanged. Delete operations are never adjusted.
    #[must_use]
    pub fn modify_changes_to_apply_labelling_policy(
        &self,
        mut changes: LabelChangeSet,
        operation: StoreOperation,
        object: &StoredObject,
        previous: Option<&StoredObject>,
    ) -> LabelChangeSet {
        let Some(descriptor) = self.root_descriptor_for(object) else {
            tracing::debug!(
                operation = %operation,
                type_ref = ?object.type_ref(),
                "no type descriptor, labelling unchanged"
            );
            return changes;
        };

        if operation == StoreOperation::Delete {
            return changes;
        }

        if operation == StoreOperation::Create {
            apply_create_labels(descriptor, object, &mut changes);
        }

        let attr_labels = self.labels_from_attributes(descriptor, object);
        changes.add_all(attr_labels.iter());

        if operation == StoreOperation::Update {
            if let Some(previous) = previous {
                let stale = self
                    .labels_from_attributes(descriptor, previous)
                    .difference(&attr_labels);
                for label in &stale {
                    if !changes.will_add(label) {
                        changes.remove(label);
                    }
                }
            }
        }

        tracing::debug!(
            operation = %operation,
            type_ref = %descriptor.type_ref(),
            to_add = %changes.to_add(),
            to_remove = %changes.to_remove(),
            "applied labelling policy"
        );
        changes
    }

    /// Labels contributed by the object's labelling attributes: every
    /// linked object and its full parent path.
    fn labels_from_attributes(&self, descriptor: &TypeDescriptor, object: &StoredObject) -> LabelSet {
        object
            .attributes
            .iter()
            .filter(|a| descriptor.is_labelling_attribute(a.descriptor))
            .filter_map(|a| a.value.as_object_ref())
            .flat_map(|r| self.store.expand_objref_into_full_parent_path(r))
            .map(Label::from)
            .collect()
    }
}

/// Base labels, default applicable label and self label for a new object.
fn apply_create_labels(descriptor: &TypeDescriptor, object: &StoredObject, changes: &mut LabelChangeSet) {
    let current = changes.change(&object.labels);

    for label in descriptor.base_labels() {
        if !current.contains(label) && !changes.will_remove(label) {
            changes.add(label);
        }
    }

    let applicable = descriptor.applicable_labels();
    if !applicable.is_empty() && !current.intersects(applicable) {
        if let Some(default) = descriptor.default_applicable_label() {
            changes.add(default);
        }
    }

    if descriptor.behaviours().contains(TypeBehaviours::SELF_LABELLING) {
        // Unallocated objects are labelled when the store assigns a reference
        if let Some(reference) = object.reference.map(Label::from) {
            if !current.contains(reference) {
                changes.add(reference);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryHierarchy, InMemorySchema};
    use labelgate_types::{AttrDesc, AttrValue, ObjectRef};

    const BOOK: ObjectRef = ObjectRef::new(100);
    const NOVEL: ObjectRef = ObjectRef::new(101);
    const PROJECT: AttrDesc = AttrDesc::new(4000);

    fn l(id: u32) -> Label {
        Label::new(id)
    }

    fn policy(schema: InMemorySchema, store: InMemoryHierarchy) -> LabellingPolicy {
        LabellingPolicy::new(Arc::new(schema), Arc::new(store), 256)
    }

    fn book_schema() -> InMemorySchema {
        InMemorySchema::new()
            .with_type(
                TypeDescriptor::new(BOOK)
                    .with_base_labels([l(1), l(2)])
                    .with_applicable_labels([l(20), l(21)])
                    .with_labelling_attributes([PROJECT])
                    .with_behaviours(TypeBehaviours::SELF_LABELLING),
            )
            .with_type(TypeDescriptor::new(NOVEL).with_parent(BOOK))
    }

    #[test]
    fn untyped_object_unchanged() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let mut changes = LabelChangeSet::new();
        changes.add(l(9));
        let out = p.modify_changes_to_apply_labelling_policy(
            changes.clone(),
            StoreOperation::Create,
            &StoredObject::new(),
            None,
        );
        assert_eq!(out, changes);
    }

    #[test]
    fn subtype_uses_root_configuration() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let out = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            &StoredObject::of_type(NOVEL),
            None,
        );
        assert!(out.will_add(l(1)));
        assert!(out.will_add(l(20)));
    }

    #[test]
    fn explicit_removal_of_base_label_respected() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let mut changes = LabelChangeSet::new();
        changes.remove(l(2));
        let out = p.modify_changes_to_apply_labelling_policy(
            changes,
            StoreOperation::Create,
            &StoredObject::of_type(BOOK),
            None,
        );
        assert!(out.will_add(l(1)));
        assert!(out.will_remove(l(2)));
    }

    #[test]
    fn chosen_applicable_label_suppresses_default() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let object = StoredObject::of_type(BOOK).with_labels(LabelSet::from_iter([l(21)]));
        let out = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            &object,
            None,
        );
        assert!(!out.will_add(l(20)));
    }

    #[test]
    fn self_label_needs_reference() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let unallocated = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            &StoredObject::of_type(BOOK),
            None,
        );
        assert_eq!(unallocated.to_add().len(), 3);

        let allocated = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            &StoredObject::of_type(BOOK).with_reference(ObjectRef::new(555)),
            None,
        );
        assert!(allocated.will_add(l(555)));
    }

    #[test]
    fn update_skips_create_only_steps() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let object = StoredObject::of_type(BOOK).with_reference(ObjectRef::new(555));
        let out = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Update,
            &object,
            Some(&object),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn attribute_labels_include_parent_path() {
        let store = InMemoryHierarchy::new().with_parent(ObjectRef::new(31), ObjectRef::new(30));
        let p = policy(book_schema(), store);
        let object = StoredObject::of_type(BOOK)
            .with_attr(PROJECT, AttrValue::Ref(ObjectRef::new(31)))
            .with_attr(PROJECT, AttrValue::Text("ignored".into()))
            .with_attr(AttrDesc::TITLE, AttrValue::Ref(ObjectRef::new(77)));
        let out = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Update,
            &object,
            None,
        );
        assert_eq!(out.to_add(), LabelSet::from_iter([l(30), l(31)]));
    }

    #[test]
    fn delete_is_a_no_op() {
        let p = policy(book_schema(), InMemoryHierarchy::new());
        let out = p.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Delete,
            &StoredObject::of_type(BOOK).with_attr(PROJECT, AttrValue::Ref(ObjectRef::new(31))),
            None,
        );
        assert!(out.is_empty());
    }
}
