//! Integration tests for the labelling policy and label pipeline.
//!
//! Tests the complete write path: caller changes → label hooks →
//! labelling policy → stored label set.

use labelgate_hook::testing::MockLabelHook;
use labelgate_hook::{HookPoint, HookRegistry};
use labelgate_runtime::{
    InMemoryHierarchy, InMemorySchema, LabelPipeline, LabellingPolicy, TypeBehaviours,
    TypeDescriptor,
};
use labelgate_types::{
    AttrDesc, AttrValue, Label, LabelChangeSet, LabelSet, ObjectRef, StoreOperation, StoredObject,
};
use std::sync::Arc;

// =============================================================================
// Test Fixtures
// =============================================================================

const PROJECT_TYPE: ObjectRef = ObjectRef::new(200);
const TASK_TYPE: ObjectRef = ObjectRef::new(201);
const SUBTASK_TYPE: ObjectRef = ObjectRef::new(202);
const ASSIGNED_PROJECT: AttrDesc = AttrDesc::new(5000);

const BASE_A: Label = Label::new(1);
const BASE_B: Label = Label::new(2);
const CONFIDENTIAL: Label = Label::new(40);
const INTERNAL: Label = Label::new(41);
const HOOK_LABEL: Label = Label::new(77);

const CLIENTS: ObjectRef = ObjectRef::new(900);
const ACME: ObjectRef = ObjectRef::new(901);
const GLOBEX: ObjectRef = ObjectRef::new(902);

fn schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_type(
            TypeDescriptor::new(PROJECT_TYPE)
                .with_title("Project")
                .with_behaviours(TypeBehaviours::SELF_LABELLING | TypeBehaviours::HIERARCHICAL),
        )
        .with_type(
            TypeDescriptor::new(TASK_TYPE)
                .with_title("Task")
                .with_base_labels([BASE_A, BASE_B])
                .with_applicable_labels([CONFIDENTIAL, INTERNAL])
                .with_default_applicable_label(INTERNAL)
                .with_labelling_attributes([ASSIGNED_PROJECT]),
        )
        .with_type(TypeDescriptor::new(SUBTASK_TYPE).with_parent(TASK_TYPE))
}

fn hierarchy() -> InMemoryHierarchy {
    InMemoryHierarchy::new()
        .with_parent(ACME, CLIENTS)
        .with_parent(GLOBEX, CLIENTS)
}

fn labelling() -> LabellingPolicy {
    LabellingPolicy::new(Arc::new(schema()), Arc::new(hierarchy()), 256)
}

fn labels(items: &[Label]) -> LabelSet {
    items.iter().copied().collect()
}

/// Runs the create path and returns the label set the object ends up with.
fn create_labels(policy: &LabellingPolicy, object: &StoredObject) -> LabelSet {
    policy
        .modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            object,
            None,
        )
        .change(&object.labels)
}

fn task_for(project: ObjectRef) -> StoredObject {
    StoredObject::of_type(TASK_TYPE).with_attr(ASSIGNED_PROJECT, AttrValue::Ref(project))
}

// =============================================================================
// Base Labels
// =============================================================================

mod base_labels {
    use super::*;

    #[test]
    fn create_adds_every_base_label() {
        let result = create_labels(&labelling(), &StoredObject::of_type(TASK_TYPE));
        assert!(result.contains(BASE_A));
        assert!(result.contains(BASE_B));
    }

    #[test]
    fn relabelling_a_labelled_object_changes_nothing() {
        let policy = labelling();
        let first = create_labels(&policy, &task_for(ACME));

        let stored = task_for(ACME).with_labels(first.clone());
        let second = create_labels(&policy, &stored);

        assert_eq!(first, second);
    }

    #[test]
    fn subtype_inherits_root_configuration() {
        let result = create_labels(&labelling(), &StoredObject::of_type(SUBTASK_TYPE));
        assert_eq!(result, labels(&[BASE_A, BASE_B, INTERNAL]));
    }

    #[test]
    fn unknown_type_gets_nothing() {
        let result = create_labels(&labelling(), &StoredObject::of_type(ObjectRef::new(12345)));
        assert!(result.is_empty());
    }
}

// =============================================================================
// Applicable Labels
// =============================================================================

mod applicable_labels {
    use super::*;

    #[test]
    fn default_added_when_none_chosen() {
        let result = create_labels(&labelling(), &StoredObject::of_type(TASK_TYPE));
        let chosen: Vec<Label> = result
            .iter()
            .filter(|l| [CONFIDENTIAL, INTERNAL].contains(l))
            .collect();
        assert_eq!(chosen, vec![INTERNAL]);
    }

    #[test]
    fn pending_choice_suppresses_default() {
        let mut changes = LabelChangeSet::new();
        changes.add(CONFIDENTIAL);
        let out = labelling().modify_changes_to_apply_labelling_policy(
            changes,
            StoreOperation::Create,
            &StoredObject::of_type(TASK_TYPE),
            None,
        );
        assert!(out.will_add(CONFIDENTIAL));
        assert!(!out.will_add(INTERNAL));
    }

    #[test]
    fn existing_choice_suppresses_default() {
        let object = StoredObject::of_type(TASK_TYPE).with_labels(labels(&[CONFIDENTIAL]));
        let result = create_labels(&labelling(), &object);
        assert!(result.contains(CONFIDENTIAL));
        assert!(!result.contains(INTERNAL));
    }
}

// =============================================================================
// Self Labelling
// =============================================================================

mod self_labelling {
    use super::*;

    #[test]
    fn allocated_object_carries_its_own_label() {
        let project = ObjectRef::new(4242);
        let object = StoredObject::of_type(PROJECT_TYPE).with_reference(project);
        let result = create_labels(&labelling(), &object);
        assert!(result.contains(project.as_label()));
    }

    #[test]
    fn unallocated_object_is_skipped() {
        let result = create_labels(&labelling(), &StoredObject::of_type(PROJECT_TYPE));
        assert!(result.is_empty());
    }

    #[test]
    fn types_without_behaviour_never_self_label() {
        let task = ObjectRef::new(4343);
        let object = StoredObject::of_type(TASK_TYPE).with_reference(task);
        assert!(!create_labels(&labelling(), &object).contains(task.as_label()));
    }
}

// =============================================================================
// Labelling Attributes
// =============================================================================

mod labelling_attributes {
    use super::*;

    #[test]
    fn linked_object_and_parents_become_labels() {
        let result = create_labels(&labelling(), &task_for(ACME));
        assert!(result.contains(ACME.as_label()));
        assert!(result.contains(CLIENTS.as_label()));
    }

    #[test]
    fn update_removes_labels_of_unlinked_objects() {
        let policy = labelling();
        let before_labels = create_labels(&policy, &task_for(ACME));
        let previous = task_for(ACME).with_labels(before_labels.clone());
        let current = task_for(GLOBEX).with_labels(before_labels);

        let changes = policy.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Update,
            &current,
            Some(&previous),
        );
        let after = changes.change(&current.labels);

        assert!(!after.contains(ACME.as_label()));
        assert!(after.contains(GLOBEX.as_label()));
        // Shared parent stays
        assert!(after.contains(CLIENTS.as_label()));
        assert!(after.contains(BASE_A));
    }

    #[test]
    fn update_keeps_stale_label_another_contributor_adds() {
        let previous = task_for(ACME);
        let current = task_for(GLOBEX);
        let mut changes = LabelChangeSet::new();
        changes.add(ACME.as_label());

        let out = labelling().modify_changes_to_apply_labelling_policy(
            changes,
            StoreOperation::Update,
            &current,
            Some(&previous),
        );
        assert!(out.will_add(ACME.as_label()));
        assert!(!out.will_remove(ACME.as_label()));
    }

    #[test]
    fn non_labelling_attribute_ignored() {
        let object = StoredObject::of_type(TASK_TYPE)
            .with_attr(AttrDesc::new(5001), AttrValue::Ref(ACME));
        assert!(!create_labels(&labelling(), &object).contains(ACME.as_label()));
    }
}

// =============================================================================
// Label Pipeline
// =============================================================================

mod pipeline {
    use super::*;
    use labelgate_hook::HookError;

    fn pipeline_with(registry: HookRegistry) -> LabelPipeline {
        LabelPipeline::new(Arc::new(registry), labelling())
    }

    #[test]
    fn hooks_run_before_labelling() -> Result<(), HookError> {
        let hook = Arc::new(MockLabelHook::adder("tagger", HookPoint::LabelObject, HOOK_LABEL));
        let mut registry = HookRegistry::new();
        registry.register_label(hook.clone())?;

        let result = pipeline_with(registry).apply(
            StoreOperation::Create,
            &StoredObject::of_type(TASK_TYPE),
            None,
            false,
            LabelChangeSet::new(),
        )?;

        assert_eq!(hook.call_count(), 1);
        assert_eq!(result, labels(&[BASE_A, BASE_B, INTERNAL, HOOK_LABEL]));
        Ok(())
    }

    #[test]
    fn hook_removal_of_base_label_is_respected() -> Result<(), HookError> {
        let mut registry = HookRegistry::new();
        registry.register_label(Arc::new(MockLabelHook::remover(
            "stripper",
            HookPoint::LabelObject,
            BASE_B,
        )))?;

        let result = pipeline_with(registry).apply(
            StoreOperation::Create,
            &StoredObject::of_type(TASK_TYPE),
            None,
            false,
            LabelChangeSet::new(),
        )?;
        assert!(result.contains(BASE_A));
        assert!(!result.contains(BASE_B));
        Ok(())
    }

    #[test]
    fn labelling_overrides_hook_choice_of_default() -> Result<(), HookError> {
        // A hook removing the default cannot leave the object without an applicable label
        let mut registry = HookRegistry::new();
        registry.register_label(Arc::new(MockLabelHook::remover(
            "unclassify",
            HookPoint::LabelObject,
            INTERNAL,
        )))?;

        let result = pipeline_with(registry).apply(
            StoreOperation::Create,
            &StoredObject::of_type(TASK_TYPE),
            None,
            false,
            LabelChangeSet::new(),
        )?;
        assert!(result.contains(INTERNAL));
        Ok(())
    }

    #[test]
    fn schema_objects_skip_hooks() -> Result<(), HookError> {
        let hook = Arc::new(MockLabelHook::adder("tagger", HookPoint::LabelObject, HOOK_LABEL));
        let mut registry = HookRegistry::new();
        registry.register_label(hook.clone())?;

        let result = pipeline_with(registry).apply(
            StoreOperation::Create,
            &StoredObject::of_type(TASK_TYPE),
            None,
            true,
            LabelChangeSet::new(),
        )?;

        assert_eq!(hook.call_count(), 0);
        assert!(!result.contains(HOOK_LABEL));
        assert!(result.contains(BASE_A));
        Ok(())
    }

    #[test]
    fn update_fires_updated_object_point_only() -> Result<(), HookError> {
        let on_create = Arc::new(MockLabelHook::adder("c", HookPoint::LabelObject, Label::new(80)));
        let on_update = Arc::new(MockLabelHook::adder("u", HookPoint::LabelUpdatedObject, Label::new(81)));
        let mut registry = HookRegistry::new();
        registry.register_label(on_create.clone())?;
        registry.register_label(on_update.clone())?;

        let object = task_for(ACME);
        let result = pipeline_with(registry).apply(
            StoreOperation::Update,
            &object,
            Some(&object),
            false,
            LabelChangeSet::new(),
        )?;

        assert_eq!(on_create.call_count(), 0);
        assert_eq!(on_update.call_count(), 1);
        assert!(result.contains(Label::new(81)));
        Ok(())
    }

    #[test]
    fn delete_fires_no_hooks() -> Result<(), HookError> {
        let hook = Arc::new(MockLabelHook::adder("c", HookPoint::LabelObject, HOOK_LABEL));
        let mut registry = HookRegistry::new();
        registry.register_label(hook.clone())?;

        let object = task_for(ACME).with_labels(labels(&[BASE_A]));
        let result = pipeline_with(registry).apply(
            StoreOperation::Delete,
            &object,
            None,
            false,
            LabelChangeSet::new(),
        )?;

        assert_eq!(hook.call_count(), 0);
        assert_eq!(result, object.labels);
        Ok(())
    }

    #[test]
    fn hook_failure_propagates() {
        let mut registry = HookRegistry::new();
        registry
            .register_label(Arc::new(MockLabelHook::failer(
                "broken",
                HookPoint::LabelObject,
                "backend unavailable",
            )))
            .expect("register");

        let err = pipeline_with(registry)
            .update_label_changes_for(
                StoreOperation::Create,
                &StoredObject::of_type(TASK_TYPE),
                None,
                false,
                LabelChangeSet::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("backend unavailable"), "got: {err}");
    }
}
