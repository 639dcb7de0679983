//! Type schema consumed by the labelling and user policies.
//!
//! Every object has a type. Types form a tree through their parent
//! type; labelling configuration lives on the root of each tree.
//!
//! ```text
//! Book (root) ── base_labels, applicable_labels, behaviours
//!   └── Novel            parent_type = Book
//!         └── Thriller   parent_type = Novel   → resolves to Book
//! ```

use bitflags::bitflags;
use labelgate_types::{AttrDesc, Label, LabelSet, ObjectRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

bitflags! {
    /// Behaviours of a type which affect labelling and display.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TypeBehaviours: u32 {
        /// Objects are classification terms.
        const CLASSIFICATION = 1 << 0;
        /// Objects are physical items.
        const PHYSICAL       = 1 << 1;
        /// Objects form a hierarchy through their parent attribute.
        const HIERARCHICAL   = 1 << 2;
        /// The hierarchy is shown when displaying objects.
        const SHOW_HIERARCHY = 1 << 3;
        /// Objects carry their own reference as a label.
        const SELF_LABELLING = 1 << 4;
    }
}

/// Where a type appears in the creation UI. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiPosition(i32);

impl UiPosition {
    /// Listed with the most common types.
    pub const COMMON: Self = Self(-1);
    /// Listed normally.
    pub const NORMAL: Self = Self(0);
    /// Listed after everything else.
    pub const INFREQUENT: Self = Self(1);
    /// Never offered.
    pub const NEVER: Self = Self(2);

    /// Wraps a raw position.
    #[must_use]
    pub const fn new(position: i32) -> Self {
        Self(position)
    }

    /// Raw position.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for UiPosition {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Labelling configuration of one type.
///
/// # Example
///
/// ```
/// use labelgate_runtime::{TypeBehaviours, TypeDescriptor};
/// use labelgate_types::{Label, ObjectRef};
///
/// let book = TypeDescriptor::new(ObjectRef::new(100))
///     .with_base_labels([Label::new(1)])
///     .with_applicable_labels([Label::new(20), Label::new(10)])
///     .with_behaviours(TypeBehaviours::SELF_LABELLING);
///
/// // First applicable label in declaration order
/// assert_eq!(book.default_applicable_label(), Some(Label::new(20)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    type_ref: ObjectRef,
    #[serde(default)]
    title: String,
    #[serde(default)]
    parent_type: Option<ObjectRef>,
    #[serde(default)]
    base_labels: LabelSet,
    #[serde(default)]
    applicable_labels: LabelSet,
    #[serde(default)]
    default_applicable_label: Option<Label>,
    #[serde(default)]
    labelling_attributes: Vec<AttrDesc>,
    #[serde(default)]
    behaviours: TypeBehaviours,
    #[serde(default)]
    creation_ui_position: UiPosition,
}

impl TypeDescriptor {
    /// Creates a descriptor with no labelling configuration.
    #[must_use]
    pub fn new(type_ref: ObjectRef) -> Self {
        Self {
            type_ref,
            title: String::new(),
            parent_type: None,
            base_labels: LabelSet::new(),
            applicable_labels: LabelSet::new(),
            default_applicable_label: None,
            labelling_attributes: Vec::new(),
            behaviours: TypeBehaviours::empty(),
            creation_ui_position: UiPosition::NORMAL,
        }
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Makes this a subtype of `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: ObjectRef) -> Self {
        self.parent_type = Some(parent);
        self
    }

    /// Sets the labels every new object of the type receives.
    #[must_use]
    pub fn with_base_labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        self.base_labels = labels.into_iter().collect();
        self
    }

    /// Sets the labels a user may choose from.
    ///
    /// Unless a default was set explicitly, the first label given
    /// becomes the default applicable label.
    #[must_use]
    pub fn with_applicable_labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        let ordered: Vec<Label> = labels.into_iter().collect();
        if self.default_applicable_label.is_none() {
            self.default_applicable_label = ordered.first().copied();
        }
        self.applicable_labels = ordered.into_iter().collect();
        self
    }

    /// Sets the default applicable label explicitly.
    #[must_use]
    pub fn with_default_applicable_label(mut self, label: Label) -> Self {
        self.default_applicable_label = Some(label);
        self
    }

    /// Sets the attributes whose linked objects label this object.
    #[must_use]
    pub fn with_labelling_attributes(mut self, attrs: impl IntoIterator<Item = AttrDesc>) -> Self {
        self.labelling_attributes = attrs.into_iter().collect();
        self
    }

    /// Sets the behaviours.
    #[must_use]
    pub fn with_behaviours(mut self, behaviours: TypeBehaviours) -> Self {
        self.behaviours = behaviours;
        self
    }

    /// Sets the creation UI position.
    #[must_use]
    pub fn with_creation_ui_position(mut self, position: UiPosition) -> Self {
        self.creation_ui_position = position;
        self
    }

    /// Reference of the type object.
    #[must_use]
    pub fn type_ref(&self) -> ObjectRef {
        self.type_ref
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Supertype, or `None` for a root type.
    #[must_use]
    pub fn parent_type(&self) -> Option<ObjectRef> {
        self.parent_type
    }

    /// Labels every new object of this type receives.
    #[must_use]
    pub fn base_labels(&self) -> &LabelSet {
        &self.base_labels
    }

    /// Labels from which a new object should carry at least one.
    #[must_use]
    pub fn applicable_labels(&self) -> &LabelSet {
        &self.applicable_labels
    }

    /// Label added when a new object carries none of the applicable labels.
    ///
    /// Descriptors loaded without an explicit default fall back to the
    /// lowest applicable label.
    #[must_use]
    pub fn default_applicable_label(&self) -> Option<Label> {
        self.default_applicable_label
            .or_else(|| self.applicable_labels.iter().next())
    }

    /// Attributes whose linked objects become labels.
    #[must_use]
    pub fn labelling_attributes(&self) -> &[AttrDesc] {
        &self.labelling_attributes
    }

    /// Returns `true` if values of `desc` label objects of this type.
    #[must_use]
    pub fn is_labelling_attribute(&self, desc: AttrDesc) -> bool {
        self.labelling_attributes.contains(&desc)
    }

    /// Behaviour flags for this type.
    #[must_use]
    pub fn behaviours(&self) -> TypeBehaviours {
        self.behaviours
    }

    /// Where the type is offered when creating objects.
    #[must_use]
    pub fn creation_ui_position(&self) -> UiPosition {
        self.creation_ui_position
    }
}

/// Read access to the type schema.
pub trait Schema: Send + Sync {
    /// Descriptor for a type, if the type exists.
    fn type_descriptor(&self, type_ref: ObjectRef) -> Option<&TypeDescriptor>;

    /// Root types, in display order.
    fn root_types(&self) -> Vec<ObjectRef>;

    /// Does writing an object of this type change the schema itself?
    ///
    /// Plugins are not asked to label schema objects.
    fn is_schema_type(&self, _type_ref: ObjectRef) -> bool {
        false
    }

    /// Root types which are hierarchical classifications, in display order.
    fn hierarchical_classification_types(&self) -> Vec<ObjectRef> {
        let wanted = TypeBehaviours::CLASSIFICATION | TypeBehaviours::HIERARCHICAL;
        self.root_types()
            .into_iter()
            .filter(|t| {
                self.type_descriptor(*t)
                    .is_some_and(|d| d.behaviours().contains(wanted))
            })
            .collect()
    }

    /// Follows parent types up to the root descriptor.
    ///
    /// Returns `None` for unknown types, dangling parents, and parent
    /// chains longer than `max_depth` (which are taken to be loops).
    fn root_type_descriptor(&self, type_ref: ObjectRef, max_depth: usize) -> Option<&TypeDescriptor> {
        let mut descriptor = self.type_descriptor(type_ref)?;
        let mut hops = 0;
        while let Some(parent) = descriptor.parent_type() {
            if hops == max_depth {
                tracing::warn!(
                    type_ref = %type_ref,
                    max_depth,
                    "type hierarchy too deep, assuming a loop"
                );
                return None;
            }
            descriptor = self.type_descriptor(parent)?;
            hops += 1;
        }
        Some(descriptor)
    }
}

/// Schema held in memory.
///
/// # Example
///
/// ```
/// use labelgate_runtime::{InMemorySchema, Schema, TypeDescriptor};
/// use labelgate_types::{Label, ObjectRef};
///
/// let book = ObjectRef::new(100);
/// let novel = ObjectRef::new(101);
/// let schema = InMemorySchema::new()
///     .with_type(TypeDescriptor::new(book).with_base_labels([Label::new(1)]))
///     .with_type(TypeDescriptor::new(novel).with_parent(book));
///
/// assert_eq!(schema.root_types(), vec![book]);
/// let root = schema.root_type_descriptor(novel, 256).expect("resolves");
/// assert_eq!(root.type_ref(), book);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySchema {
    types: HashMap<ObjectRef, TypeDescriptor>,
    order: Vec<ObjectRef>,
    schema_types: Vec<ObjectRef>,
}

impl InMemorySchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a type. Root types keep insertion order.
    #[must_use]
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Marks a type as describing schema objects.
    #[must_use]
    pub fn with_schema_type(mut self, type_ref: ObjectRef) -> Self {
        self.schema_types.push(type_ref);
        self
    }

    /// Adds or replaces a type in place.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        let type_ref = descriptor.type_ref();
        if self.types.insert(type_ref, descriptor).is_none() {
            self.order.push(type_ref);
        }
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if there are no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Schema for InMemorySchema {
    fn type_descriptor(&self, type_ref: ObjectRef) -> Option<&TypeDescriptor> {
        self.types.get(&type_ref)
    }

    fn root_types(&self) -> Vec<ObjectRef> {
        self.order
            .iter()
            .copied()
            .filter(|t| {
                self.types
                    .get(t)
                    .is_some_and(|d| d.parent_type().is_none())
            })
            .collect()
    }

    fn is_schema_type(&self, type_ref: ObjectRef) -> bool {
        self.schema_types.contains(&type_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(id: u32) -> ObjectRef {
        ObjectRef::new(id)
    }

    #[test]
    fn explicit_default_survives_applicable_labels() {
        let d = TypeDescriptor::new(r(1))
            .with_default_applicable_label(Label::new(7))
            .with_applicable_labels([Label::new(3), Label::new(7)]);
        assert_eq!(d.default_applicable_label(), Some(Label::new(7)));
    }

    #[test]
    fn no_applicable_labels_no_default() {
        let d = TypeDescriptor::new(r(1)).with_applicable_labels(Vec::new());
        assert_eq!(d.default_applicable_label(), None);
    }

    #[test]
    fn ui_position_ordering() {
        assert!(UiPosition::COMMON < UiPosition::NORMAL);
        assert!(UiPosition::INFREQUENT < UiPosition::NEVER);
        assert_eq!(UiPosition::default(), UiPosition::NORMAL);
    }

    #[test]
    fn root_resolution_through_chain() {
        let schema = InMemorySchema::new()
            .with_type(TypeDescriptor::new(r(1)))
            .with_type(TypeDescriptor::new(r(2)).with_parent(r(1)))
            .with_type(TypeDescriptor::new(r(3)).with_parent(r(2)));
        let root = schema.root_type_descriptor(r(3), 256).expect("root");
        assert_eq!(root.type_ref(), r(1));
        assert_eq!(schema.root_types(), vec![r(1)]);
    }

    #[test]
    fn loop_in_hierarchy_gives_none() {
        let schema = InMemorySchema::new()
            .with_type(TypeDescriptor::new(r(1)).with_parent(r(2)))
            .with_type(TypeDescriptor::new(r(2)).with_parent(r(1)));
        assert!(schema.root_type_descriptor(r(1), 256).is_none());
    }

    #[test]
    fn depth_limit_applies() {
        let schema = InMemorySchema::new()
            .with_type(TypeDescriptor::new(r(1)))
            .with_type(TypeDescriptor::new(r(2)).with_parent(r(1)))
            .with_type(TypeDescriptor::new(r(3)).with_parent(r(2)));
        assert!(schema.root_type_descriptor(r(3), 1).is_none());
        assert!(schema.root_type_descriptor(r(3), 2).is_some());
    }

    #[test]
    fn dangling_parent_gives_none() {
        let schema = InMemorySchema::new().with_type(TypeDescriptor::new(r(2)).with_parent(r(99)));
        assert!(schema.root_type_descriptor(r(2), 256).is_none());
        assert!(schema.root_type_descriptor(r(42), 256).is_none());
    }

    #[test]
    fn hierarchical_classification_types_filtered() {
        let both = TypeBehaviours::CLASSIFICATION | TypeBehaviours::HIERARCHICAL;
        let schema = InMemorySchema::new()
            .with_type(TypeDescriptor::new(r(1)).with_behaviours(both))
            .with_type(TypeDescriptor::new(r(2)).with_behaviours(TypeBehaviours::CLASSIFICATION))
            .with_type(TypeDescriptor::new(r(3)).with_behaviours(both).with_parent(r(1)))
            .with_type(TypeDescriptor::new(r(4)).with_behaviours(both | TypeBehaviours::SHOW_HIERARCHY));
        assert_eq!(schema.hierarchical_classification_types(), vec![r(1), r(4)]);
    }

    #[test]
    fn replacing_type_keeps_order() {
        let mut schema = InMemorySchema::new()
            .with_type(TypeDescriptor::new(r(5)))
            .with_type(TypeDescriptor::new(r(6)));
        schema.insert(TypeDescriptor::new(r(5)).with_title("Book"));
        assert_eq!(schema.root_types(), vec![r(5), r(6)]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.type_descriptor(r(5)).map(TypeDescriptor::title), Some("Book"));
    }

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let d: TypeDescriptor = toml::from_str("type_ref = 12\nbase_labels = [3, 1]\n").expect("parse");
        assert_eq!(d.type_ref(), r(12));
        assert_eq!(d.base_labels().len(), 2);
        assert_eq!(d.creation_ui_position(), UiPosition::NORMAL);
    }
}
