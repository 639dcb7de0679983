//! Stored object model, as seen by the policy engine.
//!
//! Only the parts of an object that labelling and permission checks
//! need are modelled: its reference, its labels and its attribute
//! values. Everything else belongs to the object store.

use crate::{LabelSet, ObjectRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute descriptor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrDesc(u32);

impl AttrDesc {
    /// Link to the parent object, for tree definitions.
    pub const PARENT: Self = Self(201);
    /// Link to the object's type.
    pub const TYPE: Self = Self(210);
    /// Object title.
    pub const TITLE: Self = Self(211);

    /// Creates a descriptor from its raw identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AttrDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    /// Reference to another stored object.
    Ref(ObjectRef),
    /// Free text.
    Text(String),
    /// Integer.
    Integer(i64),
}

impl AttrValue {
    /// Returns the referenced object if this is a [`AttrValue::Ref`].
    #[must_use]
    pub fn as_object_ref(&self) -> Option<ObjectRef> {
        match self {
            Self::Ref(r) => Some(*r),
            _ => None,
        }
    }
}

/// An attribute value tagged with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Which attribute this value belongs to.
    pub descriptor: AttrDesc,
    /// The value.
    pub value: AttrValue,
}

/// A stored (or about to be stored) object.
///
/// `reference` is `None` until the store allocates one. Permission
/// probes run against objects which never get that far.
///
/// # Example
///
/// ```
/// use labelgate_types::{AttrDesc, AttrValue, ObjectRef, StoredObject};
///
/// let book_type = ObjectRef::new(300);
/// let obj = StoredObject::of_type(book_type)
///     .with_attr(AttrDesc::TITLE, AttrValue::Text("Dune".into()));
///
/// assert_eq!(obj.type_ref(), Some(book_type));
/// assert!(obj.reference.is_none());
/// assert!(obj.labels.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Store-allocated reference, if any.
    pub reference: Option<ObjectRef>,
    /// Labels currently attached.
    pub labels: LabelSet,
    /// Attribute values, in insertion order.
    pub attributes: Vec<Attribute>,
}

impl StoredObject {
    /// Creates an empty, unlabelled object with no reference.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a template object carrying only a TYPE attribute.
    #[must_use]
    pub fn of_type(type_ref: ObjectRef) -> Self {
        Self::new().with_attr(AttrDesc::TYPE, AttrValue::Ref(type_ref))
    }

    /// Sets the store-allocated reference.
    #[must_use]
    pub fn with_reference(mut self, reference: ObjectRef) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Replaces the label set.
    #[must_use]
    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    /// Appends an attribute value.
    #[must_use]
    pub fn with_attr(mut self, descriptor: AttrDesc, value: AttrValue) -> Self {
        self.add_attr(descriptor, value);
        self
    }

    /// Appends an attribute value in place.
    pub fn add_attr(&mut self, descriptor: AttrDesc, value: AttrValue) {
        self.attributes.push(Attribute { descriptor, value });
    }

    /// Removes every value of the given attribute.
    pub fn delete_attrs(&mut self, descriptor: AttrDesc) {
        self.attributes.retain(|a| a.descriptor != descriptor);
    }

    /// Iterates values of one attribute.
    pub fn values(&self, descriptor: AttrDesc) -> impl Iterator<Item = &AttrValue> + '_ {
        self.attributes
            .iter()
            .filter(move |a| a.descriptor == descriptor)
            .map(|a| &a.value)
    }

    /// First value of one attribute.
    #[must_use]
    pub fn first_attr(&self, descriptor: AttrDesc) -> Option<&AttrValue> {
        self.values(descriptor).next()
    }

    /// The object's type, from the first TYPE attribute which is a reference.
    #[must_use]
    pub fn type_ref(&self) -> Option<ObjectRef> {
        self.values(AttrDesc::TYPE).find_map(AttrValue::as_object_ref)
    }
}

/// Store operations which labelling and permission checks distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    /// Object is being created.
    Create,
    /// Existing object is being updated.
    Update,
    /// Object is being deleted.
    Delete,
}

impl StoreOperation {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A saved search subset, restricting queries by label and type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSubset {
    /// Results must carry at least one of these labels.
    pub include_labels: LabelSet,
    /// Results must carry none of these labels.
    pub exclude_labels: LabelSet,
    /// Results must be of one of these types (all types if empty).
    pub include_types: Vec<ObjectRef>,
}
