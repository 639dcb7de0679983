//! Label and object reference identifiers.
//!
//! Both are opaque integers. A [`Label`] has no internal structure;
//! equality and ordering are the only meaningful operations. An
//! [`ObjectRef`] names a stored object, and because objects can label
//! other objects (hierarchy paths, self-labelling), every reference
//! converts losslessly into a label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque label identifier attached to stored objects.
///
/// # Example
///
/// ```
/// use labelgate_types::{Label, ObjectRef};
///
/// let label = Label::new(42);
/// assert_eq!(label.get(), 42);
///
/// // Object references are usable as labels
/// let obj = ObjectRef::new(42);
/// assert_eq!(Label::from(obj), label);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(u32);

impl Label {
    /// Creates a label from its raw identifier.
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

impl From<u32> for Label {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ObjectRef> for Label {
    fn from(r: ObjectRef) -> Self {
        Self(r.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Reference to a stored object.
///
/// References are allocated by the object store. Types, labels,
/// classification terms and ordinary objects all share this id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(u32);

impl ObjectRef {
    /// Creates a reference from its raw identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns this reference as a label.
    #[must_use]
    pub const fn as_label(self) -> Label {
        Label(self.0)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
