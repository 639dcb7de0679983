//! Object store access needed by the labelling policy.

use labelgate_types::ObjectRef;
use std::collections::{HashMap, HashSet};

/// Read access to the object store.
pub trait ObjectStore: Send + Sync {
    /// Expands a reference into its full parent path, root first and
    /// ending with the reference itself.
    ///
    /// A reference with no parent expands to itself alone.
    fn expand_objref_into_full_parent_path(&self, objref: ObjectRef) -> Vec<ObjectRef>;
}

/// Parent links held in memory.
///
/// # Example
///
/// ```
/// use labelgate_runtime::{InMemoryHierarchy, ObjectStore};
/// use labelgate_types::ObjectRef;
///
/// let europe = ObjectRef::new(1);
/// let france = ObjectRef::new(2);
/// let paris = ObjectRef::new(3);
/// let store = InMemoryHierarchy::new()
///     .with_parent(france, europe)
///     .with_parent(paris, france);
///
/// assert_eq!(store.expand_objref_into_full_parent_path(paris), vec![europe, france, paris]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryHierarchy {
    parents: HashMap<ObjectRef, ObjectRef>,
}

impl InMemoryHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `parent` as the parent of `child`.
    #[must_use]
    pub fn with_parent(mut self, child: ObjectRef, parent: ObjectRef) -> Self {
        self.set_parent(child, parent);
        self
    }

    /// Records `parent` as the parent of `child`, replacing any previous parent.
    pub fn set_parent(&mut self, child: ObjectRef, parent: ObjectRef) {
        self.parents.insert(child, parent);
    }

    /// Parent of `child`, if recorded.
    #[must_use]
    pub fn parent_of(&self, child: ObjectRef) -> Option<ObjectRef> {
        self.parents.get(&child).copied()
    }
}

impl ObjectStore for InMemoryHierarchy {
    fn expand_objref_into_full_parent_path(&self, objref: ObjectRef) -> Vec<ObjectRef> {
        let mut path = vec![objref];
        let mut seen = HashSet::from([objref]);
        let mut current = objref;
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(parent) {
                tracing::warn!(objref = %objref, parent = %parent, "loop in object hierarchy");
                break;
            }
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}
