//! Immutable label sets.

use crate::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Duplicate-free, sorted set of labels attached to an object.
///
/// A `LabelSet` is never mutated once attached to a stored object.
/// Every modifying operation returns a new set, and updates replace
/// the old set wholesale.
///
/// # Example
///
/// ```
/// use labelgate_types::{Label, LabelSet};
///
/// let set = LabelSet::from_iter([Label::new(7), Label::new(5), Label::new(7)]);
/// assert_eq!(set.len(), 2);
///
/// let bigger = set.copy_adding([Label::new(1)]);
/// assert_eq!(set.len(), 2); // unchanged
/// assert_eq!(bigger.to_vec(), vec![Label::new(1), Label::new(5), Label::new(7)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: BTreeSet<Label>,
}

impl LabelSet {
    /// Creates an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the label is a member.
    #[must_use]
    pub fn contains(&self, label: Label) -> bool {
        self.labels.contains(&label)
    }

    /// Returns `true` if every label in `other` is a member.
    ///
    /// An empty `other` returns `false`.
    #[must_use]
    pub fn contains_all(&self, other: &LabelSet) -> bool {
        !other.is_empty() && other.labels.is_subset(&self.labels)
    }

    /// Returns `true` if any label in `other` is a member.
    #[must_use]
    pub fn intersects(&self, other: &LabelSet) -> bool {
        !self.labels.is_disjoint(&other.labels)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates labels in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.iter().copied()
    }

    /// Returns the labels as a sorted vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Label> {
        self.iter().collect()
    }

    /// Returns a new set with the given labels added.
    #[must_use]
    pub fn copy_adding(&self, to_add: impl IntoIterator<Item = Label>) -> Self {
        let mut labels = self.labels.clone();
        labels.extend(to_add);
        Self { labels }
    }

    /// Returns a new set with the given labels removed.
    ///
    /// Labels that are not members are ignored.
    #[must_use]
    pub fn copy_removing(&self, to_remove: impl IntoIterator<Item = Label>) -> Self {
        let mut labels = self.labels.clone();
        for label in to_remove {
            labels.remove(&label);
        }
        Self { labels }
    }

    /// Set union.
    #[must_use]
    pub fn union(&self, other: &LabelSet) -> Self {
        Self {
            labels: self.labels.union(&other.labels).copied().collect(),
        }
    }

    /// Labels in `self` but not in `other`.
    #[must_use]
    pub fn difference(&self, other: &LabelSet) -> Self {
        Self {
            labels: self.labels.difference(&other.labels).copied().collect(),
        }
    }

    /// Labels in both sets.
    #[must_use]
    pub fn intersection(&self, other: &LabelSet) -> Self {
        Self {
            labels: self.labels.intersection(&other.labels).copied().collect(),
        }
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = Label;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Label>>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter().copied()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", label.get())?;
        }
        f.write_str("}")
    }
}
