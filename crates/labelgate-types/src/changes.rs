//! Pending label changes.
//!
//! A [`LabelChangeSet`] is created per object mutation, passed through
//! the labelling pipeline where each contributor adds or removes labels,
//! and finally applied to the object's existing [`LabelSet`].

use crate::{Label, LabelSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A delta to apply to a [`LabelSet`].
///
/// A label is never scheduled for both addition and removal. When the
/// same label is added and removed, the later call wins.
///
/// # Example
///
/// ```
/// use labelgate_types::{Label, LabelChangeSet, LabelSet};
///
/// let existing = LabelSet::from_iter([Label::new(1), Label::new(2)]);
///
/// let mut changes = LabelChangeSet::new();
/// changes.add(Label::new(3)).remove(Label::new(1));
///
/// assert!(changes.will_add(Label::new(3)));
/// assert!(changes.will_remove(Label::new(1)));
/// assert_eq!(
///     changes.change(&existing),
///     LabelSet::from_iter([Label::new(2), Label::new(3)])
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelChangeSet {
    to_add: BTreeSet<Label>,
    to_remove: BTreeSet<Label>,
}

impl LabelChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the change set which turns `from` into `to`.
    #[must_use]
    pub fn changing(from: &LabelSet, to: &LabelSet) -> Self {
        Self {
            to_add: to.difference(from).iter().collect(),
            to_remove: from.difference(to).iter().collect(),
        }
    }

    /// Schedules a label for addition, cancelling any pending removal.
    pub fn add(&mut self, label: Label) -> &mut Self {
        self.to_remove.remove(&label);
        self.to_add.insert(label);
        self
    }

    /// Schedules every label for addition.
    pub fn add_all(&mut self, labels: impl IntoIterator<Item = Label>) -> &mut Self {
        for label in labels {
            self.add(label);
        }
        self
    }

    /// Schedules a label for removal, cancelling any pending addition.
    pub fn remove(&mut self, label: Label) -> &mut Self {
        self.to_add.remove(&label);
        self.to_remove.insert(label);
        self
    }

    /// Schedules every label for removal.
    pub fn remove_all(&mut self, labels: impl IntoIterator<Item = Label>) -> &mut Self {
        for label in labels {
            self.remove(label);
        }
        self
    }

    /// Returns `true` if the label is pending addition.
    #[must_use]
    pub fn will_add(&self, label: Label) -> bool {
        self.to_add.contains(&label)
    }

    /// Returns `true` if the label is pending removal.
    #[must_use]
    pub fn will_remove(&self, label: Label) -> bool {
        self.to_remove.contains(&label)
    }

    /// Returns `true` if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Labels pending addition.
    #[must_use]
    pub fn to_add(&self) -> LabelSet {
        self.to_add.iter().copied().collect()
    }

    /// Labels pending removal.
    #[must_use]
    pub fn to_remove(&self) -> LabelSet {
        self.to_remove.iter().copied().collect()
    }

    /// Applies the delta to `existing`, returning the resulting set.
    ///
    /// `(existing ∪ to_add) \ to_remove`. An empty delta returns a set
    /// equal to `existing`.
    #[must_use]
    pub fn change(&self, existing: &LabelSet) -> LabelSet {
        if self.is_empty() {
            return existing.clone();
        }
        existing
            .copy_adding(self.to_add.iter().copied())
            .copy_removing(self.to_remove.iter().copied())
    }
}
