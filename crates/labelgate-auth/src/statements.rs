//! Label statements: the evaluated form of a principal's rules.
//!
//! [`LabelStatements`] answers "may this principal perform this
//! operation on an object with these labels?".
//!
//! # Evaluation
//!
//! For [`LabelStatements::Rules`], permission is the logical AND across
//! every label on the object:
//!
//! ```text
//! label tracked by a rule   → its effective mask must contain the operation
//! label not tracked by rule → UntrackedLabel::Neutral: ignored
//!                             UntrackedLabel::Deny:    vetoes
//! at least one tracked label must grant the operation
//! ```
//!
//! A single label lacking the operation vetoes the object, even if
//! every other label would allow it.

use crate::Permission;
use labelgate_types::{Label, LabelSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How labels which no rule mentions are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntrackedLabel {
    /// Neither grants nor vetoes. Some other label must grant.
    Neutral,
    /// Vetoes the operation.
    Deny,
}

/// Treatment of untracked labels when nothing else is configured.
///
/// Objects carry structural labels (type markers, self references)
/// which rules seldom mention, so they are neutral. An object is still
/// only accessible when at least one of its labels is explicitly
/// granted, so nothing is allowed by default.
pub const DEFAULT_UNTRACKED_LABEL: UntrackedLabel = UntrackedLabel::Neutral;

impl Default for UntrackedLabel {
    fn default() -> Self {
        DEFAULT_UNTRACKED_LABEL
    }
}

/// Effective masks folded from a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStatements {
    masks: BTreeMap<Label, Permission>,
    untracked: UntrackedLabel,
}

impl RuleStatements {
    /// Creates statements from folded masks.
    #[must_use]
    pub fn new(masks: BTreeMap<Label, Permission>, untracked: UntrackedLabel) -> Self {
        Self { masks, untracked }
    }

    /// Effective mask for a label, or `None` if no rule mentions it.
    #[must_use]
    pub fn mask_for(&self, label: Label) -> Option<Permission> {
        self.masks.get(&label).copied()
    }

    /// Labels mentioned by at least one rule.
    #[must_use]
    pub fn tracked_labels(&self) -> LabelSet {
        self.masks.keys().copied().collect()
    }

    /// Untracked label treatment.
    #[must_use]
    pub fn untracked(&self) -> UntrackedLabel {
        self.untracked
    }

    fn allow(&self, operation: Permission, labels: &LabelSet) -> bool {
        let mut granted = false;
        for label in labels {
            match self.masks.get(&label) {
                Some(mask) if mask.contains(operation) => granted = true,
                Some(_) => return false,
                None if self.untracked == UntrackedLabel::Deny => return false,
                None => {}
            }
        }
        granted
    }

    fn label_is_allowed(&self, operation: Permission, label: Label) -> bool {
        self.masks
            .get(&label)
            .is_some_and(|mask| mask.contains(operation))
    }

    fn label_is_denied(&self, operation: Permission, label: Label) -> bool {
        match self.masks.get(&label) {
            Some(mask) => !mask.contains(operation),
            None => self.untracked == UntrackedLabel::Deny,
        }
    }

    fn something_allowed(&self, operation: Permission) -> bool {
        self.masks.values().any(|mask| mask.contains(operation))
    }

    fn query_filter(&self, operation: Permission, additional_excludes: &LabelSet) -> LabelFilter {
        let mut allow = Vec::new();
        let mut deny = Vec::new();
        for (label, mask) in &self.masks {
            if mask.contains(operation) {
                allow.push(*label);
            } else {
                deny.push(*label);
            }
        }
        if allow.is_empty() {
            return LabelFilter::Nothing;
        }
        LabelFilter::Labels {
            require_any: allow.into_iter().collect(),
            exclude: deny.into_iter().collect::<LabelSet>().union(additional_excludes),
            only_required: self.untracked == UntrackedLabel::Deny,
        }
    }
}

/// How two statements are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Both must allow.
    And,
    /// Either may allow.
    Or,
}

/// Evaluated permissions for one principal.
///
/// # Example
///
/// ```
/// use labelgate_auth::{LabelStatements, Permission};
/// use labelgate_types::{Label, LabelSet};
///
/// let labels = LabelSet::from_iter([Label::new(1)]);
/// assert!(LabelStatements::SuperUser.allow(Permission::DELETE, &labels));
/// assert!(!LabelStatements::Nothing.allow(Permission::READ, &labels));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelStatements {
    /// Allows nothing.
    Nothing,
    /// Allows everything.
    SuperUser,
    /// Folded permission rules.
    Rules(RuleStatements),
    /// Both statements must allow.
    And(Box<LabelStatements>, Box<LabelStatements>),
    /// Either statement may allow.
    Or(Box<LabelStatements>, Box<LabelStatements>),
}

impl LabelStatements {
    /// Combines two statements.
    #[must_use]
    pub fn combine(a: LabelStatements, b: LabelStatements, how: Combine) -> Self {
        match how {
            Combine::And => Self::And(Box::new(a), Box::new(b)),
            Combine::Or => Self::Or(Box::new(a), Box::new(b)),
        }
    }

    /// Returns `true` only for [`LabelStatements::SuperUser`].
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        matches!(self, Self::SuperUser)
    }

    /// Returns `true` for plain folded rules.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Rules(_))
    }

    /// May `operation` be performed on an object carrying `labels`?
    ///
    /// An empty `operation` is never allowed.
    #[must_use]
    pub fn allow(&self, operation: Permission, labels: &LabelSet) -> bool {
        if operation.is_empty() {
            return false;
        }
        match self {
            Self::Nothing => false,
            Self::SuperUser => true,
            Self::Rules(rules) => rules.allow(operation, labels),
            Self::And(a, b) => a.allow(operation, labels) && b.allow(operation, labels),
            Self::Or(a, b) => a.allow(operation, labels) || b.allow(operation, labels),
        }
    }

    /// Does `label` on its own grant `operation`?
    ///
    /// Used when synthesising hypothetical objects. An untracked label
    /// never grants.
    #[must_use]
    pub fn label_is_allowed(&self, operation: Permission, label: Label) -> bool {
        match self {
            Self::Nothing => false,
            Self::SuperUser => true,
            Self::Rules(rules) => rules.label_is_allowed(operation, label),
            Self::And(a, b) => {
                a.label_is_allowed(operation, label) && b.label_is_allowed(operation, label)
            }
            Self::Or(a, b) => {
                a.label_is_allowed(operation, label) || b.label_is_allowed(operation, label)
            }
        }
    }

    /// Would `label` veto `operation` on any object carrying it?
    #[must_use]
    pub fn label_is_denied(&self, operation: Permission, label: Label) -> bool {
        match self {
            Self::Nothing => true,
            Self::SuperUser => false,
            Self::Rules(rules) => rules.label_is_denied(operation, label),
            Self::And(a, b) => {
                a.label_is_denied(operation, label) || b.label_is_denied(operation, label)
            }
            Self::Or(a, b) => {
                a.label_is_denied(operation, label) && b.label_is_denied(operation, label)
            }
        }
    }

    /// Is any label at all allowed for `operation`?
    #[must_use]
    pub fn something_allowed(&self, operation: Permission) -> bool {
        match self {
            Self::Nothing => false,
            Self::SuperUser => true,
            Self::Rules(rules) => rules.something_allowed(operation),
            Self::And(a, b) => a.something_allowed(operation) && b.something_allowed(operation),
            Self::Or(a, b) => a.something_allowed(operation) || b.something_allowed(operation),
        }
    }

    /// Builds the label-only filter used for bulk queries.
    ///
    /// The filter matches exactly the label sets [`allow`](Self::allow)
    /// accepts, minus any carrying one of `additional_excludes`.
    #[must_use]
    pub fn query_filter(&self, operation: Permission, additional_excludes: &LabelSet) -> LabelFilter {
        if operation.is_empty() {
            return LabelFilter::Nothing;
        }
        match self {
            Self::Nothing => LabelFilter::Nothing,
            Self::SuperUser => LabelFilter::Everything {
                exclude: additional_excludes.clone(),
            },
            Self::Rules(rules) => rules.query_filter(operation, additional_excludes),
            Self::And(a, b) => LabelFilter::And(
                Box::new(a.query_filter(operation, additional_excludes)),
                Box::new(b.query_filter(operation, additional_excludes)),
            ),
            Self::Or(a, b) => LabelFilter::Or(
                Box::new(a.query_filter(operation, additional_excludes)),
                Box::new(b.query_filter(operation, additional_excludes)),
            ),
        }
    }
}

/// Label-only condition for filtering query results.
///
/// The object store translates this into its own index query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFilter {
    /// Matches nothing.
    Nothing,
    /// Matches everything not carrying an excluded label.
    Everything {
        /// Labels which exclude an object.
        exclude: LabelSet,
    },
    /// Matches objects carrying a required label and no excluded label.
    Labels {
        /// At least one of these must be present.
        require_any: LabelSet,
        /// None of these may be present.
        exclude: LabelSet,
        /// If set, every label must be one of `require_any`.
        only_required: bool,
    },
    /// Both filters must match.
    And(Box<LabelFilter>, Box<LabelFilter>),
    /// Either filter may match.
    Or(Box<LabelFilter>, Box<LabelFilter>),
}

impl LabelFilter {
    /// Evaluates the filter against one object's labels.
    #[must_use]
    pub fn matches(&self, labels: &LabelSet) -> bool {
        match self {
            Self::Nothing => false,
            Self::Everything { exclude } => !labels.intersects(exclude),
            Self::Labels {
                require_any,
                exclude,
                only_required,
            } => {
                labels.intersects(require_any)
                    && !labels.intersects(exclude)
                    && (!*only_required || labels.iter().all(|l| require_any.contains(l)))
            }
            Self::And(a, b) => a.matches(labels) && b.matches(labels),
            Self::Or(a, b) => a.matches(labels) || b.matches(labels),
        }
    }
}
