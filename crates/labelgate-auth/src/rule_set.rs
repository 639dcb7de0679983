//! Ordered rule sets and their folding into label statements.
//!
//! ```text
//! RuleList (rules from many sources, with distance)
//!     │  into_rule_set(): most distant first
//!     ▼
//! PermissionRuleSet (declaration order)
//!     │  fold(): RESET / ALLOW / DENY left to right
//!     ▼
//! LabelStatements::Rules (label → effective mask)
//! ```

use crate::statements::{RuleStatements, UntrackedLabel};
use crate::{LabelStatements, Permission, PermissionRule, Statement};
use labelgate_types::Label;
use std::collections::BTreeMap;

/// Rules for one principal, in evaluation order.
///
/// Order is significant: rules are folded left to right into one
/// effective mask per label.
///
/// # Example
///
/// ```
/// use labelgate_auth::{Permission, PermissionRule, PermissionRuleSet, UntrackedLabel};
/// use labelgate_types::{Label, LabelSet};
///
/// let docs = Label::new(100);
/// let secret = Label::new(200);
///
/// let rules = PermissionRuleSet::from_iter([
///     PermissionRule::allow(docs, Permission::READ | Permission::UPDATE)?,
///     PermissionRule::allow(secret, Permission::READ)?,
///     PermissionRule::deny(secret, Permission::READ)?,
/// ]);
/// let statements = rules.to_statements(UntrackedLabel::Neutral);
///
/// assert!(statements.allow(Permission::READ, &LabelSet::from_iter([docs])));
/// // Any label lacking the permission vetoes the whole object
/// assert!(!statements.allow(Permission::READ, &LabelSet::from_iter([docs, secret])));
/// # Ok::<(), labelgate_auth::RuleError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRuleSet {
    rules: Vec<PermissionRule>,
}

impl PermissionRuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule at the end of the evaluation order.
    pub fn push(&mut self, rule: PermissionRule) {
        self.rules.push(rule);
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Folds the rules into one effective mask per label.
    ///
    /// Every label named by any rule starts at zero. RESET clears that
    /// label only; ALLOW sets bits; DENY clears bits.
    #[must_use]
    pub fn fold(&self) -> BTreeMap<Label, Permission> {
        let mut masks: BTreeMap<Label, Permission> = BTreeMap::new();
        for rule in &self.rules {
            let mask = masks.entry(rule.label()).or_insert(Permission::empty());
            match rule.statement() {
                Statement::Reset => *mask = Permission::empty(),
                Statement::Allow => *mask |= rule.mask(),
                Statement::Deny => *mask &= !rule.mask(),
            }
        }
        masks
    }

    /// Folds the rules into [`LabelStatements`].
    #[must_use]
    pub fn to_statements(&self, untracked: UntrackedLabel) -> LabelStatements {
        let masks = self.fold();
        tracing::debug!(
            rules = self.rules.len(),
            labels = masks.len(),
            untracked = ?untracked,
            "folded permission rules"
        );
        LabelStatements::Rules(RuleStatements::new(masks, untracked))
    }
}

impl FromIterator<PermissionRule> for PermissionRuleSet {
    fn from_iter<I: IntoIterator<Item = PermissionRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Rules collected from several sources before ordering.
///
/// Each rule carries a *distance* from the principal: plugin-supplied
/// rules are nearest, then the principal's own rules, then rules of
/// each group it belongs to, further groups being more distant.
///
/// [`into_rule_set`](Self::into_rule_set) orders the most distant rules
/// first so that nearer rules are applied later and win. Within one
/// distance, RESET is applied first, then ALLOW, then DENY, so a DENY
/// beats an ALLOW stated at the same distance.
///
/// # Example
///
/// ```
/// use labelgate_auth::{Permission, PermissionRule, RuleList, UntrackedLabel};
/// use labelgate_types::Label;
///
/// let label = Label::new(50);
/// let mut list = RuleList::new();
/// // Everyone group may read...
/// list.push(RuleList::DISTANCE_FIRST_GROUP, PermissionRule::allow(label, Permission::READ)?);
/// // ...but this user may not
/// list.push(RuleList::DISTANCE_USER, PermissionRule::deny(label, Permission::READ)?);
///
/// let statements = list.into_rule_set().to_statements(UntrackedLabel::Neutral);
/// assert!(!statements.label_is_allowed(Permission::READ, label));
/// # Ok::<(), labelgate_auth::RuleError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<(u32, PermissionRule)>,
}

impl RuleList {
    /// Distance of rules supplied by plugins.
    pub const DISTANCE_PLUGIN_RULES: u32 = 0;
    /// Distance of the principal's own rules.
    pub const DISTANCE_USER: u32 = 1;
    /// Distance of the nearest group's rules.
    pub const DISTANCE_FIRST_GROUP: u32 = 2;

    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the given distance.
    pub fn push(&mut self, distance: u32, rule: PermissionRule) {
        self.rules.push((distance, rule));
    }

    /// Adds several rules at the same distance.
    pub fn extend(&mut self, distance: u32, rules: impl IntoIterator<Item = PermissionRule>) {
        self.rules.extend(rules.into_iter().map(|r| (distance, r)));
    }

    /// Number of rules collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Orders the collected rules for folding.
    #[must_use]
    pub fn into_rule_set(mut self) -> PermissionRuleSet {
        // Nearest and most restrictive first, then reversed. Stable, so
        // insertion order is kept (reversed) for exact ties.
        self.rules
            .sort_by_key(|(distance, rule)| (*distance, rule.statement()));
        self.rules.into_iter().rev().map(|(_, rule)| rule).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(id: u32) -> Label {
        Label::new(id)
    }

    #[test]
    fn allow_then_deny_clears_bits() {
        let set = PermissionRuleSet::from_iter([
            PermissionRule::allow(l(1), Permission::READ | Permission::UPDATE).unwrap(),
            PermissionRule::deny(l(1), Permission::UPDATE).unwrap(),
        ]);
        assert_eq!(set.fold()[&l(1)], Permission::READ);
    }

    #[test]
    fn deny_then_allow_restores_bits() {
        let set = PermissionRuleSet::from_iter([
            PermissionRule::deny(l(1), Permission::READ).unwrap(),
            PermissionRule::allow(l(1), Permission::READ).unwrap(),
        ]);
        assert_eq!(set.fold()[&l(1)], Permission::READ);
    }

    #[test]
    fn reset_clears_only_its_label() {
        let set = PermissionRuleSet::from_iter([
            PermissionRule::allow(l(1), Permission::READ).unwrap(),
            PermissionRule::allow(l(2), Permission::READ).unwrap(),
            PermissionRule::reset(l(1)).unwrap(),
            PermissionRule::allow(l(1), Permission::DELETE).unwrap(),
        ]);
        let masks = set.fold();
        assert_eq!(masks[&l(1)], Permission::DELETE);
        assert_eq!(masks[&l(2)], Permission::READ);
    }

    #[test]
    fn denied_label_is_still_tracked() {
        let set = PermissionRuleSet::from_iter([PermissionRule::deny(l(9), Permission::READ).unwrap()]);
        assert_eq!(set.fold().get(&l(9)), Some(&Permission::empty()));
    }

    #[test]
    fn rule_list_orders_distant_first() {
        let mut list = RuleList::new();
        list.push(RuleList::DISTANCE_USER, PermissionRule::allow(l(1), Permission::READ).unwrap());
        list.push(5, PermissionRule::deny(l(1), Permission::READ).unwrap());
        list.push(
            RuleList::DISTANCE_PLUGIN_RULES,
            PermissionRule::allow(l(1), Permission::DELETE).unwrap(),
        );

        let set = list.into_rule_set();
        let statements: Vec<_> = set.rules().iter().map(|r| r.statement()).collect();
        assert_eq!(
            statements,
            vec![Statement::Deny, Statement::Allow, Statement::Allow]
        );
        assert_eq!(set.fold()[&l(1)], Permission::READ | Permission::DELETE);
    }

    #[test]
    fn rule_list_deny_wins_at_same_distance() {
        let mut list = RuleList::new();
        list.push(2, PermissionRule::deny(l(1), Permission::READ).unwrap());
        list.push(2, PermissionRule::allow(l(1), Permission::READ).unwrap());

        assert_eq!(list.into_rule_set().fold()[&l(1)], Permission::empty());
    }

    #[test]
    fn rule_list_reset_at_nearer_distance_discards_groups() {
        let mut list = RuleList::new();
        list.push(3, PermissionRule::allow(l(1), Permission::READ).unwrap());
        list.push(RuleList::DISTANCE_USER, PermissionRule::reset(l(1)).unwrap());

        assert_eq!(list.into_rule_set().fold()[&l(1)], Permission::empty());
    }
}
