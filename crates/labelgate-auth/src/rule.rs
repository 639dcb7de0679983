//! Permission rules.
//!
//! A [`PermissionRule`] states that a principal is allowed or denied a
//! set of operations on objects carrying a label, or resets whatever
//! was accumulated for that label so far.

use crate::{Permission, RuleError};
use labelgate_types::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction within a permission rule.
///
/// The numeric codes match the persisted rule format: lower codes take
/// precedence when rules are ordered within one distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Remove the permissions from the label.
    Deny,
    /// Grant the permissions on the label.
    Allow,
    /// Clear everything accumulated for the label.
    Reset,
}

impl Statement {
    /// Persisted numeric code.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Deny => 0,
            Self::Allow => 1,
            Self::Reset => 2,
        }
    }

    /// Decodes a persisted numeric code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Deny),
            1 => Some(Self::Allow),
            2 => Some(Self::Reset),
            _ => None,
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "deny",
            Self::Allow => "allow",
            Self::Reset => "reset",
        }
    }
}

impl FromStr for Statement {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "allow" => Ok(Self::Allow),
            "reset" => Ok(Self::Reset),
            _ => Err(RuleError::UnknownStatement(s.to_string())),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `(label, statement, mask)` rule.
///
/// # Example
///
/// ```
/// use labelgate_auth::{Permission, PermissionRule, Statement};
/// use labelgate_types::Label;
///
/// let rule = PermissionRule::new(Label::new(10), Statement::Allow, Permission::READ)?;
/// assert_eq!(rule.statement(), Statement::Allow);
///
/// // An ALLOW or DENY rule must name at least one operation
/// assert!(PermissionRule::new(Label::new(10), Statement::Deny, Permission::empty()).is_err());
/// # Ok::<(), labelgate_auth::RuleError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRule {
    label: Label,
    statement: Statement,
    mask: Permission,
}

impl PermissionRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] if the label is zero, or an
    /// ALLOW/DENY rule has an empty mask.
    pub fn new(label: Label, statement: Statement, mask: Permission) -> Result<Self, RuleError> {
        if label.get() == 0 {
            return Err(RuleError::invalid(
                0,
                statement.code(),
                mask.bits(),
                "label must be positive",
            ));
        }
        if mask.is_empty() && statement != Statement::Reset {
            return Err(RuleError::invalid(
                i64::from(label.get()),
                statement.code(),
                mask.bits(),
                "mask must name at least one operation",
            ));
        }
        Ok(Self {
            label,
            statement,
            mask,
        })
    }

    /// Shorthand for an ALLOW rule.
    ///
    /// # Errors
    ///
    /// See [`PermissionRule::new`].
    pub fn allow(label: Label, mask: Permission) -> Result<Self, RuleError> {
        Self::new(label, Statement::Allow, mask)
    }

    /// Shorthand for a DENY rule.
    ///
    /// # Errors
    ///
    /// See [`PermissionRule::new`].
    pub fn deny(label: Label, mask: Permission) -> Result<Self, RuleError> {
        Self::new(label, Statement::Deny, mask)
    }

    /// Shorthand for a RESET rule.
    ///
    /// # Errors
    ///
    /// See [`PermissionRule::new`].
    pub fn reset(label: Label) -> Result<Self, RuleError> {
        Self::new(label, Statement::Reset, Permission::empty())
    }

    /// The label this rule applies to.
    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    /// The rule's statement.
    #[must_use]
    pub fn statement(&self) -> Statement {
        self.statement
    }

    /// The operations the rule names.
    #[must_use]
    pub fn mask(&self) -> Permission {
        self.mask
    }
}

impl fmt::Display for PermissionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.statement, self.mask, self.label)
    }
}

/// A rule as received from an untrusted source, such as a plugin.
///
/// Nothing about it is trusted until [`RawRule::validate`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    /// Label id; must fit a positive `u32`.
    pub label: i64,
    /// Statement code (0 = deny, 1 = allow, 2 = reset).
    pub statement: i64,
    /// Permission bits.
    pub permissions: u32,
}

impl RawRule {
    /// Validates against the set of active permission bits.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] identifying the label,
    /// statement and mask if any part is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use labelgate_auth::{Permission, RawRule};
    ///
    /// let ok = RawRule { label: 40, statement: 1, permissions: 0b1 };
    /// assert!(ok.validate(Permission::ACTIVE).is_ok());
    ///
    /// let unknown_bit = RawRule { label: 40, statement: 1, permissions: 1 << 20 };
    /// assert!(unknown_bit.validate(Permission::ACTIVE).is_err());
    /// ```
    pub fn validate(&self, active: Permission) -> Result<PermissionRule, RuleError> {
        let fail = |reason: &str| {
            RuleError::invalid(self.label, self.statement, self.permissions, reason)
        };

        let label = u32::try_from(self.label)
            .ok()
            .filter(|l| *l > 0)
            .map(Label::new)
            .ok_or_else(|| fail("label must be a positive 32-bit id"))?;

        let statement = Statement::from_code(self.statement)
            .ok_or_else(|| fail("unknown statement code"))?;

        if self.permissions & !active.bits() != 0 {
            return Err(fail("mask sets inactive permission bits"));
        }
        if self.permissions & active.bits() == 0 {
            return Err(fail("mask must name at least one operation"));
        }
        let mask = Permission::from_bits_truncate(self.permissions);

        PermissionRule::new(label, statement, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_codes_roundtrip() {
        for s in [Statement::Deny, Statement::Allow, Statement::Reset] {
            assert_eq!(Statement::from_code(s.code()), Some(s));
            assert_eq!(s.as_str().parse::<Statement>().expect("parse"), s);
        }
        assert_eq!(Statement::from_code(3), None);
        assert!("permit".parse::<Statement>().is_err());
    }

    #[test]
    fn deny_sorts_before_allow_before_reset() {
        assert!(Statement::Deny < Statement::Allow);
        assert!(Statement::Allow < Statement::Reset);
    }

    #[test]
    fn zero_label_rejected() {
        let err = PermissionRule::allow(Label::new(0), Permission::READ).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn reset_needs_no_mask() {
        let rule = PermissionRule::reset(Label::new(3)).expect("valid reset");
        assert_eq!(rule.statement(), Statement::Reset);
        assert!(rule.mask().is_empty());
    }

    #[test]
    fn raw_rule_rejects_bad_label() {
        for label in [0, -1, i64::from(u32::MAX) + 1] {
            let raw = RawRule {
                label,
                statement: 1,
                permissions: 1,
            };
            let err = raw.validate(Permission::ACTIVE).unwrap_err();
            assert!(
                matches!(err, RuleError::InvalidRule { label: l, .. } if l == label),
                "label {label}: {err}"
            );
        }
    }

    #[test]
    fn raw_rule_rejects_unknown_statement() {
        let raw = RawRule {
            label: 5,
            statement: 7,
            permissions: 1,
        };
        let err = raw.validate(Permission::ACTIVE).unwrap_err();
        assert!(err.to_string().contains("statement=7"));
    }

    #[test]
    fn raw_rule_rejects_empty_or_inactive_mask() {
        let empty = RawRule {
            label: 5,
            statement: 0,
            permissions: 0,
        };
        assert!(empty.validate(Permission::ACTIVE).is_err());

        let inactive = RawRule {
            label: 5,
            statement: 0,
            permissions: Permission::UPDATE.bits(),
        };
        assert!(inactive.validate(Permission::READ).is_err());
    }

    #[test]
    fn raw_rule_validates() {
        let raw = RawRule {
            label: 77,
            statement: 0,
            permissions: (Permission::READ | Permission::DELETE).bits(),
        };
        let rule = raw.validate(Permission::ACTIVE).expect("valid");
        assert_eq!(rule.label(), Label::new(77));
        assert_eq!(rule.statement(), Statement::Deny);
        assert_eq!(rule.mask(), Permission::READ | Permission::DELETE);
    }

    #[test]
    fn raw_rule_deserializes() {
        let raw: RawRule =
            serde_json::from_str(r#"{"label": 12, "statement": 2, "permissions": 3}"#)
                .expect("deserialize");
        assert_eq!(raw.statement, 2);
    }
}
