//! Per-label operation permissions.
//!
//! Defines the operations a permission rule can grant or deny on a
//! labelled object. One bit per operation kind.
//!
//! # Example
//!
//! ```
//! use labelgate_auth::Permission;
//!
//! let mask = Permission::READ | Permission::UPDATE;
//! assert!(mask.contains(Permission::READ));
//! assert!(!mask.contains(Permission::DELETE));
//!
//! assert_eq!(Permission::parse("relabel"), Some(Permission::RELABEL));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Operations gated by label permission rules.
    ///
    /// | Permission | Operations |
    /// |------------|------------|
    /// | [`READ`](Self::READ) | view the object, find it in searches |
    /// | [`CREATE`](Self::CREATE) | create an object with these labels |
    /// | [`UPDATE`](Self::UPDATE) | edit the object, view its history |
    /// | [`RELABEL`](Self::RELABEL) | change the object's labels |
    /// | [`DELETE`](Self::DELETE) | delete the object |
    /// | [`APPROVE`](Self::APPROVE) | approve workflow transitions |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permission: u32 {
        /// Read the object.
        const READ    = 1 << 0;
        /// Create an object carrying the label.
        const CREATE  = 1 << 1;
        /// Update the object.
        const UPDATE  = 1 << 2;
        /// Change labels on the object.
        const RELABEL = 1 << 3;
        /// Delete the object.
        const DELETE  = 1 << 4;
        /// Approve workflow transitions.
        const APPROVE = 1 << 5;
    }
}

impl Permission {
    /// Bits which are currently defined. Rules from untrusted sources
    /// must not set any other bit.
    pub const ACTIVE: Self = Self::all();

    /// Every operation, in bit order, with its canonical name.
    pub const NAMED: &'static [(&'static str, Self)] = &[
        ("read", Self::READ),
        ("create", Self::CREATE),
        ("update", Self::UPDATE),
        ("relabel", Self::RELABEL),
        ("delete", Self::DELETE),
        ("approve", Self::APPROVE),
    ];

    /// Returns the names of the set operations, in bit order.
    ///
    /// # Example
    ///
    /// ```
    /// use labelgate_auth::Permission;
    ///
    /// let names = (Permission::DELETE | Permission::READ).names();
    /// assert_eq!(names, vec!["read", "delete"]);
    /// ```
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, bit)| self.contains(*bit))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Parses an operation name (case-insensitive). `"all"` is accepted.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower == "all" {
            return Some(Self::ACTIVE);
        }
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, bit)| *bit)
    }

    /// Parses a list of operation names into a combined mask.
    ///
    /// Returns the combined mask and the names which were not recognised.
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        let mut mask = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::parse(name) {
                Some(p) => mask |= p,
                None => unknown.push(*name),
            }
        }
        (mask, unknown)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_contains_every_operation() {
        for (_, bit) in Permission::NAMED {
            assert!(Permission::ACTIVE.contains(*bit));
        }
        assert_eq!(Permission::NAMED.len(), 6);
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(Permission::parse("READ"), Some(Permission::READ));
        assert_eq!(Permission::parse("Update"), Some(Permission::UPDATE));
        assert_eq!(Permission::parse("all"), Some(Permission::ACTIVE));
        assert_eq!(Permission::parse("write"), None);
        assert_eq!(Permission::parse(""), None);
    }

    #[test]
    fn parse_list_reports_unknown() {
        let (mask, unknown) = Permission::parse_list(&["read", "bad", "delete"]);
        assert_eq!(mask, Permission::READ | Permission::DELETE);
        assert_eq!(unknown, vec!["bad"]);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(Permission::READ.to_string(), "read");
        assert_eq!(
            (Permission::READ | Permission::CREATE).to_string(),
            "read | create"
        );
        assert_eq!(Permission::empty().to_string(), "(none)");
    }

    #[test]
    fn serde_roundtrip() {
        let mask = Permission::READ | Permission::RELABEL;
        let json = serde_json::to_string(&mask).expect("serialize");
        let parsed: Permission = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, mask);
    }
}
