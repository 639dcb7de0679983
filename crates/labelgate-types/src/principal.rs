//! Principal (actor identity) types.
//!
//! A [`Principal`] is identity only. What it may do is decided by the
//! permission rules loaded for it, not by this type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a user or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(u32);

impl PrincipalId {
    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The actor subject to permission rules.
///
/// | Variant | Description |
/// |---------|-------------|
/// | `User` | An authenticated user |
/// | `Group` | A group; its rules are inherited by members |
/// | `System` | Internal operations; their policies are built from super-user statements (`UserPolicy::super_user`) |
///
/// # Example
///
/// ```
/// use labelgate_types::{Principal, PrincipalId};
///
/// let user = Principal::User(PrincipalId::new(41));
/// assert!(user.is_user());
/// assert_eq!(user.id(), Some(PrincipalId::new(41)));
///
/// assert!(Principal::System.is_system());
/// assert_eq!(Principal::System.id(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// A user.
    User(PrincipalId),
    /// A group of users.
    Group(PrincipalId),
    /// System internal operations.
    System,
}

impl Principal {
    /// Returns `true` if this is a [`Principal::User`].
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Returns `true` if this is a [`Principal::Group`].
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Returns `true` if this is [`Principal::System`].
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns the user or group id, or `None` for the system principal.
    #[must_use]
    pub fn id(&self) -> Option<PrincipalId> {
        match self {
            Self::User(id) | Self::Group(id) => Some(*id),
            Self::System => None,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
            Self::System => write!(f, "system"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        let user = Principal::User(PrincipalId::new(1));
        let group = Principal::Group(PrincipalId::new(2));

        assert!(user.is_user() && !user.is_group() && !user.is_system());
        assert!(group.is_group() && !group.is_user());
        assert!(Principal::System.is_system());
    }

    #[test]
    fn display() {
        assert_eq!(Principal::User(PrincipalId::new(5)).to_string(), "user:5");
        assert_eq!(Principal::Group(PrincipalId::new(6)).to_string(), "group:6");
        assert_eq!(Principal::System.to_string(), "system");
    }

    #[test]
    fn serde_roundtrip() {
        let p = Principal::Group(PrincipalId::new(21));
        let json = serde_json::to_string(&p).expect("serialize");
        let parsed: Principal = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, p);
    }
}
