//! Coarse global policies.
//!
//! Policies are capabilities which do not depend on any object, such as
//! "may set up the system". Each [`PolicyKind`] maps to one bit of a
//! [`PolicyBitmask`].
//!
//! ```text
//! PolicyGrant (allow, deny) per principal and group
//!          │  from_grants(): OR of allows, minus OR of denies
//!          ▼
//! PolicyBitmask ── check(required) ── can(PolicyKind)
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A global capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Is a logged in user.
    NotAnonymous,
    /// May change system configuration.
    SetupSystem,
    /// May manage trust settings.
    ControlTrust,
    /// May act as another user.
    ImpersonateUser,
    /// May use recent-changes views.
    UseLatest,
    /// Must present a second-factor token.
    RequireToken,
    /// May export data in bulk.
    ExportData,
    /// May use testing tools.
    UseTestingTools,
    /// May read any stored file regardless of labels.
    ReadAnyStoredFile,
}

impl PolicyKind {
    /// Every policy with its bit, in bit order.
    pub const ALL: &'static [(PolicyKind, u32)] = &[
        (Self::NotAnonymous, PolicyBitmask::NOT_ANONYMOUS.bits()),
        (Self::SetupSystem, PolicyBitmask::SETUP_SYSTEM.bits()),
        (Self::ControlTrust, PolicyBitmask::CONTROL_TRUST.bits()),
        (Self::ImpersonateUser, PolicyBitmask::IMPERSONATE_USER.bits()),
        (Self::UseLatest, PolicyBitmask::USE_LATEST.bits()),
        (Self::RequireToken, PolicyBitmask::REQUIRE_TOKEN.bits()),
        (Self::ExportData, PolicyBitmask::EXPORT_DATA.bits()),
        (Self::UseTestingTools, PolicyBitmask::USE_TESTING_TOOLS.bits()),
        (Self::ReadAnyStoredFile, PolicyBitmask::READ_ANY_STORED_FILE.bits()),
    ];

    /// Bit representing this policy.
    #[must_use]
    pub fn bit(self) -> u32 {
        Self::ALL
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(0, |(_, bit)| *bit)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAnonymous => "not_anonymous",
            Self::SetupSystem => "setup_system",
            Self::ControlTrust => "control_trust",
            Self::ImpersonateUser => "impersonate_user",
            Self::UseLatest => "use_latest",
            Self::RequireToken => "require_token",
            Self::ExportData => "export_data",
            Self::UseTestingTools => "use_testing_tools",
            Self::ReadAnyStoredFile => "read_any_stored_file",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .map(|(kind, _)| *kind)
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown policy: {s}"))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow and deny bits from one policy record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGrant {
    /// Bits granted.
    pub allow: u32,
    /// Bits removed, overriding any allow.
    pub deny: u32,
}

/// Effective global policies of a principal.
///
/// Bits without a [`PolicyKind`] are kept, so masks stored by newer
/// versions survive a round trip.
///
/// # Example
///
/// ```
/// use labelgate_auth::{PolicyBitmask, PolicyKind};
///
/// let mask = PolicyBitmask::NOT_ANONYMOUS | PolicyBitmask::USE_LATEST;
/// assert!(mask.can(PolicyKind::UseLatest));
/// assert!(!mask.can(PolicyKind::SetupSystem));
/// assert!(PolicyBitmask::SUPER_USER.can(PolicyKind::SetupSystem));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyBitmask(u32);

bitflags! {
    impl PolicyBitmask: u32 {
        /// [`PolicyKind::NotAnonymous`].
        const NOT_ANONYMOUS        = 1 << 0;
        /// [`PolicyKind::SetupSystem`].
        const SETUP_SYSTEM         = 1 << 1;
        /// [`PolicyKind::ControlTrust`].
        const CONTROL_TRUST        = 1 << 2;
        /// [`PolicyKind::ImpersonateUser`].
        const IMPERSONATE_USER     = 1 << 3;
        /// [`PolicyKind::UseLatest`].
        const USE_LATEST           = 1 << 4;
        /// [`PolicyKind::RequireToken`].
        const REQUIRE_TOKEN        = 1 << 5;
        /// [`PolicyKind::ExportData`].
        const EXPORT_DATA          = 1 << 6;
        /// [`PolicyKind::UseTestingTools`].
        const USE_TESTING_TOOLS    = 1 << 7;
        /// [`PolicyKind::ReadAnyStoredFile`].
        const READ_ANY_STORED_FILE = 1 << 8;

        // Unassigned bits are preserved
        const _ = !0;
    }
}

impl PolicyBitmask {
    /// Every policy, present and future.
    pub const SUPER_USER: Self = Self::from_bits_retain(0x7fff_ffff);

    /// No policies.
    pub const NONE: Self = Self::empty();

    /// Wraps raw bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Bitmask for the given policies.
    #[must_use]
    pub fn of(kinds: &[PolicyKind]) -> Self {
        kinds
            .iter()
            .fold(Self::NONE, |acc, kind| acc | Self::from_bits_retain(kind.bit()))
    }

    /// Combines grants from a principal and its groups.
    ///
    /// A deny from any grant wins over an allow from any other.
    #[must_use]
    pub fn from_grants<'a>(grants: impl IntoIterator<Item = &'a PolicyGrant>) -> Self {
        let (allow, deny) = grants
            .into_iter()
            .fold((0u32, 0u32), |(a, d), g| (a | g.allow, d | g.deny));
        Self::from_bits_retain(allow) - Self::from_bits_retain(deny)
    }

    /// Are all bits of `required` present?
    #[must_use]
    pub fn check(self, required: Self) -> bool {
        self.contains(required)
    }

    /// Is the policy granted?
    #[must_use]
    pub fn can(self, kind: PolicyKind) -> bool {
        let bit = kind.bit();
        bit != 0 && self.contains(Self::from_bits_retain(bit))
    }

    /// Granted policies, in bit order.
    #[must_use]
    pub fn kinds(self) -> Vec<PolicyKind> {
        PolicyKind::ALL
            .iter()
            .filter(|(_, bit)| self.contains(Self::from_bits_retain(*bit)))
            .map(|(kind, _)| *kind)
            .collect()
    }
}
