//! Permission tiers.
//!
//! Codes are assigned in declaration order starting at 1, so `Admin`
//! sits numerically between `Root` and `User`. The codes carry no
//! privilege ordering: `Tier` deliberately has no `PartialOrd`, and the
//! only authorization predicate is [`is_admin`], an exact match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    /// Reserved. Never granted nor checked.
    Root,
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown permission tier code: {0}")]
pub struct UnknownTier(pub u8);

impl Tier {
    /// Wire code of this tier (`perms` claim / record field).
    pub const fn code(self) -> u8 {
        match self {
            Tier::Root => 1,
            Tier::Admin => 2,
            Tier::User => 3,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Tier::Root),
            2 => Some(Tier::Admin),
            3 => Some(Tier::User),
            _ => None,
        }
    }
}

/// `true` only for the exact `Admin` code.
pub const fn is_admin(code: u8) -> bool {
    code == Tier::Admin.code()
}

impl TryFrom<u8> for Tier {
    type Error = UnknownTier;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Tier::from_code(code).ok_or(UnknownTier(code))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.code()
    }
}
