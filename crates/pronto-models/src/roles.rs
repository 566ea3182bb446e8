//! Employee roles and the capability scopes each one may activate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scopes::ScopeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Waiter,
    Chef,
    Cashier,
    System,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Waiter,
        Role::Chef,
        Role::Cashier,
        Role::System,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Waiter => "waiter",
            Self::Chef => "chef",
            Self::Cashier => "cashier",
            Self::System => "system",
        }
    }

    /// Scope tags granted by this role.
    pub const fn scope_tags(self) -> &'static [&'static str] {
        match self {
            Self::Admin => &["admin"],
            Self::Waiter => &["waiter"],
            Self::Chef => &["chef"],
            Self::Cashier => &["cashier"],
            Self::System => &["system", "admin"],
        }
    }

    /// The exact `allowed_scopes` value a row with this role must carry.
    pub fn canonical_scopes(self) -> ScopeSet {
        self.scope_tags().iter().copied().collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "waiter" => Ok(Self::Waiter),
            "chef" => Ok(Self::Chef),
            "cashier" => Ok(Self::Cashier),
            "system" => Ok(Self::System),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
