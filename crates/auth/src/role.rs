use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::DomainError;

/// Role of an authenticated user.
///
/// The set is closed: a request either carries one of these roles or carries
/// no identity at all ([`crate::Identity::Guest`]). Guests are never given a
/// role value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
