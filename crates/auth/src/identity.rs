use serde::{Deserialize, Serialize};

use storefront_core::UserId;

use crate::Role;

/// Identity attached to a request.
///
/// Unauthenticated requests are an explicit `Guest` variant, not a role value:
/// code that needs a user id must go through [`Identity::user_id`] and handle
/// absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// No authenticated user (guest checkout, public reads).
    Guest,
    /// An authenticated user with an explicit role.
    User { user_id: UserId, role: Role },
}

impl Identity {
    pub fn user(user_id: UserId, role: Role) -> Self {
        Self::User { user_id, role }
    }

    pub fn customer(user_id: UserId) -> Self {
        Self::User {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::User {
            user_id,
            role: Role::Admin,
        }
    }

    /// The authenticated user id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Guest => None,
            Identity::User { user_id, .. } => Some(*user_id),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Identity::Guest => None,
            Identity::User { role, .. } => Some(*role),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Identity::User {
                role: Role::Admin,
                ..
            }
        )
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }
}
