//! Permission engine
//!
//! Pure decisions about whether an acting identity may mutate a target
//! identity. Nothing here touches the store.

use datapolis_db::UpdateUser;
use datapolis_types::{Identity, Role, UserId};

use crate::token::AccessClaims;
use crate::AuthError;

/// The authenticated identity performing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the actor and the target are the same identity
    pub fn is_self(&self, target: UserId) -> bool {
        self.user_id == target
    }
}

impl From<AccessClaims> for Actor {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: UserId(claims.user_id),
            username: claims.username,
            role: claims.role,
        }
    }
}

impl From<Identity> for Actor {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.id,
            username: identity.username,
            role: identity.role,
        }
    }
}

/// Admins may update anyone; everyone else only themselves
pub fn can_update(actor: &Actor, target: UserId) -> bool {
    actor.is_admin() || actor.is_self(target)
}

/// Same rule as [`can_update`], as an error
pub fn ensure_can_update(actor: &Actor, target: UserId) -> Result<(), AuthError> {
    if can_update(actor, target) {
        Ok(())
    } else {
        tracing::debug!(actor = %actor.user_id, target = %target, "Update denied");
        Err(AuthError::NoPermission)
    }
}

/// Neutralize a self role change by a non-admin
///
/// The proposed role is overwritten with `current_role` rather than
/// rejected. Admins and updates of other users pass through unchanged.
pub fn authorize_role_change(
    actor: &Actor,
    target: UserId,
    current_role: Role,
    mut proposed: UpdateUser,
) -> UpdateUser {
    if !actor.is_admin() && actor.is_self(target) && proposed.role != current_role {
        tracing::warn!(
            user_id = %actor.user_id,
            attempted = %proposed.role,
            "Blocked self role change"
        );
        proposed.role = current_role;
    }
    proposed
}

/// Nobody may deactivate their own account, admins included
pub fn authorize_deactivation(
    actor: &Actor,
    target: UserId,
    proposed_active: bool,
) -> Result<(), AuthError> {
    if actor.is_self(target) && !proposed_active {
        tracing::warn!(user_id = %actor.user_id, "Blocked self deactivation");
        return Err(AuthError::CannotDeactivateSelf);
    }
    Ok(())
}
