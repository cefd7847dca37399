use serde::{Deserialize, Serialize};

use crate::domain::menu::{RoleId, MAX_MENU_ROLES};

/// A guild role as reported by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRole {
    pub id: RoleId,
    pub name: String,
    /// Owned by an integration (bot roles, boosts); cannot be self-assigned.
    pub managed: bool,
    /// The guild's default @everyone role.
    pub is_default: bool,
}

impl GuildRole {
    pub fn is_eligible(&self) -> bool {
        !self.managed && !self.is_default
    }
}

/// Roles an operator may put in a menu: non-managed, non-default, capped at
/// the dropdown option limit.
pub fn eligible_menu_roles(roles: Vec<GuildRole>) -> Vec<GuildRole> {
    let mut eligible: Vec<GuildRole> = roles.into_iter().filter(GuildRole::is_eligible).collect();
    eligible.truncate(MAX_MENU_ROLES);
    eligible
}
