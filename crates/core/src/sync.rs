//! Pure planning for member-role reconciliation. The platform-facing half
//! that actually mutates roles lives with the gateway; everything here is
//! deterministic set arithmetic over the menu's role list.

use serde::{Deserialize, Serialize};

use crate::domain::menu::RoleId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleAction {
    Add,
    Remove,
}

/// Flip a single role: remove it if the member holds it, add it otherwise.
/// No other role is inspected.
pub fn plan_toggle(member_roles: &[RoleId], role: &RoleId) -> ToggleAction {
    if member_roles.contains(role) {
        ToggleAction::Remove
    } else {
        ToggleAction::Add
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub to_add: Vec<RoleId>,
    pub to_remove: Vec<RoleId>,
}

impl SyncPlan {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Symmetric difference between the member's held roles and the desired
/// subset, restricted to the menu's role set. Walks the menu's roles once, in
/// menu order; desired entries outside the menu and roles outside the menu
/// are never touched.
pub fn plan_sync(menu_roles: &[RoleId], member_roles: &[RoleId], desired: &[RoleId]) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for role in menu_roles {
        let held = member_roles.contains(role);
        let wanted = desired.contains(role);
        match (held, wanted) {
            (false, true) => plan.to_add.push(role.clone()),
            (true, false) => plan.to_remove.push(role.clone()),
            _ => {}
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::{plan_sync, plan_toggle, SyncPlan, ToggleAction};
    use crate::domain::menu::RoleId;

    fn ids(names: &[&str]) -> Vec<RoleId> {
        names.iter().map(|name| RoleId::from(*name)).collect()
    }

    #[test]
    fn toggle_adds_when_absent_and_removes_when_held() {
        let held = ids(&["R1", "R2"]);
        assert_eq!(plan_toggle(&held, &RoleId::from("R3")), ToggleAction::Add);
        assert_eq!(plan_toggle(&held, &RoleId::from("R2")), ToggleAction::Remove);
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut held = ids(&["R1"]);
        let role = RoleId::from("R5");

        assert_eq!(plan_toggle(&held, &role), ToggleAction::Add);
        held.push(role.clone());
        assert_eq!(plan_toggle(&held, &role), ToggleAction::Remove);
        held.retain(|r| r != &role);
        assert_eq!(held, ids(&["R1"]));
    }

    #[test]
    fn sync_computes_the_symmetric_difference_over_menu_roles() {
        let menu = ids(&["R1", "R2", "R3"]);
        let held = ids(&["R1", "X9"]);
        let desired = ids(&["R2", "R3"]);

        let plan = plan_sync(&menu, &held, &desired);

        assert_eq!(plan.to_add, ids(&["R2", "R3"]));
        assert_eq!(plan.to_remove, ids(&["R1"]));
    }

    #[test]
    fn sync_never_touches_roles_outside_the_menu() {
        let menu = ids(&["R1"]);
        let held = ids(&["X1", "X2"]);
        let desired = ids(&["R1", "X3"]);

        let plan = plan_sync(&menu, &held, &desired);

        assert_eq!(plan.to_add, ids(&["R1"]));
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn sync_is_idempotent_once_applied() {
        let menu = ids(&["R1", "R2", "R3"]);
        let desired = ids(&["R2", "R3"]);
        let first = plan_sync(&menu, &ids(&["R1"]), &desired);

        // Apply the first plan to the member's roles.
        let mut held = ids(&["R1"]);
        held.retain(|role| !first.to_remove.contains(role));
        held.extend(first.to_add.clone());

        let second = plan_sync(&menu, &held, &desired);
        assert!(second.is_noop());
        assert_eq!(second, SyncPlan::default());
    }

    #[test]
    fn roles_neither_held_nor_desired_stay_untouched() {
        let plan = plan_sync(&ids(&["R1", "R2"]), &ids(&["R1"]), &ids(&["R1"]));
        assert!(plan.is_noop());
    }
}
