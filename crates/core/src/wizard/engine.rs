use std::collections::HashSet;

use thiserror::Error;

use crate::domain::menu::{MenuPhase, RoleId, MAX_MENU_ROLES};
use crate::wizard::states::{TransitionOutcome, WizardAction, WizardContext, WizardEvent};

/// The menu-creation wizard. One fixed progression: create, pick roles, pick
/// a selection type, publish. Transitions are pure; callers persist the
/// matching partial update only after a transition is accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct MenuWizard;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardTransitionError {
    #[error("pick at least one role for the menu")]
    EmptyRoleSelection,
    #[error("a menu can hold at most {limit} roles, got {count}")]
    TooManyRoles { count: usize, limit: usize },
    #[error("the role selection contains the same role twice")]
    DuplicateRoles,
    #[error("pick at least one selection type")]
    EmptyTypeSelection,
    #[error("invalid transition from {phase:?} using event {event:?}")]
    InvalidTransition { phase: MenuPhase, event: WizardEvent },
}

impl MenuWizard {
    pub fn initial_phase(&self) -> MenuPhase {
        MenuPhase::Created
    }

    pub fn apply(
        &self,
        current: &MenuPhase,
        event: &WizardEvent,
        context: &WizardContext,
    ) -> Result<TransitionOutcome, WizardTransitionError> {
        use MenuPhase::{Created, Published, RolesAssigned, TypeAssigned};
        use WizardAction::{DeliverMenuMessage, PromptPublishControls, PromptTypeSelection};
        use WizardEvent::{PublishRequested, RolesSubmitted, TypeChosen};

        let (to, actions) = match (current, event) {
            // Re-entry from RolesAssigned lets the operator adjust the
            // selection before moving on.
            (Created, RolesSubmitted) | (RolesAssigned, RolesSubmitted) => {
                validate_role_selection(&context.submitted_roles)?;
                (RolesAssigned, vec![PromptTypeSelection])
            }
            (RolesAssigned, TypeChosen) | (TypeAssigned, TypeChosen) => {
                if context.resolved_types.is_empty() {
                    return Err(WizardTransitionError::EmptyTypeSelection);
                }
                (TypeAssigned, vec![PromptPublishControls])
            }
            // Republishing an already-published menu is allowed and
            // overwrites the stored message location.
            (TypeAssigned, PublishRequested) | (Published, PublishRequested) => {
                (Published, vec![DeliverMenuMessage])
            }
            _ => {
                return Err(WizardTransitionError::InvalidTransition {
                    phase: *current,
                    event: event.clone(),
                });
            }
        };

        Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
    }
}

fn validate_role_selection(roles: &[RoleId]) -> Result<(), WizardTransitionError> {
    if roles.is_empty() {
        return Err(WizardTransitionError::EmptyRoleSelection);
    }
    if roles.len() > MAX_MENU_ROLES {
        return Err(WizardTransitionError::TooManyRoles {
            count: roles.len(),
            limit: MAX_MENU_ROLES,
        });
    }
    let distinct: HashSet<&RoleId> = roles.iter().collect();
    if distinct.len() != roles.len() {
        return Err(WizardTransitionError::DuplicateRoles);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MenuWizard, WizardTransitionError};
    use crate::domain::menu::{MenuPhase, RoleId, SelectionType};
    use crate::wizard::states::{WizardAction, WizardContext, WizardEvent};

    fn roles(ids: &[&str]) -> Vec<RoleId> {
        ids.iter().map(|id| RoleId::from(*id)).collect()
    }

    fn roles_context(ids: &[&str]) -> WizardContext {
        WizardContext { submitted_roles: roles(ids), ..WizardContext::default() }
    }

    fn types_context(types: Vec<SelectionType>) -> WizardContext {
        WizardContext { resolved_types: types, ..WizardContext::default() }
    }

    #[test]
    fn wizard_happy_path_reaches_published() {
        let wizard = MenuWizard;
        let mut phase = wizard.initial_phase();

        let outcome = wizard
            .apply(&phase, &WizardEvent::RolesSubmitted, &roles_context(&["R1", "R2"]))
            .expect("created -> roles assigned");
        assert_eq!(outcome.to, MenuPhase::RolesAssigned);
        assert_eq!(outcome.actions, vec![WizardAction::PromptTypeSelection]);
        phase = outcome.to;

        let outcome = wizard
            .apply(
                &phase,
                &WizardEvent::TypeChosen,
                &types_context(vec![SelectionType::Dropdown, SelectionType::Button]),
            )
            .expect("roles assigned -> type assigned");
        assert_eq!(outcome.to, MenuPhase::TypeAssigned);
        assert_eq!(outcome.actions, vec![WizardAction::PromptPublishControls]);
        phase = outcome.to;

        let outcome = wizard
            .apply(&phase, &WizardEvent::PublishRequested, &WizardContext::default())
            .expect("type assigned -> published");
        assert_eq!(outcome.to, MenuPhase::Published);
        assert_eq!(outcome.actions, vec![WizardAction::DeliverMenuMessage]);
    }

    #[test]
    fn role_selection_can_be_adjusted_before_moving_on() {
        let wizard = MenuWizard;
        let outcome = wizard
            .apply(
                &MenuPhase::RolesAssigned,
                &WizardEvent::RolesSubmitted,
                &roles_context(&["R3"]),
            )
            .expect("re-submission from roles assigned");
        assert_eq!(outcome.to, MenuPhase::RolesAssigned);
    }

    #[test]
    fn republish_is_a_legal_transition() {
        let wizard = MenuWizard;
        let outcome = wizard
            .apply(&MenuPhase::Published, &WizardEvent::PublishRequested, &WizardContext::default())
            .expect("republish");
        assert_eq!(outcome.to, MenuPhase::Published);
    }

    #[test]
    fn empty_role_selection_is_rejected() {
        let wizard = MenuWizard;
        let error = wizard
            .apply(&MenuPhase::Created, &WizardEvent::RolesSubmitted, &roles_context(&[]))
            .expect_err("empty selection must be rejected");
        assert_eq!(error, WizardTransitionError::EmptyRoleSelection);
    }

    #[test]
    fn oversized_role_selection_is_rejected() {
        let wizard = MenuWizard;
        let ids: Vec<String> = (0..26).map(|n| format!("R{n}")).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let error = wizard
            .apply(&MenuPhase::Created, &WizardEvent::RolesSubmitted, &roles_context(&ids))
            .expect_err("26 roles must be rejected");
        assert_eq!(error, WizardTransitionError::TooManyRoles { count: 26, limit: 25 });
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let wizard = MenuWizard;
        let error = wizard
            .apply(
                &MenuPhase::Created,
                &WizardEvent::RolesSubmitted,
                &roles_context(&["R1", "R1"]),
            )
            .expect_err("duplicates must be rejected");
        assert_eq!(error, WizardTransitionError::DuplicateRoles);
    }

    #[test]
    fn publishing_before_type_selection_is_rejected() {
        let wizard = MenuWizard;
        let error = wizard
            .apply(
                &MenuPhase::RolesAssigned,
                &WizardEvent::PublishRequested,
                &WizardContext::default(),
            )
            .expect_err("publish from roles assigned is invalid");
        assert!(matches!(
            error,
            WizardTransitionError::InvalidTransition {
                phase: MenuPhase::RolesAssigned,
                event: WizardEvent::PublishRequested,
            }
        ));
    }

    #[test]
    fn replay_is_deterministic_for_the_same_event_sequence() {
        let wizard = MenuWizard;
        let steps = [
            (WizardEvent::RolesSubmitted, roles_context(&["R1"])),
            (WizardEvent::TypeChosen, types_context(vec![SelectionType::Button])),
            (WizardEvent::PublishRequested, WizardContext::default()),
        ];

        let run = || {
            let mut phase = wizard.initial_phase();
            let mut actions = Vec::new();
            for (event, context) in &steps {
                let outcome = wizard.apply(&phase, event, context).expect("deterministic run");
                actions.push(outcome.actions);
                phase = outcome.to;
            }
            (phase, actions)
        };

        assert_eq!(run(), run());
    }
}
