use serde::{Deserialize, Serialize};

use crate::domain::menu::{MenuPhase, RoleId, SelectionType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    RolesSubmitted,
    TypeChosen,
    PublishRequested,
}

/// Payload accompanying an event: the submitted selection for
/// `RolesSubmitted`, the resolved type set for `TypeChosen`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardContext {
    pub submitted_roles: Vec<RoleId>,
    pub resolved_types: Vec<SelectionType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardAction {
    PromptTypeSelection,
    PromptPublishControls,
    DeliverMenuMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: MenuPhase,
    pub to: MenuPhase,
    pub event: WizardEvent,
    pub actions: Vec<WizardAction>,
}

/// The token a type button carries on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeChoice {
    Dropdown,
    Button,
    Both,
}

impl TypeChoice {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "dropdown" => Some(Self::Dropdown),
            "button" => Some(Self::Button),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Dropdown => "dropdown",
            Self::Button => "button",
            Self::Both => "both",
        }
    }

    pub fn resolve(&self) -> Vec<SelectionType> {
        match self {
            Self::Dropdown => vec![SelectionType::Dropdown],
            Self::Button => vec![SelectionType::Button],
            Self::Both => vec![SelectionType::Dropdown, SelectionType::Button],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeChoice;
    use crate::domain::menu::SelectionType;

    #[test]
    fn both_resolves_to_the_full_type_set() {
        assert_eq!(
            TypeChoice::Both.resolve(),
            vec![SelectionType::Dropdown, SelectionType::Button]
        );
    }

    #[test]
    fn single_tokens_resolve_to_singletons() {
        assert_eq!(TypeChoice::Dropdown.resolve(), vec![SelectionType::Dropdown]);
        assert_eq!(TypeChoice::Button.resolve(), vec![SelectionType::Button]);
    }

    #[test]
    fn tokens_round_trip_through_parse() {
        for choice in [TypeChoice::Dropdown, TypeChoice::Button, TypeChoice::Both] {
            assert_eq!(TypeChoice::parse(choice.token()), Some(choice));
        }
        assert_eq!(TypeChoice::parse("menu"), None);
    }
}
