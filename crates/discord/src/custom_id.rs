use rolecall_core::domain::menu::{MenuId, RoleId};
use rolecall_core::wizard::TypeChoice;

/// The one slash command the bot registers.
pub const DASHBOARD_COMMAND: &str = "dashboard";

/// Identifier of the wizard's creation form. Matched by equality on modal
/// submissions rather than through the (context, action) table.
pub const CREATE_MENU_MODAL: &str = "rr:modal:create";

pub const MODAL_NAME_INPUT: &str = "menu-name";
pub const MODAL_DESC_INPUT: &str = "menu-desc";

/// Routing key for interactive components, encoded as
/// `context:action[:extra[:menuId]]`. Every component the bot creates carries
/// an identifier in this grammar so future events round-trip through the
/// router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteKey {
    ReactionRolesDashboard,
    MainDashboard,
    OpenCreateWizard,
    Publish { menu_id: MenuId },
    ChooseType { choice: TypeChoice, menu_id: MenuId },
    ToggleRole { role_id: RoleId },
    SelectRoles { menu_id: MenuId },
    SyncRoles { menu_id: MenuId },
}

impl RouteKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let segments: Vec<&str> = raw.split(':').collect();
        match segments.as_slice() {
            ["dash", "reaction-roles"] => Some(Self::ReactionRolesDashboard),
            ["dash", "back"] => Some(Self::MainDashboard),
            ["rr", "create"] => Some(Self::OpenCreateWizard),
            ["rr", "publish", menu_id] => Some(Self::Publish { menu_id: MenuId::from(*menu_id) }),
            ["rr", "type", choice, menu_id] => TypeChoice::parse(choice)
                .map(|choice| Self::ChooseType { choice, menu_id: MenuId::from(*menu_id) }),
            ["rr", "assign", role_id] => {
                Some(Self::ToggleRole { role_id: RoleId::from(*role_id) })
            }
            ["rr", "select", menu_id] => {
                Some(Self::SelectRoles { menu_id: MenuId::from(*menu_id) })
            }
            ["rr", "use", menu_id] => Some(Self::SyncRoles { menu_id: MenuId::from(*menu_id) }),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::ReactionRolesDashboard => "dash:reaction-roles".to_owned(),
            Self::MainDashboard => "dash:back".to_owned(),
            Self::OpenCreateWizard => "rr:create".to_owned(),
            Self::Publish { menu_id } => format!("rr:publish:{menu_id}"),
            Self::ChooseType { choice, menu_id } => {
                format!("rr:type:{}:{menu_id}", choice.token())
            }
            Self::ToggleRole { role_id } => format!("rr:assign:{role_id}"),
            Self::SelectRoles { menu_id } => format!("rr:select:{menu_id}"),
            Self::SyncRoles { menu_id } => format!("rr:use:{menu_id}"),
        }
    }
}
