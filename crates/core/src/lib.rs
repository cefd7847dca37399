pub mod config;
pub mod domain;
pub mod errors;
pub mod sync;
pub mod wizard;

pub use domain::menu::{
    ChannelId, GuildId, Menu, MenuId, MenuPhase, MessageId, PublishedLocation, RoleId,
    SelectionType, UserId, BUTTONS_PER_ROW, MAX_MENU_ROLES,
};
pub use domain::role::{eligible_menu_roles, GuildRole};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use sync::{plan_sync, plan_toggle, SyncPlan, ToggleAction};
pub use wizard::{
    MenuWizard, TransitionOutcome, TypeChoice, WizardAction, WizardContext, WizardEvent,
    WizardTransitionError,
};
