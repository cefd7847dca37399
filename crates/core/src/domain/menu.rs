use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound the platform puts on dropdown options, and the bound we keep
/// for roles per menu overall.
pub const MAX_MENU_ROLES: usize = 25;

/// Buttons the platform allows in a single action row.
pub const BUTTONS_PER_ROW: usize = 5;

macro_rules! string_id {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
            pub struct $name(pub String);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_owned())
                }
            }
        )+
    };
}

string_id! {
    /// Menu identifier, a UUID assigned at creation.
    MenuId,
    GuildId,
    ChannelId,
    MessageId,
    RoleId,
    UserId,
}

impl MenuId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    Dropdown,
    Button,
}

/// Where a menu's message lives once published. Both ids travel together so a
/// half-published menu is unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedLocation {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Lifecycle phase, derived from which fields are populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuPhase {
    Created,
    RolesAssigned,
    TypeAssigned,
    Published,
}

/// A named, guild-scoped collection of self-assignable roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub guild_id: GuildId,
    pub name: String,
    pub description: String,
    pub roles: Vec<RoleId>,
    pub selection_types: Vec<SelectionType>,
    pub published: Option<PublishedLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    pub fn new(guild_id: GuildId, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: MenuId::generate(),
            guild_id,
            name,
            description,
            roles: Vec::new(),
            selection_types: Vec::new(),
            published: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> MenuPhase {
        if self.published.is_some() {
            MenuPhase::Published
        } else if !self.selection_types.is_empty() {
            MenuPhase::TypeAssigned
        } else if !self.roles.is_empty() {
            MenuPhase::RolesAssigned
        } else {
            MenuPhase::Created
        }
    }

    pub fn wants(&self, selection_type: SelectionType) -> bool {
        self.selection_types.contains(&selection_type)
    }
}
