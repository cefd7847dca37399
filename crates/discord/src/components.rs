use serde::Serialize;

use rolecall_core::domain::menu::{Menu, MenuId, MenuPhase, RoleId, SelectionType, BUTTONS_PER_ROW};
use rolecall_core::domain::role::GuildRole;
use rolecall_core::sync::ToggleAction;
use rolecall_core::wizard::TypeChoice;

use crate::custom_id::{RouteKey, CREATE_MENU_MODAL, MODAL_DESC_INPUT, MODAL_NAME_INPUT};
use crate::roles::{SyncReport, ToggleReport};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { custom_id: custom_id.into(), label: label.into(), style: ButtonStyle::Secondary }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectMenu {
    pub custom_id: String,
    pub placeholder: String,
    pub min_values: u8,
    pub max_values: u8,
    pub options: Vec<SelectOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRow {
    Buttons { components: Vec<Button> },
    Select { component: SelectMenu },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub content: String,
    pub embeds: Vec<Embed>,
    pub components: Vec<ActionRow>,
    pub ephemeral: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextInput {
    pub custom_id: String,
    pub label: String,
    pub paragraph: bool,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalPrompt {
    pub custom_id: String,
    pub title: String,
    pub inputs: Vec<TextInput>,
}

pub struct MessageBuilder {
    content: String,
    embeds: Vec<Embed>,
    components: Vec<ActionRow>,
    ephemeral: bool,
}

impl MessageBuilder {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), embeds: Vec::new(), components: Vec::new(), ephemeral: false }
    }

    pub fn embed(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.embeds.push(Embed { title: title.into(), description: description.into() });
        self
    }

    pub fn buttons<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut ButtonsBuilder),
    {
        let mut builder = ButtonsBuilder::default();
        build(&mut builder);
        self.components.push(ActionRow::Buttons { components: builder.build() });
        self
    }

    pub fn select(mut self, component: SelectMenu) -> Self {
        self.components.push(ActionRow::Select { component });
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn build(self) -> MessagePayload {
        MessagePayload {
            content: self.content,
            embeds: self.embeds,
            components: self.components,
            ephemeral: self.ephemeral,
        }
    }
}

#[derive(Default)]
pub struct ButtonsBuilder {
    elements: Vec<Button>,
}

impl ButtonsBuilder {
    pub fn button(&mut self, button: Button) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<Button> {
        self.elements
    }
}

/// Pack buttons into action rows of at most five, covering every button.
pub fn button_rows(buttons: Vec<Button>) -> Vec<ActionRow> {
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| ActionRow::Buttons { components: chunk.to_vec() })
        .collect()
}

fn role_mention(role_id: &RoleId) -> String {
    format!("<@&{role_id}>")
}

fn role_label(guild_roles: &[GuildRole], role_id: &RoleId) -> String {
    guild_roles
        .iter()
        .find(|role| &role.id == role_id)
        .map(|role| role.name.clone())
        .unwrap_or_else(|| role_id.0.clone())
}

fn phase_label(phase: MenuPhase) -> &'static str {
    match phase {
        MenuPhase::Created => "draft",
        MenuPhase::RolesAssigned => "roles selected",
        MenuPhase::TypeAssigned => "ready to publish",
        MenuPhase::Published => "published",
    }
}

pub fn main_dashboard_message() -> MessagePayload {
    MessageBuilder::new("Server dashboard")
        .embed("Dashboard", "Manage this server's bot features.")
        .buttons(|row| {
            row.button(
                Button::new(RouteKey::ReactionRolesDashboard.encode(), "Reaction Roles")
                    .style(ButtonStyle::Primary),
            );
        })
        .build()
}

pub fn reaction_roles_dashboard_message(menus: &[Menu]) -> MessagePayload {
    let listing = if menus.is_empty() {
        "No menus yet. Create the first one.".to_owned()
    } else {
        menus
            .iter()
            .map(|menu| {
                format!(
                    "• *{}* — {} roles ({})",
                    menu.name,
                    menu.roles.len(),
                    phase_label(menu.phase())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    MessageBuilder::new("Reaction role menus")
        .embed("Reaction Roles", listing)
        .buttons(|row| {
            row.button(
                Button::new(RouteKey::OpenCreateWizard.encode(), "Create Menu")
                    .style(ButtonStyle::Primary),
            )
            .button(Button::new(RouteKey::MainDashboard.encode(), "Back"));
        })
        .build()
}

pub fn create_menu_modal() -> ModalPrompt {
    ModalPrompt {
        custom_id: CREATE_MENU_MODAL.to_owned(),
        title: "New Reaction Role Menu".to_owned(),
        inputs: vec![
            TextInput {
                custom_id: MODAL_NAME_INPUT.to_owned(),
                label: "Menu name".to_owned(),
                paragraph: false,
                required: true,
            },
            TextInput {
                custom_id: MODAL_DESC_INPUT.to_owned(),
                label: "Description".to_owned(),
                paragraph: true,
                required: true,
            },
        ],
    }
}

pub fn role_select_message(menu: &Menu, eligible: &[GuildRole]) -> MessagePayload {
    let options = eligible
        .iter()
        .map(|role| SelectOption { label: role.name.clone(), value: role.id.0.clone() })
        .collect::<Vec<_>>();
    let max_values = options.len() as u8;

    MessageBuilder::new(format!("Pick the roles for *{}*", menu.name))
        .select(SelectMenu {
            custom_id: RouteKey::SelectRoles { menu_id: menu.id.clone() }.encode(),
            placeholder: "Pick at least one role".to_owned(),
            min_values: 1,
            max_values,
            options,
        })
        .build()
}

pub fn type_select_message(menu: &Menu) -> MessagePayload {
    let menu_id = menu.id.clone();
    MessageBuilder::new(format!("How should members pick roles from *{}*?", menu.name))
        .buttons(|row| {
            row.button(Button::new(
                RouteKey::ChooseType { choice: TypeChoice::Dropdown, menu_id: menu_id.clone() }
                    .encode(),
                "Dropdown",
            ))
            .button(Button::new(
                RouteKey::ChooseType { choice: TypeChoice::Button, menu_id: menu_id.clone() }
                    .encode(),
                "Buttons",
            ))
            .button(Button::new(
                RouteKey::ChooseType { choice: TypeChoice::Both, menu_id }.encode(),
                "Both",
            ));
        })
        .build()
}

pub fn publish_controls_message(menu: &Menu) -> MessagePayload {
    MessageBuilder::new(format!("*{}* is ready. Publish it to this channel?", menu.name))
        .buttons(|row| {
            row.button(
                Button::new(RouteKey::Publish { menu_id: menu.id.clone() }.encode(), "Publish")
                    .style(ButtonStyle::Success),
            )
            .button(Button::new(RouteKey::MainDashboard.encode(), "Back"));
        })
        .build()
}

/// The public message a published menu lives in: an embed plus, per selection
/// type, a role dropdown and/or rows of toggle buttons.
pub fn published_menu_payload(menu: &Menu, guild_roles: &[GuildRole]) -> MessagePayload {
    let mut builder =
        MessageBuilder::new(menu.name.clone()).embed(menu.name.clone(), menu.description.clone());

    if menu.wants(SelectionType::Dropdown) {
        let options = menu
            .roles
            .iter()
            .map(|role_id| SelectOption {
                label: role_label(guild_roles, role_id),
                value: role_id.0.clone(),
            })
            .collect::<Vec<_>>();
        let max_values = options.len() as u8;

        builder = builder.select(SelectMenu {
            custom_id: RouteKey::SyncRoles { menu_id: menu.id.clone() }.encode(),
            placeholder: "Pick your roles".to_owned(),
            min_values: 0,
            max_values,
            options,
        });
    }

    if menu.wants(SelectionType::Button) {
        let buttons = menu
            .roles
            .iter()
            .map(|role_id| {
                Button::new(
                    RouteKey::ToggleRole { role_id: role_id.clone() }.encode(),
                    role_label(guild_roles, role_id),
                )
            })
            .collect::<Vec<_>>();

        let mut payload = builder.build();
        payload.components.extend(button_rows(buttons));
        return payload;
    }

    builder.build()
}

pub fn publish_confirmation_message(menu: &Menu) -> MessagePayload {
    let location = menu
        .published
        .as_ref()
        .map(|location| format!("<#{}>", location.channel_id))
        .unwrap_or_else(|| "this channel".to_owned());

    MessageBuilder::new(format!("*{}* is live in {location}.", menu.name))
        .buttons(|row| {
            row.button(Button::new(RouteKey::MainDashboard.encode(), "Back"));
        })
        .build()
}

pub fn toggle_ack_message(report: &ToggleReport) -> MessagePayload {
    let mention = role_mention(&report.role_id);
    let content = match (&report.error, report.action) {
        (None, ToggleAction::Add) => format!("Added {mention}."),
        (None, ToggleAction::Remove) => format!("Removed {mention}."),
        (Some(reason), ToggleAction::Add) => format!("Could not add {mention}: {reason}"),
        (Some(reason), ToggleAction::Remove) => format!("Could not remove {mention}: {reason}"),
    };
    MessageBuilder::new(content).ephemeral().build()
}

pub fn sync_report_message(report: &SyncReport) -> MessagePayload {
    let mut lines = Vec::new();
    if !report.added.is_empty() {
        let mentions: Vec<String> = report.added.iter().map(role_mention).collect();
        lines.push(format!("Added: {}", mentions.join(", ")));
    }
    if !report.removed.is_empty() {
        let mentions: Vec<String> = report.removed.iter().map(role_mention).collect();
        lines.push(format!("Removed: {}", mentions.join(", ")));
    }
    for failure in &report.failed {
        let verb = match failure.action {
            ToggleAction::Add => "add",
            ToggleAction::Remove => "remove",
        };
        lines.push(format!(
            "Could not {verb} {}: {}",
            role_mention(&failure.role_id),
            failure.reason
        ));
    }
    if lines.is_empty() {
        lines.push("Your roles already match that selection.".to_owned());
    }

    MessageBuilder::new(lines.join("\n")).ephemeral().build()
}

pub fn menu_not_found_message(menu_id: &MenuId) -> MessagePayload {
    MessageBuilder::new(format!(
        "That menu (`{menu_id}`) no longer exists. Reopen the dashboard and try again."
    ))
    .ephemeral()
    .build()
}

pub fn unrecognized_action_message(custom_id: &str) -> MessagePayload {
    MessageBuilder::new(format!("Nothing is wired to `{custom_id}`. The control may be stale."))
        .ephemeral()
        .build()
}

pub fn no_assignable_roles_message() -> MessagePayload {
    MessageBuilder::new(
        "This server has no assignable roles. Create a role that is not managed by an \
         integration first.",
    )
    .ephemeral()
    .build()
}

pub fn validation_notice_message(reason: &str) -> MessagePayload {
    MessageBuilder::new(format!(":warning: {reason}")).ephemeral().build()
}

pub fn error_notice_message(summary: &str, correlation_id: &str) -> MessagePayload {
    MessageBuilder::new(format!(":warning: {summary} (ref `{correlation_id}`)"))
        .ephemeral()
        .build()
}
