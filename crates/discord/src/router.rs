use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use rolecall_core::domain::menu::{GuildId, MenuId, RoleId};
use rolecall_core::domain::role::eligible_menu_roles;
use rolecall_core::errors::ApplicationError;
use rolecall_core::sync::plan_sync;
use rolecall_core::wizard::{MenuWizard, TypeChoice, WizardContext, WizardEvent};
use rolecall_store::repositories::{InMemoryMenuRepository, MenuRepository, RepositoryError};
use rolecall_store::KeyedLocks;

use crate::components;
use crate::custom_id::{RouteKey, CREATE_MENU_MODAL, DASHBOARD_COMMAND, MODAL_DESC_INPUT, MODAL_NAME_INPUT};
use crate::events::{
    ButtonPressEvent, EventContext, EventDispatcher, EventHandler, EventHandlerError,
    HandlerResult, Interaction, InteractionEnvelope, InteractionKind, InteractionResponse,
    ModalSubmitEvent, SelectSubmitEvent, SlashCommandEvent,
};
use crate::publish::{MessageTransport, NoopMessageTransport, PublishError, Publisher};
use crate::roles::{NoopRoleGateway, RoleGateway, RoleSynchronizer};

/// Decodes each inbound interaction into a routing key and runs the matching
/// handler exactly once. Every path answers with exactly one response; user
/// mistakes and unresolvable menus come back as private ephemeral notices.
pub struct InteractionRouter {
    store: Arc<dyn MenuRepository>,
    gateway: Arc<dyn RoleGateway>,
    publisher: Publisher,
    synchronizer: RoleSynchronizer,
    locks: KeyedLocks,
    wizard: MenuWizard,
}

impl InteractionRouter {
    pub fn new(
        store: Arc<dyn MenuRepository>,
        gateway: Arc<dyn RoleGateway>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        Self {
            publisher: Publisher::new(store.clone(), transport),
            synchronizer: RoleSynchronizer::new(gateway.clone()),
            store,
            gateway,
            locks: KeyedLocks::new(),
            wizard: MenuWizard,
        }
    }

    async fn handle_slash_command(
        &self,
        event: &SlashCommandEvent,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        if event.command != DASHBOARD_COMMAND {
            return Ok(HandlerResult::Ignored);
        }
        respond(InteractionResponse::Reply(components::main_dashboard_message()))
    }

    async fn handle_button_press(
        &self,
        event: &ButtonPressEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        match RouteKey::parse(&event.custom_id) {
            Some(RouteKey::ReactionRolesDashboard) => self.show_menu_dashboard(event, ctx).await,
            Some(RouteKey::MainDashboard) => {
                respond(InteractionResponse::Update(components::main_dashboard_message()))
            }
            Some(RouteKey::OpenCreateWizard) => {
                respond(InteractionResponse::Modal(components::create_menu_modal()))
            }
            Some(RouteKey::ChooseType { choice, menu_id }) => {
                self.record_type_choice(choice, &menu_id, ctx).await
            }
            Some(RouteKey::Publish { menu_id }) => self.publish_menu(&menu_id, event, ctx).await,
            Some(RouteKey::ToggleRole { role_id }) => self.toggle_role(&role_id, event, ctx).await,
            // Select-only keys arriving on a button are stale or forged
            // controls; answer like any unknown action.
            Some(RouteKey::SelectRoles { .. }) | Some(RouteKey::SyncRoles { .. }) | None => {
                respond(unrecognized(&event.custom_id, ctx))
            }
        }
    }

    async fn handle_select_submit(
        &self,
        event: &SelectSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        match RouteKey::parse(&event.custom_id) {
            Some(RouteKey::SelectRoles { menu_id }) => {
                self.record_role_selection(&menu_id, event, ctx).await
            }
            Some(RouteKey::SyncRoles { menu_id }) => {
                self.sync_member_roles(&menu_id, event, ctx).await
            }
            _ => respond(unrecognized(&event.custom_id, ctx)),
        }
    }

    async fn handle_modal_submit(
        &self,
        event: &ModalSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        if event.custom_id == CREATE_MENU_MODAL {
            return self.create_menu(event, ctx).await;
        }
        respond(unrecognized(&event.custom_id, ctx))
    }

    async fn show_menu_dashboard(
        &self,
        event: &ButtonPressEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        match self.store.list_by_guild(&event.guild_id).await {
            Ok(menus) => respond(InteractionResponse::Update(
                components::reaction_roles_dashboard_message(&menus),
            )),
            Err(error) => respond(store_failure(error, ctx)),
        }
    }

    async fn create_menu(
        &self,
        event: &ModalSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let name = field(event, MODAL_NAME_INPUT);
        let description = field(event, MODAL_DESC_INPUT);
        if name.is_empty() {
            return respond(validation("The menu needs a name."));
        }

        let menu = match self.store.create(event.guild_id.clone(), name, description).await {
            Ok(menu) => menu,
            Err(error) => return respond(store_failure(error, ctx)),
        };

        let guild_roles = match self.gateway.list_roles(&event.guild_id).await {
            Ok(roles) => roles,
            Err(error) => {
                return respond(failure(ApplicationError::Integration(error.to_string()), ctx))
            }
        };
        let eligible = eligible_menu_roles(guild_roles);
        if eligible.is_empty() {
            return respond(InteractionResponse::Reply(components::no_assignable_roles_message()));
        }

        info!(
            event_name = "menu.wizard.created",
            correlation_id = %ctx.correlation_id,
            guild_id = %menu.guild_id,
            menu_id = %menu.id,
            "menu created, prompting role selection"
        );
        respond(InteractionResponse::Reply(components::role_select_message(&menu, &eligible)))
    }

    async fn record_role_selection(
        &self,
        menu_id: &MenuId,
        event: &SelectSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let _guard = self.locks.acquire(KeyedLocks::menu_key(menu_id)).await;

        let menu = match self.load_menu(menu_id, ctx).await {
            Ok(menu) => menu,
            Err(response) => return respond(response),
        };

        let roles: Vec<RoleId> = event.values.iter().map(|value| RoleId(value.clone())).collect();
        let context = WizardContext { submitted_roles: roles.clone(), ..WizardContext::default() };
        let outcome =
            match self.wizard.apply(&menu.phase(), &WizardEvent::RolesSubmitted, &context) {
                Ok(outcome) => outcome,
                Err(error) => return respond(validation(&error.to_string())),
            };

        let updated = match self.store.set_roles(menu_id, roles).await {
            Ok(menu) => menu,
            Err(RepositoryError::NotFound(id)) => return respond(not_found(&id)),
            Err(error) => return respond(store_failure(error, ctx)),
        };

        log_transition(&updated.guild_id, menu_id, &outcome, ctx);
        respond(InteractionResponse::Update(components::type_select_message(&updated)))
    }

    async fn record_type_choice(
        &self,
        choice: TypeChoice,
        menu_id: &MenuId,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let _guard = self.locks.acquire(KeyedLocks::menu_key(menu_id)).await;

        let menu = match self.load_menu(menu_id, ctx).await {
            Ok(menu) => menu,
            Err(response) => return respond(response),
        };

        let resolved = choice.resolve();
        let context =
            WizardContext { resolved_types: resolved.clone(), ..WizardContext::default() };
        let outcome = match self.wizard.apply(&menu.phase(), &WizardEvent::TypeChosen, &context) {
            Ok(outcome) => outcome,
            Err(error) => return respond(validation(&error.to_string())),
        };

        let updated = match self.store.set_selection_types(menu_id, resolved).await {
            Ok(menu) => menu,
            Err(RepositoryError::NotFound(id)) => return respond(not_found(&id)),
            Err(error) => return respond(store_failure(error, ctx)),
        };

        log_transition(&updated.guild_id, menu_id, &outcome, ctx);
        respond(InteractionResponse::Update(components::publish_controls_message(&updated)))
    }

    async fn publish_menu(
        &self,
        menu_id: &MenuId,
        event: &ButtonPressEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let _guard = self.locks.acquire(KeyedLocks::menu_key(menu_id)).await;

        // Labels on the published controls come from the live role list; if
        // the lookup fails the payload falls back to raw ids.
        let guild_roles = match self.gateway.list_roles(&event.guild_id).await {
            Ok(roles) => roles,
            Err(error) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    guild_id = %event.guild_id,
                    menu_id = %menu_id,
                    error = %error,
                    "guild role lookup failed; publishing with raw role ids"
                );
                Vec::new()
            }
        };

        match self.publisher.publish(menu_id, &event.channel_id, &guild_roles).await {
            Ok(menu) => {
                info!(
                    event_name = "menu.published",
                    correlation_id = %ctx.correlation_id,
                    guild_id = %menu.guild_id,
                    menu_id = %menu.id,
                    channel_id = %event.channel_id,
                    "menu published"
                );
                respond(InteractionResponse::Update(components::publish_confirmation_message(
                    &menu,
                )))
            }
            Err(PublishError::MenuNotFound(id)) => respond(not_found(&id)),
            Err(PublishError::Wizard(error)) => respond(validation(&error.to_string())),
            Err(PublishError::Transport(error)) => {
                respond(failure(ApplicationError::Integration(error.to_string()), ctx))
            }
            Err(PublishError::Store(error)) => {
                respond(failure(ApplicationError::Persistence(error), ctx))
            }
        }
    }

    async fn toggle_role(
        &self,
        role_id: &RoleId,
        event: &ButtonPressEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let _guard = self
            .locks
            .acquire(KeyedLocks::member_key(&event.guild_id, &event.member.user_id))
            .await;

        let report = self
            .synchronizer
            .toggle(&event.guild_id, &event.member.user_id, &event.member.role_ids, role_id)
            .await;

        info!(
            event_name = "roles.toggled",
            correlation_id = %ctx.correlation_id,
            guild_id = %event.guild_id,
            user_id = %event.member.user_id,
            role_id = %report.role_id,
            action = ?report.action,
            succeeded = report.succeeded(),
            "role toggle processed"
        );
        respond(InteractionResponse::Reply(components::toggle_ack_message(&report)))
    }

    async fn sync_member_roles(
        &self,
        menu_id: &MenuId,
        event: &SelectSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let _guard = self
            .locks
            .acquire(KeyedLocks::member_key(&event.guild_id, &event.member.user_id))
            .await;

        let menu = match self.load_menu(menu_id, ctx).await {
            Ok(menu) => menu,
            Err(response) => return respond(response),
        };

        let desired: Vec<RoleId> =
            event.values.iter().map(|value| RoleId(value.clone())).collect();
        let plan = plan_sync(&menu.roles, &event.member.role_ids, &desired);
        let report =
            self.synchronizer.sync(&event.guild_id, &event.member.user_id, plan).await;

        info!(
            event_name = "roles.synced",
            correlation_id = %ctx.correlation_id,
            guild_id = %event.guild_id,
            user_id = %event.member.user_id,
            menu_id = %menu_id,
            added = report.added.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "role sync processed"
        );
        respond(InteractionResponse::Reply(components::sync_report_message(&report)))
    }

    async fn load_menu(
        &self,
        menu_id: &MenuId,
        ctx: &EventContext,
    ) -> Result<rolecall_core::domain::menu::Menu, InteractionResponse> {
        match self.store.find_by_id(menu_id).await {
            Ok(Some(menu)) => Ok(menu),
            Ok(None) => Err(not_found(menu_id)),
            Err(error) => Err(store_failure(error, ctx)),
        }
    }
}

fn respond(response: InteractionResponse) -> Result<HandlerResult, EventHandlerError> {
    Ok(HandlerResult::Responded(response))
}

fn field(event: &ModalSubmitEvent, input_id: &str) -> String {
    event.fields.get(input_id).map(|value| value.trim().to_owned()).unwrap_or_default()
}

fn not_found(menu_id: &MenuId) -> InteractionResponse {
    InteractionResponse::Reply(components::menu_not_found_message(menu_id))
}

fn validation(reason: &str) -> InteractionResponse {
    InteractionResponse::Reply(components::validation_notice_message(reason))
}

fn unrecognized(custom_id: &str, ctx: &EventContext) -> InteractionResponse {
    warn!(
        event_name = "router.unrecognized_action",
        correlation_id = %ctx.correlation_id,
        custom_id,
        "no handler matches this routing key"
    );
    InteractionResponse::Reply(components::unrecognized_action_message(custom_id))
}

fn failure(error: ApplicationError, ctx: &EventContext) -> InteractionResponse {
    let interface = error.into_interface(ctx.correlation_id.clone());
    InteractionResponse::Reply(components::error_notice_message(
        interface.user_message(),
        &ctx.correlation_id,
    ))
}

fn store_failure(error: RepositoryError, ctx: &EventContext) -> InteractionResponse {
    failure(ApplicationError::Persistence(error.to_string()), ctx)
}

fn log_transition(
    guild_id: &GuildId,
    menu_id: &MenuId,
    outcome: &rolecall_core::wizard::TransitionOutcome,
    ctx: &EventContext,
) {
    info!(
        event_name = "menu.wizard.transition",
        correlation_id = %ctx.correlation_id,
        guild_id = %guild_id,
        menu_id = %menu_id,
        from = ?outcome.from,
        to = ?outcome.to,
        "wizard transition applied"
    );
}

pub struct SlashCommandHandler {
    router: Arc<InteractionRouter>,
}

#[async_trait]
impl EventHandler for SlashCommandHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Interaction::SlashCommand(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.router.handle_slash_command(event, ctx).await
    }
}

pub struct ButtonPressHandler {
    router: Arc<InteractionRouter>,
}

#[async_trait]
impl EventHandler for ButtonPressHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::ButtonPress
    }

    async fn handle(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Interaction::ButtonPress(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.router.handle_button_press(event, ctx).await
    }
}

pub struct SelectSubmitHandler {
    router: Arc<InteractionRouter>,
}

#[async_trait]
impl EventHandler for SelectSubmitHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::SelectSubmit
    }

    async fn handle(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Interaction::SelectSubmit(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.router.handle_select_submit(event, ctx).await
    }
}

pub struct ModalSubmitHandler {
    router: Arc<InteractionRouter>,
}

#[async_trait]
impl EventHandler for ModalSubmitHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::ModalSubmit
    }

    async fn handle(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Interaction::ModalSubmit(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.router.handle_modal_submit(event, ctx).await
    }
}

/// Wire every interaction kind to the given router.
pub fn router_dispatcher(router: Arc<InteractionRouter>) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler { router: router.clone() });
    dispatcher.register(ButtonPressHandler { router: router.clone() });
    dispatcher.register(SelectSubmitHandler { router: router.clone() });
    dispatcher.register(ModalSubmitHandler { router });
    dispatcher
}

/// Dispatcher over an empty in-memory store and noop collaborators; the
/// scaffold wiring until a real platform session is attached.
pub fn default_dispatcher() -> EventDispatcher {
    let router = Arc::new(InteractionRouter::new(
        Arc::new(InMemoryMenuRepository::default()),
        Arc::new(NoopRoleGateway),
        Arc::new(NoopMessageTransport),
    ));
    router_dispatcher(router)
}
