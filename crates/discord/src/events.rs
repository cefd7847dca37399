use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use rolecall_core::domain::menu::{ChannelId, GuildId, RoleId, UserId};

use crate::components::{MessagePayload, ModalPrompt};

/// One inbound interaction plus the id the platform expects the
/// acknowledgment for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionEnvelope {
    pub interaction_id: String,
    pub event: Interaction,
}

/// The invoking member as the platform reports them on every event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberContext {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandEvent {
    pub command: String,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub member: MemberContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonPressEvent {
    pub custom_id: String,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub member: MemberContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectSubmitEvent {
    pub custom_id: String,
    pub values: Vec<String>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub member: MemberContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalSubmitEvent {
    pub custom_id: String,
    pub fields: HashMap<String, String>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub member: MemberContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    SlashCommand(SlashCommandEvent),
    ButtonPress(ButtonPressEvent),
    SelectSubmit(SelectSubmitEvent),
    ModalSubmit(ModalSubmitEvent),
    Unsupported { kind: String },
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::SlashCommand(_) => InteractionKind::SlashCommand,
            Self::ButtonPress(_) => InteractionKind::ButtonPress,
            Self::SelectSubmit(_) => InteractionKind::SelectSubmit,
            Self::ModalSubmit(_) => InteractionKind::ModalSubmit,
            Self::Unsupported { .. } => InteractionKind::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    SlashCommand,
    ButtonPress,
    SelectSubmit,
    ModalSubmit,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// The single acknowledgment a handled event produces: a fresh reply, an
/// in-place update of the interaction message, or a form prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionResponse {
    Reply(MessagePayload),
    Update(MessagePayload),
    Modal(ModalPrompt),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(InteractionResponse),
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error("menu store failure: {0}")]
    Store(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn kind(&self) -> InteractionKind;
    async fn handle(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<InteractionKind, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &InteractionEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.kind()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{
        EventContext, EventDispatcher, EventHandler, EventHandlerError, HandlerResult,
        Interaction, InteractionEnvelope, InteractionKind, InteractionResponse, MemberContext,
        SlashCommandEvent,
    };
    use crate::components::MessageBuilder;

    struct CannedSlashHandler;

    #[async_trait]
    impl EventHandler for CannedSlashHandler {
        fn kind(&self) -> InteractionKind {
            InteractionKind::SlashCommand
        }

        async fn handle(
            &self,
            _envelope: &InteractionEnvelope,
            _ctx: &EventContext,
        ) -> Result<HandlerResult, EventHandlerError> {
            Ok(HandlerResult::Responded(InteractionResponse::Reply(
                MessageBuilder::new("ok").build(),
            )))
        }
    }

    fn slash_envelope() -> InteractionEnvelope {
        InteractionEnvelope {
            interaction_id: "int-1".to_owned(),
            event: Interaction::SlashCommand(SlashCommandEvent {
                command: "dashboard".to_owned(),
                guild_id: "G1".into(),
                channel_id: "C1".into(),
                member: MemberContext { user_id: "U1".into(), role_ids: Vec::new() },
            }),
        }
    }

    #[tokio::test]
    async fn dispatcher_routes_to_the_registered_handler() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(CannedSlashHandler);

        let result = dispatcher
            .dispatch(&slash_envelope(), &EventContext::default())
            .await
            .expect("dispatch");

        assert!(matches!(result, HandlerResult::Responded(_)));
        assert_eq!(dispatcher.handler_count(), 1);
    }

    #[tokio::test]
    async fn dispatcher_ignores_events_without_a_handler() {
        let dispatcher = EventDispatcher::new();

        let result = dispatcher
            .dispatch(&slash_envelope(), &EventContext::default())
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }
}
