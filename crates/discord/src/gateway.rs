use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::custom_id::RouteKey;
use crate::events::{EventContext, EventDispatcher, Interaction, InteractionEnvelope};
use crate::router::default_dispatcher;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Realtime feed of interaction events. The platform connection itself lives
/// behind this trait; the runner only pumps, acknowledges, and dispatches.
#[async_trait]
pub trait InteractionTransport: Send + Sync {
    async fn connect(&self) -> Result<(), ConnectionError>;
    async fn next_envelope(&self) -> Result<Option<InteractionEnvelope>, ConnectionError>;
    async fn acknowledge(&self, interaction_id: &str) -> Result<(), ConnectionError>;
    async fn disconnect(&self) -> Result<(), ConnectionError>;
}

#[derive(Default)]
pub struct NoopInteractionTransport;

#[async_trait]
impl InteractionTransport for NoopInteractionTransport {
    async fn connect(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<InteractionEnvelope>, ConnectionError> {
        Ok(None)
    }

    async fn acknowledge(&self, _interaction_id: &str) -> Result<(), ConnectionError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConnectionError> {
        Ok(())
    }
}

/// Pulls envelopes off the transport one at a time and handles each to
/// completion before the next, so per-event isolation and the ordering model
/// hold. Dispatch failures are logged and never break the loop.
pub struct GatewayRunner {
    transport: Arc<dyn InteractionTransport>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
    noop_transport: bool,
}

impl Default for GatewayRunner {
    fn default() -> Self {
        Self {
            transport: Arc::new(NoopInteractionTransport),
            dispatcher: default_dispatcher(),
            reconnect_policy: ReconnectPolicy::default(),
            noop_transport: true,
        }
    }
}

impl GatewayRunner {
    pub fn new(
        transport: Arc<dyn InteractionTransport>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy, noop_transport: false }
    }

    /// Runner over the noop transport: the dispatcher is live, the realtime
    /// connection is not attached yet.
    pub fn with_noop_transport(
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self {
            transport: Arc::new(NoopInteractionTransport),
            dispatcher,
            reconnect_policy,
            noop_transport: true,
        }
    }

    pub fn is_noop_transport(&self) -> bool {
        self.noop_transport
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(connection_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %connection_error,
                        "gateway transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "gateway retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), ConnectionError> {
        info!(attempt, "opening gateway transport connection");
        self.transport.connect().await?;
        info!(attempt, "gateway transport connected");

        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(attempt, "gateway transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };
            let (guild_id, menu_id) = correlation_fields(&envelope);

            info!(
                event_name = "ingress.discord.envelope_received",
                interaction_id = %envelope.interaction_id,
                interaction_kind = ?envelope.event.kind(),
                correlation_id = %envelope.interaction_id,
                guild_id = guild_id.as_deref().unwrap_or("unknown"),
                menu_id = menu_id.as_deref().unwrap_or("unknown"),
                "received interaction envelope"
            );

            if let Err(error) = self.transport.acknowledge(&envelope.interaction_id).await {
                warn!(
                    event_name = "ingress.discord.ack_sent",
                    interaction_id = %envelope.interaction_id,
                    correlation_id = %envelope.interaction_id,
                    guild_id = guild_id.as_deref().unwrap_or("unknown"),
                    menu_id = menu_id.as_deref().unwrap_or("unknown"),
                    error = %error,
                    "failed to acknowledge interaction envelope"
                );
            } else {
                debug!(
                    event_name = "ingress.discord.ack_sent",
                    interaction_id = %envelope.interaction_id,
                    correlation_id = %envelope.interaction_id,
                    guild_id = guild_id.as_deref().unwrap_or("unknown"),
                    menu_id = menu_id.as_deref().unwrap_or("unknown"),
                    "acknowledged interaction envelope"
                );
            }

            let context = EventContext { correlation_id: envelope.interaction_id.clone() };
            if let Err(error) = self.dispatcher.dispatch(&envelope, &context).await {
                warn!(
                    interaction_id = %envelope.interaction_id,
                    correlation_id = %envelope.interaction_id,
                    guild_id = guild_id.as_deref().unwrap_or("unknown"),
                    menu_id = menu_id.as_deref().unwrap_or("unknown"),
                    error = %error,
                    "event dispatch failed; continuing gateway loop"
                );
            }
        }
    }
}

fn correlation_fields(envelope: &InteractionEnvelope) -> (Option<String>, Option<String>) {
    let (guild_id, custom_id) = match &envelope.event {
        Interaction::SlashCommand(event) => (Some(event.guild_id.0.clone()), None),
        Interaction::ButtonPress(event) => {
            (Some(event.guild_id.0.clone()), Some(event.custom_id.as_str()))
        }
        Interaction::SelectSubmit(event) => {
            (Some(event.guild_id.0.clone()), Some(event.custom_id.as_str()))
        }
        Interaction::ModalSubmit(event) => {
            (Some(event.guild_id.0.clone()), Some(event.custom_id.as_str()))
        }
        Interaction::Unsupported { .. } => (None, None),
    };

    let menu_id = custom_id.and_then(RouteKey::parse).and_then(|key| match key {
        RouteKey::Publish { menu_id }
        | RouteKey::ChooseType { menu_id, .. }
        | RouteKey::SelectRoles { menu_id }
        | RouteKey::SyncRoles { menu_id } => Some(menu_id.0),
        _ => None,
    });

    (guild_id, menu_id)
}
