use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use rolecall_core::domain::menu::{ChannelId, Menu, MenuId, MessageId, PublishedLocation};
use rolecall_core::domain::role::GuildRole;
use rolecall_core::wizard::{MenuWizard, WizardContext, WizardEvent, WizardTransitionError};
use rolecall_store::repositories::{MenuRepository, RepositoryError};

use crate::components::{self, MessagePayload};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("message send failed: {0}")]
    Send(String),
}

/// Sends one message to a channel and reports the created message's id.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn create_message(
        &self,
        channel_id: &ChannelId,
        payload: &MessagePayload,
    ) -> Result<MessageId, TransportError>;
}

#[derive(Default)]
pub struct NoopMessageTransport;

#[async_trait]
impl MessageTransport for NoopMessageTransport {
    async fn create_message(
        &self,
        _channel_id: &ChannelId,
        _payload: &MessagePayload,
    ) -> Result<MessageId, TransportError> {
        Ok(MessageId::from("0"))
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("menu `{0}` not found")]
    MenuNotFound(MenuId),
    #[error(transparent)]
    Wizard(#[from] WizardTransitionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("menu store failure: {0}")]
    Store(String),
}

/// Materializes a finalized menu into exactly one channel message and records
/// where it landed. Republishing is allowed; the stored location is
/// overwritten and the previous message is orphaned.
pub struct Publisher {
    store: Arc<dyn MenuRepository>,
    transport: Arc<dyn MessageTransport>,
    wizard: MenuWizard,
}

impl Publisher {
    pub fn new(store: Arc<dyn MenuRepository>, transport: Arc<dyn MessageTransport>) -> Self {
        Self { store, transport, wizard: MenuWizard }
    }

    pub async fn publish(
        &self,
        menu_id: &MenuId,
        channel_id: &ChannelId,
        guild_roles: &[GuildRole],
    ) -> Result<Menu, PublishError> {
        let menu = self
            .store
            .find_by_id(menu_id)
            .await
            .map_err(|error| PublishError::Store(error.to_string()))?
            .ok_or_else(|| PublishError::MenuNotFound(menu_id.clone()))?;

        self.wizard.apply(&menu.phase(), &WizardEvent::PublishRequested, &WizardContext::default())?;

        let payload = components::published_menu_payload(&menu, guild_roles);
        let message_id = self.transport.create_message(channel_id, &payload).await?;

        let location = PublishedLocation { channel_id: channel_id.clone(), message_id };
        match self.store.set_published_location(menu_id, location).await {
            Ok(menu) => Ok(menu),
            Err(RepositoryError::NotFound(id)) => Err(PublishError::MenuNotFound(id)),
            Err(error) => Err(PublishError::Store(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::{MessageTransport, NoopMessageTransport, PublishError, Publisher, TransportError};
    use crate::components::{ActionRow, MessagePayload};
    use rolecall_core::domain::menu::{ChannelId, GuildId, MenuId, MessageId, SelectionType};
    use rolecall_store::repositories::{InMemoryMenuRepository, MenuRepository};

    #[derive(Default)]
    struct RecordingTransport {
        state: Mutex<RecordingState>,
    }

    #[derive(Default)]
    struct RecordingState {
        sent: Vec<(ChannelId, MessagePayload)>,
        fail_next: bool,
    }

    impl RecordingTransport {
        async fn sent(&self) -> Vec<(ChannelId, MessagePayload)> {
            self.state.lock().await.sent.clone()
        }

        async fn fail_next(&self) {
            self.state.lock().await.fail_next = true;
        }
    }

    #[async_trait]
    impl MessageTransport for RecordingTransport {
        async fn create_message(
            &self,
            channel_id: &ChannelId,
            payload: &MessagePayload,
        ) -> Result<MessageId, TransportError> {
            let mut state = self.state.lock().await;
            if state.fail_next {
                state.fail_next = false;
                return Err(TransportError::Send("channel is gone".to_owned()));
            }
            state.sent.push((channel_id.clone(), payload.clone()));
            Ok(MessageId(format!("M{}", state.sent.len())))
        }
    }

    async fn finalized_menu(
        store: &InMemoryMenuRepository,
        role_count: usize,
        types: Vec<SelectionType>,
    ) -> MenuId {
        let menu = store
            .create(GuildId::from("G1"), "Colors".to_owned(), "Pick a color".to_owned())
            .await
            .expect("create");
        let roles = (0..role_count).map(|n| format!("R{n}").as_str().into()).collect();
        store.set_roles(&menu.id, roles).await.expect("set roles");
        store.set_selection_types(&menu.id, types).await.expect("set types");
        menu.id
    }

    #[tokio::test]
    async fn publish_sends_one_message_and_records_its_location() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Publisher::new(store.clone(), transport.clone());

        let menu_id =
            finalized_menu(&store, 3, vec![SelectionType::Dropdown, SelectionType::Button]).await;

        let published = publisher
            .publish(&menu_id, &ChannelId::from("C1"), &[])
            .await
            .expect("publish");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId::from("C1"));

        let location = published.published.expect("location recorded");
        assert_eq!(location.channel_id, ChannelId::from("C1"));
        assert_eq!(location.message_id, MessageId::from("M1"));
    }

    #[tokio::test]
    async fn button_rows_stay_within_the_platform_bound() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Publisher::new(store.clone(), transport.clone());

        let menu_id = finalized_menu(&store, 13, vec![SelectionType::Button]).await;
        publisher.publish(&menu_id, &ChannelId::from("C1"), &[]).await.expect("publish");

        let sent = transport.sent().await;
        let rows: Vec<&ActionRow> = sent[0]
            .1
            .components
            .iter()
            .filter(|row| matches!(row, ActionRow::Buttons { .. }))
            .collect();

        assert_eq!(rows.len(), 3);
        for row in rows {
            let ActionRow::Buttons { components } = row else { unreachable!() };
            assert!(components.len() <= 5);
        }
    }

    #[tokio::test]
    async fn republish_creates_a_second_message_and_overwrites_the_location() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Publisher::new(store.clone(), transport.clone());

        let menu_id = finalized_menu(&store, 2, vec![SelectionType::Dropdown]).await;

        publisher.publish(&menu_id, &ChannelId::from("C1"), &[]).await.expect("first publish");
        let republished = publisher
            .publish(&menu_id, &ChannelId::from("C2"), &[])
            .await
            .expect("republish");

        assert_eq!(transport.sent().await.len(), 2);
        let location = republished.published.expect("location");
        assert_eq!(location.channel_id, ChannelId::from("C2"));
        assert_eq!(location.message_id, MessageId::from("M2"));
    }

    #[tokio::test]
    async fn publishing_before_type_selection_is_rejected() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let publisher = Publisher::new(store.clone(), Arc::new(NoopMessageTransport));

        let menu = store
            .create(GuildId::from("G1"), "Colors".to_owned(), String::new())
            .await
            .expect("create");
        store.set_roles(&menu.id, vec!["R1".into()]).await.expect("set roles");

        let error = publisher
            .publish(&menu.id, &ChannelId::from("C1"), &[])
            .await
            .expect_err("publish before type selection");
        assert!(matches!(error, PublishError::Wizard(_)));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_and_writes_nothing() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Publisher::new(store.clone(), transport.clone());

        let menu_id = finalized_menu(&store, 2, vec![SelectionType::Dropdown]).await;
        transport.fail_next().await;

        let error = publisher
            .publish(&menu_id, &ChannelId::from("C1"), &[])
            .await
            .expect_err("transport failure");
        assert!(matches!(error, PublishError::Transport(_)));

        let stored = store.find_by_id(&menu_id).await.expect("find").expect("stored");
        assert!(stored.published.is_none());
    }

    #[tokio::test]
    async fn publishing_an_unknown_menu_reports_not_found() {
        let store = Arc::new(InMemoryMenuRepository::default());
        let publisher = Publisher::new(store, Arc::new(NoopMessageTransport));

        let error = publisher
            .publish(&MenuId::from("missing"), &ChannelId::from("C1"), &[])
            .await
            .expect_err("unknown menu");
        assert!(matches!(error, PublishError::MenuNotFound(_)));
    }
}
