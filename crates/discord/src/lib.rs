pub mod components;
pub mod custom_id;
pub mod events;
pub mod gateway;
pub mod publish;
pub mod roles;
pub mod router;

pub use custom_id::{RouteKey, CREATE_MENU_MODAL, DASHBOARD_COMMAND};
pub use events::{
    EventContext, EventDispatcher, HandlerResult, Interaction, InteractionEnvelope,
    InteractionResponse, MemberContext,
};
pub use gateway::{GatewayRunner, InteractionTransport, NoopInteractionTransport, ReconnectPolicy};
pub use publish::{MessageTransport, NoopMessageTransport, Publisher};
pub use roles::{NoopRoleGateway, RoleGateway, RoleSynchronizer, SyncReport, ToggleReport};
pub use router::{default_dispatcher, router_dispatcher, InteractionRouter};
