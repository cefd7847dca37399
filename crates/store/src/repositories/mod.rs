use async_trait::async_trait;
use thiserror::Error;

use rolecall_core::domain::menu::{
    GuildId, Menu, MenuId, PublishedLocation, RoleId, SelectionType,
};

pub mod memory;
pub mod menu;

pub use memory::InMemoryMenuRepository;
pub use menu::SqlMenuRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("menu `{0}` not found")]
    NotFound(MenuId),
}

/// Persistence for menus, keyed by menu id and by guild. The wizard mutates
/// menus only through the per-step partial updates below; each update is
/// atomic and fails with `NotFound` for an unknown id.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn create(
        &self,
        guild_id: GuildId,
        name: String,
        description: String,
    ) -> Result<Menu, RepositoryError>;

    async fn find_by_id(&self, id: &MenuId) -> Result<Option<Menu>, RepositoryError>;

    /// All menus for a guild, in creation order. Empty for an unknown guild.
    async fn list_by_guild(&self, guild_id: &GuildId) -> Result<Vec<Menu>, RepositoryError>;

    async fn set_roles(&self, id: &MenuId, roles: Vec<RoleId>) -> Result<Menu, RepositoryError>;

    async fn set_selection_types(
        &self,
        id: &MenuId,
        types: Vec<SelectionType>,
    ) -> Result<Menu, RepositoryError>;

    async fn set_published_location(
        &self,
        id: &MenuId,
        location: PublishedLocation,
    ) -> Result<Menu, RepositoryError>;
}
