use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use rolecall_core::domain::menu::{
    GuildId, Menu, MenuId, PublishedLocation, RoleId, SelectionType,
};

use super::{MenuRepository, RepositoryError};

/// Reference implementation: a process-local table guarded by one RwLock, so
/// every trait method is a single atomic lock acquisition.
#[derive(Default)]
pub struct InMemoryMenuRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    menus: HashMap<String, Menu>,
    guild_index: HashMap<String, Vec<MenuId>>,
}

#[async_trait::async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn create(
        &self,
        guild_id: GuildId,
        name: String,
        description: String,
    ) -> Result<Menu, RepositoryError> {
        let menu = Menu::new(guild_id, name, description);
        let mut state = self.state.write().await;
        state.guild_index.entry(menu.guild_id.0.clone()).or_default().push(menu.id.clone());
        state.menus.insert(menu.id.0.clone(), menu.clone());
        Ok(menu)
    }

    async fn find_by_id(&self, id: &MenuId) -> Result<Option<Menu>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.menus.get(&id.0).cloned())
    }

    async fn list_by_guild(&self, guild_id: &GuildId) -> Result<Vec<Menu>, RepositoryError> {
        let state = self.state.read().await;
        let ids = state.guild_index.get(&guild_id.0).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|id| state.menus.get(&id.0).cloned()).collect())
    }

    async fn set_roles(&self, id: &MenuId, roles: Vec<RoleId>) -> Result<Menu, RepositoryError> {
        let mut state = self.state.write().await;
        let menu =
            state.menus.get_mut(&id.0).ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        menu.roles = roles;
        menu.updated_at = Utc::now();
        Ok(menu.clone())
    }

    async fn set_selection_types(
        &self,
        id: &MenuId,
        types: Vec<SelectionType>,
    ) -> Result<Menu, RepositoryError> {
        let mut state = self.state.write().await;
        let menu =
            state.menus.get_mut(&id.0).ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        menu.selection_types = types;
        menu.updated_at = Utc::now();
        Ok(menu.clone())
    }

    async fn set_published_location(
        &self,
        id: &MenuId,
        location: PublishedLocation,
    ) -> Result<Menu, RepositoryError> {
        let mut state = self.state.write().await;
        let menu =
            state.menus.get_mut(&id.0).ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        menu.published = Some(location);
        menu.updated_at = Utc::now();
        Ok(menu.clone())
    }
}
