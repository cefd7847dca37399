use chrono::{DateTime, Utc};
use sqlx::Row;

use rolecall_core::domain::menu::{
    ChannelId, GuildId, Menu, MenuId, MessageId, PublishedLocation, RoleId, SelectionType,
};

use super::{MenuRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMenuRepository {
    pool: DbPool,
}

impl SqlMenuRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_required(&self, id: &MenuId) -> Result<Menu, RepositoryError> {
        self.find_by_id(id).await?.ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_menu(row: &sqlx::sqlite::SqliteRow) -> Result<Menu, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let guild_id: String =
        row.try_get("guild_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let roles_raw: String =
        row.try_get("roles").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let types_raw: String =
        row.try_get("selection_types").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let channel_id: Option<String> =
        row.try_get("channel_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let message_id: Option<String> =
        row.try_get("message_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_raw: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_raw: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let roles: Vec<RoleId> = decode_json(&roles_raw)?;
    let selection_types: Vec<SelectionType> = decode_json(&types_raw)?;

    let published = match (channel_id, message_id) {
        (Some(channel_id), Some(message_id)) => Some(PublishedLocation {
            channel_id: ChannelId(channel_id),
            message_id: MessageId(message_id),
        }),
        (None, None) => None,
        _ => {
            return Err(RepositoryError::Decode(
                "published location is half-set; the schema CHECK should prevent this".to_owned(),
            ));
        }
    };

    Ok(Menu {
        id: MenuId(id),
        guild_id: GuildId(guild_id),
        name,
        description,
        roles,
        selection_types,
        published,
        created_at: parse_timestamp(&created_at_raw),
        updated_at: parse_timestamp(&updated_at_raw),
    })
}

const MENU_COLUMNS: &str = "id, guild_id, name, description, roles, selection_types, \
                            channel_id, message_id, created_at, updated_at";

#[async_trait::async_trait]
impl MenuRepository for SqlMenuRepository {
    async fn create(
        &self,
        guild_id: GuildId,
        name: String,
        description: String,
    ) -> Result<Menu, RepositoryError> {
        let menu = Menu::new(guild_id, name, description);

        sqlx::query(
            "INSERT INTO menu (id, guild_id, name, description, roles, selection_types, \
                               channel_id, message_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)",
        )
        .bind(&menu.id.0)
        .bind(&menu.guild_id.0)
        .bind(&menu.name)
        .bind(&menu.description)
        .bind(encode_json(&menu.roles)?)
        .bind(encode_json(&menu.selection_types)?)
        .bind(menu.created_at.to_rfc3339())
        .bind(menu.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(menu)
    }

    async fn find_by_id(&self, id: &MenuId) -> Result<Option<Menu>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {MENU_COLUMNS} FROM menu WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_menu(row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_guild(&self, guild_id: &GuildId) -> Result<Vec<Menu>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_COLUMNS} FROM menu WHERE guild_id = ? ORDER BY rowid"
        ))
        .bind(&guild_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_menu).collect()
    }

    async fn set_roles(&self, id: &MenuId, roles: Vec<RoleId>) -> Result<Menu, RepositoryError> {
        let result = sqlx::query("UPDATE menu SET roles = ?, updated_at = ? WHERE id = ?")
            .bind(encode_json(&roles)?)
            .bind(Utc::now().to_rfc3339())
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        self.fetch_required(id).await
    }

    async fn set_selection_types(
        &self,
        id: &MenuId,
        types: Vec<SelectionType>,
    ) -> Result<Menu, RepositoryError> {
        let result =
            sqlx::query("UPDATE menu SET selection_types = ?, updated_at = ? WHERE id = ?")
                .bind(encode_json(&types)?)
                .bind(Utc::now().to_rfc3339())
                .bind(&id.0)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        self.fetch_required(id).await
    }

    async fn set_published_location(
        &self,
        id: &MenuId,
        location: PublishedLocation,
    ) -> Result<Menu, RepositoryError> {
        let result = sqlx::query(
            "UPDATE menu SET channel_id = ?, message_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&location.channel_id.0)
        .bind(&location.message_id.0)
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        self.fetch_required(id).await
    }
}
