use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use rolecall_core::domain::menu::{GuildId, RoleId, UserId};
use rolecall_core::domain::role::GuildRole;
use rolecall_core::sync::{plan_toggle, SyncPlan, ToggleAction};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RoleMutationError {
    #[error("missing permission to manage role `{0}`")]
    MissingPermission(RoleId),
    #[error("role `{0}` no longer exists")]
    UnknownRole(RoleId),
    #[error("platform call failed: {0}")]
    Platform(String),
}

/// Role operations the platform session exposes, scoped to a guild.
#[async_trait]
pub trait RoleGateway: Send + Sync {
    async fn list_roles(&self, guild_id: &GuildId) -> Result<Vec<GuildRole>, RoleMutationError>;

    async fn add_role(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> Result<(), RoleMutationError>;

    async fn remove_role(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> Result<(), RoleMutationError>;
}

#[derive(Default)]
pub struct NoopRoleGateway;

#[async_trait]
impl RoleGateway for NoopRoleGateway {
    async fn list_roles(&self, _guild_id: &GuildId) -> Result<Vec<GuildRole>, RoleMutationError> {
        Ok(Vec::new())
    }

    async fn add_role(
        &self,
        _guild_id: &GuildId,
        _user_id: &UserId,
        _role_id: &RoleId,
    ) -> Result<(), RoleMutationError> {
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: &GuildId,
        _user_id: &UserId,
        _role_id: &RoleId,
    ) -> Result<(), RoleMutationError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleReport {
    pub role_id: RoleId,
    pub action: ToggleAction,
    pub error: Option<String>,
}

impl ToggleReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleChangeFailure {
    pub role_id: RoleId,
    pub action: ToggleAction,
    pub reason: String,
}

/// Exactly which adds and removes succeeded and which failed. The caller
/// decides how to surface it; nothing is swallowed here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<RoleId>,
    pub removed: Vec<RoleId>,
    pub failed: Vec<RoleChangeFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies core sync plans against the role gateway, one role at a time.
pub struct RoleSynchronizer {
    gateway: Arc<dyn RoleGateway>,
}

impl RoleSynchronizer {
    pub fn new(gateway: Arc<dyn RoleGateway>) -> Self {
        Self { gateway }
    }

    /// Flip a single role for the member. Only that role is touched.
    pub async fn toggle(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        member_roles: &[RoleId],
        role_id: &RoleId,
    ) -> ToggleReport {
        let action = plan_toggle(member_roles, role_id);
        let result = match action {
            ToggleAction::Add => self.gateway.add_role(guild_id, user_id, role_id).await,
            ToggleAction::Remove => self.gateway.remove_role(guild_id, user_id, role_id).await,
        };

        ToggleReport {
            role_id: role_id.clone(),
            action,
            error: result.err().map(|error| error.to_string()),
        }
    }

    /// Apply a sync plan in one pass. A failed mutation is recorded and the
    /// remaining roles are still processed.
    pub async fn sync(&self, guild_id: &GuildId, user_id: &UserId, plan: SyncPlan) -> SyncReport {
        let mut report = SyncReport::default();

        for role_id in plan.to_add {
            match self.gateway.add_role(guild_id, user_id, &role_id).await {
                Ok(()) => report.added.push(role_id),
                Err(error) => report.failed.push(RoleChangeFailure {
                    role_id,
                    action: ToggleAction::Add,
                    reason: error.to_string(),
                }),
            }
        }

        for role_id in plan.to_remove {
            match self.gateway.remove_role(guild_id, user_id, &role_id).await {
                Ok(()) => report.removed.push(role_id),
                Err(error) => report.failed.push(RoleChangeFailure {
                    role_id,
                    action: ToggleAction::Remove,
                    reason: error.to_string(),
                }),
            }
        }

        report
    }
}
