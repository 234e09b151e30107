use super::{ChurchService, Principal};
use crate::error::ChurchError;
use crate::types::requests::{ChangePasswordRequest, NewUserRequest, UserUpdate};
use crate::types::{Operation, User};
use chrono::Utc;
use tracing::info;

fn normalize_group(group: Option<String>) -> Option<String> {
    group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("n/a"))
}

impl ChurchService {
    pub async fn create_user(
        &self,
        principal: &Principal,
        req: NewUserRequest,
    ) -> Result<User, ChurchError> {
        principal.require(Operation::ManageUsers)?;
        let username = req.username.trim().to_string();
        if username.is_empty() {
            return Err(ChurchError::invalid("username must not be empty"));
        }

        let now = Utc::now();
        let user = User {
            username,
            password_hash: self.gate.hash_password(&req.password).await?,
            role: req.role,
            home_cell_group: normalize_group(req.home_cell_group),
            created_at: now,
            updated_at: now,
        };
        self.gate.users().insert_user(&user).await?;
        info!(by = %principal.username, username = %user.username, role = %user.role, "user created");
        Ok(user)
    }

    /// Update an account in place. Absent fields are left unchanged.
    pub async fn update_user(
        &self,
        principal: &Principal,
        username: &str,
        update: UserUpdate,
    ) -> Result<User, ChurchError> {
        principal.require(Operation::ManageUsers)?;
        let mut user = self
            .gate
            .users()
            .find_user(username)
            .await?
            .ok_or_else(|| ChurchError::UserNotFound(username.to_string()))?;

        if let Some(password) = update.password.as_deref() {
            user.password_hash = self.gate.hash_password(password).await?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if update.home_cell_group.is_some() {
            user.home_cell_group = normalize_group(update.home_cell_group);
        }
        user.updated_at = Utc::now();

        self.gate.users().update_user(&user).await?;
        info!(
            by = %principal.username,
            username = %user.username,
            role = %user.role,
            password_changed = update.password.is_some(),
            "user updated"
        );
        Ok(user)
    }

    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, ChurchError> {
        principal.require(Operation::ManageUsers)?;
        self.gate.users().list_users().await
    }

    /// Any signed-in user may replace their own password after proving the current one.
    pub async fn change_own_password(
        &self,
        principal: &Principal,
        req: ChangePasswordRequest,
    ) -> Result<(), ChurchError> {
        self.gate
            .authenticate(&principal.username, &req.current_password)
            .await?;
        let mut user = self
            .gate
            .users()
            .find_user(&principal.username)
            .await?
            .ok_or(ChurchError::AuthenticationFailed)?;
        user.password_hash = self.gate.hash_password(&req.new_password).await?;
        user.updated_at = Utc::now();
        self.gate.users().update_user(&user).await?;
        info!(username = %user.username, "password changed");
        Ok(())
    }
}
