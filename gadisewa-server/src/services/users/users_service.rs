//! Registration and provisioning of principals.
//!
//! The request's host decides the identity universe: a platform host
//! registers platform users, a garage host registers that garage's
//! users. Listing and lookups are confined to the requesting scope, and
//! removal is a soft-disable.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use gadi_auth::{User, UserStore};
use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::schema::Rules;
use gadi_core::tenant::{TenantContext, TenantScope};
use gadi_core::GadiService;

use crate::services::GadiParams;
use crate::validators::is_email;

pub struct UsersService {
    pub users: Arc<UserStore>,
}

impl UsersService {
    fn str_field(data: &Value, key: &str) -> String {
        data.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    fn in_scope(user: &User, scope: &TenantScope) -> bool {
        match scope {
            TenantScope::Platform => user.garage.is_none(),
            TenantScope::Garage(id) => user.garage == Some(*id),
        }
    }

    async fn get_in_scope(&self, ctx: &TenantContext, id: &str) -> GadiResult<User> {
        let user = self.users.get(id).await;
        match user {
            Some(u) if Self::in_scope(&u, &ctx.scope()) => Ok(u),
            // Another scope's user is indistinguishable from no user.
            _ => Err(GadiError::not_found("User not found.").into_anyhow()),
        }
    }

    fn validate(user: &User) -> Result<()> {
        Rules::new()
            .non_empty("username", &user.username)
            .require("email", is_email(&user.email), "Enter a valid email address.")
            .non_empty("password", &user.password)
            .check()
    }
}

#[async_trait]
impl GadiService<Value, GadiParams> for UsersService {
    async fn find(&self, ctx: &TenantContext, _params: GadiParams) -> Result<Vec<Value>> {
        let users = self.users.find_for_scope(&ctx.scope()).await;
        users
            .iter()
            .map(|u| serde_json::to_value(u).map_err(|e| anyhow::anyhow!(e)))
            .collect()
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GadiParams) -> Result<Value> {
        let user = self.get_in_scope(ctx, id).await?;
        Ok(serde_json::to_value(user)?)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GadiParams) -> Result<Value> {
        // The password arrives hashed (HashPassword before-hook) and the
        // confirm_password check already ran against the plaintext.
        let now = Utc::now();
        let user = User {
            id: User::new_id(),
            username: Self::str_field(&data, "username"),
            email: Self::str_field(&data, "email"),
            first_name: Self::str_field(&data, "first_name"),
            last_name: Self::str_field(&data, "last_name"),
            password: Self::str_field(&data, "password"),
            garage: ctx.scope().garage_id(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        Self::validate(&user)?;

        let stored = self.users.insert(user).await?;
        Ok(serde_json::to_value(stored)?)
    }

    async fn patch(
        &self,
        ctx: &TenantContext,
        id: Option<&str>,
        data: Value,
        _params: GadiParams,
    ) -> Result<Value> {
        let Some(id) = id else {
            return Err(GadiError::bad_request("Patch requires an id.").into_anyhow());
        };

        let mut user = self.get_in_scope(ctx, id).await?;

        for (key, field) in [
            ("username", &mut user.username),
            ("email", &mut user.email),
            ("first_name", &mut user.first_name),
            ("last_name", &mut user.last_name),
            ("password", &mut user.password),
        ] {
            if let Some(v) = data.get(key).and_then(|v| v.as_str()) {
                *field = v.trim().to_string();
            }
        }

        Self::validate(&user)?;

        let stored = self.users.update(user).await?;
        Ok(serde_json::to_value(stored)?)
    }

    async fn remove(
        &self,
        ctx: &TenantContext,
        id: Option<&str>,
        _params: GadiParams,
    ) -> Result<Value> {
        let Some(id) = id else {
            return Err(GadiError::bad_request("Remove requires an id.").into_anyhow());
        };

        let user = self.get_in_scope(ctx, id).await?;

        // Soft disable, preserving referential history.
        let disabled = self.users.set_active(&user.id, false).await?;
        Ok(serde_json::to_value(disabled)?)
    }
}
