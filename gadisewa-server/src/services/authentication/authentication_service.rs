//! Login and logout.
//!
//! `create` authenticates against the scope the host resolved to — the
//! same email logging in on two different garage hosts reaches two
//! different principals — and returns a JWT bound to that scope.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use gadi_auth::{extract_bearer_token, Authenticator, TokenIssuer, INVALID_LOGIN};
use gadi_core::errors::GadiError;
use gadi_core::tenant::TenantContext;
use gadi_core::{GadiService, ServiceCapabilities, ServiceMethodKind};

use crate::services::GadiParams;

pub struct AuthenticationService {
    pub authenticator: Arc<Authenticator>,
    pub tokens: Arc<TokenIssuer>,
}

impl AuthenticationService {
    fn required<'a>(data: &'a Value, key: &str) -> Result<&'a str> {
        data.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| GadiError::not_authenticated(INVALID_LOGIN).into_anyhow())
    }
}

#[async_trait]
impl GadiService<Value, GadiParams> for AuthenticationService {
    fn capabilities(&self) -> ServiceCapabilities {
        use ServiceMethodKind::*;
        ServiceCapabilities::from_methods(vec![Create, Remove])
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GadiParams) -> Result<Value> {
        let strategy = data
            .get("strategy")
            .and_then(|v| v.as_str())
            .unwrap_or("local");
        if strategy != "local" {
            return Err(
                GadiError::not_authenticated(format!("Invalid strategy: {strategy}")).into_anyhow(),
            );
        }

        let email = Self::required(&data, "email")?;
        let password = Self::required(&data, "password")?;

        let user = self
            .authenticator
            .authenticate(&ctx.scope(), email, password)
            .await?;

        let access_token = self.tokens.issue(&user)?;

        let mut user_json = serde_json::to_value(&user)?;
        if let Some(map) = user_json.as_object_mut() {
            map.remove("password");
        }

        Ok(json!({
            "accessToken": access_token,
            "authentication": { "strategy": "local" },
            "user": user_json,
        }))
    }

    async fn remove(
        &self,
        ctx: &TenantContext,
        id: Option<&str>,
        params: GadiParams,
    ) -> Result<Value> {
        let token = extract_bearer_token(&params.headers)
            .or_else(|| id.map(|s| s.to_string()))
            .ok_or_else(|| GadiError::not_authenticated("Invalid access token.").into_anyhow())?;

        // Logout verifies the token against the current scope; a token
        // from another scope is simply invalid here.
        self.tokens.verify_for_scope(&token, &ctx.scope())?;

        Ok(json!({ "accessToken": token }))
    }
}
