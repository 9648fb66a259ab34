//! Platform-side garage administration.
//!
//! Registration, listing and soft-disable of tenants. Every method
//! requires the platform scope — a garage host poking at another
//! garage's registration is refused outright, and `remove` deactivates
//! instead of deleting so historical scoped data survives.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use gadi_core::directory::Garage;
use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::resolver::TenancyRules;
use gadi_core::schema::Rules;
use gadi_core::tenant::{GarageId, TenantContext};
use gadi_core::{GadiService, ServiceCapabilities, ServiceMethodKind};
use gadi_store::GarageRegistry;

use crate::services::GadiParams;
use crate::validators::{is_email, NEPALI_PHONE, SUBDOMAIN_LABEL};

pub struct GaragesService {
    pub registry: Arc<GarageRegistry>,
    pub rules: TenancyRules,
}

impl GaragesService {
    fn ensure_platform(ctx: &TenantContext) -> GadiResult<()> {
        if ctx.is_platform() {
            Ok(())
        } else {
            Err(
                GadiError::forbidden("Garage administration requires the platform scope.")
                    .into_anyhow(),
            )
        }
    }

    fn decode(data: Value) -> GadiResult<Garage> {
        serde_json::from_value(data).map_err(|e| {
            GadiError::unprocessable("Invalid garage payload.")
                .with_errors(json!({ "_schema": [e.to_string()] }))
                .into_anyhow()
        })
    }

    fn parse_id(id: &str) -> GadiResult<GarageId> {
        GarageId::parse(id).ok_or_else(|| GadiError::not_found("Garage not found.").into_anyhow())
    }

    fn validate(&self, garage: &Garage) -> Result<()> {
        Rules::new()
            .non_empty("name", &garage.name)
            .require(
                "subdomain",
                SUBDOMAIN_LABEL.is_match(&garage.subdomain),
                "Subdomain must be lowercase letters, digits and dashes.",
            )
            .require(
                "subdomain",
                !self.rules.is_reserved(&garage.subdomain),
                "This subdomain is reserved.",
            )
            .non_empty("registration_number", &garage.registration_number)
            .non_empty("tax_pan_number", &garage.tax_pan_number)
            .non_empty("street_address", &garage.street_address)
            .non_empty("city", &garage.city)
            .non_empty("postal_code", &garage.postal_code)
            .require(
                "phone_number",
                NEPALI_PHONE.is_match(&garage.phone_number),
                "Enter a valid Nepali phone number.",
            )
            .require(
                "email_address",
                is_email(&garage.email_address),
                "Enter a valid email address.",
            )
            .check()
    }
}

#[async_trait]
impl GadiService<Value, GadiParams> for GaragesService {
    fn capabilities(&self) -> ServiceCapabilities {
        use ServiceMethodKind::*;
        ServiceCapabilities::from_methods(vec![Find, Get, Create, Patch, Remove])
    }

    async fn find(&self, ctx: &TenantContext, _params: GadiParams) -> Result<Vec<Value>> {
        Self::ensure_platform(ctx)?;
        let garages = self.registry.all().await;
        garages
            .iter()
            .map(|g| serde_json::to_value(g).map_err(|e| anyhow::anyhow!(e)))
            .collect()
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GadiParams) -> Result<Value> {
        Self::ensure_platform(ctx)?;
        let id = Self::parse_id(id)?;
        let garage = self
            .registry
            .get(&id)
            .await
            .ok_or_else(|| GadiError::not_found("Garage not found.").into_anyhow())?;
        Ok(serde_json::to_value(garage)?)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GadiParams) -> Result<Value> {
        Self::ensure_platform(ctx)?;

        let mut garage = Self::decode(data)?;
        garage.id = GarageId::new();
        garage.subdomain = garage.subdomain.trim().to_lowercase();
        garage.active = true;
        garage.created_at = Utc::now();
        garage.updated_at = garage.created_at;

        self.validate(&garage)?;

        let stored = self.registry.register(garage).await?;
        Ok(serde_json::to_value(stored)?)
    }

    async fn patch(
        &self,
        ctx: &TenantContext,
        id: Option<&str>,
        data: Value,
        _params: GadiParams,
    ) -> Result<Value> {
        Self::ensure_platform(ctx)?;

        let Some(id) = id else {
            return Err(GadiError::bad_request("Patch requires an id.").into_anyhow());
        };
        let id = Self::parse_id(id)?;

        let stored = self
            .registry
            .get(&id)
            .await
            .ok_or_else(|| GadiError::not_found("Garage not found.").into_anyhow())?;

        let mut base = serde_json::to_value(&stored)?
            .as_object()
            .cloned()
            .unwrap_or_default();

        if let Some(patch) = data.as_object() {
            for (k, v) in patch {
                // id and subdomain never change after registration
                if matches!(k.as_str(), "id" | "subdomain" | "created_at" | "updated_at") {
                    continue;
                }
                base.insert(k.clone(), v.clone());
            }
        }

        let garage = Self::decode(Value::Object(base))?;
        self.validate(&garage)?;

        let stored = self.registry.update(garage).await?;
        Ok(serde_json::to_value(stored)?)
    }

    async fn remove(
        &self,
        ctx: &TenantContext,
        id: Option<&str>,
        _params: GadiParams,
    ) -> Result<Value> {
        Self::ensure_platform(ctx)?;

        let Some(id) = id else {
            return Err(GadiError::bad_request("Remove requires an id.").into_anyhow());
        };
        let id = Self::parse_id(id)?;

        // Soft disable: the garage stops resolving but nothing is lost.
        let disabled = self.registry.set_active(&id, false).await?;
        Ok(serde_json::to_value(disabled)?)
    }
}
