//! Employees of a garage.
//!
//! An employee links a garage-scoped user to a role. Platform users can
//! never be employees, and an employee's user must belong to the same
//! garage — both enforced here at write time.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use gadi_auth::UserStore;
use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::{GarageId, TenantContext};
use gadi_core::GadiService;
use gadi_store::{ScopedCollection, ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::GadiParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    Tech,
    Advisor,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    /// The garage user this employee wraps; one employee per user.
    pub user: String,
    pub role: EmployeeRole,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Employee {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::required("user", self.user.clone())]
    }
}

impl ScopedRecord for Employee {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

pub struct EmployeesService {
    pub collection: Arc<ScopedCollection<Employee>>,
    pub users: Arc<UserStore>,
}

impl EmployeesService {
    fn decode(data: Value) -> GadiResult<Employee> {
        serde_json::from_value(data).map_err(|e| {
            GadiError::unprocessable("Invalid employee payload.")
                .with_errors(json!({ "_schema": [e.to_string()] }))
                .into_anyhow()
        })
    }

    async fn check_user(&self, garage: GarageId, user_id: &str) -> Result<()> {
        let user = self.users.get(user_id).await;

        let belongs = user.as_ref().map(|u| u.garage) == Some(Some(garage));
        if !belongs {
            // Platform users and other garages' users are equally invalid.
            return Err(GadiError::unprocessable("Validation failed.")
                .with_errors(json!({ "user": ["Employee garage must match user garage."] }))
                .into_anyhow());
        }

        Ok(())
    }

    fn not_found(id: &str) -> anyhow::Error {
        GadiError::not_found(format!("Employee not found: {id}")).into_anyhow()
    }
}

#[async_trait]
impl GadiService<Value, GadiParams> for EmployeesService {
    async fn find(&self, ctx: &TenantContext, _params: GadiParams) -> Result<Vec<Value>> {
        let garage = ctx.garage_id()?;
        let rows = self.collection.bind(garage).find().await?;
        rows.iter()
            .map(|r| serde_json::to_value(r).map_err(|e| anyhow::anyhow!(e)))
            .collect()
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GadiParams) -> Result<Value> {
        let garage = ctx.garage_id()?;
        let employee = self
            .collection
            .bind(garage)
            .get(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Ok(serde_json::to_value(employee)?)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GadiParams) -> Result<Value> {
        let garage = ctx.garage_id()?;

        let mut employee = Self::decode(data)?;
        self.check_user(garage, &employee.user).await?;

        employee.id = Uuid::new_v4().to_string();
        employee.garage = garage;
        employee.created_at = Utc::now();
        employee.updated_at = employee.created_at;

        let stored = self.collection.bind(garage).insert(employee).await?;
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

        let garage = ctx.garage_id()?;
        let bound = self.collection.bind(garage);

        let mut employee = bound.get(id).await?.ok_or_else(|| Self::not_found(id))?;

        // Only the role is mutable; the linked user is fixed at creation.
        if let Some(role) = data.get("role") {
            employee.role = serde_json::from_value(role.clone()).map_err(|_| {
                GadiError::unprocessable("Validation failed.")
                    .with_errors(json!({ "role": ["Unknown role."] }))
                    .into_anyhow()
            })?;
        }
        employee.updated_at = Utc::now();

        let stored = bound.replace(id, employee).await?;
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

        let garage = ctx.garage_id()?;
        let removed = self
            .collection
            .bind(garage)
            .remove(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Ok(serde_json::to_value(removed)?)
    }
}
