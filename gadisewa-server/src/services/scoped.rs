//! Generic CRUD service over a tenant-bound collection.
//!
//! Every tenant-scoped entity service is an instance of
//! `ScopedCrudService<T>`: it reads the garage from the request context
//! (platform requests are refused at that accessor), then only ever
//! talks to the collection through a bound handle — the unscoped read
//! shape does not exist in this module at all.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::{GarageId, TenantContext};
use gadi_core::GadiService;
use gadi_store::{ScopedCollection, ScopedRecord};

use super::types::GadiParams;

/// A tenant-scoped entity the generic CRUD service can manage.
pub trait EntityModel: ScopedRecord + Serialize + DeserializeOwned {
    /// Noun for error messages ("Customer", "Vehicle").
    const NOUN: &'static str;

    /// Field-level validation; runs on create and after every merge.
    fn validate(&self) -> Result<()>;

    /// Stamp server-controlled fields on creation: id, garage, timestamps.
    fn stamp_new(&mut self, garage: GarageId);

    /// Recompute derived fields (e.g. invoice totals) before writing.
    fn normalize(&mut self) {}
}

/// Fields clients never control; on update/patch they are restored from
/// the stored record.
const PROTECTED_FIELDS: [&str; 3] = ["id", "garage", "created_at"];

pub struct ScopedCrudService<T> {
    collection: Arc<ScopedCollection<T>>,
}

impl<T: EntityModel> ScopedCrudService<T> {
    pub fn new(collection: Arc<ScopedCollection<T>>) -> Self {
        Self { collection }
    }

    fn decode(data: Value) -> GadiResult<T> {
        serde_json::from_value(data).map_err(|e| {
            GadiError::unprocessable(format!("Invalid {} payload.", T::NOUN))
                .with_errors(json!({ "_schema": [e.to_string()] }))
                .into_anyhow()
        })
    }

    fn encode(record: &T) -> GadiResult<Value> {
        serde_json::to_value(record).map_err(|e| anyhow::anyhow!(e))
    }

    fn not_found(id: &str) -> anyhow::Error {
        GadiError::not_found(format!("{} not found: {id}", T::NOUN)).into_anyhow()
    }

    /// Overlay the protected fields of `existing` onto an incoming
    /// payload and freshen `updated_at`.
    fn overlay_protected(data: Value, existing: &Value) -> Value {
        let mut obj = data.as_object().cloned().unwrap_or_default();
        for key in PROTECTED_FIELDS {
            if let Some(v) = existing.get(key) {
                obj.insert(key.to_string(), v.clone());
            }
        }
        obj.insert("updated_at".to_string(), json!(Utc::now()));
        Value::Object(obj)
    }

    async fn write_back(
        &self,
        garage: GarageId,
        id: &str,
        merged: Value,
    ) -> Result<Value> {
        let mut record: T = Self::decode(merged)?;
        record.normalize();
        record.validate()?;

        let stored = self.collection.bind(garage).replace(id, record).await?;
        Self::encode(&stored)
    }
}

#[async_trait]
impl<T: EntityModel> GadiService<Value, GadiParams> for ScopedCrudService<T> {
    async fn find(&self, ctx: &TenantContext, _params: GadiParams) -> Result<Vec<Value>> {
        let garage = ctx.garage_id()?;
        let rows = self.collection.bind(garage).find().await?;
        rows.iter().map(Self::encode).collect()
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GadiParams) -> Result<Value> {
        let garage = ctx.garage_id()?;
        let record = self
            .collection
            .bind(garage)
            .get(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Self::encode(&record)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GadiParams) -> Result<Value> {
        let garage = ctx.garage_id()?;

        let mut record: T = Self::decode(data)?;
        record.stamp_new(garage);
        record.normalize();
        record.validate()?;

        let created = self.collection.bind(garage).insert(record).await?;
        Self::encode(&created)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: GadiParams,
    ) -> Result<Value> {
        let garage = ctx.garage_id()?;
        let bound = self.collection.bind(garage);

        let existing = bound.get(id).await?.ok_or_else(|| Self::not_found(id))?;
        let existing = Self::encode(&existing)?;

        let merged = Self::overlay_protected(data, &existing);
        self.write_back(garage, id, merged).await
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

        let existing = bound.get(id).await?.ok_or_else(|| Self::not_found(id))?;
        let mut base = Self::encode(&existing)?
            .as_object()
            .cloned()
            .unwrap_or_default();

        if let Some(patch) = data.as_object() {
            for (k, v) in patch {
                if PROTECTED_FIELDS.contains(&k.as_str()) || k == "updated_at" {
                    continue;
                }
                base.insert(k.clone(), v.clone());
            }
        }
        base.insert("updated_at".to_string(), json!(Utc::now()));

        self.write_back(garage, id, Value::Object(base)).await
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
        Self::encode(&removed)
    }
}
