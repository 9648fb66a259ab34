//! The tenant access guard.
//!
//! Tenant-scoped entities live only in a `ScopedCollection<T>`. The type
//! deliberately has no "read everything" method: the one collection-wide
//! entry point takes an explicit garage filter and fails closed without
//! it, and all other access goes through a `Bound` handle that carries
//! the filter lexically. Forgetting the tenant is therefore either a
//! compile error (no such method) or an immediate `MissingTenantScope`,
//! never a silent cross-tenant read.

use std::collections::HashMap;

use tokio::sync::RwLock;

use gadi_core::errors::{ErrorKind, GadiError, GadiResult};
use gadi_core::tenant::GarageId;

use crate::unique::{check_collisions, UniqueKeyed};

/// A record owned by exactly one garage.
pub trait ScopedRecord: UniqueKeyed + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn garage(&self) -> GarageId;
}

/// Storage for one tenant-scoped entity type, keyed garage-first.
pub struct ScopedCollection<T> {
    name: &'static str,
    rows: RwLock<HashMap<GarageId, HashMap<String, T>>>,
}

impl<T: ScopedRecord> ScopedCollection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The only collection-wide read. A missing filter is a programming
    /// contract violation: logged loudly, fatal to the request, never
    /// defaulted to "all garages".
    pub async fn find(&self, filter: Option<&GarageId>) -> GadiResult<Vec<T>> {
        let Some(garage) = filter else {
            tracing::error!(
                collection = self.name,
                "tenant-scoped read attempted without a garage filter"
            );
            return Err(GadiError::missing_tenant_scope(self.name).into_anyhow());
        };

        let rows = self.rows.read().await;
        Ok(rows
            .get(garage)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    /// A handle bound to one garage; every operation on it carries the
    /// filter by construction.
    pub fn bind(&self, garage: GarageId) -> Bound<'_, T> {
        Bound { col: self, garage }
    }
}

pub struct Bound<'c, T> {
    col: &'c ScopedCollection<T>,
    garage: GarageId,
}

impl<T: ScopedRecord> Bound<'_, T> {
    pub fn garage_id(&self) -> GarageId {
        self.garage
    }

    pub async fn find(&self) -> GadiResult<Vec<T>> {
        self.col.find(Some(&self.garage)).await
    }

    /// Lookup within the bound garage only; an id existing under another
    /// garage is indistinguishable from an unknown id.
    pub async fn get(&self, id: &str) -> GadiResult<Option<T>> {
        let rows = self.col.rows.read().await;
        Ok(rows.get(&self.garage).and_then(|m| m.get(id)).cloned())
    }

    /// Insert a new record. Ownership and uniqueness are verified inside
    /// the same write critical section as the insert, so concurrent
    /// creations cannot both pass the constraint check.
    pub async fn insert(&self, record: T) -> GadiResult<T> {
        self.check_ownership(&record)?;

        let mut rows = self.col.rows.write().await;
        let map = rows.entry(self.garage).or_default();

        if map.contains_key(record.id()) {
            return Err(GadiError::conflict(format!(
                "A record with id '{}' already exists in '{}'.",
                record.id(),
                self.col.name
            ))
            .into_anyhow());
        }

        check_collisions(
            record.id(),
            &record,
            map.iter().map(|(id, r)| (id.as_str(), r)),
        )?;

        map.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    /// Overwrite an existing record, re-checking uniqueness against its
    /// siblings (excluding itself).
    pub async fn replace(&self, id: &str, record: T) -> GadiResult<T> {
        self.check_ownership(&record)?;

        if record.id() != id {
            return Err(
                GadiError::bad_request("Record id does not match the target id.").into_anyhow()
            );
        }

        let mut rows = self.col.rows.write().await;
        let map = rows.entry(self.garage).or_default();

        if !map.contains_key(id) {
            return Err(GadiError::not_found(format!(
                "Record not found in '{}': {id}",
                self.col.name
            ))
            .into_anyhow());
        }

        check_collisions(id, &record, map.iter().map(|(rid, r)| (rid.as_str(), r)))?;

        map.insert(id.to_string(), record.clone());
        Ok(record)
    }

    pub async fn remove(&self, id: &str) -> GadiResult<Option<T>> {
        let mut rows = self.col.rows.write().await;
        Ok(rows.get_mut(&self.garage).and_then(|m| m.remove(id)))
    }

    fn check_ownership(&self, record: &T) -> GadiResult<()> {
        if record.garage() != self.garage {
            tracing::error!(
                collection = self.col.name,
                "record stamped for a different garage than the bound handle"
            );
            return Err(GadiError::new(
                ErrorKind::MissingTenantScope,
                format!(
                    "Record garage does not match the bound garage for '{}'.",
                    self.col.name
                ),
            )
            .into_anyhow());
        }
        Ok(())
    }
}
