use anyhow::Result;
use async_trait::async_trait;

use crate::errors::GadiError;
use crate::tenant::TenantContext;

/// Standard service methods: find, get, create, update, patch, remove.
///
/// Custom methods are declared via `Custom("methodName")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Custom(&'static str),
}

/// Which methods a service exposes to the outside world. Adapters (like
/// gadi-axum) mount only the allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }
}

/// Core GadiSewa service trait.
///
/// Every method takes the per-request `TenantContext` — there is no way
/// to call a service without deciding whose data it operates on. All
/// methods default to "not implemented" so a service overrides only what
/// it supports.
#[async_trait]
pub trait GadiService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    /// Find many records (optionally filtered by params).
    async fn find(&self, _ctx: &TenantContext, _params: P) -> Result<Vec<R>> {
        Err(GadiError::not_implemented("Method not implemented: find").into_anyhow())
    }

    /// Get a single record by id.
    async fn get(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        Err(GadiError::not_implemented("Method not implemented: get").into_anyhow())
    }

    /// Create a new record.
    async fn create(&self, _ctx: &TenantContext, _data: R, _params: P) -> Result<R> {
        Err(GadiError::not_implemented("Method not implemented: create").into_anyhow())
    }

    /// Fully replace an existing record.
    async fn update(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(GadiError::not_implemented("Method not implemented: update").into_anyhow())
    }

    /// Partially update an existing record. `id` may be `None` when an
    /// implementation supports "multi" semantics.
    async fn patch(
        &self,
        _ctx: &TenantContext,
        _id: Option<&str>,
        _data: R,
        _params: P,
    ) -> Result<R> {
        Err(GadiError::not_implemented("Method not implemented: patch").into_anyhow())
    }

    /// Remove an existing record.
    async fn remove(&self, _ctx: &TenantContext, _id: Option<&str>, _params: P) -> Result<R> {
        Err(GadiError::not_implemented("Method not implemented: remove").into_anyhow())
    }
}
