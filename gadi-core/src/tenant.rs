//! Tenant scope and the per-request tenant context.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::GadiError;

/// Identifier of a garage (tenant) organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GarageId(pub Uuid);

impl GarageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for GarageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GarageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The tenancy a request resolved to.
///
/// `Platform` is the tenant-less scope: system administration and
/// accounts not bound to any garage. Everything else runs under exactly
/// one `Garage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Platform,
    Garage(GarageId),
}

impl TenantScope {
    pub fn garage_id(&self) -> Option<GarageId> {
        match self {
            TenantScope::Garage(id) => Some(*id),
            TenantScope::Platform => None,
        }
    }
}

/// Context carried with every GadiSewa operation.
///
/// Built exactly once per request (after host resolution) and threaded
/// explicitly into services, hooks and stores. There is no process-wide
/// "current tenant"; concurrent requests each own their context, and the
/// scope cannot change after construction.
#[derive(Debug, Clone)]
pub struct TenantContext {
    scope: TenantScope,
}

impl TenantContext {
    pub fn new(scope: TenantScope) -> Self {
        Self { scope }
    }

    pub fn platform() -> Self {
        Self::new(TenantScope::Platform)
    }

    pub fn for_garage(id: GarageId) -> Self {
        Self::new(TenantScope::Garage(id))
    }

    pub fn scope(&self) -> TenantScope {
        self.scope
    }

    pub fn is_platform(&self) -> bool {
        matches!(self.scope, TenantScope::Platform)
    }

    /// The current garage, or a permission error when the request is
    /// platform-scoped. Services over garage data call this instead of
    /// matching on the scope themselves, so the failure is uniform.
    pub fn garage_id(&self) -> anyhow::Result<GarageId> {
        match self.scope {
            TenantScope::Garage(id) => Ok(id),
            TenantScope::Platform => {
                Err(GadiError::forbidden("No garage found for this request.").into_anyhow())
            }
        }
    }
}
