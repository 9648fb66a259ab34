//! Garage (tenant) records and the directory lookup contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GadiResult;
use crate::tenant::GarageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GarageType {
    AutoRepair,
    BodyShop,
    MultiService,
}

/// A garage organization sharing the deployment.
///
/// `subdomain` is unique (case-insensitive) and immutable after
/// registration. Garages are never hard-deleted; `active = false` makes
/// the garage unresolvable while its scoped data stays put.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Garage {
    #[serde(default)]
    pub id: GarageId,
    pub name: String,
    pub subdomain: String,
    /// Business registration number.
    pub registration_number: String,
    pub tax_pan_number: String,
    pub garage_type: GarageType,

    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    pub email_address: String,

    /// Example: {"mon-fri": "9am-6pm", "sat": "10am-4pm"}
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<Value>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Authoritative lookup used by host resolution.
///
/// Implementations must match case-insensitively and return `None` both
/// for unknown and for deactivated subdomains, so callers cannot tell
/// the two apart.
#[async_trait]
pub trait GarageDirectory: Send + Sync {
    async fn find_active_by_subdomain(&self, label: &str) -> GadiResult<Option<Garage>>;
}
