use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;

/// A service a garage offers (brake job, oil change, ...). The name is
/// the natural key, unique within the owning garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub labor_rate: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for ServiceItem {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::required("name", self.name.clone())]
    }
}

impl ScopedRecord for ServiceItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for ServiceItem {
    const NOUN: &'static str = "Service";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("name", &self.name)
            .require(
                "labor_rate",
                self.labor_rate >= Decimal::ZERO,
                "Labor rate must not be negative.",
            )
            .check()
    }

    fn stamp_new(&mut self, garage: GarageId) {
        self.id = Uuid::new_v4().to_string();
        self.garage = garage;
        self.created_at = Utc::now();
        self.updated_at = self.created_at;
    }
}
