use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;

/// An inventory part. The SKU is the natural key, unique per garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub brand: String,
    /// Category id.
    pub category: String,
    /// Supplier id.
    pub supplier: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Part {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::required("sku", self.sku.clone())]
    }
}

impl ScopedRecord for Part {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Part {
    const NOUN: &'static str = "Part";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("name", &self.name)
            .non_empty("sku", &self.sku)
            .non_empty("category", &self.category)
            .non_empty("supplier", &self.supplier)
            .require(
                "purchase_price",
                self.purchase_price >= Decimal::ZERO,
                "Price must not be negative.",
            )
            .require(
                "selling_price",
                self.selling_price >= Decimal::ZERO,
                "Price must not be negative.",
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
