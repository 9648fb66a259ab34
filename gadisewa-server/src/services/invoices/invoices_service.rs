use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKeyed};

use crate::services::scoped::EntityModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Paid,
    Void,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// An invoice for a work order. The total is derived from the line
/// items on every write, never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub work_order: String,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Invoice {}

impl ScopedRecord for Invoice {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Invoice {
    const NOUN: &'static str = "Invoice";

    fn validate(&self) -> Result<()> {
        let mut rules = Rules::new().non_empty("work_order", &self.work_order);

        for item in &self.items {
            rules = rules
                .non_empty("items.description", &item.description)
                .require(
                    "items.quantity",
                    item.quantity >= Decimal::ZERO,
                    "Quantity must not be negative.",
                )
                .require(
                    "items.unit_price",
                    item.unit_price >= Decimal::ZERO,
                    "Unit price must not be negative.",
                );
        }

        rules.check()
    }

    fn stamp_new(&mut self, garage: GarageId) {
        self.id = Uuid::new_v4().to_string();
        self.garage = garage;
        self.date = Utc::now();
        self.created_at = self.date;
        self.updated_at = self.date;
    }

    fn normalize(&mut self) {
        self.total = self
            .items
            .iter()
            .map(|i| i.quantity * i.unit_price)
            .sum::<Decimal>()
            .round_dp(2);
    }
}
