use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKeyed};

use crate::services::scoped::EntityModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    InProgress,
    Ready,
    Closed,
}

/// A service visit for a customer's vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub customer: String,
    pub vehicle: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(default = "Utc::now")]
    pub open_date: DateTime<Utc>,
    #[serde(default)]
    pub close_date: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for WorkOrder {}

impl ScopedRecord for WorkOrder {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for WorkOrder {
    const NOUN: &'static str = "Work order";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("customer", &self.customer)
            .non_empty("vehicle", &self.vehicle)
            .require(
                "remarks",
                self.remarks.chars().count() <= 1000,
                "Must be at most 1000 characters.",
            )
            .check()
    }

    fn stamp_new(&mut self, garage: GarageId) {
        self.id = Uuid::new_v4().to_string();
        self.garage = garage;
        self.open_date = Utc::now();
        self.created_at = self.open_date;
        self.updated_at = self.open_date;
    }
}
