use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;
use crate::validators::NEPALI_VRN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
}

/// A customer's vehicle. The registration number follows the Department
/// of Transport Management format ("Ba 1 Pa 1234") and is unique within
/// the garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    /// Owning customer id.
    pub customer: String,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<u16>,
    /// Odometer reading in km.
    #[serde(default)]
    pub odometer_reading: u32,
    pub fuel_type: FuelType,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Vehicle {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::required(
            "registration_number",
            self.registration_number.clone(),
        )]
    }
}

impl ScopedRecord for Vehicle {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Vehicle {
    const NOUN: &'static str = "Vehicle";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("customer", &self.customer)
            .non_empty("make", &self.make)
            .non_empty("model", &self.model)
            .require(
                "registration_number",
                NEPALI_VRN.is_match(&self.registration_number),
                "Enter a valid Nepalese Vehicle Registration Number, e.g., Ba 1 Pa 1234.",
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
