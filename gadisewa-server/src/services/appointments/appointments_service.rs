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
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub vehicle: String,
    /// Assigned mechanic (employee id), if any.
    #[serde(default)]
    pub mechanic: Option<String>,
    /// Requested service ids from the garage's catalog.
    #[serde(default)]
    pub service_type: Vec<String>,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Appointment {}

impl ScopedRecord for Appointment {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Appointment {
    const NOUN: &'static str = "Appointment";

    fn validate(&self) -> Result<()> {
        Rules::new().non_empty("vehicle", &self.vehicle).check()
    }

    fn stamp_new(&mut self, garage: GarageId) {
        self.id = Uuid::new_v4().to_string();
        self.garage = garage;
        self.created_at = Utc::now();
        self.updated_at = self.created_at;
    }
}
