use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;

fn default_active() -> bool {
    true
}

/// A part category of one garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Category {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::required("name", self.name.clone())]
    }
}

impl ScopedRecord for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Category {
    const NOUN: &'static str = "Category";

    fn validate(&self) -> Result<()> {
        Rules::new().non_empty("name", &self.name).check()
    }

    fn stamp_new(&mut self, garage: GarageId) {
        self.id = Uuid::new_v4().to_string();
        self.garage = garage;
        self.created_at = Utc::now();
        self.updated_at = self.created_at;
    }
}
