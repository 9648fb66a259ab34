use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;
use crate::validators::{is_email, NEPALI_PHONE};

fn default_active() -> bool {
    true
}

/// A parts supplier of one garage. Name and phone are unique per
/// garage; email only when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone_number: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Supplier {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::required("name", self.name.clone()),
            UniqueKey::required("phone_number", self.phone_number.clone()),
            UniqueKey::optional("email", self.email.as_deref()),
        ]
    }
}

impl ScopedRecord for Supplier {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Supplier {
    const NOUN: &'static str = "Supplier";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("name", &self.name)
            .require(
                "phone_number",
                NEPALI_PHONE.is_match(&self.phone_number),
                "Enter a valid Nepali phone number.",
            )
            .require(
                "email",
                self.email.as_deref().map_or(true, is_email),
                "Enter a valid email address.",
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
