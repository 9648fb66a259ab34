use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gadi_core::schema::Rules;
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedRecord, UniqueKey, UniqueKeyed};

use crate::services::scoped::EntityModel;
use crate::validators::{is_email, NEPALI_PHONE};

/// A customer of one garage. Phone numbers are unique per garage; email
/// is optional and only checked for uniqueness when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub garage: GarageId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UniqueKeyed for Customer {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::required("phone_number", self.phone_number.clone()),
            UniqueKey::optional("email", self.email.as_deref()),
        ]
    }
}

impl ScopedRecord for Customer {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

impl EntityModel for Customer {
    const NOUN: &'static str = "Customer";

    fn validate(&self) -> Result<()> {
        Rules::new()
            .non_empty("first_name", &self.first_name)
            .non_empty("last_name", &self.last_name)
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
