//! The platform-side garage registry.
//!
//! This is the authoritative tenant directory: created by platform
//! administration, consulted by host resolution. Garages are soft
//! disabled, never deleted — a disabled garage stops resolving
//! immediately while all of its scoped data stays in place.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gadi_core::directory::{Garage, GarageDirectory};
use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::GarageId;

pub struct GarageRegistry {
    rows: RwLock<HashMap<GarageId, Garage>>,
}

impl Default for GarageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GarageRegistry {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new garage. Every contact/identity field is globally
    /// unique across all garages; the check runs under the write lock.
    pub async fn register(&self, garage: Garage) -> GadiResult<Garage> {
        let mut rows = self.rows.write().await;

        for existing in rows.values() {
            Self::check_unique(existing, &garage)?;
        }

        rows.insert(garage.id, garage.clone());
        Ok(garage)
    }

    pub async fn get(&self, id: &GarageId) -> Option<Garage> {
        self.rows.read().await.get(id).cloned()
    }

    pub async fn all(&self) -> Vec<Garage> {
        self.rows.read().await.values().cloned().collect()
    }

    /// Update a garage's mutable attributes. The subdomain is immutable:
    /// whatever the caller sends, the stored label is preserved.
    pub async fn update(&self, mut garage: Garage) -> GadiResult<Garage> {
        let mut rows = self.rows.write().await;

        let stored = rows
            .get(&garage.id)
            .ok_or_else(|| GadiError::not_found("Garage not found.").into_anyhow())?;

        garage.subdomain = stored.subdomain.clone();
        garage.created_at = stored.created_at;
        garage.updated_at = Utc::now();

        for existing in rows.values() {
            if existing.id == garage.id {
                continue;
            }
            Self::check_unique(existing, &garage)?;
        }

        rows.insert(garage.id, garage.clone());
        Ok(garage)
    }

    /// Soft disable / re-enable. Disabling takes effect for the next
    /// resolution; nothing is deleted.
    pub async fn set_active(&self, id: &GarageId, active: bool) -> GadiResult<Garage> {
        let mut rows = self.rows.write().await;

        let garage = rows
            .get_mut(id)
            .ok_or_else(|| GadiError::not_found("Garage not found.").into_anyhow())?;

        garage.active = active;
        garage.updated_at = Utc::now();
        Ok(garage.clone())
    }

    fn check_unique(existing: &Garage, candidate: &Garage) -> GadiResult<()> {
        let pairs: [(&'static str, &str, &str); 6] = [
            ("subdomain", &existing.subdomain, &candidate.subdomain),
            ("name", &existing.name, &candidate.name),
            (
                "registration_number",
                &existing.registration_number,
                &candidate.registration_number,
            ),
            (
                "tax_pan_number",
                &existing.tax_pan_number,
                &candidate.tax_pan_number,
            ),
            ("phone_number", &existing.phone_number, &candidate.phone_number),
            ("email_address", &existing.email_address, &candidate.email_address),
        ];

        for (field, a, b) in pairs {
            // subdomain labels are matched case-insensitively everywhere
            let taken = if field == "subdomain" {
                a.eq_ignore_ascii_case(b)
            } else {
                a == b
            };

            if taken {
                return Err(GadiError::identity_collision(
                    field,
                    format!("A garage with this {field} already exists."),
                )
                .into_anyhow());
            }
        }

        Ok(())
    }
}

#[async_trait]
impl GarageDirectory for GarageRegistry {
    async fn find_active_by_subdomain(&self, label: &str) -> GadiResult<Option<Garage>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|g| g.active && g.subdomain.eq_ignore_ascii_case(label))
            .cloned())
    }
}
