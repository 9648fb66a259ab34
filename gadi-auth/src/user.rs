//! Principals and the dual-scope user store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::{GarageId, TenantScope};

/// An authenticatable user.
///
/// Exactly one of two identity universes applies: `garage = None` makes
/// this a platform principal whose login identifiers are unique across
/// all platform principals; `garage = Some(..)` scopes the identifiers
/// to that garage, so the same email may belong to someone else in a
/// different garage or at platform scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// bcrypt hash, never plaintext. Stripped from responses by the
    /// `Protect` hook.
    pub password: String,
    #[serde(default)]
    pub garage: Option<GarageId>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn in_scope(&self, scope: &TenantScope) -> bool {
        match scope {
            TenantScope::Platform => self.garage.is_none(),
            TenantScope::Garage(id) => self.garage == Some(*id),
        }
    }
}

/// Store for all principals, platform and garage alike, with the
/// dual-scope uniqueness rules enforced under the write lock:
/// `(garage, username)` and `(garage, email)` unique per garage,
/// `username`/`email` unique among all tenant-less users.
pub struct UserStore {
    rows: RwLock<HashMap<String, User>>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, user: User) -> GadiResult<User> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&user.id) {
            return Err(
                GadiError::conflict(format!("A user with id '{}' already exists.", user.id))
                    .into_anyhow(),
            );
        }

        Self::check_scope_unique(rows.values(), &user)?;

        rows.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub async fn update(&self, mut user: User) -> GadiResult<User> {
        let mut rows = self.rows.write().await;

        let stored = rows
            .get(&user.id)
            .ok_or_else(|| GadiError::not_found("User not found.").into_anyhow())?;

        // The identity universe never changes after creation.
        user.garage = stored.garage;
        user.created_at = stored.created_at;
        user.updated_at = Utc::now();

        Self::check_scope_unique(rows.values().filter(|u| u.id != user.id), &user)?;

        rows.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub async fn get(&self, id: &str) -> Option<User> {
        self.rows.read().await.get(id).cloned()
    }

    /// Credential lookup for one scope. A platform scope only ever sees
    /// tenant-less users; a garage scope only that garage's users. There
    /// is no fallback between the two — cross-scope matching is the
    /// isolation bug this store exists to prevent.
    pub async fn find_by_login(&self, scope: &TenantScope, email: &str) -> Option<User> {
        let rows = self.rows.read().await;
        rows.values()
            .find(|u| u.in_scope(scope) && u.email == email)
            .cloned()
    }

    /// All principals visible to the given scope.
    pub async fn find_for_scope(&self, scope: &TenantScope) -> Vec<User> {
        let rows = self.rows.read().await;
        rows.values().filter(|u| u.in_scope(scope)).cloned().collect()
    }

    /// Soft disable / re-enable; users are never hard-deleted.
    pub async fn set_active(&self, id: &str, active: bool) -> GadiResult<User> {
        let mut rows = self.rows.write().await;

        let user = rows
            .get_mut(id)
            .ok_or_else(|| GadiError::not_found("User not found.").into_anyhow())?;

        user.active = active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn check_scope_unique<'a>(
        existing: impl Iterator<Item = &'a User>,
        candidate: &User,
    ) -> GadiResult<()> {
        for other in existing {
            if other.garage != candidate.garage {
                continue;
            }

            if other.username == candidate.username {
                return Err(GadiError::identity_collision(
                    "username",
                    "A user with that username already exists.",
                )
                .into_anyhow());
            }

            if other.email == candidate.email {
                return Err(GadiError::identity_collision(
                    "email",
                    "A user with that email already exists.",
                )
                .into_anyhow());
            }
        }

        Ok(())
    }
}
