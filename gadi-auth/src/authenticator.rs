//! Scoped credential verification.

use std::sync::Arc;

use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::TenantScope;

use crate::user::{User, UserStore};

/// The one message every failed login gets, regardless of cause: wrong
/// password, unknown email, wrong scope, disabled account. Anything more
/// specific would disclose which scope an identifier belongs to.
pub const INVALID_LOGIN: &str = "Invalid email or password.";

const HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> GadiResult<String> {
    bcrypt::hash(password, HASH_COST).map_err(|e| anyhow::anyhow!(e.to_string()))
}

/// Looks up a principal by credential *plus* tenant scope.
///
/// The same email may exist once per garage and once again at platform
/// scope; those are deliberately different principals, and this resolver
/// never crosses from one universe into the other.
pub struct Authenticator {
    users: Arc<UserStore>,
}

impl Authenticator {
    pub fn new(users: Arc<UserStore>) -> Self {
        Self { users }
    }

    pub async fn authenticate(
        &self,
        scope: &TenantScope,
        email: &str,
        password: &str,
    ) -> GadiResult<User> {
        let user = self
            .users
            .find_by_login(scope, email)
            .await
            .ok_or_else(|| GadiError::not_authenticated(INVALID_LOGIN).into_anyhow())?;

        let ok = bcrypt::verify(password, &user.password)
            .map_err(|_| GadiError::not_authenticated(INVALID_LOGIN).into_anyhow())?;

        if !ok || !user.active {
            return Err(GadiError::not_authenticated(INVALID_LOGIN).into_anyhow());
        }

        Ok(user)
    }
}
