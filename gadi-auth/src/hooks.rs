//! Password hooks for user-shaped JSON payloads.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use gadi_core::errors::GadiError;
use gadi_core::hooks::{GadiAfterHook, GadiBeforeHook, HookContext, HookResult};

use crate::authenticator::hash_password;

/// Before-hook: replace the plaintext password field in `ctx.data` with
/// its bcrypt hash. Payloads without the field pass through untouched.
pub struct HashPassword {
    pub field: &'static str,
}

impl HashPassword {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }

    fn hash_one(&self, mut value: Value) -> Result<Value> {
        let Some(pw) = value.get(self.field) else {
            return Ok(value);
        };

        let Some(pw) = pw.as_str() else {
            return Err(GadiError::bad_request("Password must be a string.").into_anyhow());
        };

        if pw.trim().is_empty() {
            return Ok(value);
        }

        let hashed = hash_password(pw)?;
        if let Some(map) = value.as_object_mut() {
            map.insert(self.field.to_string(), Value::String(hashed));
        }
        Ok(value)
    }
}

#[async_trait]
impl<P> GadiBeforeHook<Value, P> for HashPassword
where
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<Value, P>) -> Result<()> {
        let Some(data) = ctx.data.take() else {
            return Ok(());
        };

        ctx.data = Some(self.hash_one(data)?);
        Ok(())
    }
}

/// After-hook: strip a sensitive field from every outgoing record so a
/// hash can never leak through a response body.
pub struct Protect {
    pub field: &'static str,
}

impl Protect {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }

    fn strip(&self, value: &mut Value) {
        if let Some(map) = value.as_object_mut() {
            map.remove(self.field);
        }
    }
}

#[async_trait]
impl<P> GadiAfterHook<Value, P> for Protect
where
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<Value, P>) -> Result<()> {
        match ctx.result.as_mut() {
            Some(HookResult::One(v)) => self.strip(v),
            Some(HookResult::Many(vs)) => {
                for v in vs {
                    self.strip(v);
                }
            }
            None => {}
        }
        Ok(())
    }
}
