use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use gadi_auth::{HashPassword, Protect};
use gadi_core::schema::{HookMeta, Rules, ValidateData, WriteMethods};
use gadi_core::GadiApp;

use crate::services::GadiParams;

/// Registration payload checks that must see the plaintext password,
/// so they run before the hash hook.
fn validate_registration(data: &Value, _meta: &HookMeta<Value, GadiParams>) -> Result<()> {
    let password = data
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let confirm = data.get("confirm_password").and_then(|v| v.as_str());

    Rules::new()
        .min_len("password", password, 8)
        .require(
            "confirm_password",
            confirm.map_or(true, |c| c == password),
            "Password fields didn't match.",
        )
        .check()
}

pub fn register_hooks(app: &GadiApp<Value, GadiParams>) -> Result<()> {
    app.service("users")?.hooks(|h| {
        h.before_all(Arc::new(
            ValidateData::new(validate_registration).with_methods(WriteMethods::Create),
        ));
        h.before_all(Arc::new(HashPassword::new("password")));
        h.after_all(Arc::new(Protect::new("password")));
    });

    Ok(())
}
