use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use gadi_core::hooks::{GadiAroundHook, HookContext, Next};
use serde_json::Value;

use crate::services::GadiParams;

/// Logs every service call with its resolved scope; guard and
/// resolution failures surface here at error severity.
pub struct LogAround;

#[async_trait]
impl GadiAroundHook<Value, GadiParams> for LogAround {
    async fn run(
        &self,
        ctx: &mut HookContext<Value, GadiParams>,
        next: Next<Value, GadiParams>,
    ) -> Result<()> {
        let method = ctx.params.method.clone();
        let path = ctx.params.path.clone();
        let platform = ctx.tenant.is_platform();

        tracing::info!(%method, %path, platform, "-> service call");

        let res = next.run(ctx).await;

        match &res {
            Ok(()) => tracing::info!(%method, %path, "<- ok"),
            Err(err) => tracing::error!(%method, %path, %err, "<- failed"),
        }

        res
    }
}

pub fn global_hooks(app: &gadi_core::GadiApp<Value, GadiParams>) {
    app.hooks(|h| {
        h.around_all(Arc::new(LogAround));
    });
}
