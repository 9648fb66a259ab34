use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;

use crate::config::{ConfigSnapshot, GadiConfig};
use crate::hooks::{collect_method_hooks, HookContext, HookFut, HookResult, Next, ServiceHooks};
use crate::service::{GadiService, ServiceMethodKind};
use crate::tenant::TenantContext;

struct GadiAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    services: RwLock<HashMap<String, Arc<dyn GadiService<R, P>>>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<GadiConfig>,
    // The concrete Arc<dyn GadiService<R,P>> stored as Box<dyn Any>, so
    // ServiceCaller can hand it back with different type parameters.
    any_services: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

/// Central application container: named services, app-wide and
/// per-service hooks, configuration. Framework-agnostic; transports
/// (HTTP, jobs, tests) call services through `ServiceHandle`.
pub struct GadiApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<GadiAppInner<R, P>>,
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn crate::hooks::GadiAroundHook<R, P>>>,
    Vec<Arc<dyn crate::hooks::GadiBeforeHook<R, P>>>,
    Vec<Arc<dyn crate::hooks::GadiAfterHook<R, P>>>,
    Vec<Arc<dyn crate::hooks::GadiErrorHook<R, P>>>,
);

type ServiceCall<R, P> = Arc<
    dyn for<'a> Fn(Arc<dyn GadiService<R, P>>, &'a mut HookContext<R, P>) -> HookFut<'a>
        + Send
        + Sync,
>;

impl<R, P> Default for GadiApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for GadiApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> GadiApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GadiAppInner {
                services: RwLock::new(HashMap::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(GadiConfig::new()),
                any_services: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn GadiService<R, P>>)
    where
        S: Into<String>,
    {
        let name = name.into();

        self.inner
            .services
            .write()
            .unwrap()
            .insert(name.clone(), service.clone());

        self.inner
            .any_services
            .write()
            .unwrap()
            .insert(name, Box::new(service));
    }

    /// App-wide hooks, run before any per-service hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = self.inner.global_hooks.write().unwrap();
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = self.inner.service_hooks.write().unwrap();
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = self
            .inner
            .services
            .read()
            .unwrap()
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("GadiService not found: {name}"))?
            .clone();

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().unwrap().set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self.inner.config.read().unwrap();
        cfg.get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        let cfg = self.inner.config.read().unwrap();
        cfg.snapshot()
    }
}

/// A registered service plus the app context needed to run its pipeline.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: GadiApp<R, P>,
    name: String,
    service: Arc<dyn GadiService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn inner(&self) -> &Arc<dyn GadiService<R, P>> {
        &self.service
    }

    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<R, P> {
        let g = self.app.inner.global_hooks.read().unwrap();
        let map = self.app.inner.service_hooks.read().unwrap();
        let s = map.get(&self.name);

        let mut around = collect_method_hooks(&g.around_all, &g.around_by_method, method);
        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = s {
            around.extend(collect_method_hooks(&h.around_all, &h.around_by_method, method));
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }

        (around, before, after, error)
    }

    /// around → before → service_call → after; error hooks on failure.
    async fn run_pipeline(
        &self,
        method: ServiceMethodKind,
        mut ctx: HookContext<R, P>,
        service_call: ServiceCall<R, P>,
    ) -> Result<HookContext<R, P>> {
        let (around, before, after, error) = self.collect_hooks_for_method(&method);

        let svc = self.service.clone();
        let service_call_inner = service_call.clone();

        // Inner chain: BEFORE -> service call -> AFTER (reverse order).
        let mut next: Next<R, P> = Next {
            call: Box::new(move |ctx: &mut HookContext<R, P>| -> HookFut<'_> {
                let before = before.clone();
                let after = after.clone();
                let svc = svc.clone();
                let service_call = service_call_inner.clone();

                Box::pin(async move {
                    for h in &before {
                        h.run(ctx).await?;
                    }

                    // sets ctx.result
                    (service_call)(svc, ctx).await?;

                    for h in after.iter().rev() {
                        h.run(ctx).await?;
                    }

                    Ok(())
                })
            }),
        };

        // AROUND chain: first registered hook is outermost.
        for h in around.iter().rev() {
            let hook = h.clone();
            let prev = next;
            next = Next {
                call: Box::new(move |ctx: &mut HookContext<R, P>| -> HookFut<'_> {
                    Box::pin(async move { hook.run(ctx, prev).await })
                }),
            };
        }

        let res = next.run(&mut ctx).await;

        if let Err(e) = res {
            ctx.error = Some(e);

            for h in &error {
                let _ = h.run(&mut ctx).await;
            }

            // An error hook may have recovered the call by clearing it.
            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let method = ServiceMethodKind::Find;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let ctx = HookContext::new(tenant, method.clone(), params, services, config);

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(|svc, ctx| {
                    Box::pin(async move {
                        let records = svc.find(&ctx.tenant, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::Many(records));
                        Ok(())
                    })
                }),
            )
            .await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => {
                Err(anyhow::anyhow!("find() produced HookResult::One unexpectedly"))
            }
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let method = ServiceMethodKind::Get;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let ctx = HookContext::new(tenant, method.clone(), params, services, config);

        let id = id.to_string();

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let record = svc.get(&ctx.tenant, &id, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(record));
                        Ok(())
                    })
                }),
            )
            .await?;

        Self::expect_one(ctx, "get")
    }

    pub async fn create(&self, tenant: TenantContext, data: R, params: P) -> Result<R> {
        let method = ServiceMethodKind::Create;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let mut ctx = HookContext::new(tenant, method.clone(), params, services, config);
        ctx.data = Some(data);

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(|svc, ctx| {
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("create() requires ctx.data"))?;

                        let created = svc.create(&ctx.tenant, data, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(created));
                        Ok(())
                    })
                }),
            )
            .await?;

        Self::expect_one(ctx, "create")
    }

    pub async fn update(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let method = ServiceMethodKind::Update;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let mut ctx = HookContext::new(tenant, method.clone(), params, services, config);
        ctx.data = Some(data);

        let id = id.to_string();

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("update() requires ctx.data"))?;

                        let updated = svc.update(&ctx.tenant, &id, data, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(updated));
                        Ok(())
                    })
                }),
            )
            .await?;

        Self::expect_one(ctx, "update")
    }

    pub async fn patch(
        &self,
        tenant: TenantContext,
        id: Option<&str>,
        data: R,
        params: P,
    ) -> Result<R> {
        let method = ServiceMethodKind::Patch;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let mut ctx = HookContext::new(tenant, method.clone(), params, services, config);
        ctx.data = Some(data);

        let id: Option<String> = id.map(|s| s.to_string());

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("patch() requires ctx.data"))?;

                        let patched = svc
                            .patch(&ctx.tenant, id.as_deref(), data, ctx.params.clone())
                            .await?;
                        ctx.result = Some(HookResult::One(patched));
                        Ok(())
                    })
                }),
            )
            .await?;

        Self::expect_one(ctx, "patch")
    }

    pub async fn remove(&self, tenant: TenantContext, id: Option<&str>, params: P) -> Result<R> {
        let method = ServiceMethodKind::Remove;

        let services = ServiceCaller::new(self.app.clone());
        let config = self.app.config_snapshot();
        let ctx = HookContext::new(tenant, method.clone(), params, services, config);

        let id: Option<String> = id.map(|s| s.to_string());

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let removed = svc.remove(&ctx.tenant, id.as_deref(), ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(removed));
                        Ok(())
                    })
                }),
            )
            .await?;

        Self::expect_one(ctx, "remove")
    }

    fn expect_one(ctx: HookContext<R, P>, method: &str) -> Result<R> {
        match ctx.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(anyhow::anyhow!(
                "{method}() produced HookResult::Many unexpectedly"
            )),
            None => Err(anyhow::anyhow!("{method}() produced no result")),
        }
    }
}

/// Lets hooks and services call other registered services.
pub struct ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: GadiApp<R, P>,
}

impl<R, P> Clone for ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

impl<R, P> ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new(app: GadiApp<R, P>) -> Self {
        Self { app }
    }

    pub fn service<R2, P2>(&self, name: &str) -> Result<Arc<dyn GadiService<R2, P2>>>
    where
        R2: Send + 'static,
        P2: Send + 'static,
    {
        let map = self.app.inner.any_services.read().unwrap();

        let any = map
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("GadiService not found: {name}"))?;

        let stored = any
            .as_ref()
            .downcast_ref::<Arc<dyn GadiService<R2, P2>>>()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "GadiService type mismatch for '{name}'. \
                     You requested a different <R,P> than what was registered."
                )
            })?;

        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::hooks::{GadiBeforeHook, HookContext};

    struct Echo;

    #[async_trait]
    impl GadiService<Value, ()> for Echo {
        async fn create(&self, _ctx: &TenantContext, data: Value, _params: ()) -> Result<Value> {
            Ok(data)
        }
    }

    struct Stamp(&'static str, Arc<AtomicUsize>);

    #[async_trait]
    impl GadiBeforeHook<Value, ()> for Stamp {
        async fn run(&self, ctx: &mut HookContext<Value, ()>) -> Result<()> {
            let order = self.1.fetch_add(1, Ordering::SeqCst);
            if let Some(Value::Object(map)) = ctx.data.as_mut() {
                map.insert(self.0.to_string(), json!(order));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn global_hooks_run_before_service_hooks() {
        let app: GadiApp<Value, ()> = GadiApp::new();
        app.register_service("things", Arc::new(Echo));

        let counter = Arc::new(AtomicUsize::new(0));
        app.hooks(|h| {
            h.before_all(Arc::new(Stamp("global", counter.clone())));
        });

        let svc = app
            .service("things")
            .unwrap()
            .hooks(|h| {
                h.before_all(Arc::new(Stamp("service", counter.clone())));
            });

        let out = svc
            .create(TenantContext::platform(), json!({}), ())
            .await
            .unwrap();

        assert_eq!(out["global"], json!(0));
        assert_eq!(out["service"], json!(1));
    }

    #[tokio::test]
    async fn unknown_service_is_an_error() {
        let app: GadiApp<Value, ()> = GadiApp::new();
        assert!(app.service("nope").is_err());
    }
}
