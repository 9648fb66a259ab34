use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use gadi_core::directory::GarageDirectory;
use gadi_core::resolver::TenancyRules;
use gadi_core::{GadiApp, GadiService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::params::FromRestParams;
use crate::rest;
use crate::tenancy::{resolve_tenancy, Tenancy};
use crate::GadiAxumState;

pub struct AxumApp<R, P = ()>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<GadiApp<R, P>>,
    pub router: Router<()>,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: GadiApp<R, P>) -> Self {
        let app = Arc::new(app);
        let state = GadiAxumState {
            app: Arc::clone(&app),
        };
        Self {
            app,
            router: Router::new().with_state(state),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    pub fn service<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        self.use_get(path, handler)
    }

    /// Register a service and mount its REST routes under `path`.
    pub fn use_service(mut self, path: &'static str, service: Arc<dyn GadiService<R, P>>) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let name = path.trim_start_matches('/');
        self.app.register_service(name, service);

        let service_name = Arc::new(name.to_string());
        let router = rest::service_router(Arc::clone(&service_name), Arc::clone(&self.app));

        self.router = self.router.nest(path, router);
        self
    }

    /// Apply host-based tenant resolution to every route registered so
    /// far. Call this after the last `use_service`; routes added later
    /// would bypass resolution and fail the scope invariant instead of
    /// leaking.
    pub fn with_tenancy(mut self, directory: Arc<dyn GarageDirectory>, rules: TenancyRules) -> Self {
        let tenancy = Tenancy::new(directory, rules);
        self.router = self
            .router
            .layer(axum::middleware::from_fn_with_state(tenancy, resolve_tenancy));
        self
    }

    /// Request-id + trace layers, outermost so every response (including
    /// tenancy 404s) carries an `x-request-id`.
    pub fn with_observability(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn axum<R, P>(app: GadiApp<R, P>) -> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    AxumApp::new(app)
}
