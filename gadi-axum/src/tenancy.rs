//! Host-based tenancy middleware.
//!
//! Resolution runs once per request, before routing reaches any service:
//! the `Host` header is parsed, the directory consulted, and the
//! resulting `TenantScope` attached as a request extension. The
//! extension is read-only from then on — handlers take it out through
//! the `ResolvedScope` extractor and build their `TenantContext` from
//! it. An unknown or disabled subdomain terminates the request with a
//! uniform 404 here, so no guarded data access can ever run for it.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use gadi_core::directory::GarageDirectory;
use gadi_core::errors::GadiError;
use gadi_core::resolver::{resolve_scope, TenancyRules};
use gadi_core::tenant::{TenantContext, TenantScope};

use crate::GadiAxumError;

#[derive(Clone)]
pub struct Tenancy {
    pub directory: Arc<dyn GarageDirectory>,
    pub rules: Arc<TenancyRules>,
}

impl Tenancy {
    pub fn new(directory: Arc<dyn GarageDirectory>, rules: TenancyRules) -> Self {
        Self {
            directory,
            rules: Arc::new(rules),
        }
    }
}

pub async fn resolve_tenancy(
    State(tenancy): State<Tenancy>,
    mut req: Request,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match resolve_scope(tenancy.directory.as_ref(), host, &tenancy.rules).await {
        Ok(scope) => {
            req.extensions_mut().insert(scope);
            next.run(req).await
        }
        Err(err) => GadiAxumError::from(err).into_response(),
    }
}

/// Extractor for the scope the middleware attached.
///
/// Reaching a handler without one means the tenancy layer was not wired
/// in front of this route — a deployment/wiring defect, not a user
/// error. It is logged loudly and fails the request with a 500; there is
/// no fallback scope.
pub struct ResolvedScope(pub TenantScope);

impl ResolvedScope {
    pub fn context(&self) -> TenantContext {
        TenantContext::new(self.0)
    }
}

impl<S> FromRequestParts<S> for ResolvedScope
where
    S: Send + Sync,
{
    type Rejection = GadiAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TenantScope>() {
            Some(scope) => Ok(ResolvedScope(*scope)),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "request reached a service without a resolved tenant scope"
                );
                Err(GadiError::general_error("Tenant scope missing from request.")
                    .into_anyhow()
                    .into())
            }
        }
    }
}
