use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::HeaderMap,
    routing, Json, Router,
};
use gadi_core::errors::GadiError;
use gadi_core::{GadiApp, ServiceHandle, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    tenancy::ResolvedScope,
    GadiAxumError, GadiAxumState,
};

fn map_json_rejection(rejection: JsonRejection) -> GadiAxumError {
    GadiError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into_anyhow()
        .into()
}

/// Services declare which methods they expose; the router refuses the
/// rest instead of silently forwarding them.
fn ensure_allowed<R, P>(
    svc: &ServiceHandle<R, P>,
    method: &ServiceMethodKind,
) -> Result<(), GadiAxumError>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    if svc.inner().capabilities().allows(method) {
        Ok(())
    } else {
        Err(GadiError::method_not_allowed(format!("Method not allowed: {method:?}"))
            .into_anyhow()
            .into())
    }
}

pub fn service_router<R, P>(service_name: Arc<String>, app: Arc<GadiApp<R, P>>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = GadiAxumState { app };

    Router::new()
        .route(
            "/",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri| async move {
                    let params = RestParams::from_parts("rest", &headers, query, "GET", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Find)?;
                    let res = svc.find(scope.context(), params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            })
            .post({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "POST", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Create)?;
                    let res = svc.create(scope.context(), data, params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            }),
        )
        .route(
            "/{id}",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let params = RestParams::from_parts("rest", &headers, query, "GET", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Get)?;
                    let res = svc.get(scope.context(), &id, params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            })
            .put({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "PUT", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Update)?;
                    let res = svc.update(scope.context(), &id, data, params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            })
            .patch({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "PATCH", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Patch)?;
                    let res = svc.patch(scope.context(), Some(&id), data, params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            })
            .delete({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<GadiAxumState<R, P>>,
                      scope: ResolvedScope,
                      headers: HeaderMap,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let params = RestParams::from_parts("rest", &headers, query, "DELETE", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(&service_name)?;
                    ensure_allowed(&svc, &ServiceMethodKind::Remove)?;
                    let res = svc.remove(scope.context(), Some(&id), params).await?;
                    Ok::<_, GadiAxumError>(Json(res))
                }
            }),
        )
        .with_state(state)
}
