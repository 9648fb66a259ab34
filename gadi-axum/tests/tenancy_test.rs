use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use chrono::Utc;
use gadi_axum::axum;
use gadi_axum::params::RestParams;
use gadi_core::directory::{Garage, GarageType};
use gadi_core::resolver::TenancyRules;
use gadi_core::tenant::{TenantContext, TenantScope};
use gadi_core::{GadiApp, GadiService};
use gadi_store::GarageRegistry;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct WhoAmI;

#[async_trait::async_trait]
impl GadiService<Value, RestParams> for WhoAmI {
    async fn find(&self, ctx: &TenantContext, _params: RestParams) -> anyhow::Result<Vec<Value>> {
        let scope = match ctx.scope() {
            TenantScope::Platform => json!("platform"),
            TenantScope::Garage(id) => json!(id.to_string()),
        };
        Ok(vec![json!({ "scope": scope })])
    }
}

fn garage(subdomain: &str) -> Garage {
    Garage {
        id: gadi_core::tenant::GarageId::new(),
        name: format!("{subdomain} workshop"),
        subdomain: subdomain.to_string(),
        registration_number: format!("REG-{subdomain}"),
        tax_pan_number: format!("PAN-{subdomain}"),
        garage_type: GarageType::AutoRepair,
        street_address: "Balaju".into(),
        city: "Kathmandu".into(),
        postal_code: "44600".into(),
        phone_number: format!("+977981{:07}", subdomain.len()),
        email_address: format!("hello@{subdomain}.com"),
        working_hours: None,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn build() -> (gadi_axum::AxumApp<Value, RestParams>, Arc<GarageRegistry>, Garage) {
    let registry = Arc::new(GarageRegistry::new());
    let autofix = registry.register(garage("autofix")).await.unwrap();

    let app: GadiApp<Value, RestParams> = GadiApp::new();
    let ax = axum(app)
        .use_service("/whoami", Arc::new(WhoAmI))
        .with_tenancy(registry.clone(), TenancyRules::default())
        .with_observability();

    (ax, registry, autofix)
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_with_host(host: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/whoami")
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn garage_hosts_resolve_to_their_garage() {
    let (ax, _registry, autofix) = build().await;

    let res = ax
        .router
        .oneshot(get_with_host("autofix.gadisewa.com"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body = json_body(res).await;
    assert_eq!(body[0]["scope"], json!(autofix.id.to_string()));
}

#[tokio::test]
async fn resolution_ignores_case_and_port() {
    let (ax, _registry, autofix) = build().await;

    let res = ax
        .router
        .oneshot(get_with_host("AutoFix.GadiSewa.com:8443"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await[0]["scope"], json!(autofix.id.to_string()));
}

#[tokio::test]
async fn apex_reserved_and_loopback_hosts_are_platform() {
    let (ax, _registry, _autofix) = build().await;

    for host in ["gadisewa.com", "www.gadisewa.com", "localhost:3030"] {
        let res = ax.router.clone().oneshot(get_with_host(host)).await.unwrap();
        assert_eq!(res.status().as_u16(), 200, "host {host}");
        assert_eq!(json_body(res).await[0]["scope"], json!("platform"), "host {host}");
    }
}

#[tokio::test]
async fn unknown_subdomains_are_a_uniform_not_found() {
    let (ax, registry, autofix) = build().await;

    let res = ax
        .router
        .clone()
        .oneshot(get_with_host("ghost.gadisewa.com"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    assert!(res.headers().get("x-request-id").is_some());
    let unknown = json_body(res).await;
    assert_eq!(unknown["name"], "NotFound");

    // Disabling makes a garage unresolvable with the very same response.
    registry.set_active(&autofix.id, false).await.unwrap();
    let res = ax
        .router
        .clone()
        .oneshot(get_with_host("autofix.gadisewa.com"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    assert_eq!(json_body(res).await["message"], unknown["message"]);
}

#[tokio::test]
async fn a_route_without_the_tenancy_layer_fails_the_invariant() {
    // Deliberately mis-wired app: no with_tenancy.
    let app: GadiApp<Value, RestParams> = GadiApp::new();
    let ax = axum(app).use_service("/whoami", Arc::new(WhoAmI));

    let res = ax
        .router
        .oneshot(get_with_host("autofix.gadisewa.com"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
}
