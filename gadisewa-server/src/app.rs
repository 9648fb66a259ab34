use gadi_core::GadiApp;
use serde_json::Value;

use crate::services::GadiParams;

/// The application container with its configuration defaults. Every key
/// here can be overridden from the environment (`GADISEWA__HTTP__PORT`,
/// `GADISEWA__TENANCY__RESERVED_SUBDOMAINS`, ...).
pub fn gadi_app() -> GadiApp<Value, GadiParams> {
    let app: GadiApp<Value, GadiParams> = GadiApp::new();

    app.set("http.host", "127.0.0.1");
    app.set("http.port", "3030");

    app.set("tenancy.reserved_subdomains", "www,api,admin");
    app.set("tenancy.local_suffix", "localhost");

    // Development secret; deployments override it from the environment.
    app.set("auth.secret", "gadisewa-dev-secret");
    app.set("auth.ttl_secs", "3600");

    app
}
