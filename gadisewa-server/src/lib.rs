mod app;
mod config;
mod hooks;
mod services;
mod validators;

use std::sync::Arc;

use anyhow::Result;
use gadi_axum::AxumApp;
use gadi_core::directory::GarageDirectory;
use gadi_core::resolver::TenancyRules;
use serde_json::Value;

use crate::services::{GadiParams, ServerState};

/// Assemble the whole backend: config, hooks, stores, services, then
/// the HTTP surface with host-based tenancy resolved in front of every
/// route.
pub fn build() -> Result<AxumApp<Value, GadiParams>> {
    let app = app::gadi_app();
    config::load_env(&app, "GADISEWA__");

    hooks::global_hooks(&app);

    let snapshot = app.config_snapshot();
    let state = Arc::new(ServerState::new(&snapshot));
    let rules = TenancyRules::from_config(&snapshot);

    let svcs = services::configure(&app, Arc::clone(&state), rules.clone())?;

    let directory: Arc<dyn GarageDirectory> = state.registry.clone();

    let ax = gadi_axum::axum(app)
        .use_service("/garages", svcs.garages)
        .use_service("/authentication", svcs.authentication)
        .use_service("/users", svcs.users)
        .use_service("/customers", svcs.customers)
        .use_service("/employees", svcs.employees)
        .use_service("/services", svcs.catalog)
        .use_service("/vehicles", svcs.vehicles)
        .use_service("/appointments", svcs.appointments)
        .use_service("/work-orders", svcs.work_orders)
        .use_service("/categories", svcs.categories)
        .use_service("/suppliers", svcs.suppliers)
        .use_service("/parts", svcs.parts)
        .use_service("/invoices", svcs.invoices)
        .service("/health", || async { "ok" })
        .with_tenancy(directory, rules)
        .with_observability();

    Ok(ax)
}
