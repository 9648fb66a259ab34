use chrono::Utc;

use gadi_core::directory::{Garage, GarageDirectory, GarageType};
use gadi_core::errors::{ErrorKind, GadiError};
use gadi_core::tenant::GarageId;
use gadi_store::GarageRegistry;

fn garage(subdomain: &str, phone: &str, email: &str) -> Garage {
    Garage {
        id: GarageId::new(),
        name: format!("{subdomain} workshop"),
        subdomain: subdomain.to_string(),
        registration_number: format!("REG-{subdomain}"),
        tax_pan_number: format!("PAN-{subdomain}"),
        garage_type: GarageType::AutoRepair,
        street_address: "Balaju".into(),
        city: "Kathmandu".into(),
        postal_code: "44600".into(),
        phone_number: phone.to_string(),
        email_address: email.to_string(),
        working_hours: None,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn kind_of(err: &anyhow::Error) -> ErrorKind {
    GadiError::from_anyhow(err).expect("structured error").kind
}

#[tokio::test]
async fn subdomain_collisions_are_case_insensitive() {
    let registry = GarageRegistry::new();
    registry
        .register(garage("autofix", "+9779811111111", "a@autofix.com"))
        .await
        .unwrap();

    let err = registry
        .register(garage("AutoFix", "+9779822222222", "b@autofix.com"))
        .await
        .unwrap_err();
    let gadi = GadiError::from_anyhow(&err).unwrap();
    assert_eq!(gadi.kind, ErrorKind::IdentityCollision);
    assert!(gadi.errors.as_ref().unwrap()["subdomain"].is_array());
}

#[tokio::test]
async fn contact_fields_are_globally_unique() {
    let registry = GarageRegistry::new();
    registry
        .register(garage("autofix", "+9779811111111", "a@autofix.com"))
        .await
        .unwrap();

    let mut dup_phone = garage("quickfix", "+9779811111111", "b@quickfix.com");
    dup_phone.name = "quickfix".into();
    let err = registry.register(dup_phone).await.unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::IdentityCollision);
}

#[tokio::test]
async fn lookup_matches_case_insensitively_and_active_only() {
    let registry = GarageRegistry::new();
    let g = registry
        .register(garage("autofix", "+9779811111111", "a@autofix.com"))
        .await
        .unwrap();

    let found = registry.find_active_by_subdomain("AUTOFIX").await.unwrap();
    assert_eq!(found.map(|g| g.id), Some(g.id));

    registry.set_active(&g.id, false).await.unwrap();
    assert!(registry
        .find_active_by_subdomain("autofix")
        .await
        .unwrap()
        .is_none());

    // Nothing was deleted; re-enabling restores resolution.
    registry.set_active(&g.id, true).await.unwrap();
    assert!(registry
        .find_active_by_subdomain("autofix")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn update_preserves_the_subdomain() {
    let registry = GarageRegistry::new();
    let g = registry
        .register(garage("autofix", "+9779811111111", "a@autofix.com"))
        .await
        .unwrap();

    let mut changed = g.clone();
    changed.subdomain = "renamed".into();
    changed.city = "Pokhara".into();

    let stored = registry.update(changed).await.unwrap();
    assert_eq!(stored.subdomain, "autofix");
    assert_eq!(stored.city, "Pokhara");
}
