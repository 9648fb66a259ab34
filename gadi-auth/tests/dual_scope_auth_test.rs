use std::sync::Arc;

use gadi_auth::{hash_password, Authenticator, TokenIssuer, User, UserStore};
use gadi_core::errors::{ErrorKind, GadiError};
use gadi_core::tenant::{GarageId, TenantScope};

fn user(email: &str, username: &str, password: &str, garage: Option<GarageId>) -> User {
    User {
        id: User::new_id(),
        username: username.to_string(),
        email: email.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        password: hash_password(password).unwrap(),
        garage,
        active: true,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

fn kind_of(err: &anyhow::Error) -> ErrorKind {
    GadiError::from_anyhow(err).expect("structured error").kind
}

#[tokio::test]
async fn the_same_email_lives_once_per_scope() {
    let store = Arc::new(UserStore::new());
    let a = GarageId::new();
    let b = GarageId::new();

    store
        .insert(user("ram@example.com", "ram-a", "secret-a", Some(a)))
        .await
        .unwrap();
    store
        .insert(user("ram@example.com", "ram-b", "secret-b", Some(b)))
        .await
        .unwrap();
    store
        .insert(user("ram@example.com", "ram-platform", "secret-p", None))
        .await
        .unwrap();

    let auth = Authenticator::new(Arc::clone(&store));

    let in_a = auth
        .authenticate(&TenantScope::Garage(a), "ram@example.com", "secret-a")
        .await
        .unwrap();
    let in_b = auth
        .authenticate(&TenantScope::Garage(b), "ram@example.com", "secret-b")
        .await
        .unwrap();
    let platform = auth
        .authenticate(&TenantScope::Platform, "ram@example.com", "secret-p")
        .await
        .unwrap();

    assert_eq!(in_a.garage, Some(a));
    assert_eq!(in_b.garage, Some(b));
    assert_eq!(platform.garage, None);
    assert_ne!(in_a.id, in_b.id);
}

#[tokio::test]
async fn duplicate_email_in_the_same_scope_collides() {
    let store = UserStore::new();
    let a = GarageId::new();

    store
        .insert(user("ram@example.com", "ram", "pw", Some(a)))
        .await
        .unwrap();

    let err = store
        .insert(user("ram@example.com", "ram2", "pw", Some(a)))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::IdentityCollision);
}

#[tokio::test]
async fn two_platform_users_with_one_email_collide() {
    let store = UserStore::new();

    store
        .insert(user("admin@example.com", "admin", "pw", None))
        .await
        .unwrap();

    let err = store
        .insert(user("admin@example.com", "admin2", "pw", None))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::IdentityCollision);
}

#[tokio::test]
async fn no_fallback_between_scopes() {
    let store = Arc::new(UserStore::new());
    let garage = GarageId::new();

    // Only a platform user exists with this email.
    store
        .insert(user("admin@example.com", "admin", "pw", None))
        .await
        .unwrap();

    let auth = Authenticator::new(Arc::clone(&store));

    // Correct credentials, wrong scope: same uniform failure as a bad
    // password, nothing reveals that the identifier exists elsewhere.
    let err = auth
        .authenticate(&TenantScope::Garage(garage), "admin@example.com", "pw")
        .await
        .unwrap_err();
    let gadi = GadiError::from_anyhow(&err).unwrap();
    assert_eq!(gadi.kind, ErrorKind::NotAuthenticated);

    let bad_pw = auth
        .authenticate(&TenantScope::Platform, "admin@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(
        gadi.message,
        GadiError::from_anyhow(&bad_pw).unwrap().message
    );
}

#[tokio::test]
async fn disabled_users_cannot_authenticate() {
    let store = Arc::new(UserStore::new());
    let u = store
        .insert(user("ram@example.com", "ram", "pw", None))
        .await
        .unwrap();
    store.set_active(&u.id, false).await.unwrap();

    let auth = Authenticator::new(Arc::clone(&store));
    let err = auth
        .authenticate(&TenantScope::Platform, "ram@example.com", "pw")
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::NotAuthenticated);
}

#[tokio::test]
async fn tokens_are_bound_to_their_scope() {
    let garage = GarageId::new();
    let issuer = TokenIssuer::new("test-secret", 3600);

    let garage_user = user("ram@example.com", "ram", "pw", Some(garage));
    let token = issuer.issue(&garage_user).unwrap();

    let claims = issuer
        .verify_for_scope(&token, &TenantScope::Garage(garage))
        .unwrap();
    assert_eq!(claims.sub, garage_user.id);
    assert_eq!(claims.garage, Some(garage));

    // The same token is invalid at platform scope and in another garage.
    assert!(issuer
        .verify_for_scope(&token, &TenantScope::Platform)
        .is_err());
    assert!(issuer
        .verify_for_scope(&token, &TenantScope::Garage(GarageId::new()))
        .is_err());
}

#[tokio::test]
async fn updates_keep_the_identity_universe() {
    let store = UserStore::new();
    let garage = GarageId::new();

    let u = store
        .insert(user("ram@example.com", "ram", "pw", Some(garage)))
        .await
        .unwrap();

    let mut changed = u.clone();
    changed.garage = None; // attempt to hop scopes
    changed.first_name = "Ram".into();

    let stored = store.update(changed).await.unwrap();
    assert_eq!(stored.garage, Some(garage));
    assert_eq!(stored.first_name, "Ram");
}
