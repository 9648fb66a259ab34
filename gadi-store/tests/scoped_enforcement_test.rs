use std::sync::Arc;

use gadi_core::errors::{ErrorKind, GadiError};
use gadi_core::tenant::GarageId;
use gadi_store::{ScopedCollection, ScopedRecord, UniqueKey, UniqueKeyed};

#[derive(Debug, Clone)]
struct Customer {
    id: String,
    garage: GarageId,
    phone_number: String,
    email: Option<String>,
}

impl Customer {
    fn new(garage: GarageId, phone: &str, email: Option<&str>) -> Self {
        Self {
            id: uuid_like(phone, garage),
            garage,
            phone_number: phone.to_string(),
            email: email.map(|s| s.to_string()),
        }
    }
}

fn uuid_like(phone: &str, garage: GarageId) -> String {
    format!("{garage}-{phone}")
}

impl UniqueKeyed for Customer {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::required("phone_number", self.phone_number.clone()),
            UniqueKey::optional("email", self.email.as_deref()),
        ]
    }
}

impl ScopedRecord for Customer {
    fn id(&self) -> &str {
        &self.id
    }

    fn garage(&self) -> GarageId {
        self.garage
    }
}

fn kind_of(err: &anyhow::Error) -> ErrorKind {
    GadiError::from_anyhow(err).expect("structured error").kind
}

#[tokio::test]
async fn unfiltered_find_fails_closed() {
    let col = ScopedCollection::<Customer>::new("customers");
    let err = col.find(None).await.unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::MissingTenantScope);
}

#[tokio::test]
async fn filtered_find_returns_only_matching_rows() {
    let col = ScopedCollection::<Customer>::new("customers");
    let autofix = GarageId::new();
    let quickfix = GarageId::new();

    col.bind(autofix)
        .insert(Customer::new(autofix, "+9779812345678", None))
        .await
        .unwrap();
    col.bind(quickfix)
        .insert(Customer::new(quickfix, "+9779898765432", None))
        .await
        .unwrap();

    let rows = col.find(Some(&autofix)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].garage, autofix);
}

#[tokio::test]
async fn bound_get_cannot_see_other_garages() {
    let col = ScopedCollection::<Customer>::new("customers");
    let autofix = GarageId::new();
    let quickfix = GarageId::new();

    let foreign = col
        .bind(quickfix)
        .insert(Customer::new(quickfix, "+9779812345678", None))
        .await
        .unwrap();

    // Known id, wrong garage: indistinguishable from unknown.
    assert!(col.bind(autofix).get(&foreign.id).await.unwrap().is_none());
}

#[tokio::test]
async fn mismatched_record_garage_is_rejected() {
    let col = ScopedCollection::<Customer>::new("customers");
    let autofix = GarageId::new();
    let quickfix = GarageId::new();

    let err = col
        .bind(autofix)
        .insert(Customer::new(quickfix, "+9779812345678", None))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::MissingTenantScope);
}

#[tokio::test]
async fn duplicate_phone_collides_within_a_garage_only() {
    let col = ScopedCollection::<Customer>::new("customers");
    let autofix = GarageId::new();
    let quickfix = GarageId::new();

    col.bind(autofix)
        .insert(Customer {
            id: "c1".into(),
            garage: autofix,
            phone_number: "+9779812345678".into(),
            email: None,
        })
        .await
        .unwrap();

    let err = col
        .bind(autofix)
        .insert(Customer {
            id: "c2".into(),
            garage: autofix,
            phone_number: "+9779812345678".into(),
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::IdentityCollision);

    // Same phone under another garage is fine.
    col.bind(quickfix)
        .insert(Customer {
            id: "c3".into(),
            garage: quickfix,
            phone_number: "+9779812345678".into(),
            email: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_optional_emails_do_not_collide() {
    let col = ScopedCollection::<Customer>::new("customers");
    let garage = GarageId::new();

    col.bind(garage)
        .insert(Customer {
            id: "c1".into(),
            garage,
            phone_number: "+9779812345678".into(),
            email: None,
        })
        .await
        .unwrap();

    col.bind(garage)
        .insert(Customer {
            id: "c2".into(),
            garage,
            phone_number: "+9779898765432".into(),
            email: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn replace_rechecks_uniqueness_but_not_against_itself() {
    let col = ScopedCollection::<Customer>::new("customers");
    let garage = GarageId::new();

    col.bind(garage)
        .insert(Customer {
            id: "c1".into(),
            garage,
            phone_number: "+9779812345678".into(),
            email: None,
        })
        .await
        .unwrap();
    col.bind(garage)
        .insert(Customer {
            id: "c2".into(),
            garage,
            phone_number: "+9779898765432".into(),
            email: None,
        })
        .await
        .unwrap();

    // Keeping your own phone is fine.
    col.bind(garage)
        .replace(
            "c1",
            Customer {
                id: "c1".into(),
                garage,
                phone_number: "+9779812345678".into(),
                email: Some("c1@example.com".into()),
            },
        )
        .await
        .unwrap();

    // Taking a sibling's phone is not.
    let err = col
        .bind(garage)
        .replace(
            "c1",
            Customer {
                id: "c1".into(),
                garage,
                phone_number: "+9779898765432".into(),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::IdentityCollision);
}

#[tokio::test]
async fn concurrent_creations_cannot_both_pass_the_constraint() {
    let col = Arc::new(ScopedCollection::<Customer>::new("customers"));
    let garage = GarageId::new();

    let a = {
        let col = Arc::clone(&col);
        tokio::spawn(async move {
            col.bind(garage)
                .insert(Customer {
                    id: "a".into(),
                    garage,
                    phone_number: "+9779812345678".into(),
                    email: None,
                })
                .await
        })
    };
    let b = {
        let col = Arc::clone(&col);
        tokio::spawn(async move {
            col.bind(garage)
                .insert(Customer {
                    id: "b".into(),
                    garage,
                    phone_number: "+9779812345678".into(),
                    email: None,
                })
                .await
        })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one of two racing inserts may win"
    );

    let rows = col.find(Some(&garage)).await.unwrap();
    assert_eq!(rows.len(), 1);
}
