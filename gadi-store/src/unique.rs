//! Declarative uniqueness constraints.
//!
//! Records declare their unique keys; collections evaluate them inside
//! the same critical section as the write, so two racing creations can
//! never both pass. A key whose value is `None` never collides — two
//! records both lacking an optional email are not a conflict.

use gadi_core::errors::{GadiError, GadiResult};

/// One unique key of a record: the field name (as reported to clients)
/// and its normalized value, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: Option<String>,
}

impl UniqueKey {
    pub fn required(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: Some(value.into()),
        }
    }

    /// Nullable-field key: `None` is excluded from the check entirely.
    pub fn optional(field: &'static str, value: Option<&str>) -> Self {
        Self {
            field,
            value: value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string()),
        }
    }
}

/// Records that expose unique keys for constraint checking.
pub trait UniqueKeyed {
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}

/// Compare the candidate against every sibling; the first matching key
/// is surfaced as an `IdentityCollision` naming the field. Records with
/// the candidate's own id are skipped so updates don't collide with
/// themselves.
pub fn check_collisions<'a, T, I>(id: &str, candidate: &T, siblings: I) -> GadiResult<()>
where
    T: UniqueKeyed + 'a,
    I: IntoIterator<Item = (&'a str, &'a T)>,
{
    let keys = candidate.unique_keys();
    if keys.is_empty() {
        return Ok(());
    }

    for (other_id, other) in siblings {
        if other_id == id {
            continue;
        }

        let other_keys = other.unique_keys();
        for key in &keys {
            let Some(value) = &key.value else { continue };

            let taken = other_keys
                .iter()
                .any(|ok| ok.field == key.field && ok.value.as_deref() == Some(value.as_str()));

            if taken {
                return Err(GadiError::identity_collision(
                    key.field,
                    format!("A record with this {} already exists.", key.field),
                )
                .into_anyhow());
            }
        }
    }

    Ok(())
}
