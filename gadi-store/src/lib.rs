//! gadi-store: in-memory storage for GadiSewa.
//!
//! Two kinds of store exist on purpose, and tenant-scoped entity code
//! only ever holds the first:
//! - `ScopedCollection` / `Bound` — tenant-guarded collections with no
//!   unscoped read path;
//! - `GarageRegistry` — the platform-side tenant directory.

pub mod registry;
pub mod scoped;
pub mod unique;

pub use registry::GarageRegistry;
pub use scoped::{Bound, ScopedCollection, ScopedRecord};
pub use unique::{check_collisions, UniqueKey, UniqueKeyed};
