pub mod suppliers_service;

pub use suppliers_service::Supplier;
