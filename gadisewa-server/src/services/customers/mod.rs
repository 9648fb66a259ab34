pub mod customers_service;

pub use customers_service::Customer;
