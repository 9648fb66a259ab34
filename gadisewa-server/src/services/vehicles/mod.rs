pub mod vehicles_service;

pub use vehicles_service::{FuelType, Vehicle};
