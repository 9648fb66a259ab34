pub mod garages_service;

pub use garages_service::GaragesService;
