pub mod authentication_service;

pub use authentication_service::AuthenticationService;
