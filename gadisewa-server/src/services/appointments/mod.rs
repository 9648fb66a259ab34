pub mod appointments_service;

pub use appointments_service::{Appointment, AppointmentStatus};
