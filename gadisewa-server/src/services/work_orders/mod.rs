pub mod work_orders_service;

pub use work_orders_service::{OrderStatus, WorkOrder};
