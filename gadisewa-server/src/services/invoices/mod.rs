pub mod invoices_service;

pub use invoices_service::{Invoice, InvoiceItem, InvoiceStatus};
