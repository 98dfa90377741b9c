//! Application use cases. Orchestrate domain logic via ports.

pub mod catalog_service;
pub mod export_service;
pub mod quotation_service;

pub use catalog_service::{CatalogService, ClientChoice};
pub use export_service::ExportService;
pub use quotation_service::QuotationService;
