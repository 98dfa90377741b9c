//! HTTP adapters for the quotation backend.

pub mod quotation_api;

pub use quotation_api::HttpQuotationRepository;
