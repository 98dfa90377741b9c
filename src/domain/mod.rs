//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod aggregator;
pub mod assembler;
pub mod entities;
pub mod errors;
pub mod format;
pub mod paginator;
pub mod store;

pub use assembler::{assemble, assemble_with_layout};
pub use entities::{
    BillingUnit, Client, ClientSelection, CompanyProfile, ExportedFile, LineItem, NewQuotation,
    Page, PageSize, Price, QuotationDocument, QuotationHeader, QuotationRecord,
};
pub use errors::{DomainError, QuotationError};
pub use paginator::{PageLayout, paginate};
pub use store::{ItemEdit, LineItemStore};
