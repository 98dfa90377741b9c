//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Structural failures of the quotation core. Data values never fail; bad prices coerce to zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotationError {
    #[error(
        "invalid page configuration: capacities must be >= 1 (first page {first_page_capacity}, later pages {later_page_capacity})"
    )]
    InvalidConfiguration {
        first_page_capacity: usize,
        later_page_capacity: usize,
    },

    #[error("quotation has no client name")]
    MissingClient,

    #[error("quotation has no billable items")]
    EmptyQuotation,

    #[error("item index {index} out of range ({len} items)")]
    ItemOutOfRange { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Quotation(#[from] QuotationError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Quotation {0} not found")]
    NotFound(i64),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Input error: {0}")]
    Input(String),
}
