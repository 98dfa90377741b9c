//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    Client, DomainError, ExportedFile, NewQuotation, PageSize, QuotationDocument, QuotationRecord,
};

/// Quotation backend. Fetch and create quotation and client records.
#[async_trait::async_trait]
pub trait QuotationRepository: Send + Sync {
    /// All stored quotations, in backend order.
    async fn list_quotations(&self) -> Result<Vec<QuotationRecord>, DomainError>;

    /// One quotation by id. `DomainError::NotFound` when the backend has no such record.
    async fn get_quotation(&self, id: i64) -> Result<QuotationRecord, DomainError>;

    /// All known clients, in backend order.
    async fn list_clients(&self) -> Result<Vec<Client>, DomainError>;

    /// Persist a new quotation. The returned record carries the number the backend
    /// confirmed or assigned.
    async fn create_quotation(&self, quotation: &NewQuotation)
    -> Result<QuotationRecord, DomainError>;
}

/// Document renderer. Turns a snapshot into a downloadable artifact.
#[async_trait::async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Render every page of `document` onto pages of `page_size`.
    ///
    /// The snapshot's pages are already sized for the layout; the exporter must not
    /// re-paginate.
    async fn export(
        &self,
        document: &QuotationDocument,
        page_size: &PageSize,
    ) -> Result<ExportedFile, DomainError>;
}
