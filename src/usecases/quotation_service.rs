//! Quotation lifecycle: preview while composing, submit to the backend, reload stored ones.

use crate::domain::{
    DomainError, LineItemStore, NewQuotation, PageLayout, QuotationDocument, QuotationError,
    QuotationHeader, QuotationRecord, assemble_with_layout,
};
use crate::ports::QuotationRepository;
use std::sync::Arc;
use tracing::{info, warn};

pub struct QuotationService {
    repo: Arc<dyn QuotationRepository>,
    layout: PageLayout,
}

impl QuotationService {
    pub fn new(repo: Arc<dyn QuotationRepository>, layout: PageLayout) -> Self {
        Self { repo, layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Fresh snapshot of the quotation being composed.
    pub fn preview(
        &self,
        header: &QuotationHeader,
        store: &LineItemStore,
    ) -> Result<QuotationDocument, QuotationError> {
        assemble_with_layout(header, store.items(), &self.layout)
    }

    /// Validate and persist. Returns the stored record and the snapshot rebuilt with the
    /// number the backend confirmed.
    pub async fn submit(
        &self,
        header: &QuotationHeader,
        store: &LineItemStore,
    ) -> Result<(QuotationRecord, QuotationDocument), DomainError> {
        let document = self.preview(header, store)?;
        if document.item_count() == 0 {
            warn!(number = %header.number, "refusing to submit quotation without items");
            return Err(QuotationError::EmptyQuotation.into());
        }

        let request = NewQuotation {
            number: header.number.clone(),
            client_name: document.client_name().to_string(),
            client_id: header.client_id(),
            date: header.date,
            items: store.billable(),
        };
        let record = self.repo.create_quotation(&request).await?;
        info!(
            id = record.id,
            number = %record.number,
            items = request.items.len(),
            total = document.total(),
            "quotation submitted"
        );

        let mut confirmed = header.clone();
        confirmed.number = record.number.clone();
        let document = assemble_with_layout(&confirmed, store.items(), &self.layout)?;
        Ok((record, document))
    }

    pub async fn list(&self) -> Result<Vec<QuotationRecord>, DomainError> {
        self.repo.list_quotations().await
    }

    pub async fn get(&self, id: i64) -> Result<QuotationRecord, DomainError> {
        self.repo.get_quotation(id).await
    }

    /// Snapshot of a stored quotation, for viewing or exporting.
    pub fn document_for(&self, record: &QuotationRecord) -> Result<QuotationDocument, DomainError> {
        let date = record.date.ok_or_else(|| {
            DomainError::Input(format!("quotation {} has no date", record.id))
        })?;
        let header = QuotationHeader::new(record.number.clone(), date)
            .with_client(record.client_selection());
        let store = LineItemStore::from_items(record.items.clone());
        Ok(self.preview(&header, &store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::InMemoryQuotationRepository;
    use crate::domain::{BillingUnit, ClientSelection, LineItem};
    use chrono::NaiveDate;

    fn service() -> (Arc<InMemoryQuotationRepository>, QuotationService) {
        let repo = Arc::new(InMemoryQuotationRepository::new());
        let service = QuotationService::new(repo.clone(), PageLayout::default());
        (repo, service)
    }

    fn header(number: &str) -> QuotationHeader {
        QuotationHeader::new(number, NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()).with_client(
            ClientSelection::Manual {
                name: "Walk-in Customer".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn submit_persists_billable_items_and_confirms_number() {
        let (repo, service) = service();
        let mut store = LineItemStore::new();
        store.add(LineItem::new("Website", 45000.0).with_unit(BillingUnit::Lifetime));
        store.add_blank();
        store.add(LineItem::new("Hosting", 1200.0));

        let (record, document) = service.submit(&header(""), &store).await.unwrap();

        assert_eq!(record.number, "Q-0001");
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.client_id, None);
        assert_eq!(document.header().number, "Q-0001");
        assert_eq!(document.total(), 46200.0);
        assert_eq!(repo.list_quotations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_without_items_is_rejected() {
        let (repo, service) = service();
        let mut store = LineItemStore::new();
        store.add_blank();

        let err = service.submit(&header("Q-9"), &store).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Quotation(QuotationError::EmptyQuotation)
        ));
        assert!(repo.list_quotations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_without_client_is_rejected() {
        let (_, service) = service();
        let mut store = LineItemStore::new();
        store.add(LineItem::new("Website", 100.0));
        let mut h = header("Q-1");
        h.client = None;

        let err = service.submit(&h, &store).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Quotation(QuotationError::MissingClient)
        ));
    }

    #[tokio::test]
    async fn stored_quotation_reassembles_into_document() {
        let (_, service) = service();
        let mut store = LineItemStore::new();
        for i in 0..4 {
            store.add(LineItem::new(format!("Service {}", i), 250.0));
        }
        let (record, _) = service.submit(&header("KIT-1"), &store).await.unwrap();

        let fetched = service.get(record.id).await.unwrap();
        let document = service.document_for(&fetched).unwrap();
        assert_eq!(document.pages().len(), 2);
        assert_eq!(document.subtotal(), 1000.0);
        assert_eq!(document.client_name(), "Walk-in Customer");
    }

    #[test]
    fn record_without_date_cannot_be_rendered() {
        let (_, service) = service();
        let record = QuotationRecord {
            id: 3,
            number: "Q-3".to_string(),
            client_name: "Acme".to_string(),
            client_id: Some(1),
            date: None,
            items: Vec::new(),
            total_amount: None,
        };
        assert!(matches!(
            service.document_for(&record),
            Err(DomainError::Input(_))
        ));
    }
}
