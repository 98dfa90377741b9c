//! In-memory quotation backend.
//!
//! Used when no API URL is configured (offline mode) and by tests. Assigns ids and,
//! when the request has none, quotation numbers.

use crate::domain::{Client, DomainError, NewQuotation, QuotationRecord, aggregator};
use crate::ports::QuotationRepository;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Default)]
struct Store {
    clients: Vec<Client>,
    quotations: Vec<QuotationRecord>,
    next_id: i64,
}

pub struct InMemoryQuotationRepository {
    store: RwLock<Store>,
}

impl InMemoryQuotationRepository {
    pub fn new() -> Self {
        Self::with_clients(Vec::new())
    }

    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self {
            store: RwLock::new(Store {
                clients,
                quotations: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number assigned when the request leaves it blank.
    fn assigned_number(id: i64) -> String {
        format!("Q-{:04}", id)
    }
}

impl Default for InMemoryQuotationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn list_quotations(&self) -> Result<Vec<QuotationRecord>, DomainError> {
        Ok(self.store.read().await.quotations.clone())
    }

    async fn get_quotation(&self, id: i64) -> Result<QuotationRecord, DomainError> {
        self.store
            .read()
            .await
            .quotations
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or(DomainError::NotFound(id))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DomainError> {
        Ok(self.store.read().await.clients.clone())
    }

    async fn create_quotation(
        &self,
        quotation: &NewQuotation,
    ) -> Result<QuotationRecord, DomainError> {
        let mut store = self.store.write().await;
        let id = store.next_id;
        store.next_id += 1;

        let number = if quotation.number.trim().is_empty() {
            Self::assigned_number(id)
        } else {
            quotation.number.trim().to_string()
        };

        let record = QuotationRecord {
            id,
            number,
            client_name: quotation.client_name.clone(),
            client_id: quotation.client_id,
            date: Some(quotation.date),
            items: quotation.items.clone(),
            total_amount: Some(aggregator::total(&quotation.items)),
        };
        store.quotations.push(record.clone());

        info!(id, number = %record.number, "stored quotation in memory");
        Ok(record)
    }
}
