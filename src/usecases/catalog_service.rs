//! Lookup data for the composer: client choices and service title suggestions.

use crate::domain::{Client, ClientSelection, DomainError, QuotationRecord};
use crate::ports::QuotationRepository;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// One entry of the client picker. Manual entry is always offered first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientChoice {
    Manual,
    Known(Client),
}

impl ClientChoice {
    /// Resolve into a header selection. `manual_name` is only read for `Manual`.
    pub fn into_selection(self, manual_name: impl Into<String>) -> ClientSelection {
        match self {
            ClientChoice::Manual => ClientSelection::Manual {
                name: manual_name.into(),
            },
            ClientChoice::Known(client) => ClientSelection::Known {
                id: client.id,
                name: client.name,
            },
        }
    }
}

impl fmt::Display for ClientChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientChoice::Manual => f.write_str("--Enter Manually--"),
            ClientChoice::Known(client) => f.write_str(&client.name),
        }
    }
}

pub struct CatalogService {
    repo: Arc<dyn QuotationRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn QuotationRepository>) -> Self {
        Self { repo }
    }

    pub async fn client_choices(&self) -> Result<Vec<ClientChoice>, DomainError> {
        let clients = self.repo.list_clients().await?;
        info!(count = clients.len(), "loaded clients");
        Ok(client_choices(clients))
    }

    /// Titles used on earlier quotations, for quick re-use.
    pub async fn service_titles(&self) -> Result<Vec<String>, DomainError> {
        let records = self.repo.list_quotations().await?;
        let titles = distinct_service_titles(&records);
        info!(count = titles.len(), "loaded service titles");
        Ok(titles)
    }
}

pub fn client_choices(clients: Vec<Client>) -> Vec<ClientChoice> {
    std::iter::once(ClientChoice::Manual)
        .chain(clients.into_iter().map(ClientChoice::Known))
        .collect()
}

/// Distinct non-blank item titles across `records`, in first-seen order.
pub fn distinct_service_titles(records: &[QuotationRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|r| r.items.iter())
        .map(|item| item.title.trim())
        .filter(|title| !title.is_empty() && seen.insert(title.to_string()))
        .map(str::to_string)
        .collect()
}
