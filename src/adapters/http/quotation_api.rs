//! REST adapter for the quotation backend. Implements `QuotationRepository`.
//!
//! Endpoints: `GET {base}/quotations/`, `GET {base}/quotations/{id}`, `GET {base}/clients/`,
//! `POST {base}/quotations/`. Decoding is lenient: prices may arrive as numbers or
//! strings, and missing fields fall back to empty/zero instead of failing the request.

use crate::domain::{
    BillingUnit, Client, DomainError, LineItem, NewQuotation, Price, QuotationRecord,
};
use crate::ports::QuotationRepository;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

pub struct HttpQuotationRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuotationRepository {
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.example.com/api` (trailing slash optional)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DomainError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Persistence(format!("HTTP request failed: {}", e)))?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DomainError> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "quotation API returned error");
            return Err(DomainError::Persistence(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| DomainError::Persistence(format!("Failed to parse API response: {}", e)))
    }
}

/// Quotation as served by the backend.
#[derive(Debug, Deserialize)]
struct QuotationDto {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    quotation_number: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    client: Value,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    items: Option<Vec<ItemDto>>,
    #[serde(default)]
    total_amount: Value,
}

#[derive(Debug, Deserialize)]
struct ItemDto {
    #[serde(default)]
    service_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cost: Value,
    /// Older records carry `price` instead of `cost`.
    #[serde(default)]
    price: Value,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientDto {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateQuotationDto<'a> {
    #[serde(rename = "quotationNumber")]
    quotation_number: &'a str,
    client_name: &'a str,
    client: Option<i64>,
    items: Vec<CreateItemDto<'a>>,
    date: String,
}

#[derive(Debug, Serialize)]
struct CreateItemDto<'a> {
    service_name: &'a str,
    cost: f64,
    description: &'a str,
    duration: &'static str,
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn id_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn price_from(value: &Value) -> Price {
    number_from(value).map(Price::new).unwrap_or(Price::ZERO)
}

/// Accepts `YYYY-MM-DD` or any ISO timestamp starting with one.
fn date_from(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl From<ItemDto> for LineItem {
    fn from(dto: ItemDto) -> Self {
        let price = if dto.cost.is_null() {
            price_from(&dto.price)
        } else {
            price_from(&dto.cost)
        };
        LineItem {
            title: dto.service_name.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
            price,
            unit: dto
                .duration
                .as_deref()
                .and_then(BillingUnit::parse)
                .unwrap_or_default(),
        }
    }
}

impl From<QuotationDto> for QuotationRecord {
    fn from(dto: QuotationDto) -> Self {
        let date = dto
            .date
            .as_deref()
            .and_then(date_from)
            .or_else(|| dto.created_at.as_deref().and_then(date_from));
        QuotationRecord {
            id: id_from(&dto.id).unwrap_or_default(),
            number: dto.quotation_number.unwrap_or_default(),
            client_name: dto.client_name.unwrap_or_default(),
            client_id: id_from(&dto.client),
            date,
            items: dto
                .items
                .unwrap_or_default()
                .into_iter()
                .map(LineItem::from)
                .collect(),
            total_amount: number_from(&dto.total_amount),
        }
    }
}

impl<'a> From<&'a NewQuotation> for CreateQuotationDto<'a> {
    fn from(q: &'a NewQuotation) -> Self {
        CreateQuotationDto {
            quotation_number: &q.number,
            client_name: &q.client_name,
            client: q.client_id,
            items: q
                .items
                .iter()
                .map(|item| CreateItemDto {
                    service_name: &item.title,
                    cost: item.price.amount(),
                    description: &item.description,
                    duration: item.unit.backend_value(),
                })
                .collect(),
            date: q.date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[async_trait::async_trait]
impl QuotationRepository for HttpQuotationRepository {
    async fn list_quotations(&self) -> Result<Vec<QuotationRecord>, DomainError> {
        let dtos: Vec<QuotationDto> = self.get_json(&self.url("quotations/")).await?;
        info!(count = dtos.len(), "fetched quotations");
        Ok(dtos.into_iter().map(QuotationRecord::from).collect())
    }

    async fn get_quotation(&self, id: i64) -> Result<QuotationRecord, DomainError> {
        let url = self.url(&format!("quotations/{}", id));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Persistence(format!("HTTP request failed: {}", e)))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::NotFound(id));
        }
        let dto: QuotationDto = Self::read_json(response).await?;
        Ok(dto.into())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DomainError> {
        let dtos: Vec<ClientDto> = self.get_json(&self.url("clients/")).await?;
        let clients: Vec<Client> = dtos
            .into_iter()
            .filter_map(|dto| {
                Some(Client {
                    id: id_from(&dto.id)?,
                    name: dto.name.unwrap_or_default(),
                })
            })
            .collect();
        info!(count = clients.len(), "fetched clients");
        Ok(clients)
    }

    async fn create_quotation(
        &self,
        quotation: &NewQuotation,
    ) -> Result<QuotationRecord, DomainError> {
        let body = CreateQuotationDto::from(quotation);
        let response = self
            .client
            .post(self.url("quotations/"))
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Persistence(format!("HTTP request failed: {}", e)))?;
        let dto: QuotationDto = Self::read_json(response).await?;

        let mut record = QuotationRecord::from(dto);
        if record.number.is_empty() {
            record.number = quotation.number.clone();
        }
        info!(id = record.id, number = %record.number, "quotation created");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> QuotationRecord {
        serde_json::from_str::<QuotationDto>(json).unwrap().into()
    }

    #[test]
    fn decodes_full_record() {
        let record = decode(
            r#"{
                "id": 12,
                "quotation_number": "KIT-0012",
                "client_name": "Everest Foods",
                "client": 4,
                "date": "2024-06-30",
                "items": [
                    {
                        "service_name": "Website",
                        "description": "5 pages",
                        "cost": "45000",
                        "duration": "Lifetime"
                    },
                    {"service_name": "Hosting", "cost": 1200.5, "duration": "Monthly"}
                ],
                "total_amount": "46200.50"
            }"#,
        );
        assert_eq!(record.id, 12);
        assert_eq!(record.number, "KIT-0012");
        assert_eq!(record.client_id, Some(4));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0].price.amount(), 45000.0);
        assert_eq!(record.items[0].unit, BillingUnit::Lifetime);
        assert_eq!(record.items[1].description, "");
        assert_eq!(record.total_amount, Some(46200.5));
    }

    #[test]
    fn malformed_fields_default_instead_of_failing() {
        let record = decode(
            r#"{
                "id": "7",
                "client": null,
                "created_at": "2024-02-01T09:30:00Z",
                "items": [
                    {"cost": "abc", "duration": "Fortnightly"},
                    {"price": "300"},
                    {}
                ]
            }"#,
        );
        assert_eq!(record.id, 7);
        assert_eq!(record.number, "");
        assert_eq!(record.client_name, "");
        assert_eq!(record.client_id, None);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert!(record.items[0].price.is_zero());
        assert_eq!(record.items[0].unit, BillingUnit::Monthly);
        assert_eq!(record.items[1].price.amount(), 300.0);
        assert_eq!(record.total_amount, None);
        assert_eq!(record.effective_total(), 300.0);
    }

    #[test]
    fn null_items_decode_as_empty() {
        let record = decode(r#"{"id": 1, "items": null}"#);
        assert!(record.items.is_empty());
    }

    #[test]
    fn clients_without_ids_are_skipped_by_id_parser() {
        let dto: ClientDto = serde_json::from_str(r#"{"name": "Ghost"}"#).unwrap();
        assert_eq!(id_from(&dto.id), None);
    }

    #[test]
    fn create_payload_uses_backend_field_names() {
        let quotation = NewQuotation {
            number: "KIT-0013".to_string(),
            client_name: "Walk-in".to_string(),
            client_id: None,
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            items: vec![
                LineItem::new("SEO", 8000.0)
                    .with_description("Monthly audit")
                    .with_unit(BillingUnit::Quarterly),
            ],
        };
        let json = serde_json::to_value(CreateQuotationDto::from(&quotation)).unwrap();
        assert_eq!(json["quotationNumber"], "KIT-0013");
        assert_eq!(json["client_name"], "Walk-in");
        assert!(json["client"].is_null());
        assert_eq!(json["date"], "2024-07-01");
        assert_eq!(json["items"][0]["service_name"], "SEO");
        assert_eq!(json["items"][0]["cost"], 8000.0);
        assert_eq!(json["items"][0]["duration"], "Quarterly");
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let repo = HttpQuotationRepository::new("https://api.example.com/api/");
        assert_eq!(
            repo.url("quotations/"),
            "https://api.example.com/api/quotations/"
        );
    }
}
