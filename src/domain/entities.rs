//! Domain entities. Pure data structures for the quotation core.
//!
//! No HTTP/PDF types here; adapters map their wire formats into these.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative monetary amount of a line item.
///
/// Construction never fails: non-numeric, non-finite or negative input becomes zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub const ZERO: Price = Price(0.0);

    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Price(value)
        } else {
            Price::ZERO
        }
    }

    /// Coerce free-form user or upstream input (e.g. `"12000"`, `" 99.5 "`, `"abc"`).
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<f64>()
            .map(Price::new)
            .unwrap_or(Price::ZERO)
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Billing period of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BillingUnit {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    Lifetime,
}

impl BillingUnit {
    pub const ALL: [BillingUnit; 4] = [
        BillingUnit::Monthly,
        BillingUnit::Quarterly,
        BillingUnit::Yearly,
        BillingUnit::Lifetime,
    ];

    /// Display suffix used after amounts (`Rs 12,000/m`).
    pub fn label(self) -> &'static str {
        match self {
            BillingUnit::Monthly => "/m",
            BillingUnit::Quarterly => "/q",
            BillingUnit::Yearly => "/y",
            BillingUnit::Lifetime => "/lt",
        }
    }

    /// Value understood by the quotation backend (`duration` field).
    pub fn backend_value(self) -> &'static str {
        match self {
            BillingUnit::Monthly => "Monthly",
            BillingUnit::Quarterly => "Quarterly",
            BillingUnit::Yearly => "Yearly",
            BillingUnit::Lifetime => "Lifetime",
        }
    }

    /// Accepts backend values and display labels, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim();
        Self::ALL.into_iter().find(|unit| {
            needle.eq_ignore_ascii_case(unit.backend_value())
                || needle.eq_ignore_ascii_case(unit.label())
        })
    }
}

impl fmt::Display for BillingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.backend_value())
    }
}

/// One billable service entry of a quotation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub unit: BillingUnit,
}

impl LineItem {
    pub fn new(title: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: BillingUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Half-entered row: no title and nothing to bill. Never exported.
    pub fn is_draft(&self) -> bool {
        self.title.trim().is_empty() && self.price.is_zero()
    }
}

/// Who the quotation is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClientSelection {
    /// A client record known to the backend.
    Known { id: i64, name: String },
    /// Free-text client name typed by the user; no backend record.
    Manual { name: String },
}

impl ClientSelection {
    pub fn name(&self) -> &str {
        match self {
            ClientSelection::Known { name, .. } | ClientSelection::Manual { name } => name,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            ClientSelection::Known { id, .. } => Some(*id),
            ClientSelection::Manual { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationHeader {
    pub number: String,
    pub date: NaiveDate,
    pub client: Option<ClientSelection>,
}

impl QuotationHeader {
    pub fn new(number: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            date,
            client: None,
        }
    }

    pub fn with_client(mut self, client: ClientSelection) -> Self {
        self.client = Some(client);
        self
    }

    /// Resolved client name, `None` when unselected or blank.
    pub fn client_name(&self) -> Option<&str> {
        self.client
            .as_ref()
            .map(|c| c.name().trim())
            .filter(|name| !name.is_empty())
    }

    pub fn client_id(&self) -> Option<i64> {
        self.client.as_ref().and_then(ClientSelection::id)
    }
}

/// One output page of a quotation document. `index` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub items: Vec<LineItem>,
}

/// Immutable snapshot of a quotation, ready for rendering.
///
/// Only the assembler builds these; there are no mutating accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationDocument {
    header: QuotationHeader,
    pages: Vec<Page>,
    subtotal: f64,
    total: f64,
    unit_label: String,
}

impl QuotationDocument {
    pub(crate) fn new(
        header: QuotationHeader,
        pages: Vec<Page>,
        subtotal: f64,
        total: f64,
        unit_label: String,
    ) -> Self {
        Self {
            header,
            pages,
            subtotal,
            total,
            unit_label,
        }
    }

    pub fn header(&self) -> &QuotationHeader {
        &self.header
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    /// Client name as validated at assembly time.
    pub fn client_name(&self) -> &str {
        self.header.client_name().unwrap_or_default()
    }
}

/// Target page geometry for export, in device-independent pixels (96 dpi).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_px: f32,
    pub height_px: f32,
    pub margin_px: f32,
}

impl PageSize {
    /// A4 portrait at 96 dpi.
    pub const A4: PageSize = PageSize {
        width_px: 794.0,
        height_px: 1123.0,
        margin_px: 32.0,
    };

    pub fn content_width_px(&self) -> f32 {
        (self.width_px - 2.0 * self.margin_px).max(0.0)
    }

    pub fn content_height_px(&self) -> f32 {
        (self.height_px - 2.0 * self.margin_px).max(0.0)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Issuing company, printed in the footer of every exported page.
#[derive(Debug, Clone)]
pub struct CompanyProfile {
    pub name: String,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub terms: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            website: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            terms: "This quotation is valid for 7 days only.".to_string(),
        }
    }
}

impl CompanyProfile {
    /// Non-blank footer lines, in print order.
    pub fn contact_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.name.is_empty() {
            lines.push(self.name.clone());
        }
        if !self.website.is_empty() {
            lines.push(self.website.clone());
        }
        if !self.email.is_empty() {
            lines.push(format!("Email : {}", self.email));
        }
        if !self.phone.is_empty() {
            lines.push(format!("Phone : {}", self.phone));
        }
        if !self.address.is_empty() {
            lines.push(self.address.clone());
        }
        lines
    }
}

/// Rendered artifact handed back by an exporter.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Client record known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

/// Persisted quotation as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationRecord {
    pub id: i64,
    pub number: String,
    pub client_name: String,
    pub client_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    /// Server-computed total; absent or zero on older records.
    pub total_amount: Option<f64>,
}

impl QuotationRecord {
    /// Server total when positive, otherwise the sum of item prices.
    pub fn effective_total(&self) -> f64 {
        match self.total_amount {
            Some(total) if total.is_finite() && total > 0.0 => total,
            _ => crate::domain::aggregator::total(&self.items),
        }
    }

    pub fn client_selection(&self) -> ClientSelection {
        match self.client_id {
            Some(id) => ClientSelection::Known {
                id,
                name: self.client_name.clone(),
            },
            None => ClientSelection::Manual {
                name: self.client_name.clone(),
            },
        }
    }
}

/// Create-quotation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewQuotation {
    pub number: String,
    pub client_name: String,
    pub client_id: Option<i64>,
    pub date: NaiveDate,
    pub items: Vec<LineItem>,
}
