//! Presentation helpers shared by the PDF exporter and the terminal preview.

use crate::domain::entities::LineItem;
use chrono::NaiveDate;

/// Currency prefix on line items.
pub const ITEM_CURRENCY: &str = "Rs";
/// Currency prefix on subtotal/total rows.
pub const TOTAL_CURRENCY: &str = "NRs.";

/// Thousands-separated amount. Whole amounts print without decimals.
pub fn format_amount(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if cents == 0 {
        grouped
    } else {
        format!("{}.{:02}", grouped, cents)
    }
}

/// Item price cell, e.g. `Rs 12,000/m`.
pub fn format_item_price(item: &LineItem) -> String {
    format!(
        "{} {}{}",
        ITEM_CURRENCY,
        format_amount(item.price.amount()),
        item.unit.label()
    )
}

/// Total row, e.g. `NRs. 44,000 /m`. Empty unit labels leave no trailing space.
pub fn format_total(value: f64, unit_label: &str) -> String {
    let amount = format!("{} {}", TOTAL_CURRENCY, format_amount(value));
    if unit_label.is_empty() {
        amount
    } else {
        format!("{} {}", amount, unit_label)
    }
}

/// `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Deterministic export file name for a quotation number.
pub fn export_file_name(number: &str, extension: &str) -> String {
    let stem: String = number
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "draft".to_string() } else { stem };
    format!("Quotation_{}.{}", stem, extension)
}
