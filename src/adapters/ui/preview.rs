//! Plain-text rendering of a quotation snapshot for the terminal.

use crate::domain::QuotationDocument;
use crate::domain::format::{format_date, format_item_price, format_total};
use std::fmt::Write;

const RULE_WIDTH: usize = 56;

/// Page-by-page listing with the totals block on the last page.
pub fn render_text(document: &QuotationDocument) -> String {
    let header = document.header();
    let page_total = document.pages().len();
    let rule = "─".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "QUOTATION TO: {}", document.client_name());
    let number = if header.number.trim().is_empty() {
        "(assigned on submit)"
    } else {
        header.number.as_str()
    };
    let _ = writeln!(out, "Quotation No: {}", number);
    let _ = writeln!(out, "Date: {}", format_date(header.date));

    for page in document.pages() {
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Page {} of {}", page.index, page_total);
        if page.items.is_empty() {
            let _ = writeln!(out, "  (no items)");
        }
        for item in &page.items {
            let _ = writeln!(out, "  {:<32} {:>20}", item.title, format_item_price(item));
            if !item.description.trim().is_empty() {
                let _ = writeln!(out, "    {}", item.description.trim());
            }
        }
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "  {:<32} {:>20}",
        "SUBTOTAL",
        format_total(document.subtotal(), "")
    );
    let _ = writeln!(
        out,
        "  {:<32} {:>20}",
        "TOTAL",
        format_total(document.total(), document.unit_label())
    );
    out
}
