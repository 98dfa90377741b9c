//! Builds immutable quotation snapshots from a header and the current items.

use crate::domain::aggregator;
use crate::domain::entities::{LineItem, Page, QuotationDocument, QuotationHeader};
use crate::domain::errors::QuotationError;
use crate::domain::paginator::{self, PageLayout};

/// Assemble a document snapshot.
///
/// Draft items are dropped first; totals and the unit label are computed over the whole
/// remaining set, then the items are paginated. Items are copied into the document.
pub fn assemble(
    header: &QuotationHeader,
    items: &[LineItem],
    first_page_capacity: usize,
    later_page_capacity: usize,
) -> Result<QuotationDocument, QuotationError> {
    let billable = billable_for(header, items)?;
    let pages = paginator::paginate(&billable, first_page_capacity, later_page_capacity)?;
    Ok(snapshot(header, pages, &billable))
}

/// [`assemble`] with capacities taken from a validated layout.
pub fn assemble_with_layout(
    header: &QuotationHeader,
    items: &[LineItem],
    layout: &PageLayout,
) -> Result<QuotationDocument, QuotationError> {
    let billable = billable_for(header, items)?;
    let pages = layout.paginate(&billable);
    Ok(snapshot(header, pages, &billable))
}

fn billable_for(
    header: &QuotationHeader,
    items: &[LineItem],
) -> Result<Vec<LineItem>, QuotationError> {
    if header.client_name().is_none() {
        return Err(QuotationError::MissingClient);
    }
    Ok(items.iter().filter(|i| !i.is_draft()).cloned().collect())
}

fn snapshot(
    header: &QuotationHeader,
    pages: Vec<Page>,
    billable: &[LineItem],
) -> QuotationDocument {
    QuotationDocument::new(
        header.clone(),
        pages,
        aggregator::subtotal(billable),
        aggregator::total(billable),
        aggregator::unit_label(billable).to_string(),
    )
}
