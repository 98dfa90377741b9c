//! Working set of line items while a quotation is being composed.
//!
//! Single owner, edited through explicit operations. Documents copy items out of the
//! store, so later edits never reach an already assembled snapshot.

use crate::domain::entities::{BillingUnit, LineItem, Price};
use crate::domain::errors::QuotationError;

/// A single field change applied to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Title(String),
    Description(String),
    Price(Price),
    Unit(BillingUnit),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemStore {
    items: Vec<LineItem>,
}

impl LineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a fetched record.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Appends and returns the new item's index.
    pub fn add(&mut self, item: LineItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Appends an empty draft row (Monthly, no price).
    pub fn add_blank(&mut self) -> usize {
        self.add(LineItem::default())
    }

    pub fn remove(&mut self, index: usize) -> Result<LineItem, QuotationError> {
        self.check(index)?;
        Ok(self.items.remove(index))
    }

    pub fn edit(&mut self, index: usize, edit: ItemEdit) -> Result<(), QuotationError> {
        self.check(index)?;
        let item = &mut self.items[index];
        match edit {
            ItemEdit::Title(title) => item.title = title,
            ItemEdit::Description(description) => item.description = description,
            ItemEdit::Price(price) => item.price = price,
            ItemEdit::Unit(unit) => item.unit = unit,
        }
        Ok(())
    }

    /// Items that would appear on an exported document.
    pub fn billable(&self) -> Vec<LineItem> {
        self.items.iter().filter(|i| !i.is_draft()).cloned().collect()
    }

    fn check(&self, index: usize) -> Result<(), QuotationError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(QuotationError::ItemOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}
