//! Splits an ordered item list onto pages.
//!
//! The cover page carries the header and client block, so it fits fewer items than
//! continuation pages. Items are never split, duplicated or reordered, and an empty
//! list still yields one (cover) page.

use crate::domain::entities::{LineItem, Page};
use crate::domain::errors::QuotationError;

/// Page capacities for a document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    first_page_capacity: usize,
    later_page_capacity: usize,
}

impl PageLayout {
    pub const DEFAULT_FIRST_PAGE_CAPACITY: usize = 3;
    pub const DEFAULT_LATER_PAGE_CAPACITY: usize = 5;

    pub fn new(
        first_page_capacity: usize,
        later_page_capacity: usize,
    ) -> Result<Self, QuotationError> {
        validate(first_page_capacity, later_page_capacity)?;
        Ok(Self {
            first_page_capacity,
            later_page_capacity,
        })
    }

    pub fn first_page_capacity(&self) -> usize {
        self.first_page_capacity
    }

    pub fn later_page_capacity(&self) -> usize {
        self.later_page_capacity
    }

    pub fn paginate(&self, items: &[LineItem]) -> Vec<Page> {
        split(items, self.first_page_capacity, self.later_page_capacity)
    }

    pub fn page_count(&self, item_count: usize) -> usize {
        count(item_count, self.first_page_capacity, self.later_page_capacity)
    }

    pub fn page_number_for(&self, item_index: usize) -> usize {
        number_for(item_index, self.first_page_capacity, self.later_page_capacity)
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            first_page_capacity: Self::DEFAULT_FIRST_PAGE_CAPACITY,
            later_page_capacity: Self::DEFAULT_LATER_PAGE_CAPACITY,
        }
    }
}

/// Partition `items` into pages: up to `first_page_capacity` on page 1, then up to
/// `later_page_capacity` per page.
pub fn paginate(
    items: &[LineItem],
    first_page_capacity: usize,
    later_page_capacity: usize,
) -> Result<Vec<Page>, QuotationError> {
    validate(first_page_capacity, later_page_capacity)?;
    Ok(split(items, first_page_capacity, later_page_capacity))
}

fn validate(first_page_capacity: usize, later_page_capacity: usize) -> Result<(), QuotationError> {
    if first_page_capacity == 0 || later_page_capacity == 0 {
        return Err(QuotationError::InvalidConfiguration {
            first_page_capacity,
            later_page_capacity,
        });
    }
    Ok(())
}

fn split(items: &[LineItem], first: usize, later: usize) -> Vec<Page> {
    let (cover, rest) = items.split_at(first.min(items.len()));

    let mut pages = Vec::with_capacity(count(items.len(), first, later));
    pages.push(Page {
        index: 1,
        items: cover.to_vec(),
    });
    pages.extend(rest.chunks(later).enumerate().map(|(i, chunk)| Page {
        index: i + 2,
        items: chunk.to_vec(),
    }));
    pages
}

fn count(item_count: usize, first: usize, later: usize) -> usize {
    if item_count <= first {
        1
    } else {
        1 + (item_count - first).div_ceil(later)
    }
}

fn number_for(item_index: usize, first: usize, later: usize) -> usize {
    if item_index < first {
        1
    } else {
        2 + (item_index - first) / later
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Price;

    fn numbered(n: usize) -> Vec<LineItem> {
        (0..n)
            .map(|i| LineItem::new(format!("Item {}", i), (i as f64 + 1.0) * 100.0))
            .collect()
    }

    fn flatten(pages: &[Page]) -> Vec<LineItem> {
        pages.iter().flat_map(|p| p.items.iter().cloned()).collect()
    }

    #[test]
    fn empty_list_yields_one_empty_page() {
        let pages = paginate(&[], 3, 5).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 1);
        assert!(pages[0].items.is_empty());
    }

    #[test]
    fn short_list_fits_on_cover_page() {
        let items = vec![
            LineItem::new("", Price::parse("12000")),
            LineItem::new("", Price::parse("32000")),
            LineItem::new("", Price::parse("abc")),
        ];
        let pages = paginate(&items, 3, 5).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].items, items);
    }

    #[test]
    fn eight_items_split_three_then_five() {
        let items = numbered(8);
        let pages = paginate(&items, 3, 5).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].items, items[0..3].to_vec());
        assert_eq!(pages[1].items, items[3..8].to_vec());
        assert_eq!(pages[1].index, 2);
    }

    #[test]
    fn pages_preserve_order_and_respect_capacities() {
        for len in 0..40 {
            for first in 1..6 {
                for later in 1..7 {
                    let items = numbered(len);
                    let pages = paginate(&items, first, later).unwrap();

                    assert_eq!(flatten(&pages), items);
                    assert_eq!(pages.iter().map(|p| p.items.len()).sum::<usize>(), len);
                    assert!(pages[0].items.len() <= first);
                    assert!(pages[1..].iter().all(|p| p.items.len() <= later));
                    assert!(pages[1..].iter().all(|p| !p.items.is_empty()));
                    assert!(pages.iter().enumerate().all(|(i, p)| p.index == i + 1));
                    let layout = PageLayout::new(first, later).unwrap();
                    assert_eq!(pages.len(), layout.page_count(len));
                }
            }
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let items = numbered(4);
        assert_eq!(
            paginate(&items, 0, 5),
            Err(QuotationError::InvalidConfiguration {
                first_page_capacity: 0,
                later_page_capacity: 5,
            })
        );
        assert!(paginate(&items, 3, 0).is_err());
        assert!(PageLayout::new(0, 0).is_err());
    }

    #[test]
    fn page_number_for_matches_pagination() {
        let items = numbered(14);
        let layout = PageLayout::default();
        let pages = layout.paginate(&items);
        for (page_pos, page) in pages.iter().enumerate() {
            for item in &page.items {
                let index = items.iter().position(|i| i == item).unwrap();
                assert_eq!(layout.page_number_for(index), page_pos + 1);
            }
        }
    }

    #[test]
    fn layout_defaults_match_cover_and_continuation_capacities() {
        let layout = PageLayout::default();
        assert_eq!(layout.first_page_capacity(), 3);
        assert_eq!(layout.later_page_capacity(), 5);
        assert_eq!(layout.page_count(0), 1);
        assert_eq!(layout.page_count(3), 1);
        assert_eq!(layout.page_count(4), 2);
        assert_eq!(layout.page_count(9), 3);
        assert_eq!(layout.page_number_for(8), 3);
        assert_eq!(layout.paginate(&numbered(4)).len(), 2);
    }
}
