//! Derived totals over a set of line items. Recomputed on every read; no caching.

use crate::domain::entities::{BillingUnit, LineItem};

/// Sum of item prices. Prices are already coerced, so this is always >= 0.
pub fn subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.price.amount()).sum()
}

/// Grand total. No tax or discount is applied, so it equals the subtotal.
pub fn total(items: &[LineItem]) -> f64 {
    subtotal(items)
}

/// Most frequent billing unit. Ties go to the unit encountered first in item order.
pub fn dominant_unit(items: &[LineItem]) -> Option<BillingUnit> {
    let mut tally: Vec<(BillingUnit, usize)> = Vec::with_capacity(BillingUnit::ALL.len());
    for item in items {
        match tally.iter_mut().find(|(unit, _)| *unit == item.unit) {
            Some((_, count)) => *count += 1,
            None => tally.push((item.unit, 1)),
        }
    }

    tally
        .into_iter()
        .fold(None, |best: Option<(BillingUnit, usize)>, (unit, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((unit, count)),
        })
        .map(|(unit, _)| unit)
}

/// Label of the dominant unit, empty when there are no items.
pub fn unit_label(items: &[LineItem]) -> &'static str {
    dominant_unit(items).map(BillingUnit::label).unwrap_or("")
}
