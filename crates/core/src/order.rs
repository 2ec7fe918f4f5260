//! Order-in-progress math
//!
//! The order map is always rebuilt from scratch out of the quantity inputs that
//! are currently rendered, never patched line by line.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::{MenuItem, MenuItemId, OrderLine, OrderMap, MAX_QUANTITY};

/// Read a quantity input. Leading integer wins ("3x" is 3), anything else is 0,
/// and the result is clamped into `0..=MAX_QUANTITY`.
pub fn parse_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    // Overlong digit runs saturate rather than fail
    digits[..end]
        .parse::<u64>()
        .map(|q| q.min(MAX_QUANTITY as u64) as u32)
        .unwrap_or(MAX_QUANTITY)
}

/// Full recompute of the order from the rendered menu and its quantity inputs
pub fn rebuild_order(menu: &[MenuItem], inputs: &BTreeMap<MenuItemId, String>) -> OrderMap {
    menu.iter()
        .filter_map(|item| {
            let quantity = inputs.get(&item.id).map(|raw| parse_quantity(raw)).unwrap_or(0);
            (quantity > 0).then(|| (item.id, OrderLine::new(item, quantity)))
        })
        .collect()
}

pub fn order_total(order: &OrderMap) -> f64 {
    order.values().fold(0.0, |total, line| total + line.sub_total)
}

/// Lines to submit, rejecting an empty order
pub fn submission_lines(order: &OrderMap) -> Result<Vec<OrderLine>, ValidationError> {
    let lines: Vec<OrderLine> = order.values().filter(|l| l.quantity > 0).cloned().collect();
    if lines.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }
    Ok(lines)
}

/// Quantity inputs as they should be rendered for `menu`, seeded from a cached order
pub fn inputs_from_order(menu: &[MenuItem], order: &OrderMap) -> BTreeMap<MenuItemId, String> {
    menu.iter()
        .map(|item| {
            let quantity = order.get(&item.id).map(|l| l.quantity).unwrap_or(0);
            (item.id, quantity.to_string())
        })
        .collect()
}
