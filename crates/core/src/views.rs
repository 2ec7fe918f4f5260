//! View renderers: server data in, display structures out
//!
//! Nothing here touches controller state. Interactive elements carry the
//! [`Command`] they dispatch so the shell only has to draw and forward clicks.

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;

use crate::error::ValidationError;
use crate::messages::Command;
use crate::models::*;
use crate::order::order_total;

pub const CURRENCY: &str = "£";

pub fn format_money(amount: f64) -> String {
    // -0.0 (an empty float sum) must not print as "-0.00"
    let amount = if amount == 0.0 { 0.0 } else { amount };
    format!("{}{:.2}", CURRENCY, amount)
}

pub fn votes_label(count: u32) -> String {
    if count == 1 {
        "1 vote".to_string()
    } else {
        format!("{} votes", count)
    }
}

/// `MM:SS`, minutes uncapped; anything at or past zero is `00:00`
pub fn format_countdown(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Descending by votes; equal counts keep server order
pub fn sort_by_votes(restaurants: &[Restaurant]) -> Vec<&Restaurant> {
    let mut sorted: Vec<&Restaurant> = restaurants.iter().collect();
    sorted.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    sorted
}

/// Shareable link that opens the client on the voting flow
pub fn voting_link(page_url: &str) -> String {
    let base = page_url.split(|c| c == '?' || c == '#').next().unwrap_or(page_url);
    format!("{}?voting=true", base)
}

// ============================================================================
// Applicant views
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MenuLine {
    pub name: String,
    pub price: String,
    pub best: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantCard {
    pub id: RestaurantId,
    pub name: String,
    pub description: String,
    pub menu: Vec<MenuLine>,
    pub has_best_dish: bool,
    pub votes: String,
    pub vote: Command,
}

pub fn restaurant_cards(restaurants: &[Restaurant]) -> Vec<RestaurantCard> {
    sort_by_votes(restaurants)
        .into_iter()
        .map(|r| RestaurantCard {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            menu: r
                .menu
                .iter()
                .map(|item| MenuLine {
                    name: item.name.clone(),
                    price: format_money(item.price),
                    best: item.is_best_dish,
                })
                .collect(),
            has_best_dish: r.best_dish().is_some(),
            votes: votes_label(r.vote_count),
            vote: Command::Vote(r.id),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteResultRow {
    pub id: RestaurantId,
    pub name: String,
    pub description: String,
    pub vote_count: u32,
    pub votes: String,
    pub leader: bool,
    pub selected: bool,
    /// Disabled while a selection request for this row is in flight
    pub busy: bool,
    /// `None` once this restaurant is the winner
    pub select: Option<Command>,
}

pub fn vote_results(
    restaurants: &[Restaurant],
    selected: Option<RestaurantId>,
    pending: &[RestaurantId],
) -> Vec<VoteResultRow> {
    sort_by_votes(restaurants)
        .into_iter()
        .enumerate()
        .map(|(rank, r)| {
            let is_selected = selected == Some(r.id);
            VoteResultRow {
                id: r.id,
                name: r.name.clone(),
                description: r.description.clone(),
                vote_count: r.vote_count,
                votes: votes_label(r.vote_count),
                leader: rank == 0,
                selected: is_selected,
                busy: pending.contains(&r.id),
                select: (!is_selected).then_some(Command::SelectWinner(r.id)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRestaurantInfo {
    pub name: String,
    pub description: String,
    pub signature_dish: Option<String>,
}

pub fn selected_restaurant(restaurant: &Restaurant) -> SelectedRestaurantInfo {
    SelectedRestaurantInfo {
        name: restaurant.name.clone(),
        description: restaurant.description.clone(),
        signature_dish: restaurant.best_dish().map(|d| d.name.clone()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuRow {
    pub item_id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub best: bool,
    /// Raw text currently in the quantity input
    pub quantity: String,
}

impl MenuRow {
    pub fn set_quantity(&self, raw: impl Into<String>) -> Command {
        Command::SetQuantity {
            item_id: self.item_id,
            raw: raw.into(),
        }
    }
}

pub fn menu_rows(restaurant: &Restaurant, inputs: &BTreeMap<MenuItemId, String>) -> Vec<MenuRow> {
    restaurant
        .menu
        .iter()
        .map(|item| MenuRow {
            item_id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: format_money(item.price),
            best: item.is_best_dish,
            quantity: inputs.get(&item.id).cloned().unwrap_or_else(|| "0".to_string()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub total: String,
}

pub fn order_summary(order: &OrderMap) -> OrderSummary {
    OrderSummary {
        lines: order
            .values()
            .map(|line| SummaryLine {
                label: format!("{} x{}", line.menu_item_name, line.quantity),
                amount: format_money(line.sub_total),
            })
            .collect(),
        total: format_money(order_total(order)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: String,
    pub amount: String,
}

fn receipt_lines(items: &[OrderLine]) -> Vec<ReceiptLine> {
    items
        .iter()
        .map(|line| ReceiptLine {
            name: line.menu_item_name.clone(),
            quantity: format!("x{}", line.quantity),
            amount: format_money(line.sub_total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub heading: String,
    pub applicant: String,
    pub lines: Vec<ReceiptLine>,
    pub total: String,
}

pub fn receipt(order: &SubmittedOrder) -> Receipt {
    Receipt {
        heading: format!("Order #{}", order.id),
        applicant: order.applicant_name.clone(),
        lines: receipt_lines(&order.items),
        total: format_money(order.total_cost),
    }
}

// ============================================================================
// Admin views
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_orders: String,
    pub total_revenue: String,
    pub selected_restaurant: String,
}

pub fn dashboard_stats(
    orders: Option<usize>,
    revenue: Option<f64>,
    winner: Option<&Restaurant>,
) -> DashboardStats {
    DashboardStats {
        total_orders: orders.unwrap_or(0).to_string(),
        total_revenue: format_money(revenue.unwrap_or(0.0)),
        selected_restaurant: winner
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Pending".to_string()),
    }
}

/// Outcome of checking a paid amount against an order total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentCheck {
    pub paid: f64,
    pub change: f64,
}

pub fn check_payment(total_cost: f64, raw_paid: &str) -> Result<PaymentCheck, ValidationError> {
    let paid = raw_paid
        .trim()
        .trim_start_matches(CURRENCY)
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or(ValidationError::InvalidPayment)?;
    if paid < total_cost {
        return Err(ValidationError::InvalidPayment);
    }
    Ok(PaymentCheck {
        paid,
        change: paid - total_cost,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPaymentRow {
    pub order_id: OrderId,
    pub heading: String,
    pub applicant: String,
    pub total: String,
    pub lines: Vec<ReceiptLine>,
    /// Prefill for the paid input; empty when nothing was recorded
    pub paid: String,
    pub change: String,
}

impl OrderPaymentRow {
    pub fn record_payment(&self, raw_paid: impl Into<String>) -> Command {
        Command::RecordPayment {
            order_id: self.order_id,
            paid: raw_paid.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedOrderCard {
    pub restaurant_name: String,
    pub total: String,
    pub items: Vec<ReceiptLine>,
    pub orders: Vec<OrderPaymentRow>,
}

/// Admin order rollups; `checked` holds payments computed locally this session
pub fn aggregated_orders(
    aggregated: &[AggregatedOrder],
    checked: &HashMap<OrderId, PaymentCheck>,
) -> Vec<AggregatedOrderCard> {
    aggregated
        .iter()
        .map(|agg| AggregatedOrderCard {
            restaurant_name: agg.restaurant_name.clone(),
            total: format_money(agg.total_cost),
            items: receipt_lines(&agg.items),
            orders: agg
                .orders
                .iter()
                .map(|order| {
                    let recorded = order
                        .paid_amount
                        .filter(|p| *p > 0.0)
                        .map(|paid| PaymentCheck {
                            paid,
                            change: paid - order.total_cost,
                        });
                    let shown = checked.get(&order.id).copied().or(recorded);
                    OrderPaymentRow {
                        order_id: order.id,
                        heading: format!("Order #{}", order.id),
                        applicant: order.applicant_name.clone(),
                        total: format_money(order.total_cost),
                        lines: receipt_lines(&order.items),
                        paid: shown.map(|p| format!("{:.2}", p.paid)).unwrap_or_default(),
                        change: shown.map(|p| format_money(p.change)).unwrap_or_default(),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Add/edit menu item form, mirrored by the shell's modal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuItemForm {
    pub restaurant_id: RestaurantId,
    pub item_id: Option<MenuItemId>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub is_best_dish: bool,
}

impl MenuItemForm {
    pub fn add(restaurant_id: RestaurantId) -> Self {
        Self {
            restaurant_id,
            ..Default::default()
        }
    }

    pub fn edit(restaurant_id: RestaurantId, item: &MenuItem) -> Self {
        Self {
            restaurant_id,
            item_id: Some(item.id),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_string(),
            is_best_dish: item.is_best_dish,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.item_id.is_some() {
            "Edit Menu Item"
        } else {
            "Add Menu Item"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.item_id.is_some() {
            "Update Item"
        } else {
            "Add Item"
        }
    }

    pub fn validate(&self) -> Result<MenuItemDraft, ValidationError> {
        let name = self.name.trim();
        let description = self.description.trim();
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0);
        match price {
            Some(price) if !name.is_empty() && !description.is_empty() => Ok(MenuItemDraft {
                name: name.to_string(),
                description: description.to_string(),
                price,
                is_best_dish: self.is_best_dish,
            }),
            _ => Err(ValidationError::InvalidMenuItem),
        }
    }
}

pub fn restaurant_draft(name: &str, description: &str) -> Result<RestaurantDraft, ValidationError> {
    let (name, description) = (name.trim(), description.trim());
    if name.is_empty() || description.is_empty() {
        return Err(ValidationError::IncompleteRestaurant);
    }
    Ok(RestaurantDraft {
        name: name.to_string(),
        description: description.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuAdminRow {
    pub item_id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub best: bool,
    pub edit: MenuItemForm,
    pub delete: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantAdminCard {
    pub id: RestaurantId,
    pub name: String,
    pub description: String,
    pub votes: String,
    pub menu: Vec<MenuAdminRow>,
    pub add_item: MenuItemForm,
    pub delete: Command,
}

pub fn restaurant_admin_cards(restaurants: &[Restaurant]) -> Vec<RestaurantAdminCard> {
    restaurants
        .iter()
        .map(|r| RestaurantAdminCard {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            votes: votes_label(r.vote_count),
            menu: r
                .menu
                .iter()
                .map(|item| MenuAdminRow {
                    item_id: item.id,
                    name: item.name.clone(),
                    description: item.description.clone(),
                    price: format_money(item.price),
                    best: item.is_best_dish,
                    edit: MenuItemForm::edit(r.id, item),
                    delete: Command::DeleteMenuItem {
                        restaurant_id: r.id,
                        item_id: item.id,
                    },
                })
                .collect(),
            add_item: MenuItemForm::add(r.id),
            delete: Command::DeleteRestaurant(r.id),
        })
        .collect()
}
