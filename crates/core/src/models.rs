//! Shared data models exchanged with the OrderCo service and kept in the local cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ApplicantId = i64;
pub type RestaurantId = i64;
pub type MenuItemId = i64;
pub type OrderId = i64;

/// Upper bound for a single order line
pub const MAX_QUANTITY: u32 = 10;

/// In-progress order, keyed by menu item id. Never holds a zero-quantity line.
pub type OrderMap = BTreeMap<MenuItemId, OrderLine>;

/// Applicant progress persisted between reloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub applicant_id: Option<ApplicantId>,
    pub applicant_name: Option<String>,
    pub restaurant_voted: bool,
    pub selected_restaurant_id: Option<RestaurantId>,
    pub current_order: OrderMap,
}

impl SessionState {
    pub fn is_registered(&self) -> bool {
        self.applicant_id.is_some()
    }

    /// Drops voting and ordering progress while keeping the applicant identity
    pub fn reset_progress(&mut self) {
        self.restaurant_voted = false;
        self.selected_restaurant_id = None;
        self.current_order.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: MenuItemId,
    pub menu_item_name: String,
    pub price: f64,
    pub quantity: u32,
    pub sub_total: f64,
}

impl OrderLine {
    pub fn new(item: &MenuItem, quantity: u32) -> Self {
        Self {
            item_id: item.id,
            menu_item_name: item.name.clone(),
            price: item.price,
            quantity,
            sub_total: item.price * quantity as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub is_best_dish: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub vote_count: u32,
}

impl Restaurant {
    /// The signature dish, if the server flagged one
    pub fn best_dish(&self) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.is_best_dish)
    }

    pub fn menu_item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.id == id)
    }
}

/// Current voting round; a new `end_time` means a new round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatus {
    pub end_time: DateTime<Utc>,
}

/// Server receipt for a placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedOrder {
    pub id: OrderId,
    #[serde(default)]
    pub applicant_name: String,
    pub restaurant_id: RestaurantId,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
}

impl SubmittedOrder {
    /// Whether this receipt still belongs to the server's current selection
    pub fn matches_selection(&self, live: Option<RestaurantId>) -> bool {
        live == Some(self.restaurant_id)
    }
}

/// Admin rollup of every order placed with one restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedOrder {
    pub restaurant_name: String,
    pub total_cost: f64,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub orders: Vec<SubmittedOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: f64,
}

/// Body for creating or renaming a restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDraft {
    pub name: String,
    pub description: String,
}

/// Body for adding or editing a menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub is_best_dish: bool,
}
