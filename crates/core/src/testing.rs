//! In-process stand-ins for the browser shell: a settable clock, a scripted
//! OrderCo server and a loop that carries out controller effects.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use crate::cache::MemoryStore;
use crate::clock::Clock;
use crate::config::Config;
use crate::controller::Controller;
use crate::error::RemoteError;
use crate::messages::{Effect, Event};
use crate::models::*;
use crate::remote::{Request, Response};

/// Clock the test moves by hand; clones share the same instant
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(noon())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn menu_item(id: MenuItemId, name: &str, price: f64, best: bool) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        is_best_dish: best,
    }
}

pub fn restaurant(id: RestaurantId, name: &str, votes: u32, menu: Vec<MenuItem>) -> Restaurant {
    Restaurant {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        menu,
        vote_count: votes,
    }
}

/// OrderCo service double. Replies are rendered as JSON and decoded through
/// [`Request::decode`] so the wire format is exercised too.
pub struct FakeServer {
    pub restaurants: Vec<Restaurant>,
    pub voting_ends: DateTime<Utc>,
    pub selection: Option<RestaurantId>,
    pub next_applicant_id: ApplicantId,
    pub next_order_id: OrderId,
    pub orders: Vec<SubmittedOrder>,
    pub password: String,
    /// Request names (see [`Request::name`]) that fail with a 500
    pub failing: HashSet<&'static str>,
    /// Every request received, in order
    pub log: Vec<Request>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self {
            restaurants: vec![
                restaurant(
                    1,
                    "Pasta Place",
                    3,
                    vec![menu_item(4, "Carbonara", 8.5, true), menu_item(5, "Salad", 4.0, false)],
                ),
                restaurant(
                    2,
                    "Curry House",
                    5,
                    vec![
                        menu_item(7, "Curry", 5.0, true),
                        menu_item(8, "Rice", 1.25, false),
                        menu_item(9, "Naan", 2.1, false),
                    ],
                ),
            ],
            voting_ends: noon() + Duration::minutes(10),
            selection: None,
            next_applicant_id: 1,
            next_order_id: 9,
            orders: Vec::new(),
            password: "secret".to_string(),
            failing: HashSet::new(),
            log: Vec::new(),
        }
    }
}

impl FakeServer {
    pub fn fail(&mut self, name: &'static str) {
        self.failing.insert(name);
    }

    pub fn heal(&mut self, name: &'static str) {
        self.failing.remove(name);
    }

    pub fn received(&self, name: &str) -> usize {
        self.log.iter().filter(|r| r.name() == name).count()
    }

    pub fn respond(&mut self, request: &Request) -> Result<Response, RemoteError> {
        self.log.push(request.clone());
        if self.failing.contains(request.name()) {
            return Err(RemoteError::Status(500));
        }

        let body = match request {
            Request::RegisterApplicant { .. } => {
                let id = self.next_applicant_id;
                self.next_applicant_id += 1;
                json!({ "id": id })
            }
            Request::ListRestaurants | Request::VoteResults => json!(self.restaurants),
            Request::GetRestaurant(id) => match self.restaurants.iter().find(|r| r.id == *id) {
                Some(r) => json!(r),
                None => return Err(RemoteError::Status(404)),
            },
            Request::VotingStatus => json!({
                "endTime": self.voting_ends.to_rfc3339(),
            }),
            Request::SubmitVote { restaurant_id, .. } => {
                if let Some(r) = self.restaurants.iter_mut().find(|r| r.id == *restaurant_id) {
                    r.vote_count += 1;
                }
                json!({})
            }
            Request::SelectedRestaurant => json!({ "restaurantId": self.selection }),
            Request::SelectedWinner => {
                let winner = self
                    .selection
                    .and_then(|id| self.restaurants.iter().find(|r| r.id == id));
                json!(winner)
            }
            Request::SelectWinner(id) => {
                self.selection = Some(*id);
                json!(self.restaurants.iter().find(|r| r.id == *id))
            }
            Request::SubmitOrder { restaurant_id, items, .. } => {
                let order = SubmittedOrder {
                    id: self.next_order_id,
                    applicant_name: "Alice".to_string(),
                    restaurant_id: *restaurant_id,
                    items: items.clone(),
                    total_cost: items.iter().map(|l| l.sub_total).sum(),
                    paid_amount: None,
                };
                self.next_order_id += 1;
                self.orders.push(order.clone());
                json!(order)
            }
            Request::AdminLogin { password } => {
                if *password != self.password {
                    return Err(RemoteError::Status(401));
                }
                json!({ "token": "admin-token" })
            }
            Request::ListOrders => json!(self.orders),
            Request::Revenue => json!({
                "totalRevenue": self.orders.iter().map(|o| o.total_cost).sum::<f64>(),
            }),
            Request::AggregatedOrders => {
                let aggregated: Vec<AggregatedOrder> = self
                    .restaurants
                    .iter()
                    .filter_map(|r| {
                        let orders: Vec<SubmittedOrder> = self
                            .orders
                            .iter()
                            .filter(|o| o.restaurant_id == r.id)
                            .cloned()
                            .collect();
                        (!orders.is_empty()).then(|| AggregatedOrder {
                            restaurant_name: r.name.clone(),
                            total_cost: orders.iter().map(|o| o.total_cost).sum(),
                            items: orders.iter().flat_map(|o| o.items.clone()).collect(),
                            orders,
                        })
                    })
                    .collect();
                json!(aggregated)
            }
            Request::RecordPayment { order_id, paid_amount } => {
                if let Some(order) = self.orders.iter_mut().find(|o| o.id == *order_id) {
                    order.paid_amount = Some(*paid_amount);
                }
                json!({})
            }
            Request::CreateRestaurant(draft) => {
                let id = self.restaurants.iter().map(|r| r.id).max().unwrap_or(0) + 1;
                self.restaurants.push(Restaurant {
                    id,
                    name: draft.name.clone(),
                    description: draft.description.clone(),
                    menu: Vec::new(),
                    vote_count: 0,
                });
                json!({ "id": id })
            }
            Request::DeleteRestaurant(id) => {
                self.restaurants.retain(|r| r.id != *id);
                json!({})
            }
            Request::ResetVotes | Request::DeleteAllVotes => {
                for r in &mut self.restaurants {
                    r.vote_count = 0;
                }
                self.selection = None;
                json!({})
            }
            Request::StartVotingRound { end_time } => {
                self.voting_ends = *end_time;
                self.selection = None;
                json!({})
            }
            // Acknowledged with an empty body
            Request::UpdateRestaurant { .. }
            | Request::AddMenuItem { .. }
            | Request::UpdateMenuItem { .. }
            | Request::DeleteMenuItem { .. } => return request.decode(""),
        };

        request.decode(&body.to_string())
    }
}

pub type TestController = Controller<MemoryStore, ManualClock>;

pub fn controller(store: MemoryStore, clock: ManualClock) -> TestController {
    Controller::new(Config::default(), store, clock)
}

/// Carry out every queued effect until the controller settles. Requests are
/// answered by `server`; timer effects are returned without firing.
pub fn settle(controller: &mut TestController, server: &mut FakeServer) -> Vec<Effect> {
    let mut timers = Vec::new();
    loop {
        let effects = controller.take_effects();
        if effects.is_empty() {
            return timers;
        }
        for effect in effects {
            match effect {
                Effect::Request { ticket, request, .. } => {
                    let outcome = server.respond(&request);
                    controller.handle(Event::Completed {
                        ticket,
                        request,
                        outcome,
                    });
                }
                timer => timers.push(timer),
            }
        }
    }
}

/// Split queued effects into requests (unanswered) and everything else
pub fn pending_requests(controller: &mut TestController) -> (Vec<Effect>, Vec<Effect>) {
    controller
        .take_effects()
        .into_iter()
        .partition(|e| matches!(e, Effect::Request { .. }))
}
