//! Admin flow: login, dashboard tabs and the management operations

use chrono::Duration;

use crate::cache::KeyValueStore;
use crate::clock::Clock;
use crate::error::RemoteError;
use crate::messages::*;
use crate::remote::{Request, Response};
use crate::views::{check_payment, restaurant_draft};

use super::Controller;

impl<S: KeyValueStore, C: Clock> Controller<S, C> {
    // ========================================================================
    // Login
    // ========================================================================

    pub(super) fn open_admin_login(&mut self) {
        if matches!(self.page, Some(page) if !page.is_admin()) {
            self.enter(Page::AdminLogin);
        }
    }

    pub(super) fn leave_admin_login(&mut self) {
        if self.page == Some(Page::AdminLogin) {
            self.start();
        }
    }

    pub(super) fn admin_login(&mut self, password: String) {
        if self.page != Some(Page::AdminLogin) {
            return;
        }
        self.login_error = None;
        self.issue(Request::AdminLogin { password });
    }

    pub(super) fn on_admin_login(&mut self, outcome: Result<Response, RemoteError>, current: bool) {
        match outcome {
            // The user backed out before the reply; they stay on the applicant side
            Ok(Response::AdminToken(_)) if !current => {
                tracing::info!("Discarding admin login that finished after leaving the form");
            }
            Ok(Response::AdminToken(token)) => {
                tracing::info!("Admin login succeeded");
                self.cache.save_admin_token(&token);
                self.admin_token = Some(token);
                self.login_error = None;
                self.dashboard = Default::default();
                self.enter(Page::AdminDashboard);
            }
            _ => self.login_error = Some("Invalid password".to_string()),
        }
    }

    // ========================================================================
    // Dashboard loading
    // ========================================================================

    /// Summary stats plus the votes and orders tabs
    pub(super) fn load_dashboard(&mut self) {
        self.issue(Request::ListOrders);
        self.issue(Request::Revenue);
        self.issue(Request::SelectedWinner);
        self.issue(Request::VoteResults);
        self.issue(Request::AggregatedOrders);
        if self.dashboard.tab == AdminTab::Restaurants {
            self.issue(Request::ListRestaurants);
        }
    }

    fn load_tab(&mut self, tab: AdminTab) {
        match tab {
            AdminTab::Votes => {
                self.issue(Request::VoteResults);
                self.issue(Request::SelectedWinner);
            }
            AdminTab::Orders => self.issue(Request::AggregatedOrders),
            AdminTab::Restaurants => self.issue(Request::ListRestaurants),
        }
    }

    /// Reload the dashboard after a mutation, unless the admin already moved on
    fn reload_if_current(&mut self, current: bool, reload: impl FnOnce(&mut Self)) {
        if current && self.page == Some(Page::AdminDashboard) {
            reload(self);
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub(super) fn dispatch_admin(&mut self, command: Command) {
        if let Command::AdminLogout = command {
            if self.admin_token.is_some() {
                tracing::info!("Admin logout");
                self.cache.clear_all();
                self.start();
            }
            return;
        }

        if self.page != Some(Page::AdminDashboard) {
            tracing::debug!("Ignoring admin command outside the dashboard");
            return;
        }

        match command {
            Command::SwitchTab(tab) => {
                self.dashboard.tab = tab;
                self.load_tab(tab);
            }
            Command::SelectWinner(restaurant_id) => self.issue(Request::SelectWinner(restaurant_id)),
            Command::RecordPayment { order_id, paid } => self.record_payment(order_id, &paid),
            Command::CreateRestaurant { name, description } => {
                match restaurant_draft(&name, &description) {
                    Ok(draft) => self.issue(Request::CreateRestaurant(draft)),
                    Err(e) => self.notify(Notice::error(e.to_string())),
                }
            }
            Command::UpdateRestaurant { id, name, description } => {
                match restaurant_draft(&name, &description) {
                    Ok(draft) => self.issue(Request::UpdateRestaurant { id, draft }),
                    Err(_) => self.notify(Notice::error("Name and description cannot be empty")),
                }
            }
            Command::DeleteRestaurant(id) => self.ask(
                "Are you sure you want to delete this restaurant?",
                Request::DeleteRestaurant(id),
            ),
            Command::DeleteMenuItem { restaurant_id, item_id } => self.ask(
                "Remove this menu item?",
                Request::DeleteMenuItem { restaurant_id, item_id },
            ),
            Command::ResetVotes => self.ask(
                "Are you sure you want to reset voting? All votes will be cleared.",
                Request::ResetVotes,
            ),
            Command::DeleteAllVotes => self.ask(
                "Are you sure you want to DELETE ALL VOTES? This cannot be undone.",
                Request::DeleteAllVotes,
            ),
            Command::Confirm => {
                if let Some(confirmation) = self.confirmation.take() {
                    self.issue(confirmation.request);
                }
            }
            Command::CancelConfirmation => self.confirmation = None,
            Command::OpenMenuItemForm(form) => self.menu_form = Some(form),
            Command::CloseMenuItemForm => self.menu_form = None,
            Command::SaveMenuItem => self.save_menu_item(),
            Command::StartVotingRound { minutes } => self.start_voting_round(&minutes),
            other => tracing::debug!("Unhandled command {:?}", other),
        }
    }

    fn ask(&mut self, prompt: &str, request: Request) {
        self.confirmation = Some(Confirmation {
            prompt: prompt.to_string(),
            request,
        });
    }

    fn record_payment(&mut self, order_id: crate::models::OrderId, raw_paid: &str) {
        let total = self
            .dashboard
            .aggregated
            .iter()
            .flatten()
            .flat_map(|agg| agg.orders.iter())
            .find(|order| order.id == order_id)
            .map(|order| order.total_cost);
        let Some(total) = total else {
            tracing::warn!("Payment for unknown order {}", order_id);
            return;
        };

        match check_payment(total, raw_paid) {
            Ok(check) => {
                self.dashboard.payments.insert(order_id, check);
                self.issue(Request::RecordPayment {
                    order_id,
                    paid_amount: check.paid,
                });
            }
            Err(e) => self.notify(Notice::error(e.to_string())),
        }
    }

    fn save_menu_item(&mut self) {
        let Some(form) = &self.menu_form else {
            return;
        };
        let restaurant_id = form.restaurant_id;
        let request = match (form.validate(), form.item_id) {
            (Ok(draft), None) => Request::AddMenuItem { restaurant_id, draft },
            (Ok(draft), Some(item_id)) => Request::UpdateMenuItem {
                restaurant_id,
                item_id,
                draft,
            },
            (Err(e), _) => {
                self.notify(Notice::error(e.to_string()));
                return;
            }
        };
        self.issue(request);
    }

    /// Empty, unparseable or zero minutes fall back to the configured default
    fn start_voting_round(&mut self, raw_minutes: &str) {
        // The end time differs per click, so the request-equality guard cannot catch repeats
        if self.is_in_flight(|r| matches!(r, Request::StartVotingRound { .. })) {
            tracing::debug!("Ignoring start_voting_round while one is in flight");
            return;
        }
        let minutes = raw_minutes
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| *m > 0)
            .unwrap_or(self.config.default_voting_minutes);
        let end_time = self.clock.now() + Duration::minutes(i64::from(minutes));
        self.pending_round_minutes = Some(minutes);
        self.issue(Request::StartVotingRound { end_time });
    }

    // ========================================================================
    // Responses
    // ========================================================================

    pub(super) fn complete_admin(
        &mut self,
        request: Request,
        outcome: Result<Response, RemoteError>,
        current: bool,
    ) {
        let ok = outcome.is_ok();
        match (request, outcome) {
            (Request::ListOrders, Ok(Response::Orders(orders))) => {
                self.dashboard.order_count = Some(orders.len());
            }
            (Request::Revenue, Ok(Response::Revenue(summary))) => {
                self.dashboard.revenue = Some(summary.total_revenue);
            }
            (Request::SelectedWinner, Ok(Response::Winner(winner))) => {
                self.dashboard.winner = winner;
            }
            (Request::AggregatedOrders, Ok(Response::AggregatedOrders(aggregated))) => {
                self.dashboard.aggregated = Some(aggregated);
                self.orders_revision += 1;
            }

            (Request::SelectWinner(id), _) if ok => {
                let name = self
                    .dashboard
                    .vote_results
                    .iter()
                    .flatten()
                    .find(|r| r.id == id)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| id.to_string());
                self.notify(Notice::info(format!("Restaurant {} selected!", name)));
                self.reload_if_current(current, Self::load_dashboard);
            }
            (Request::SelectWinner(_), _) => {
                self.notify(Notice::error("Failed to select restaurant"));
            }

            (Request::RecordPayment { .. }, _) if ok => {
                self.notify(Notice::info("Paid amount saved."));
            }
            (Request::RecordPayment { order_id, .. }, _) => {
                self.dashboard.payments.remove(&order_id);
                self.orders_revision += 1;
                self.notify(Notice::error("Failed to save paid amount"));
            }

            (Request::CreateRestaurant(_), _) => self.restaurants_changed(
                ok,
                current,
                "Restaurant created successfully!",
                "Failed to create restaurant",
            ),
            (Request::UpdateRestaurant { .. }, _) => self.restaurants_changed(
                ok,
                current,
                "Restaurant updated successfully!",
                "Failed to update restaurant",
            ),
            (Request::DeleteRestaurant(_), _) => self.restaurants_changed(
                ok,
                current,
                "Restaurant deleted successfully!",
                "Failed to delete restaurant",
            ),
            (Request::AddMenuItem { .. }, _) => {
                if ok {
                    self.menu_form = None;
                }
                self.restaurants_changed(
                    ok,
                    current,
                    "Menu item added successfully!",
                    "Failed to add menu item",
                )
            }
            (Request::UpdateMenuItem { .. }, _) => {
                if ok {
                    self.menu_form = None;
                }
                self.restaurants_changed(
                    ok,
                    current,
                    "Menu item updated successfully!",
                    "Failed to update menu item",
                )
            }
            (Request::DeleteMenuItem { .. }, _) => self.restaurants_changed(
                ok,
                current,
                "Menu item removed.",
                "Failed to delete menu item",
            ),

            (Request::ResetVotes, _) => self.votes_changed(
                ok,
                current,
                "Voting has been reset successfully!".to_string(),
                "Failed to reset voting",
            ),
            (Request::DeleteAllVotes, _) => self.votes_changed(
                ok,
                current,
                "All votes have been deleted successfully!".to_string(),
                "Failed to delete votes",
            ),
            (Request::StartVotingRound { .. }, _) => {
                let minutes = self
                    .pending_round_minutes
                    .take()
                    .unwrap_or(self.config.default_voting_minutes);
                self.votes_changed(
                    ok,
                    current,
                    format!("New voting session created for {} minutes!", minutes),
                    "Failed to create voting session",
                )
            }

            (request, Err(e)) => {
                tracing::warn!("Dashboard load {} failed: {}", request.name(), e);
            }
            (request, Ok(other)) => {
                tracing::warn!("Unexpected response to {}: {:?}", request.name(), other);
            }
        }
    }

    fn restaurants_changed(&mut self, ok: bool, current: bool, success: &str, failure: &str) {
        if ok {
            self.notify(Notice::info(success));
            self.reload_if_current(current, |c| c.load_tab(AdminTab::Restaurants));
        } else {
            self.notify(Notice::error(failure));
        }
    }

    fn votes_changed(&mut self, ok: bool, current: bool, success: String, failure: &str) {
        if ok {
            self.notify(Notice::info(success));
            self.reload_if_current(current, |c| c.load_tab(AdminTab::Votes));
        } else {
            self.notify(Notice::error(failure));
        }
    }
}
