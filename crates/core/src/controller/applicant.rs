//! Applicant flow: startup reconciliation, registration, voting, selection
//! polling and ordering

use crate::cache::KeyValueStore;
use crate::clock::Clock;
use crate::error::RemoteError;
use crate::messages::{Notice, Page};
use crate::models::*;
use crate::order::{inputs_from_order, parse_quantity, rebuild_order, submission_lines};
use crate::remote::{Request, Response};
use crate::views::format_countdown;

use super::Controller;

const VOTING_ENDED: &str = "Voting has ended! Admin will now select the restaurant.";

impl<S: KeyValueStore, C: Clock> Controller<S, C> {
    // ========================================================================
    // Startup
    // ========================================================================

    pub(super) fn on_selection(&mut self, outcome: Result<Response, RemoteError>) {
        let live = match outcome {
            Ok(Response::Selection(live)) => Ok(live),
            Ok(other) => Err(RemoteError::Decode(format!("unexpected response {:?}", other))),
            Err(e) => Err(e),
        };

        match self.page {
            None => self.reconcile(live),
            Some(Page::AwaitingSelection) => match live {
                Ok(Some(restaurant_id)) => {
                    tracing::info!("Restaurant {} selected, moving to ordering", restaurant_id);
                    self.session.selected_restaurant_id = Some(restaurant_id);
                    self.persist_session();
                    self.enter(Page::Ordering);
                }
                // Still waiting, or the poll failed: both simply re-arm
                Ok(None) | Err(_) => self.schedule_poll(),
            },
            Some(page) => tracing::debug!("Ignoring selection result on {:?}", page),
        }
    }

    /// Decide the first page from the cache and the live selection.
    ///
    /// A failed lookup leaves the cache untouched and routes on the cached
    /// selection instead of treating the failure as "nothing selected".
    fn reconcile(&mut self, live: Result<Option<RestaurantId>, RemoteError>) {
        let submitted = self.cache.load_submitted_order();

        let selection = match live {
            Ok(live) => {
                if let Some(order) = submitted {
                    if order.matches_selection(live) {
                        self.confirmed = Some(order);
                        self.enter(Page::OrderConfirmed);
                        return;
                    }
                    tracing::info!(
                        "Discarding stale order {} for restaurant {} (live selection {:?})",
                        order.id,
                        order.restaurant_id,
                        live
                    );
                    self.cache.clear_submitted_order();
                    self.session.reset_progress();
                    self.persist_session();
                }
                self.session.selected_restaurant_id = live;
                self.persist_session();
                live
            }
            Err(e) => {
                tracing::warn!("Could not fetch live selection, using cached state: {}", e);
                self.notify(Notice::error(
                    "Could not reach the server. Showing your last known progress.",
                ));
                let cached = self.session.selected_restaurant_id;
                if let Some(order) = submitted.filter(|o| o.matches_selection(cached)) {
                    self.confirmed = Some(order);
                    self.enter(Page::OrderConfirmed);
                    return;
                }
                cached
            }
        };

        if !self.session.restaurant_voted {
            self.enter(Page::Voting);
        } else if selection.is_none() {
            self.enter(Page::AwaitingSelection);
        } else {
            self.enter(Page::Ordering);
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub(super) fn register(&mut self, name: &str) {
        if self.page != Some(Page::Landing) {
            return;
        }
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.issue(Request::RegisterApplicant {
            name: name.to_string(),
        });
    }

    pub(super) fn on_registered(
        &mut self,
        name: String,
        outcome: Result<Response, RemoteError>,
        current: bool,
    ) {
        match outcome {
            Ok(Response::Registered { id }) => {
                tracing::info!("Registered applicant {}", id);
                self.session = SessionState {
                    applicant_id: Some(id),
                    applicant_name: Some(name),
                    ..Default::default()
                };
                self.persist_session();
                if current {
                    self.enter(Page::Voting);
                }
            }
            _ => self.notify(Notice::error("Registration failed. Please try again.")),
        }
    }

    // ========================================================================
    // Voting
    // ========================================================================

    pub(super) fn load_voting(&mut self) {
        self.voting = Default::default();
        self.issue(Request::ListRestaurants);
        self.issue(Request::VotingStatus);
    }

    pub(super) fn on_restaurants(&mut self, outcome: Result<Response, RemoteError>) {
        let Ok(Response::Restaurants(restaurants)) = outcome else {
            return;
        };
        match self.page {
            Some(Page::Voting) => self.voting.restaurants = Some(restaurants),
            Some(Page::AdminDashboard) => self.dashboard.restaurants = Some(restaurants),
            _ => {}
        }
    }

    pub(super) fn on_voting_status(&mut self, outcome: Result<Response, RemoteError>) {
        if self.page != Some(Page::Voting) {
            return;
        }
        if let Ok(Response::VotingStatus(status)) = outcome {
            self.voting.end_time = Some(status.end_time);
            self.voting.ended = false;
            self.start_countdown();
            self.update_countdown();
        }
    }

    pub(super) fn countdown_tick(&mut self, generation: u64) {
        if !self.countdown_active
            || generation != self.countdown_generation
            || self.page != Some(Page::Voting)
        {
            tracing::debug!("Ignoring stale countdown tick {}", generation);
            return;
        }
        self.update_countdown();
    }

    fn update_countdown(&mut self) {
        let Some(end_time) = self.voting.end_time else {
            return;
        };
        let remaining = end_time - self.clock.now();
        self.voting.remaining = Some(format_countdown(remaining));

        if remaining.num_milliseconds() <= 0 {
            self.stop_countdown();
            self.voting.ended = true;
            self.notify(Notice::info(VOTING_ENDED));
        }
    }

    /// Votes are sent even after the countdown expires; the server decides.
    pub(super) fn vote(&mut self, restaurant_id: RestaurantId) {
        if self.page != Some(Page::Voting) {
            return;
        }
        let Some(applicant_id) = self.session.applicant_id else {
            return;
        };
        self.issue(Request::SubmitVote {
            applicant_id,
            restaurant_id,
        });
    }

    pub(super) fn on_voted(
        &mut self,
        restaurant_id: RestaurantId,
        outcome: Result<Response, RemoteError>,
        current: bool,
    ) {
        if outcome.is_err() {
            self.notify(Notice::error("Failed to submit vote. Please try again."));
            return;
        }

        self.session.restaurant_voted = true;
        self.persist_session();

        let name = self
            .voting
            .restaurants
            .as_ref()
            .and_then(|list| list.iter().find(|r| r.id == restaurant_id))
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("restaurant {}", restaurant_id));
        self.notify(Notice::info(format!("You voted for {}!", name)));

        if current {
            self.enter(Page::AwaitingSelection);
        }
    }

    pub(super) fn skip_voting(&mut self) {
        if self.page != Some(Page::Voting) {
            return;
        }
        self.session.restaurant_voted = true;
        self.persist_session();
        self.enter(Page::AwaitingSelection);
    }

    // ========================================================================
    // Awaiting selection
    // ========================================================================

    pub(super) fn poll_due(&mut self, generation: u64) {
        if !self.poll_active
            || generation != self.poll_generation
            || self.page != Some(Page::AwaitingSelection)
        {
            tracing::debug!("Ignoring stale poll deadline {}", generation);
            return;
        }
        self.poll_active = false;
        self.issue(Request::SelectedRestaurant);
    }

    pub(super) fn show_vote_results(&mut self) {
        if !matches!(self.page, Some(Page::AwaitingSelection | Page::Ordering)) {
            return;
        }
        self.show_vote_results = true;
        self.issue(Request::VoteResults);
    }

    pub(super) fn on_vote_results(&mut self, outcome: Result<Response, RemoteError>) {
        let Ok(Response::VoteResults(results)) = outcome else {
            return;
        };
        match self.page {
            Some(Page::AdminDashboard) => self.dashboard.vote_results = Some(results),
            Some(_) => self.vote_results = Some(results),
            None => {}
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    pub(super) fn load_ordering(&mut self) {
        self.ordering = Default::default();
        match self.session.selected_restaurant_id {
            Some(restaurant_id) => self.issue(Request::GetRestaurant(restaurant_id)),
            None => tracing::warn!("Entered ordering without a selected restaurant"),
        }
    }

    pub(super) fn on_menu(&mut self, outcome: Result<Response, RemoteError>) {
        if self.page != Some(Page::Ordering) {
            return;
        }
        match outcome {
            Ok(Response::Restaurant(restaurant)) => {
                self.ordering.inputs = inputs_from_order(&restaurant.menu, &self.session.current_order);
                self.ordering.restaurant = Some(restaurant);
                self.recompute_order();
            }
            _ => self.notify(Notice::error("Failed to load the menu.")),
        }
    }

    pub(super) fn set_quantity(&mut self, item_id: MenuItemId, raw: String) {
        if self.page != Some(Page::Ordering) {
            return;
        }
        let on_menu = self
            .ordering
            .restaurant
            .as_ref()
            .is_some_and(|r| r.menu_item(item_id).is_some());
        if !on_menu {
            return;
        }
        // The input shows the quantity actually ordered
        self.ordering.inputs.insert(item_id, parse_quantity(&raw).to_string());
        self.recompute_order();
    }

    /// Rebuild the whole order from the rendered inputs and persist it
    fn recompute_order(&mut self) {
        let Some(restaurant) = &self.ordering.restaurant else {
            return;
        };
        self.session.current_order = rebuild_order(&restaurant.menu, &self.ordering.inputs);
        self.persist_session();
    }

    pub(super) fn submit_order(&mut self) {
        if self.page != Some(Page::Ordering) {
            return;
        }
        let items = match submission_lines(&self.session.current_order) {
            Ok(items) => items,
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                return;
            }
        };
        let (Some(applicant_id), Some(restaurant_id)) = (
            self.session.applicant_id,
            self.session.selected_restaurant_id,
        ) else {
            return;
        };
        self.issue(Request::SubmitOrder {
            applicant_id,
            restaurant_id,
            items,
        });
    }

    pub(super) fn on_order_placed(&mut self, outcome: Result<Response, RemoteError>, current: bool) {
        match outcome {
            Ok(Response::OrderPlaced(order)) => {
                tracing::info!("Order {} placed, total {:.2}", order.id, order.total_cost);
                self.cache.save_submitted_order(&order);
                self.confirmed = Some(order);
                if current {
                    self.enter(Page::OrderConfirmed);
                }
            }
            _ => self.notify(Notice::error("Failed to submit order. Please try again.")),
        }
    }

    pub(super) fn new_order(&mut self) {
        if self.page != Some(Page::OrderConfirmed) {
            return;
        }
        self.cache.clear_submitted_order();
        self.confirmed = None;
        self.session.current_order.clear();
        self.persist_session();
        self.enter(Page::Voting);
    }
}
