//! Navigation/state controller
//!
//! Owns every piece of client state and decides which [`Page`] is visible.
//! It is a synchronous transition function: [`Controller::dispatch`] takes user
//! commands, [`Controller::handle`] takes completed requests and timer events,
//! and both queue [`Effect`]s that the shell drains with
//! [`Controller::take_effects`].
//!
//! Split across files like the page flows it serves:
//! - `applicant.rs`: startup reconciliation, registration, voting, polling, ordering
//! - `admin.rs`: login, dashboard tabs and admin operations

mod admin;
mod applicant;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::cache::{KeyValueStore, LocalCache};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::RemoteError;
use crate::messages::*;
use crate::models::*;
use crate::remote::{Request, Response};
use crate::views::{self, MenuItemForm, PaymentCheck};

/// Voting page data
#[derive(Debug, Clone, Default)]
pub struct VotingState {
    pub restaurants: Option<Vec<Restaurant>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Last rendered countdown text
    pub remaining: Option<String>,
    pub ended: bool,
}

/// Ordering page data; the order map itself lives in the session
#[derive(Debug, Clone, Default)]
pub struct OrderingState {
    pub restaurant: Option<Restaurant>,
    /// Raw quantity inputs as rendered, keyed by menu item
    pub inputs: BTreeMap<MenuItemId, String>,
}

/// Admin dashboard data. Each tab keeps its data when another tab is shown.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub tab: AdminTab,
    pub order_count: Option<usize>,
    pub revenue: Option<f64>,
    pub winner: Option<Restaurant>,
    pub vote_results: Option<Vec<Restaurant>>,
    pub aggregated: Option<Vec<AggregatedOrder>>,
    pub restaurants: Option<Vec<Restaurant>>,
    /// Payments validated locally this session, keyed by order
    pub payments: HashMap<OrderId, PaymentCheck>,
}

pub struct Controller<S, C> {
    config: Config,
    cache: LocalCache<S>,
    clock: C,

    // Persisted state, mirrored in memory
    session: SessionState,
    admin_token: Option<String>,

    // Navigation
    page: Option<Page>,
    epoch: u64,
    next_ticket: u64,
    in_flight: Vec<Request>,

    // Timers
    countdown_generation: u64,
    countdown_active: bool,
    poll_generation: u64,
    poll_active: bool,

    // Page data
    voting: VotingState,
    ordering: OrderingState,
    vote_results: Option<Vec<Restaurant>>,
    show_vote_results: bool,
    confirmed: Option<SubmittedOrder>,
    login_error: Option<String>,
    dashboard: Dashboard,
    orders_revision: u64,
    menu_form: Option<MenuItemForm>,
    pending_round_minutes: Option<u32>,

    // Overlays
    confirmation: Option<Confirmation>,
    notices: VecDeque<Notice>,

    effects: Vec<Effect>,
}

impl<S: KeyValueStore, C: Clock> Controller<S, C> {
    /// Hydrate from the local cache. Nothing is shown until [`Controller::start`].
    pub fn new(config: Config, store: S, clock: C) -> Self {
        let cache = LocalCache::new(store);
        let session = cache.load_session();
        let admin_token = cache.admin_token();

        Self {
            config,
            cache,
            clock,
            session,
            admin_token,
            page: None,
            epoch: 0,
            next_ticket: 0,
            in_flight: Vec::new(),
            countdown_generation: 0,
            countdown_active: false,
            poll_generation: 0,
            poll_active: false,
            voting: VotingState::default(),
            ordering: OrderingState::default(),
            vote_results: None,
            show_vote_results: false,
            confirmed: None,
            login_error: None,
            dashboard: Dashboard::default(),
            orders_revision: 0,
            menu_form: None,
            pending_round_minutes: None,
            confirmation: None,
            notices: VecDeque::new(),
            effects: Vec::new(),
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Fresh load: re-read the cache and decide the page from scratch
    pub fn start(&mut self) {
        self.stop_countdown();
        self.cancel_poll();
        self.epoch += 1;
        self.page = None;
        self.session = self.cache.load_session();
        self.admin_token = self.cache.admin_token();
        self.voting = VotingState::default();
        self.ordering = OrderingState::default();
        self.vote_results = None;
        self.show_vote_results = false;
        self.confirmed = None;
        self.login_error = None;
        self.dashboard = Dashboard::default();
        self.menu_form = None;
        self.confirmation = None;

        if self.admin_token.is_some() {
            tracing::info!("Admin session present, opening dashboard");
            self.enter(Page::AdminDashboard);
        } else if !self.session.is_registered() {
            self.enter(Page::Landing);
        } else {
            // Steps 3..9 continue in `reconcile` once the live selection arrives
            self.issue(Request::SelectedRestaurant);
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!("Command {} on {:?}", command_name(&command), self.page);
        match command {
            Command::DismissNotice => {
                self.notices.pop_front();
            }
            Command::Register { name } => self.register(&name),
            Command::Vote(restaurant_id) => self.vote(restaurant_id),
            Command::SkipVoting => self.skip_voting(),
            Command::ShowVoteResults => self.show_vote_results(),
            Command::HideVoteResults => self.show_vote_results = false,
            Command::SetQuantity { item_id, raw } => self.set_quantity(item_id, raw),
            Command::SubmitOrder => self.submit_order(),
            Command::NewOrder => self.new_order(),
            Command::OpenAdminLogin => self.open_admin_login(),
            Command::LeaveAdminLogin => self.leave_admin_login(),
            Command::AdminLogin { password } => self.admin_login(password),
            other => self.dispatch_admin(other),
        }
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Completed { ticket, request, outcome } => {
                self.complete(ticket, request, outcome)
            }
            Event::CountdownTick { generation } => self.countdown_tick(generation),
            Event::PollDue { generation } => self.poll_due(generation),
        }
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn complete(&mut self, ticket: Ticket, request: Request, outcome: Result<Response, RemoteError>) {
        if request.is_mutation() {
            if let Some(pos) = self.in_flight.iter().position(|r| r == &request) {
                self.in_flight.remove(pos);
            }
        }

        let current = ticket.epoch == self.epoch;
        if !request.is_mutation() && !current {
            tracing::debug!("Dropping stale {} response (ticket {})", request.name(), ticket.id);
            return;
        }

        match request {
            Request::SelectedRestaurant => self.on_selection(outcome),
            Request::RegisterApplicant { name } => self.on_registered(name, outcome, current),
            Request::VotingStatus => self.on_voting_status(outcome),
            Request::ListRestaurants => self.on_restaurants(outcome),
            Request::SubmitVote { restaurant_id, .. } => {
                self.on_voted(restaurant_id, outcome, current)
            }
            Request::VoteResults => self.on_vote_results(outcome),
            Request::GetRestaurant(_) => self.on_menu(outcome),
            Request::SubmitOrder { .. } => self.on_order_placed(outcome, current),
            Request::AdminLogin { .. } => self.on_admin_login(outcome, current),
            other => self.complete_admin(other, outcome, current),
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Switch the visible page, tearing down timers owned by the previous one
    /// and kicking off the new page's loads.
    fn enter(&mut self, page: Page) {
        if page != Page::Voting {
            self.stop_countdown();
        }
        if page != Page::AwaitingSelection {
            self.cancel_poll();
        }
        tracing::debug!("Page {:?} -> {:?}", self.page, page);
        self.epoch += 1;
        self.page = Some(page);
        self.show_vote_results = false;

        match page {
            Page::Voting => self.load_voting(),
            Page::AwaitingSelection => self.issue(Request::SelectedRestaurant),
            Page::Ordering => self.load_ordering(),
            Page::AdminLogin => self.login_error = None,
            Page::AdminDashboard => self.load_dashboard(),
            Page::Landing | Page::OrderConfirmed => {}
        }
    }

    /// Queue a request. Mutations identical to one still in flight are dropped.
    fn issue(&mut self, request: Request) {
        if request.is_mutation() {
            if self.in_flight.contains(&request) {
                tracing::debug!("Ignoring duplicate {} while in flight", request.name());
                return;
            }
            self.in_flight.push(request.clone());
        }
        self.next_ticket += 1;
        let ticket = Ticket {
            id: self.next_ticket,
            epoch: self.epoch,
        };
        self.effects.push(Effect::Request {
            ticket,
            request,
            bearer: self.admin_token.clone(),
        });
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    fn persist_session(&mut self) {
        self.cache.save_session(&self.session);
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn start_countdown(&mut self) {
        self.countdown_generation += 1;
        self.countdown_active = true;
        self.effects.push(Effect::StartCountdown {
            generation: self.countdown_generation,
            every: self.config.countdown_tick(),
        });
    }

    fn stop_countdown(&mut self) {
        if self.countdown_active {
            self.countdown_active = false;
            self.countdown_generation += 1;
            self.effects.push(Effect::StopCountdown);
        }
    }

    fn schedule_poll(&mut self) {
        self.poll_generation += 1;
        self.poll_active = true;
        self.effects.push(Effect::SchedulePoll {
            generation: self.poll_generation,
            after: self.config.poll_interval(),
        });
    }

    fn cancel_poll(&mut self) {
        if self.poll_active {
            self.poll_active = false;
            self.poll_generation += 1;
            self.effects.push(Effect::CancelPoll);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &LocalCache<S> {
        &self.cache
    }

    /// `None` while the startup decision is waiting on the server
    pub fn page(&self) -> Option<Page> {
        self.page
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_admin(&self) -> bool {
        self.admin_token.is_some()
    }

    pub fn voting(&self) -> &VotingState {
        &self.voting
    }

    pub fn ordering(&self) -> &OrderingState {
        &self.ordering
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Changes whenever the aggregated orders or their recorded payments are
    /// replaced, so typed payment amounts can be reseeded
    pub fn orders_revision(&self) -> u64 {
        self.orders_revision
    }

    pub fn confirmed_order(&self) -> Option<&SubmittedOrder> {
        self.confirmed.as_ref()
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn menu_form(&self) -> Option<&MenuItemForm> {
        self.menu_form.as_ref()
    }

    /// Text-edit access for the open menu item modal
    pub fn menu_form_mut(&mut self) -> Option<&mut MenuItemForm> {
        self.menu_form.as_mut()
    }

    pub fn is_showing_vote_results(&self) -> bool {
        self.show_vote_results
    }

    pub fn is_in_flight(&self, matches: impl Fn(&Request) -> bool) -> bool {
        self.in_flight.iter().any(matches)
    }

    // ========================================================================
    // Rendered views
    // ========================================================================

    pub fn restaurant_cards(&self) -> Vec<views::RestaurantCard> {
        self.voting
            .restaurants
            .as_deref()
            .map(views::restaurant_cards)
            .unwrap_or_default()
    }

    /// Applicant-facing results (nothing is selectable)
    pub fn vote_result_rows(&self) -> Vec<views::VoteResultRow> {
        self.vote_results
            .as_deref()
            .map(|r| views::vote_results(r, self.session.selected_restaurant_id, &[]))
            .unwrap_or_default()
    }

    pub fn selected_restaurant_info(&self) -> Option<views::SelectedRestaurantInfo> {
        self.ordering.restaurant.as_ref().map(views::selected_restaurant)
    }

    pub fn menu_rows(&self) -> Vec<views::MenuRow> {
        self.ordering
            .restaurant
            .as_ref()
            .map(|r| views::menu_rows(r, &self.ordering.inputs))
            .unwrap_or_default()
    }

    pub fn order_summary(&self) -> views::OrderSummary {
        views::order_summary(&self.session.current_order)
    }

    pub fn receipt(&self) -> Option<views::Receipt> {
        self.confirmed.as_ref().map(views::receipt)
    }

    pub fn dashboard_stats(&self) -> views::DashboardStats {
        views::dashboard_stats(
            self.dashboard.order_count,
            self.dashboard.revenue,
            self.dashboard.winner.as_ref(),
        )
    }

    pub fn admin_vote_rows(&self) -> Vec<views::VoteResultRow> {
        let pending: Vec<RestaurantId> = self
            .in_flight
            .iter()
            .filter_map(|r| match r {
                Request::SelectWinner(id) => Some(*id),
                _ => None,
            })
            .collect();
        self.dashboard
            .vote_results
            .as_deref()
            .map(|r| views::vote_results(r, self.dashboard.winner.as_ref().map(|w| w.id), &pending))
            .unwrap_or_default()
    }

    pub fn aggregated_order_cards(&self) -> Vec<views::AggregatedOrderCard> {
        self.dashboard
            .aggregated
            .as_deref()
            .map(|a| views::aggregated_orders(a, &self.dashboard.payments))
            .unwrap_or_default()
    }

    pub fn restaurant_admin_cards(&self) -> Vec<views::RestaurantAdminCard> {
        self.dashboard
            .restaurants
            .as_deref()
            .map(views::restaurant_admin_cards)
            .unwrap_or_default()
    }
}

/// Command label for logs, without user-entered payloads
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Register { .. } => "register",
        Command::Vote(_) => "vote",
        Command::SkipVoting => "skip_voting",
        Command::ShowVoteResults => "show_vote_results",
        Command::HideVoteResults => "hide_vote_results",
        Command::SetQuantity { .. } => "set_quantity",
        Command::SubmitOrder => "submit_order",
        Command::NewOrder => "new_order",
        Command::OpenAdminLogin => "open_admin_login",
        Command::LeaveAdminLogin => "leave_admin_login",
        Command::AdminLogin { .. } => "admin_login",
        Command::AdminLogout => "admin_logout",
        Command::SwitchTab(_) => "switch_tab",
        Command::SelectWinner(_) => "select_winner",
        Command::RecordPayment { .. } => "record_payment",
        Command::CreateRestaurant { .. } => "create_restaurant",
        Command::UpdateRestaurant { .. } => "update_restaurant",
        Command::DeleteRestaurant(_) => "delete_restaurant",
        Command::OpenMenuItemForm(_) => "open_menu_item_form",
        Command::CloseMenuItemForm => "close_menu_item_form",
        Command::SaveMenuItem => "save_menu_item",
        Command::DeleteMenuItem { .. } => "delete_menu_item",
        Command::ResetVotes => "reset_votes",
        Command::DeleteAllVotes => "delete_all_votes",
        Command::StartVotingRound { .. } => "start_voting_round",
        Command::Confirm => "confirm",
        Command::CancelConfirmation => "cancel_confirmation",
        Command::DismissNotice => "dismiss_notice",
    }
}
