//! WASM App state: owns the controller and carries out its effects

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use eframe::egui;
use gloo_timers::callback::{Interval, Timeout};
use orderco_core::views::voting_link;
use orderco_core::{
    Command, Config, Controller, Effect, Event, OrderId, RemoteClient, RestaurantId, SystemClock,
};

use crate::http_client::FetchTransport;
use crate::storage::{page_url, BrowserStore};

// ============================================================================
// Main App
// ============================================================================

pub struct OrderCoApp {
    pub(crate) controller: Controller<BrowserStore, SystemClock>,
    client: Rc<RemoteClient<FetchTransport>>,
    ctx: egui::Context,

    /// Completed requests and timer firings waiting for the next frame
    inbox: Rc<RefCell<Vec<Event>>>,
    countdown: Option<Interval>,
    poll: Option<Timeout>,

    // Form buffers (text the user is still typing)
    pub(crate) name_input: String,
    pub(crate) password_input: String,
    pub(crate) round_minutes: String,
    pub(crate) new_restaurant_name: String,
    pub(crate) new_restaurant_description: String,
    pub(crate) restaurant_edits: HashMap<RestaurantId, (String, String)>,
    pub(crate) payment_inputs: HashMap<OrderId, String>,
    pub(crate) payments_seen: u64,
    pub(crate) voting_link: String,
}

impl OrderCoApp {
    pub fn new(config: Config, ctx: egui::Context) -> Self {
        let transport = FetchTransport::new(config.request_timeout());
        let client = Rc::new(RemoteClient::new(config.api_base_url.clone(), transport));
        let round_minutes = config.default_voting_minutes.to_string();
        let controller = Controller::new(config, BrowserStore::open(), SystemClock);

        let mut app = Self {
            controller,
            client,
            ctx,
            inbox: Rc::new(RefCell::new(Vec::new())),
            countdown: None,
            poll: None,
            name_input: String::new(),
            password_input: String::new(),
            round_minutes,
            new_restaurant_name: String::new(),
            new_restaurant_description: String::new(),
            restaurant_edits: HashMap::new(),
            payment_inputs: HashMap::new(),
            payments_seen: 0,
            voting_link: voting_link(&page_url()),
        };

        app.controller.start();
        app.run_effects();
        app
    }

    pub(crate) fn dispatch_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            if matches!(command, Command::AdminLogout) {
                self.clear_buffers();
            }
            self.controller.dispatch(command);
        }
        self.run_effects();
    }

    fn clear_buffers(&mut self) {
        self.name_input.clear();
        self.password_input.clear();
        self.new_restaurant_name.clear();
        self.new_restaurant_description.clear();
        self.restaurant_edits.clear();
        self.payment_inputs.clear();
    }

    // ========================================================================
    // Effects
    // ========================================================================

    fn pump_inbox(&mut self) {
        let events: Vec<Event> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            self.controller.handle(event);
        }
    }

    fn run_effects(&mut self) {
        for effect in self.controller.take_effects() {
            match effect {
                Effect::Request { ticket, request, bearer } => {
                    let client = self.client.clone();
                    let inbox = self.inbox.clone();
                    let ctx = self.ctx.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let outcome = client.call(&request, bearer.as_deref()).await;
                        inbox.borrow_mut().push(Event::Completed {
                            ticket,
                            request,
                            outcome,
                        });
                        ctx.request_repaint();
                    });
                }
                Effect::StartCountdown { generation, every } => {
                    let inbox = self.inbox.clone();
                    let ctx = self.ctx.clone();
                    // Replacing the handle drops (and cancels) the previous interval
                    self.countdown = Some(Interval::new(millis(every), move || {
                        inbox.borrow_mut().push(Event::CountdownTick { generation });
                        ctx.request_repaint();
                    }));
                }
                Effect::StopCountdown => self.countdown = None,
                Effect::SchedulePoll { generation, after } => {
                    let inbox = self.inbox.clone();
                    let ctx = self.ctx.clone();
                    self.poll = Some(Timeout::new(millis(after), move || {
                        inbox.borrow_mut().push(Event::PollDue { generation });
                        ctx.request_repaint();
                    }));
                }
                Effect::CancelPoll => self.poll = None,
            }
        }
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

// ============================================================================
// eframe::App Implementation
// ============================================================================

impl eframe::App for OrderCoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_inbox();
        self.run_effects();

        // Render panels (implemented in panels.rs)
        let mut commands = Vec::new();
        self.render_top_panel(ctx, &mut commands);
        self.render_page(ctx, &mut commands);
        self.render_menu_item_form(ctx, &mut commands);
        self.render_overlays(ctx, &mut commands);

        self.dispatch_all(commands);
    }
}
