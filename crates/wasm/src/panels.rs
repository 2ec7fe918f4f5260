//! UI panel rendering for OrderCoApp
//!
//! Rendering only reads controller state and collects [`Command`]s; the app
//! dispatches them once the frame is drawn.

use eframe::egui;
use egui_phosphor::regular;
use orderco_core::views::{Receipt, ReceiptLine};
use orderco_core::{AdminTab, Command, NoticeLevel, Page, Request};

use crate::app::OrderCoApp;

const GOLD: egui::Color32 = egui::Color32::from_rgb(212, 160, 23);

impl OrderCoApp {
    // ========================================================================
    // Top Panel
    // ========================================================================

    pub fn render_top_panel(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let page = self.controller.page();
        let applicant = self.controller.session().applicant_name.clone();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let config = self.controller.config();
                ui.heading(format!("{} {}", regular::FORK_KNIFE, config.app_name))
                    .on_hover_text(format!("v{}", config.app_version));
                ui.separator();

                if let (Some(name), Some(page)) = (&applicant, page) {
                    if !page.is_admin() {
                        ui.label(format!("{} {}", regular::USER, name));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match page {
                        Some(Page::AdminDashboard) => {
                            if ui.button(format!("{} Logout", regular::SIGN_OUT)).clicked() {
                                commands.push(Command::AdminLogout);
                            }
                        }
                        Some(Page::AdminLogin) => {}
                        Some(_) => {
                            if ui.button(format!("{} Admin", regular::LOCK)).clicked() {
                                commands.push(Command::OpenAdminLogin);
                            }
                        }
                        None => {
                            ui.spinner();
                        }
                    }
                });
            });
        });
    }

    // ========================================================================
    // Pages
    // ========================================================================

    pub fn render_page(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.controller.page() {
                None => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.spinner();
                        ui.label("Loading...");
                    });
                }
                Some(Page::Landing) => self.render_landing(ui, commands),
                Some(Page::Voting) => self.render_voting(ui, commands),
                Some(Page::AwaitingSelection) => self.render_awaiting(ui, commands),
                Some(Page::Ordering) => self.render_ordering(ui, commands),
                Some(Page::OrderConfirmed) => self.render_confirmed(ui, commands),
                Some(Page::AdminLogin) => self.render_admin_login(ui, commands),
                Some(Page::AdminDashboard) => self.render_dashboard(ui, commands),
            });
        });
    }

    fn render_landing(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Welcome! What's your name?");
            ui.add_space(8.0);
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.name_input)
                    .hint_text("Your name")
                    .desired_width(240.0),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let busy = self
                .controller
                .is_in_flight(|r| matches!(r, Request::RegisterApplicant { .. }));
            let clicked = ui
                .add_enabled(!busy, egui::Button::new(format!("{} Start", regular::ARROW_RIGHT)))
                .clicked();
            if (clicked || submitted) && !busy {
                commands.push(Command::Register {
                    name: self.name_input.clone(),
                });
            }
        });
    }

    fn render_voting(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let voting = self.controller.voting();
        ui.horizontal(|ui| {
            ui.heading("Vote for today's restaurant");
            if let Some(remaining) = &voting.remaining {
                ui.separator();
                let color = if voting.ended {
                    egui::Color32::RED
                } else {
                    ui.visuals().text_color()
                };
                ui.colored_label(color, format!("{} {}", regular::TIMER, remaining));
            }
        });
        if voting.ended {
            ui.label("Voting has ended.");
        }
        ui.add_space(8.0);

        let voting_busy = self
            .controller
            .is_in_flight(|r| matches!(r, Request::SubmitVote { .. }));
        if voting.restaurants.is_none() {
            ui.spinner();
        }
        for card in self.controller.restaurant_cards() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.strong(&card.name);
                    if card.has_best_dish {
                        ui.colored_label(GOLD, regular::STAR);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(!voting_busy, egui::Button::new(format!("{} Vote", regular::CHECK)))
                            .clicked()
                        {
                            commands.push(card.vote.clone());
                        }
                        ui.label(&card.votes);
                    });
                });
                ui.label(&card.description);
                for line in &card.menu {
                    ui.horizontal(|ui| {
                        if line.best {
                            ui.colored_label(GOLD, format!("{} {}", regular::STAR, line.name));
                        } else {
                            ui.label(&line.name);
                        }
                        ui.weak(&line.price);
                    });
                }
            });
            ui.add_space(4.0);
        }

        ui.add_space(8.0);
        if ui.button("Skip voting").clicked() {
            commands.push(Command::SkipVoting);
        }
    }

    fn render_awaiting(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.spinner();
            ui.heading("Waiting for the admin to pick the restaurant...");
        });
        ui.add_space(12.0);
        self.render_vote_results_toggle(ui, commands);
    }

    fn render_vote_results_toggle(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        if self.controller.is_showing_vote_results() {
            if ui.button(format!("{} Hide vote results", regular::EYE_SLASH)).clicked() {
                commands.push(Command::HideVoteResults);
            }
            for row in self.controller.vote_result_rows() {
                ui.horizontal(|ui| {
                    if row.leader {
                        ui.colored_label(GOLD, regular::TROPHY);
                    }
                    ui.label(&row.name);
                    ui.weak(&row.votes);
                    if row.selected {
                        ui.strong("Selected");
                    }
                });
            }
        } else if ui.button(format!("{} Show vote results", regular::CHART_BAR)).clicked() {
            commands.push(Command::ShowVoteResults);
        }
    }

    fn render_ordering(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let Some(info) = self.controller.selected_restaurant_info() else {
            ui.spinner();
            ui.label("Loading menu...");
            return;
        };
        ui.heading(&info.name);
        ui.label(&info.description);
        if let Some(dish) = &info.signature_dish {
            ui.colored_label(GOLD, format!("{} Signature dish: {}", regular::STAR, dish));
        }
        ui.add_space(8.0);

        egui::Grid::new("menu_grid").striped(true).show(ui, |ui| {
            for row in self.controller.menu_rows() {
                if row.best {
                    ui.colored_label(GOLD, format!("{} {}", regular::STAR, row.name));
                } else {
                    ui.label(&row.name);
                }
                ui.weak(&row.description);
                ui.label(&row.price);
                let mut raw = row.quantity.clone();
                if ui
                    .add(egui::TextEdit::singleline(&mut raw).desired_width(40.0))
                    .changed()
                {
                    commands.push(row.set_quantity(raw));
                }
                ui.end_row();
            }
        });

        ui.add_space(8.0);
        ui.separator();
        let summary = self.controller.order_summary();
        ui.strong("Your order");
        for line in &summary.lines {
            ui.horizontal(|ui| {
                ui.label(&line.label);
                ui.label(&line.amount);
            });
        }
        ui.strong(format!("Total: {}", summary.total));

        let busy = self
            .controller
            .is_in_flight(|r| matches!(r, Request::SubmitOrder { .. }));
        if ui
            .add_enabled(!busy, egui::Button::new(format!("{} Submit order", regular::SHOPPING_CART)))
            .clicked()
        {
            commands.push(Command::SubmitOrder);
        }

        ui.add_space(12.0);
        self.render_vote_results_toggle(ui, commands);
    }

    fn render_confirmed(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.heading(format!("{} Order confirmed", regular::CHECK_CIRCLE));
        if let Some(receipt) = self.controller.receipt() {
            render_receipt(ui, &receipt);
        }
        ui.add_space(12.0);
        if ui.button("New order").clicked() {
            commands.push(Command::NewOrder);
        }
    }

    fn render_admin_login(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading(format!("{} Admin login", regular::LOCK));
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.password_input)
                    .password(true)
                    .hint_text("Password")
                    .desired_width(240.0),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if let Some(error) = self.controller.login_error() {
                ui.colored_label(egui::Color32::RED, error);
            }
            ui.horizontal(|ui| {
                if ui.button("Login").clicked() || submitted {
                    commands.push(Command::AdminLogin {
                        password: std::mem::take(&mut self.password_input),
                    });
                }
                if ui.button(format!("{} Back", regular::ARROW_LEFT)).clicked() {
                    commands.push(Command::LeaveAdminLogin);
                }
            });
        });
    }

    // ========================================================================
    // Admin Dashboard
    // ========================================================================

    fn render_dashboard(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let stats = self.controller.dashboard_stats();
        ui.horizontal(|ui| {
            stat(ui, "Total orders", &stats.total_orders);
            stat(ui, "Total revenue", &stats.total_revenue);
            stat(ui, "Selected restaurant", &stats.selected_restaurant);
        });

        ui.horizontal(|ui| {
            ui.label("Voting link:");
            ui.monospace(&self.voting_link);
            if ui.small_button(regular::COPY).on_hover_text("Copy link").clicked() {
                ui.ctx().copy_text(self.voting_link.clone());
            }
        });
        ui.separator();

        let current = self.controller.dashboard().tab;
        ui.horizontal(|ui| {
            for tab in AdminTab::ALL {
                if ui.selectable_label(current == tab, tab.label()).clicked() && current != tab {
                    commands.push(Command::SwitchTab(tab));
                }
            }
        });
        ui.add_space(8.0);

        match current {
            AdminTab::Votes => self.render_votes_tab(ui, commands),
            AdminTab::Orders => self.render_orders_tab(ui, commands),
            AdminTab::Restaurants => self.render_restaurants_tab(ui, commands),
        }
    }

    fn render_votes_tab(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        egui::Grid::new("vote_results").striped(true).show(ui, |ui| {
            for row in self.controller.admin_vote_rows() {
                if row.leader {
                    ui.colored_label(GOLD, format!("{} {}", regular::TROPHY, row.name));
                } else {
                    ui.label(&row.name);
                }
                ui.label(&row.votes);
                match &row.select {
                    Some(select) => {
                        if ui.add_enabled(!row.busy, egui::Button::new("Select")).clicked() {
                            commands.push(select.clone());
                        }
                    }
                    None => {
                        ui.strong(format!("{} Selected", regular::CHECK));
                    }
                }
                ui.end_row();
            }
        });

        ui.add_space(12.0);
        ui.strong("Voting round");
        ui.horizontal(|ui| {
            ui.label("Minutes:");
            ui.add(egui::TextEdit::singleline(&mut self.round_minutes).desired_width(48.0));
            let starting = self
                .controller
                .is_in_flight(|r| matches!(r, Request::StartVotingRound { .. }));
            if ui
                .add_enabled(!starting, egui::Button::new("Start new round"))
                .clicked()
            {
                commands.push(Command::StartVotingRound {
                    minutes: self.round_minutes.clone(),
                });
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Reset votes").clicked() {
                commands.push(Command::ResetVotes);
            }
            if ui
                .button(egui::RichText::new("Delete all votes").color(egui::Color32::RED))
                .clicked()
            {
                commands.push(Command::DeleteAllVotes);
            }
        });
    }

    fn render_orders_tab(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let revision = self.controller.orders_revision();
        if revision != self.payments_seen {
            self.payment_inputs.clear();
            self.payments_seen = revision;
        }
        let cards = self.controller.aggregated_order_cards();
        if cards.is_empty() {
            ui.label("No orders yet.");
        }
        for card in cards {
            egui::CollapsingHeader::new(format!("{} ({})", card.restaurant_name, card.total))
                .default_open(true)
                .show(ui, |ui| {
                    render_lines(ui, &card.items);
                    ui.separator();
                    for order in &card.orders {
                        ui.horizontal(|ui| {
                            ui.strong(&order.heading);
                            ui.label(&order.applicant);
                            ui.label(&order.total);
                        });
                        render_lines(ui, &order.lines);
                        ui.horizontal(|ui| {
                            let paid = self
                                .payment_inputs
                                .entry(order.order_id)
                                .or_insert_with(|| order.paid.clone());
                            ui.label("Paid:");
                            ui.add(egui::TextEdit::singleline(paid).desired_width(64.0));
                            if ui.button("Save").clicked() {
                                commands.push(order.record_payment(paid.clone()));
                            }
                            if !order.change.is_empty() {
                                ui.label(format!("Change: {}", order.change));
                            }
                        });
                        ui.add_space(6.0);
                    }
                });
        }
    }

    fn render_restaurants_tab(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.strong("New restaurant");
            ui.add(egui::TextEdit::singleline(&mut self.new_restaurant_name).hint_text("Name"));
            ui.add(
                egui::TextEdit::multiline(&mut self.new_restaurant_description)
                    .hint_text("Description")
                    .desired_rows(2),
            );
            if ui.button(format!("{} Create", regular::PLUS)).clicked() {
                commands.push(Command::CreateRestaurant {
                    name: self.new_restaurant_name.clone(),
                    description: self.new_restaurant_description.clone(),
                });
            }
        });
        ui.add_space(8.0);

        for card in self.controller.restaurant_admin_cards() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                let edit = self
                    .restaurant_edits
                    .entry(card.id)
                    .or_insert_with(|| (card.name.clone(), card.description.clone()));
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut edit.0).desired_width(200.0));
                    ui.weak(&card.votes);
                });
                ui.add(egui::TextEdit::multiline(&mut edit.1).desired_rows(2));
                ui.horizontal(|ui| {
                    if ui.button("Update").clicked() {
                        commands.push(Command::UpdateRestaurant {
                            id: card.id,
                            name: edit.0.clone(),
                            description: edit.1.clone(),
                        });
                    }
                    if ui.button(format!("{} Delete", regular::TRASH)).clicked() {
                        commands.push(card.delete.clone());
                    }
                });

                ui.add_space(4.0);
                for item in &card.menu {
                    ui.horizontal(|ui| {
                        if item.best {
                            ui.colored_label(GOLD, regular::STAR);
                        }
                        ui.label(&item.name);
                        ui.weak(&item.price);
                        if ui.small_button(regular::PENCIL).on_hover_text("Edit").clicked() {
                            commands.push(Command::OpenMenuItemForm(item.edit.clone()));
                        }
                        if ui.small_button(regular::TRASH).on_hover_text("Delete").clicked() {
                            commands.push(item.delete.clone());
                        }
                    });
                }
                if ui.button(format!("{} Add menu item", regular::PLUS)).clicked() {
                    commands.push(Command::OpenMenuItemForm(card.add_item.clone()));
                }
            });
            ui.add_space(4.0);
        }
    }

    // ========================================================================
    // Modals
    // ========================================================================

    pub fn render_menu_item_form(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let Some(form) = self.controller.menu_form_mut() else {
            return;
        };
        egui::Window::new(form.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add(egui::TextEdit::singleline(&mut form.name).hint_text("Name"));
                ui.add(egui::TextEdit::multiline(&mut form.description).hint_text("Description"));
                ui.add(egui::TextEdit::singleline(&mut form.price).hint_text("Price"));
                ui.checkbox(&mut form.is_best_dish, "Best dish");
                ui.horizontal(|ui| {
                    if ui.button(form.submit_label()).clicked() {
                        commands.push(Command::SaveMenuItem);
                    }
                    if ui.button("Cancel").clicked() {
                        commands.push(Command::CloseMenuItemForm);
                    }
                });
            });
    }

    /// Confirmation prompts and notices, in that order of precedence
    pub fn render_overlays(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        if let Some(confirmation) = self.controller.confirmation() {
            egui::Window::new(format!("{} Are you sure?", regular::WARNING))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(&confirmation.prompt);
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            commands.push(Command::Confirm);
                        }
                        if ui.button("Cancel").clicked() {
                            commands.push(Command::CancelConfirmation);
                        }
                    });
                });
            return;
        }

        if let Some(notice) = self.controller.notice() {
            let (icon, color) = match notice.level {
                NoticeLevel::Info => (regular::INFO, ctx.style().visuals.text_color()),
                NoticeLevel::Error => (regular::WARNING_CIRCLE, egui::Color32::RED),
            };
            egui::Window::new(format!("{} Notice", icon))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_TOP, [0.0, 48.0])
                .show(ctx, |ui| {
                    ui.colored_label(color, &notice.text);
                    if ui.button("OK").clicked() {
                        commands.push(Command::DismissNotice);
                    }
                });
        }
    }
}

fn stat(ui: &mut egui::Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.weak(label);
            ui.heading(value);
        });
    });
}

fn render_lines(ui: &mut egui::Ui, lines: &[ReceiptLine]) {
    for line in lines {
        ui.horizontal(|ui| {
            ui.label(&line.name);
            ui.weak(&line.quantity);
            ui.label(&line.amount);
        });
    }
}

fn render_receipt(ui: &mut egui::Ui, receipt: &Receipt) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.strong(&receipt.heading);
        ui.label(&receipt.applicant);
        ui.separator();
        render_lines(ui, &receipt.lines);
        ui.separator();
        ui.strong(format!("Total: {}", receipt.total));
    });
}
