use chrono::Duration;

use super::*;
use crate::cache::MemoryStore;
use crate::testing::*;

fn answer(controller: &mut TestController, server: &mut FakeServer, effects: Vec<Effect>) {
    for effect in effects {
        if let Effect::Request { ticket, request, .. } = effect {
            let outcome = server.respond(&request);
            controller.handle(Event::Completed {
                ticket,
                request,
                outcome,
            });
        }
    }
}

fn store_with(session: SessionState, order: Option<SubmittedOrder>) -> MemoryStore {
    let mut cache = LocalCache::new(MemoryStore::new());
    cache.save_session(&session);
    if let Some(order) = order {
        cache.save_submitted_order(&order);
    }
    cache.store().clone()
}

fn alice(voted: bool, selected: Option<RestaurantId>) -> SessionState {
    SessionState {
        applicant_id: Some(1),
        applicant_name: Some("Alice".to_string()),
        restaurant_voted: voted,
        selected_restaurant_id: selected,
        ..Default::default()
    }
}

fn alice_order(restaurant_id: RestaurantId) -> SubmittedOrder {
    let curry = menu_item(7, "Curry", 5.0, true);
    SubmittedOrder {
        id: 9,
        applicant_name: "Alice".to_string(),
        restaurant_id,
        items: vec![OrderLine::new(&curry, 3)],
        total_cost: 15.0,
        paid_amount: None,
    }
}

fn admin_store() -> MemoryStore {
    let mut cache = LocalCache::new(MemoryStore::new());
    cache.save_admin_token("admin-token");
    cache.store().clone()
}

fn last_poll(timers: &[Effect]) -> Option<u64> {
    timers.iter().rev().find_map(|e| match e {
        Effect::SchedulePoll { generation, .. } => Some(*generation),
        _ => None,
    })
}

fn last_countdown(timers: &[Effect]) -> Option<u64> {
    timers.iter().rev().find_map(|e| match e {
        Effect::StartCountdown { generation, .. } => Some(*generation),
        _ => None,
    })
}

fn started(store: MemoryStore, server: &mut FakeServer) -> (TestController, ManualClock, Vec<Effect>) {
    let clock = ManualClock::default();
    let mut controller = controller(store, clock.clone());
    controller.start();
    let timers = settle(&mut controller, server);
    (controller, clock, timers)
}

// ============================================================================
// Startup decision
// ============================================================================

#[test]
fn test_nothing_shown_before_start() {
    let controller = controller(MemoryStore::new(), ManualClock::default());
    assert_eq!(controller.page(), None);
}

#[test]
fn test_unregistered_applicant_lands() {
    let mut server = FakeServer::default();
    let (controller, _, _) = started(MemoryStore::new(), &mut server);

    assert_eq!(controller.page(), Some(Page::Landing));
    assert!(server.log.is_empty());
}

#[test]
fn test_admin_session_wins_over_applicant_progress() {
    let mut server = FakeServer::default();
    let mut store = store_with(alice(true, Some(2)), Some(alice_order(2)));
    store.set(crate::cache::ADMIN_TOKEN_KEY, "admin-token");
    let (controller, _, _) = started(store, &mut server);

    assert_eq!(controller.page(), Some(Page::AdminDashboard));
    assert_eq!(server.received("selected_restaurant"), 0);
}

#[test]
fn test_cached_receipt_matching_live_selection_is_shown() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (controller, _, _) = started(store_with(alice(true, Some(2)), Some(alice_order(2))), &mut server);

    assert_eq!(controller.page(), Some(Page::OrderConfirmed));
    assert_eq!(controller.receipt().unwrap().total, "£15.00");
}

#[test]
fn test_new_round_discards_stale_receipt() {
    let mut server = FakeServer::default();
    let mut session = alice(true, Some(2));
    session.current_order = BTreeMap::from([(7, OrderLine::new(&menu_item(7, "Curry", 5.0, true), 2))]);
    let (controller, _, _) = started(store_with(session, Some(alice_order(2))), &mut server);

    assert_eq!(controller.page(), Some(Page::Voting));
    assert_eq!(controller.cache().load_submitted_order(), None);

    let cached = controller.cache().load_session();
    assert!(!cached.restaurant_voted);
    assert_eq!(cached.selected_restaurant_id, None);
    assert!(cached.current_order.is_empty());
    assert_eq!(cached.applicant_id, Some(1));
}

#[test]
fn test_receipt_for_another_restaurant_is_discarded() {
    let mut server = FakeServer {
        selection: Some(1),
        ..Default::default()
    };
    let (controller, _, _) = started(store_with(alice(true, Some(2)), Some(alice_order(2))), &mut server);

    assert_eq!(controller.page(), Some(Page::Voting));
    assert_eq!(controller.cache().load_submitted_order(), None);
}

#[test]
fn test_voted_without_selection_awaits() {
    let mut server = FakeServer::default();
    let (controller, _, timers) = started(store_with(alice(true, None), None), &mut server);

    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
    assert!(last_poll(&timers).is_some());
}

#[test]
fn test_voted_with_live_selection_orders() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (controller, _, _) = started(store_with(alice(true, None), None), &mut server);

    assert_eq!(controller.page(), Some(Page::Ordering));
    assert_eq!(controller.session().selected_restaurant_id, Some(2));
    assert_eq!(controller.selected_restaurant_info().unwrap().signature_dish.as_deref(), Some("Curry"));
}

#[test]
fn test_selection_failure_keeps_cached_progress() {
    let mut server = FakeServer::default();
    server.fail("selected_restaurant");
    let (controller, _, _) = started(store_with(alice(true, Some(2)), Some(alice_order(2))), &mut server);

    assert_eq!(controller.page(), Some(Page::OrderConfirmed));
    assert_eq!(controller.cache().load_submitted_order(), Some(alice_order(2)));
    assert_eq!(controller.cache().load_session().selected_restaurant_id, Some(2));
    assert_eq!(controller.notice().map(|n| n.level), Some(NoticeLevel::Error));
}

#[test]
fn test_selection_failure_routes_on_cached_selection() {
    let mut server = FakeServer::default();
    server.fail("selected_restaurant");
    let (controller, _, _) = started(store_with(alice(true, Some(2)), None), &mut server);

    assert_eq!(controller.page(), Some(Page::Ordering));
    assert!(controller.ordering().restaurant.is_some());
}

// ============================================================================
// Applicant flow
// ============================================================================

#[test]
fn test_full_applicant_journey_survives_reload() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(MemoryStore::new(), &mut server);

    controller.dispatch(Command::Register { name: "  Alice ".to_string() });
    let timers = settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Voting));
    assert_eq!(controller.session().applicant_id, Some(1));
    assert_eq!(controller.session().applicant_name.as_deref(), Some("Alice"));
    assert!(last_countdown(&timers).is_some());
    assert_eq!(controller.restaurant_cards()[0].name, "Curry House");

    controller.dispatch(Command::Vote(2));
    let timers = settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
    assert!(timers.contains(&Effect::StopCountdown));
    assert_eq!(controller.notice().unwrap().text, "You voted for Curry House!");
    assert!(controller.cache().load_session().restaurant_voted);

    server.selection = Some(2);
    let generation = last_poll(&timers).unwrap();
    controller.handle(Event::PollDue { generation });
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Ordering));
    assert_eq!(controller.menu_rows().len(), 3);

    controller.dispatch(Command::SetQuantity { item_id: 7, raw: "3".to_string() });
    assert_eq!(controller.order_summary().total, "£15.00");

    controller.dispatch(Command::SubmitOrder);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::OrderConfirmed));
    let receipt = controller.receipt().unwrap();
    assert_eq!(receipt.heading, "Order #9");
    assert_eq!(receipt.total, "£15.00");

    let store = controller.cache().store().clone();
    let (reloaded, _, _) = started(store, &mut server);
    assert_eq!(reloaded.page(), Some(Page::OrderConfirmed));
    assert_eq!(reloaded.confirmed_order().map(|o| o.id), Some(9));
}

#[test]
fn test_blank_name_does_not_register() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(MemoryStore::new(), &mut server);

    controller.dispatch(Command::Register { name: "   ".to_string() });
    assert!(controller.take_effects().is_empty());
    assert_eq!(controller.page(), Some(Page::Landing));
}

#[test]
fn test_failed_registration_stays_on_landing() {
    let mut server = FakeServer::default();
    server.fail("register_applicant");
    let (mut controller, _, _) = started(MemoryStore::new(), &mut server);

    controller.dispatch(Command::Register { name: "Alice".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Landing));
    assert!(!controller.session().is_registered());
    assert_eq!(controller.notice().map(|n| n.level), Some(NoticeLevel::Error));
}

#[test]
fn test_failed_vote_keeps_voting_open() {
    let mut server = FakeServer::default();
    server.fail("submit_vote");
    let (mut controller, _, _) = started(store_with(alice(false, None), None), &mut server);

    controller.dispatch(Command::Vote(1));
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Voting));
    assert!(!controller.session().restaurant_voted);
}

#[test]
fn test_skip_voting_awaits_selection() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(false, None), None), &mut server);

    controller.dispatch(Command::SkipVoting);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
    assert_eq!(server.received("submit_vote"), 0);
    assert!(controller.cache().load_session().restaurant_voted);
}

#[test]
fn test_countdown_expiry_notifies_once() {
    let mut server = FakeServer::default();
    let (mut controller, clock, timers) = started(store_with(alice(false, None), None), &mut server);
    let generation = last_countdown(&timers).unwrap();
    assert_eq!(controller.voting().remaining.as_deref(), Some("10:00"));

    clock.advance(Duration::seconds(75));
    controller.handle(Event::CountdownTick { generation });
    assert_eq!(controller.voting().remaining.as_deref(), Some("08:45"));

    clock.advance(Duration::minutes(9));
    controller.handle(Event::CountdownTick { generation });
    assert_eq!(controller.voting().remaining.as_deref(), Some("00:00"));
    assert!(controller.voting().ended);
    assert_eq!(controller.take_effects(), vec![Effect::StopCountdown]);

    controller.handle(Event::CountdownTick { generation });
    controller.dispatch(Command::DismissNotice);
    assert_eq!(controller.notice(), None);
}

#[test]
fn test_voting_still_allowed_after_expiry() {
    let mut server = FakeServer {
        voting_ends: noon() - Duration::minutes(1),
        ..Default::default()
    };
    let (mut controller, _, _) = started(store_with(alice(false, None), None), &mut server);
    assert!(controller.voting().ended);

    controller.dispatch(Command::Vote(1));
    settle(&mut controller, &mut server);
    assert_eq!(server.received("submit_vote"), 1);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
}

#[test]
fn test_countdown_tick_after_leaving_voting_is_ignored() {
    let mut server = FakeServer::default();
    let (mut controller, clock, timers) = started(store_with(alice(false, None), None), &mut server);
    let generation = last_countdown(&timers).unwrap();

    controller.dispatch(Command::SkipVoting);
    settle(&mut controller, &mut server);
    clock.advance(Duration::minutes(20));
    controller.handle(Event::CountdownTick { generation });

    assert_eq!(controller.voting().remaining.as_deref(), Some("10:00"));
    assert!(!controller.voting().ended);
    assert_eq!(controller.notice(), None);
}

#[test]
fn test_poll_after_leaving_awaiting_is_ignored() {
    let mut server = FakeServer::default();
    let (mut controller, _, timers) = started(store_with(alice(true, None), None), &mut server);
    let generation = last_poll(&timers).unwrap();

    controller.dispatch(Command::OpenAdminLogin);
    assert!(controller.take_effects().contains(&Effect::CancelPoll));

    let before = server.received("selected_restaurant");
    controller.handle(Event::PollDue { generation });
    settle(&mut controller, &mut server);
    assert_eq!(server.received("selected_restaurant"), before);
    assert_eq!(controller.page(), Some(Page::AdminLogin));
}

#[test]
fn test_failed_poll_rearms() {
    let mut server = FakeServer::default();
    let (mut controller, _, timers) = started(store_with(alice(true, None), None), &mut server);
    let generation = last_poll(&timers).unwrap();

    server.fail("selected_restaurant");
    controller.handle(Event::PollDue { generation });
    let timers = settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
    assert_eq!(last_poll(&timers), Some(generation + 1));

    // The old deadline is no longer live
    let before = server.received("selected_restaurant");
    controller.handle(Event::PollDue { generation });
    settle(&mut controller, &mut server);
    assert_eq!(server.received("selected_restaurant"), before);
}

#[test]
fn test_stale_page_load_is_dropped() {
    let mut server = FakeServer::default();
    let clock = ManualClock::default();
    let mut controller = controller(store_with(alice(false, None), None), clock);
    controller.start();
    let (requests, _) = pending_requests(&mut controller);
    answer(&mut controller, &mut server, requests);
    assert_eq!(controller.page(), Some(Page::Voting));

    // Voting loads are still outstanding when the applicant skips ahead
    let (voting_loads, _) = pending_requests(&mut controller);
    assert_eq!(voting_loads.len(), 2);
    controller.dispatch(Command::SkipVoting);
    answer(&mut controller, &mut server, voting_loads);

    assert!(controller.voting().restaurants.is_none());
    assert!(controller.voting().end_time.is_none());
    assert!(!controller
        .take_effects()
        .iter()
        .any(|e| matches!(e, Effect::StartCountdown { .. })));
}

#[test]
fn test_mutation_result_applies_after_navigation() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(false, None), None), &mut server);

    controller.dispatch(Command::Vote(2));
    let (vote, _) = pending_requests(&mut controller);
    controller.dispatch(Command::OpenAdminLogin);
    answer(&mut controller, &mut server, vote);

    assert_eq!(controller.page(), Some(Page::AdminLogin));
    assert!(controller.session().restaurant_voted);
    assert!(controller.cache().load_session().restaurant_voted);
}

#[test]
fn test_duplicate_vote_while_in_flight_is_ignored() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(false, None), None), &mut server);

    controller.dispatch(Command::Vote(2));
    controller.dispatch(Command::Vote(2));
    assert!(controller.is_in_flight(|r| matches!(r, Request::SubmitVote { .. })));
    let (requests, _) = pending_requests(&mut controller);
    assert_eq!(requests.len(), 1);

    answer(&mut controller, &mut server, requests);
    assert!(!controller.is_in_flight(|r| matches!(r, Request::SubmitVote { .. })));
}

#[test]
fn test_vote_results_on_demand() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(true, None), None), &mut server);

    controller.dispatch(Command::ShowVoteResults);
    settle(&mut controller, &mut server);
    assert!(controller.is_showing_vote_results());
    let rows = controller.vote_result_rows();
    assert_eq!(rows[0].name, "Curry House");
    assert!(rows[0].leader);

    controller.dispatch(Command::HideVoteResults);
    assert!(!controller.is_showing_vote_results());
}

#[test]
fn test_quantities_clamp_and_persist() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (mut controller, _, _) = started(store_with(alice(true, Some(2)), None), &mut server);

    controller.dispatch(Command::SetQuantity { item_id: 8, raw: "25".to_string() });
    controller.dispatch(Command::SetQuantity { item_id: 9, raw: "-1".to_string() });
    controller.dispatch(Command::SetQuantity { item_id: 99, raw: "2".to_string() });

    let order = &controller.cache().load_session().current_order;
    assert_eq!(order.keys().copied().collect::<Vec<_>>(), vec![8]);
    assert_eq!(order[&8].quantity, 10);
    assert_eq!(controller.order_summary().total, "£12.50");

    let rows = controller.menu_rows();
    let shown = |id| rows.iter().find(|r| r.item_id == id).map(|r| r.quantity.clone());
    assert_eq!(shown(8).as_deref(), Some("10"));
    assert_eq!(shown(9).as_deref(), Some("0"));
}

#[test]
fn test_empty_order_total_reads_zero() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (mut controller, _, _) = started(store_with(alice(true, Some(2)), None), &mut server);
    assert_eq!(controller.order_summary().total, "£0.00");

    controller.dispatch(Command::SetQuantity { item_id: 7, raw: "2".to_string() });
    assert_eq!(controller.order_summary().total, "£10.00");
    controller.dispatch(Command::SetQuantity { item_id: 7, raw: "0".to_string() });
    assert!(controller.order_summary().lines.is_empty());
    assert_eq!(controller.order_summary().total, "£0.00");
}

#[test]
fn test_cached_order_seeds_menu_inputs() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let mut session = alice(true, Some(2));
    session.current_order = BTreeMap::from([(9, OrderLine::new(&menu_item(9, "Naan", 2.1, false), 4))]);
    let (controller, _, _) = started(store_with(session, None), &mut server);

    let naan = controller.menu_rows().into_iter().find(|r| r.item_id == 9).unwrap();
    assert_eq!(naan.quantity, "4");
    assert_eq!(controller.order_summary().lines[0].label, "Naan x4");
}

#[test]
fn test_empty_order_is_rejected_locally() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (mut controller, _, _) = started(store_with(alice(true, Some(2)), None), &mut server);

    controller.dispatch(Command::SubmitOrder);
    settle(&mut controller, &mut server);
    assert_eq!(server.received("submit_order"), 0);
    assert_eq!(controller.notice().unwrap().text, "Please select at least one item");
    assert_eq!(controller.page(), Some(Page::Ordering));
}

#[test]
fn test_failed_order_keeps_the_order() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    server.fail("submit_order");
    let (mut controller, _, _) = started(store_with(alice(true, Some(2)), None), &mut server);

    controller.dispatch(Command::SetQuantity { item_id: 7, raw: "1".to_string() });
    controller.dispatch(Command::SubmitOrder);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Ordering));
    assert_eq!(controller.session().current_order.len(), 1);
    assert_eq!(controller.cache().load_submitted_order(), None);

    server.heal("submit_order");
    controller.dispatch(Command::SubmitOrder);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::OrderConfirmed));
    assert_eq!(controller.receipt().unwrap().total, "£5.00");
}

#[test]
fn test_new_order_returns_to_voting() {
    let mut server = FakeServer {
        selection: Some(2),
        ..Default::default()
    };
    let (mut controller, _, _) = started(store_with(alice(true, Some(2)), Some(alice_order(2))), &mut server);
    assert_eq!(controller.page(), Some(Page::OrderConfirmed));

    controller.dispatch(Command::NewOrder);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Voting));
    assert_eq!(controller.receipt(), None);
    assert_eq!(controller.cache().load_submitted_order(), None);
    assert!(controller.session().restaurant_voted);
    assert!(controller.session().current_order.is_empty());
}

#[test]
fn test_notices_queue_in_order() {
    let mut server = FakeServer::default();
    server.fail("register_applicant");
    let (mut controller, _, _) = started(MemoryStore::new(), &mut server);

    controller.dispatch(Command::Register { name: "A".to_string() });
    controller.dispatch(Command::Register { name: "B".to_string() });
    settle(&mut controller, &mut server);

    assert!(controller.notice().is_some());
    controller.dispatch(Command::DismissNotice);
    assert!(controller.notice().is_some());
    controller.dispatch(Command::DismissNotice);
    assert_eq!(controller.notice(), None);
}

// ============================================================================
// Admin flow
// ============================================================================

#[test]
fn test_admin_login_and_leave() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(true, None), None), &mut server);

    controller.dispatch(Command::OpenAdminLogin);
    assert_eq!(controller.page(), Some(Page::AdminLogin));
    controller.dispatch(Command::AdminLogin { password: "nope".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AdminLogin));
    assert_eq!(controller.login_error(), Some("Invalid password"));

    controller.dispatch(Command::LeaveAdminLogin);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));

    controller.dispatch(Command::OpenAdminLogin);
    assert_eq!(controller.login_error(), None);
    controller.dispatch(Command::AdminLogin { password: "secret".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AdminDashboard));
    assert!(controller.is_admin());
    assert_eq!(controller.cache().admin_token().as_deref(), Some("admin-token"));
}

#[test]
fn test_login_finishing_after_leaving_is_discarded() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(store_with(alice(true, None), None), &mut server);

    controller.dispatch(Command::OpenAdminLogin);
    controller.dispatch(Command::AdminLogin { password: "secret".to_string() });
    let (login, _) = pending_requests(&mut controller);
    controller.dispatch(Command::LeaveAdminLogin);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));

    answer(&mut controller, &mut server, login);
    assert_eq!(controller.page(), Some(Page::AwaitingSelection));
    assert!(!controller.is_admin());
    assert_eq!(controller.cache().admin_token(), None);
}

#[test]
fn test_dashboard_requests_carry_bearer() {
    let mut controller = controller(admin_store(), ManualClock::default());
    controller.start();
    let (requests, _) = pending_requests(&mut controller);

    assert_eq!(requests.len(), 5);
    for effect in &requests {
        if let Effect::Request { bearer, .. } = effect {
            assert_eq!(bearer.as_deref(), Some("admin-token"));
        }
    }
}

#[test]
fn test_dashboard_stats_and_winner_selection() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(admin_store(), &mut server);

    let stats = controller.dashboard_stats();
    assert_eq!(stats.total_orders, "0");
    assert_eq!(stats.total_revenue, "£0.00");
    assert_eq!(stats.selected_restaurant, "Pending");

    controller.dispatch(Command::SelectWinner(2));
    assert!(controller.admin_vote_rows().iter().any(|r| r.id == 2 && r.busy));
    settle(&mut controller, &mut server);

    assert_eq!(controller.notice().unwrap().text, "Restaurant Curry House selected!");
    assert_eq!(controller.dashboard_stats().selected_restaurant, "Curry House");
    let curry = controller.admin_vote_rows().into_iter().find(|r| r.id == 2).unwrap();
    assert!(curry.selected);
    assert_eq!(curry.select, None);
}

#[test]
fn test_failed_winner_selection_reenables_row() {
    let mut server = FakeServer::default();
    server.fail("select_winner");
    let (mut controller, _, _) = started(admin_store(), &mut server);

    controller.dispatch(Command::SelectWinner(1));
    settle(&mut controller, &mut server);
    assert_eq!(controller.notice().unwrap().text, "Failed to select restaurant");
    assert!(controller.admin_vote_rows().iter().all(|r| !r.busy));
}

#[test]
fn test_switching_tabs_keeps_loaded_data() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(admin_store(), &mut server);
    assert!(controller.dashboard().vote_results.is_some());

    controller.dispatch(Command::SwitchTab(AdminTab::Restaurants));
    settle(&mut controller, &mut server);
    assert_eq!(controller.dashboard().tab, AdminTab::Restaurants);
    assert_eq!(controller.restaurant_admin_cards().len(), 2);
    assert!(controller.dashboard().vote_results.is_some());
}

#[test]
fn test_destructive_ops_wait_for_confirmation() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(admin_store(), &mut server);

    controller.dispatch(Command::ResetVotes);
    assert!(controller.confirmation().unwrap().prompt.contains("reset voting"));
    controller.dispatch(Command::CancelConfirmation);
    settle(&mut controller, &mut server);
    assert_eq!(controller.confirmation(), None);
    assert_eq!(server.received("reset_votes"), 0);

    controller.dispatch(Command::DeleteRestaurant(1));
    controller.dispatch(Command::Confirm);
    settle(&mut controller, &mut server);
    assert_eq!(server.received("delete_restaurant"), 1);
    assert_eq!(controller.notice().unwrap().text, "Restaurant deleted successfully!");
    assert_eq!(server.restaurants.len(), 1);
}

#[test]
fn test_new_voting_round_uses_default_minutes() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(admin_store(), &mut server);

    controller.dispatch(Command::StartVotingRound { minutes: "0".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(server.voting_ends, noon() + Duration::minutes(10));
    assert_eq!(controller.notice().unwrap().text, "New voting session created for 10 minutes!");

    controller.dispatch(Command::DismissNotice);
    controller.dispatch(Command::StartVotingRound { minutes: " 25 ".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(server.voting_ends, noon() + Duration::minutes(25));
    assert_eq!(controller.notice().unwrap().text, "New voting session created for 25 minutes!");
}

#[test]
fn test_new_round_ignores_repeat_while_in_flight() {
    let mut server = FakeServer::default();
    let (mut controller, clock, _) = started(admin_store(), &mut server);

    controller.dispatch(Command::StartVotingRound { minutes: "5".to_string() });
    clock.advance(Duration::milliseconds(150));
    controller.dispatch(Command::StartVotingRound { minutes: "30".to_string() });
    let (requests, _) = pending_requests(&mut controller);
    let starts = requests
        .iter()
        .filter(|e| matches!(e, Effect::Request { request: Request::StartVotingRound { .. }, .. }))
        .count();
    assert_eq!(starts, 1);

    answer(&mut controller, &mut server, requests);
    settle(&mut controller, &mut server);
    assert_eq!(server.voting_ends, noon() + Duration::minutes(5));
    assert_eq!(controller.notice().unwrap().text, "New voting session created for 5 minutes!");

    // Once answered, the next round can start
    controller.dispatch(Command::StartVotingRound { minutes: "30".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(server.received("start_voting_round"), 2);
}

#[test]
fn test_payment_is_validated_before_sending() {
    let mut server = FakeServer::default();
    server.orders.push(alice_order(2));
    let (mut controller, _, _) = started(admin_store(), &mut server);
    assert_eq!(controller.dashboard_stats().total_revenue, "£15.00");

    controller.dispatch(Command::RecordPayment { order_id: 9, paid: "10".to_string() });
    assert_eq!(
        controller.notice().unwrap().text,
        "Paid amount must be a number and greater than or equal to the total cost."
    );
    controller.dispatch(Command::DismissNotice);

    controller.dispatch(Command::RecordPayment { order_id: 9, paid: "20".to_string() });
    settle(&mut controller, &mut server);
    assert_eq!(server.received("record_payment"), 1);
    assert_eq!(server.orders[0].paid_amount, Some(20.0));
    assert_eq!(controller.notice().unwrap().text, "Paid amount saved.");

    let row = &controller.aggregated_order_cards()[0].orders[0];
    assert_eq!(row.paid, "20.00");
    assert_eq!(row.change, "£5.00");
}

#[test]
fn test_failed_payment_and_order_reload_change_revision() {
    let mut server = FakeServer::default();
    server.orders.push(alice_order(2));
    server.fail("record_payment");
    let (mut controller, _, _) = started(admin_store(), &mut server);
    let loaded = controller.orders_revision();
    assert!(loaded > 0);

    controller.dispatch(Command::RecordPayment { order_id: 9, paid: "20".to_string() });
    assert_eq!(controller.orders_revision(), loaded);
    settle(&mut controller, &mut server);
    assert_eq!(controller.notice().unwrap().text, "Failed to save paid amount");
    assert!(controller.orders_revision() > loaded);
    assert_eq!(controller.aggregated_order_cards()[0].orders[0].change, "");

    let failed = controller.orders_revision();
    controller.dispatch(Command::SwitchTab(AdminTab::Orders));
    settle(&mut controller, &mut server);
    assert!(controller.orders_revision() > failed);
}

#[test]
fn test_menu_item_form_stays_open_until_saved() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(admin_store(), &mut server);

    controller.dispatch(Command::OpenMenuItemForm(crate::views::MenuItemForm::add(2)));
    if let Some(form) = controller.menu_form_mut() {
        form.name = "Samosa".to_string();
        form.description = "Crispy".to_string();
        form.price = "cheap".to_string();
    }
    controller.dispatch(Command::SaveMenuItem);
    assert!(controller.menu_form().is_some());
    assert_eq!(controller.notice().unwrap().text, "Please fill in all fields with valid values");
    controller.dispatch(Command::DismissNotice);

    if let Some(form) = controller.menu_form_mut() {
        form.price = "3.5".to_string();
    }
    controller.dispatch(Command::SaveMenuItem);
    settle(&mut controller, &mut server);
    assert_eq!(controller.menu_form(), None);
    assert_eq!(controller.notice().unwrap().text, "Menu item added successfully!");
    assert_eq!(server.received("list_restaurants"), 1);
}

#[test]
fn test_admin_commands_ignored_outside_dashboard() {
    let mut server = FakeServer::default();
    let (mut controller, _, _) = started(MemoryStore::new(), &mut server);

    controller.dispatch(Command::ResetVotes);
    controller.dispatch(Command::SelectWinner(1));
    assert_eq!(controller.confirmation(), None);
    assert!(controller.take_effects().is_empty());
}

#[test]
fn test_logout_clears_everything() {
    let mut server = FakeServer::default();
    let mut store = store_with(alice(true, Some(2)), Some(alice_order(2)));
    store.set(crate::cache::ADMIN_TOKEN_KEY, "admin-token");
    let (mut controller, _, _) = started(store, &mut server);

    controller.dispatch(Command::AdminLogout);
    settle(&mut controller, &mut server);
    assert_eq!(controller.page(), Some(Page::Landing));
    assert!(!controller.is_admin());
    assert!(controller.cache().store().is_empty());
}
