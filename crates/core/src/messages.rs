//! Messages between the browser shell and the controller
//!
//! The shell feeds user actions in as [`Command`]s and completed work as
//! [`Event`]s; the controller answers with [`Effect`]s for the shell to carry out.

use std::time::Duration;

use crate::error::RemoteError;
use crate::models::*;
use crate::remote::{Request, Response};
use crate::views::MenuItemForm;

/// Top-level screens. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Voting,
    AwaitingSelection,
    Ordering,
    OrderConfirmed,
    AdminLogin,
    AdminDashboard,
}

impl Page {
    pub fn is_admin(&self) -> bool {
        matches!(self, Page::AdminLogin | Page::AdminDashboard)
    }
}

/// Admin dashboard sub-views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Votes,
    Orders,
    Restaurants,
}

impl AdminTab {
    pub const ALL: [AdminTab; 3] = [AdminTab::Votes, AdminTab::Orders, AdminTab::Restaurants];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Votes => "Votes",
            AdminTab::Orders => "Orders",
            AdminTab::Restaurants => "Restaurants",
        }
    }
}

/// User actions
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { name: String },
    Vote(RestaurantId),
    SkipVoting,
    ShowVoteResults,
    HideVoteResults,
    SetQuantity { item_id: MenuItemId, raw: String },
    SubmitOrder,
    NewOrder,
    OpenAdminLogin,
    LeaveAdminLogin,
    AdminLogin { password: String },
    AdminLogout,
    SwitchTab(AdminTab),
    SelectWinner(RestaurantId),
    RecordPayment { order_id: OrderId, paid: String },
    CreateRestaurant { name: String, description: String },
    UpdateRestaurant { id: RestaurantId, name: String, description: String },
    DeleteRestaurant(RestaurantId),
    OpenMenuItemForm(MenuItemForm),
    CloseMenuItemForm,
    SaveMenuItem,
    DeleteMenuItem { restaurant_id: RestaurantId, item_id: MenuItemId },
    ResetVotes,
    DeleteAllVotes,
    StartVotingRound { minutes: String },
    Confirm,
    CancelConfirmation,
    DismissNotice,
}

/// Identifies an issued request and the navigation epoch it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub epoch: u64,
}

/// Things that happened outside the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Completed {
        ticket: Ticket,
        request: Request,
        outcome: Result<Response, RemoteError>,
    },
    CountdownTick { generation: u64 },
    PollDue { generation: u64 },
}

/// Work the shell must perform on the controller's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request {
        ticket: Ticket,
        request: Request,
        bearer: Option<String>,
    },
    /// Replace any running countdown with a new repeating tick
    StartCountdown { generation: u64, every: Duration },
    StopCountdown,
    SchedulePoll { generation: u64, after: Duration },
    CancelPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Blocking message shown to the user until dismissed
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// A destructive admin action waiting for an explicit yes
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub prompt: String,
    pub request: Request,
}
