//! Request/response contract with the OrderCo service
//!
//! Every operation the client performs is a [`Request`]. A request knows its
//! HTTP endpoint and how to decode the body it gets back, so the transport stays
//! a dumb pipe. [`RemoteClient::call`] never panics: any failure comes back as a
//! [`RemoteError`], which callers treat as "the operation did not happen".

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::RemoteError;
use crate::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Operations consumed from the OrderCo service
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    RegisterApplicant { name: String },
    ListRestaurants,
    GetRestaurant(RestaurantId),
    VotingStatus,
    SubmitVote { applicant_id: ApplicantId, restaurant_id: RestaurantId },
    VoteResults,
    SelectedRestaurant,
    SelectedWinner,
    SelectWinner(RestaurantId),
    SubmitOrder {
        applicant_id: ApplicantId,
        restaurant_id: RestaurantId,
        items: Vec<OrderLine>,
    },
    AdminLogin { password: String },
    ListOrders,
    Revenue,
    AggregatedOrders,
    RecordPayment { order_id: OrderId, paid_amount: f64 },
    CreateRestaurant(RestaurantDraft),
    UpdateRestaurant { id: RestaurantId, draft: RestaurantDraft },
    DeleteRestaurant(RestaurantId),
    AddMenuItem { restaurant_id: RestaurantId, draft: MenuItemDraft },
    UpdateMenuItem {
        restaurant_id: RestaurantId,
        item_id: MenuItemId,
        draft: MenuItemDraft,
    },
    DeleteMenuItem { restaurant_id: RestaurantId, item_id: MenuItemId },
    ResetVotes,
    DeleteAllVotes,
    StartVotingRound { end_time: DateTime<Utc> },
}

/// Decoded result of a successful request
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Registered { id: ApplicantId },
    Restaurants(Vec<Restaurant>),
    Restaurant(Restaurant),
    VotingStatus(VotingStatus),
    VoteResults(Vec<Restaurant>),
    /// `None` means the server has not picked a restaurant yet
    Selection(Option<RestaurantId>),
    Winner(Option<Restaurant>),
    OrderPlaced(SubmittedOrder),
    AdminToken(String),
    Orders(Vec<SubmittedOrder>),
    Revenue(RevenueSummary),
    AggregatedOrders(Vec<AggregatedOrder>),
    Acknowledged,
}

/// Transport-level request, ready to hand to a fetch implementation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Deserialize)]
struct RegisteredBody {
    id: ApplicantId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionBody {
    #[serde(default)]
    restaurant_id: Option<RestaurantId>,
}

#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

impl Request {
    /// Short operation name for logs; never includes payloads
    pub fn name(&self) -> &'static str {
        match self {
            Request::RegisterApplicant { .. } => "register_applicant",
            Request::ListRestaurants => "list_restaurants",
            Request::GetRestaurant(_) => "get_restaurant",
            Request::VotingStatus => "voting_status",
            Request::SubmitVote { .. } => "submit_vote",
            Request::VoteResults => "vote_results",
            Request::SelectedRestaurant => "selected_restaurant",
            Request::SelectedWinner => "selected_winner",
            Request::SelectWinner(_) => "select_winner",
            Request::SubmitOrder { .. } => "submit_order",
            Request::AdminLogin { .. } => "admin_login",
            Request::ListOrders => "list_orders",
            Request::Revenue => "revenue",
            Request::AggregatedOrders => "aggregated_orders",
            Request::RecordPayment { .. } => "record_payment",
            Request::CreateRestaurant(_) => "create_restaurant",
            Request::UpdateRestaurant { .. } => "update_restaurant",
            Request::DeleteRestaurant(_) => "delete_restaurant",
            Request::AddMenuItem { .. } => "add_menu_item",
            Request::UpdateMenuItem { .. } => "update_menu_item",
            Request::DeleteMenuItem { .. } => "delete_menu_item",
            Request::ResetVotes => "reset_votes",
            Request::DeleteAllVotes => "delete_all_votes",
            Request::StartVotingRound { .. } => "start_voting_round",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Request::ListRestaurants
            | Request::GetRestaurant(_)
            | Request::VotingStatus
            | Request::VoteResults
            | Request::SelectedRestaurant
            | Request::SelectedWinner
            | Request::ListOrders
            | Request::Revenue
            | Request::AggregatedOrders => Method::Get,
            Request::UpdateRestaurant { .. } | Request::UpdateMenuItem { .. } => Method::Put,
            Request::DeleteRestaurant(_)
            | Request::DeleteMenuItem { .. }
            | Request::DeleteAllVotes => Method::Delete,
            _ => Method::Post,
        }
    }

    /// Anything that changes server state
    pub fn is_mutation(&self) -> bool {
        self.method() != Method::Get
    }

    pub fn path(&self) -> String {
        match self {
            Request::RegisterApplicant { .. } => "/applicant/register".to_string(),
            Request::ListRestaurants => "/restaurant/all".to_string(),
            Request::GetRestaurant(id) => format!("/restaurant/{}", id),
            Request::VotingStatus => "/vote/status".to_string(),
            Request::SubmitVote { .. } => "/vote/submit".to_string(),
            Request::VoteResults => "/vote/results".to_string(),
            Request::SelectedRestaurant => "/admin/selected-restaurant".to_string(),
            Request::SelectedWinner => "/restaurant/selected-winner".to_string(),
            Request::SelectWinner(id) => format!("/restaurant/select-winner/{}", id),
            Request::SubmitOrder { .. } => "/order/submit".to_string(),
            Request::AdminLogin { .. } => "/admin/login".to_string(),
            Request::ListOrders => "/order/all".to_string(),
            Request::Revenue => "/order/revenue".to_string(),
            Request::AggregatedOrders => "/admin/orders/aggregated".to_string(),
            Request::RecordPayment { order_id, .. } => format!("/order/{}/paid", order_id),
            Request::CreateRestaurant(_) => "/admin/restaurant/create".to_string(),
            Request::UpdateRestaurant { id, .. } => format!("/admin/restaurant/update/{}", id),
            Request::DeleteRestaurant(id) => format!("/admin/restaurant/delete/{}", id),
            Request::AddMenuItem { restaurant_id, .. } => {
                format!("/admin/restaurant/add-menu-item/{}", restaurant_id)
            }
            Request::UpdateMenuItem { restaurant_id, item_id, .. } => {
                format!("/admin/restaurant/update-menu-item/{}/{}", restaurant_id, item_id)
            }
            Request::DeleteMenuItem { restaurant_id, item_id } => {
                format!("/admin/restaurant/delete-menu-item/{}/{}", restaurant_id, item_id)
            }
            Request::ResetVotes => "/Vote/reset".to_string(),
            Request::DeleteAllVotes => "/admin/votes/delete-all".to_string(),
            Request::StartVotingRound { .. } => "/admin/voting/reset".to_string(),
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            Request::RegisterApplicant { name } => Some(json!({ "name": name })),
            Request::SubmitVote { applicant_id, restaurant_id } => Some(json!({
                "applicantId": applicant_id,
                "restaurantId": restaurant_id,
            })),
            Request::SubmitOrder { applicant_id, restaurant_id, items } => Some(json!({
                "applicantId": applicant_id,
                "restaurantId": restaurant_id,
                "items": items,
            })),
            Request::AdminLogin { password } => Some(json!({ "password": password })),
            Request::RecordPayment { paid_amount, .. } => {
                Some(json!({ "paidAmount": paid_amount }))
            }
            Request::CreateRestaurant(draft) | Request::UpdateRestaurant { draft, .. } => {
                Some(json!(draft))
            }
            Request::AddMenuItem { draft, .. } | Request::UpdateMenuItem { draft, .. } => {
                Some(json!(draft))
            }
            Request::StartVotingRound { end_time } => Some(json!({
                "votingEndTime": end_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
            _ => None,
        }
    }

    pub fn to_http(&self, base_url: &str, bearer: Option<&str>) -> HttpRequest {
        HttpRequest {
            method: self.method(),
            url: format!("{}{}", base_url.trim_end_matches('/'), self.path()),
            body: self.body().map(|b| b.to_string()),
            bearer: bearer.map(str::to_string),
        }
    }

    /// Decode a 2xx body into the response this request expects
    pub fn decode(&self, body: &str) -> Result<Response, RemoteError> {
        match self {
            Request::RegisterApplicant { .. } => {
                parse::<RegisteredBody>(body).map(|b| Response::Registered { id: b.id })
            }
            Request::ListRestaurants => parse(body).map(Response::Restaurants),
            Request::GetRestaurant(_) => parse(body).map(Response::Restaurant),
            Request::VotingStatus => parse(body).map(Response::VotingStatus),
            Request::VoteResults => parse(body).map(Response::VoteResults),
            Request::SelectedRestaurant => {
                parse::<Option<SelectionBody>>(body)
                    .map(|b| Response::Selection(b.and_then(|s| s.restaurant_id)))
            }
            Request::SelectedWinner | Request::SelectWinner(_) => {
                // A winner without a usable restaurant shape counts as "none yet"
                let value = parse::<Option<Value>>(body)?;
                Ok(Response::Winner(
                    value.and_then(|v| serde_json::from_value::<Restaurant>(v).ok()),
                ))
            }
            Request::SubmitOrder { .. } => parse(body).map(Response::OrderPlaced),
            Request::AdminLogin { .. } => match parse::<TokenBody>(body)?.token {
                Some(token) if !token.is_empty() => Ok(Response::AdminToken(token)),
                _ => Err(RemoteError::Decode("missing token".to_string())),
            },
            Request::ListOrders => parse(body).map(Response::Orders),
            Request::Revenue => parse(body).map(Response::Revenue),
            Request::AggregatedOrders => parse(body).map(Response::AggregatedOrders),
            _ => {
                if !body.trim().is_empty() {
                    parse::<Value>(body)?;
                }
                Ok(Response::Acknowledged)
            }
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))
}

// ============================================================================
// Async client
// ============================================================================

#[cfg(feature = "async")]
pub use client::*;

#[cfg(feature = "async")]
mod client {
    use super::*;
    use async_trait::async_trait;

    /// Performs one HTTP exchange. Implementations report transport problems as
    /// `RemoteError::Network` / `RemoteError::Timeout`; status codes are left to
    /// the client.
    #[async_trait(?Send)]
    pub trait Transport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RemoteError>;
    }

    pub struct RemoteClient<T> {
        base_url: String,
        transport: T,
    }

    impl<T: Transport> RemoteClient<T> {
        pub fn new(base_url: impl Into<String>, transport: T) -> Self {
            Self {
                base_url: base_url.into(),
                transport,
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn transport(&self) -> &T {
            &self.transport
        }

        pub async fn call(
            &self,
            request: &Request,
            bearer: Option<&str>,
        ) -> Result<Response, RemoteError> {
            let http = request.to_http(&self.base_url, bearer);
            tracing::debug!("{} {} ({})", http.method.as_str(), http.url, request.name());

            let result = match self.transport.send(http).await {
                Ok(response) if response.ok() => request.decode(&response.body),
                Ok(response) => Err(RemoteError::Status(response.status)),
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                tracing::warn!("API error on {}: {}", request.name(), e);
            }
            result
        }
    }
}
