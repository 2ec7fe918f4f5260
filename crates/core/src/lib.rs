//! Core of the OrderCo client
//!
//! This crate contains:
//! - Data models shared with the OrderCo service and the local cache
//! - The navigation/state controller and its message types
//! - The remote client and local cache seams the browser shell plugs into
//! - View renderers that turn server data into display rows

pub mod cache;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod messages;
pub mod models;
pub mod order;
pub mod remote;
pub mod views;

#[cfg(test)]
mod testing;

pub use cache::{KeyValueStore, LocalCache, MemoryStore};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use controller::{Controller, Dashboard, OrderingState, VotingState};
pub use error::*;
pub use messages::*;
pub use models::*;
pub use remote::*;
