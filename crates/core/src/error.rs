//! Error types for OrderCo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderCoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, OrderCoError>;

impl From<toml::de::Error> for OrderCoError {
    fn from(e: toml::de::Error) -> Self {
        OrderCoError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for OrderCoError {
    fn from(e: serde_json::Error) -> Self {
        OrderCoError::InvalidData(e.to_string())
    }
}

/// A remote call that did not happen. Distinct from a legitimate empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,
}

/// Input rejected before any request is sent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please select at least one item")]
    EmptyOrder,

    #[error("Paid amount must be a number and greater than or equal to the total cost.")]
    InvalidPayment,

    #[error("Please fill in all fields")]
    IncompleteRestaurant,

    #[error("Please fill in all fields with valid values")]
    InvalidMenuItem,
}
