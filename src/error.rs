use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while talking to the booking store or reading config.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Why a cancel request was refused. Local state is never touched.
#[derive(Error, Debug)]
pub enum CancellationRejected {
    #[error("booking {booking_id} can no longer be cancelled (check-in {check_in})")]
    PolicyViolation {
        booking_id: u64,
        check_in: DateTime<Utc>,
    },

    #[error("store refused the cancellation: {0}")]
    StoreRejected(StoreError),

    #[error("booking {0} is not in the current list")]
    UnknownBooking(u64),

    #[error("a cancellation for booking {0} is already in progress")]
    InFlight(u64),
}

impl CancellationRejected {
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Failed to load bookings: {0}")]
    LoadFailure(StoreError),

    #[error("Cancellation rejected: {0}")]
    CancellationRejected(#[from] CancellationRejected),
}
