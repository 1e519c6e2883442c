use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::booking::Booking;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// The backend that owns booking records.
pub trait BookingStore: Send + Sync {
    fn get_bookings(&self) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    fn cancel_booking(
        &self,
        booking_id: u64,
        reason: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone)]
pub struct BookingStoreClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookingsResponse {
    bookings: Vec<Booking>,
}

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    reason: &'a str,
}

impl BookingStoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-QA,en;q=0.8,ar;q=0.5"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn auth_failure(status: StatusCode) -> Option<StoreError> {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        .then(|| StoreError::Auth(format!("Store responded with {}", status)))
}

impl BookingStore for BookingStoreClient {
    async fn get_bookings(&self) -> Result<Vec<Booking>> {
        let url = format!("{}/bookings/my-bookings", self.base_url);
        debug!("Fetching bookings from {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if let Some(err) = auth_failure(status) {
            return Err(err);
        }
        if !status.is_success() {
            return Err(StoreError::Api(format!("Failed to get bookings: {}", status)));
        }

        let body: BookingsResponse = response.json().await?;
        debug!("Store returned {} bookings", body.bookings.len());

        Ok(body.bookings)
    }

    async fn cancel_booking(&self, booking_id: u64, reason: &str) -> Result<()> {
        let url = format!("{}/bookings/{}/cancel", self.base_url, booking_id);
        debug!("Cancelling booking {} via {}", booking_id, url);

        let response = self
            .authorized(self.client.post(&url))
            .json(&CancelRequest { reason })
            .send()
            .await?;

        let status = response.status();
        if let Some(err) = auth_failure(status) {
            return Err(err);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
