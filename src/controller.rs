//! Booking list state machine.
//!
//! Holds the fetched booking set and the active bucket, and drives load,
//! refresh and cancel against a [`BookingStore`]. Every fetch is tagged with
//! a monotonically increasing token; only the response of the most recently
//! issued fetch is applied, whatever order responses arrive in.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::api::BookingStore;
use crate::booking::Booking;
use crate::classifier::{
    available_actions, bucket_of, cancellation_window, display_status, is_cancellable_within,
    nights_between, BookingAction, Bucket, DisplayStatus,
};
use crate::error::{CancellationRejected, ControllerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "booking_id", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    Refreshing,
    Cancelling(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A later fetch was issued before this one completed; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Load,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Idle,
    Loaded,
    LoadFailed,
}

/// Where the presentation layer should go next. The controller never
/// navigates itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum NavigationIntent {
    BookingDetails { booking_id: u64 },
    CancelBooking { booking_id: u64 },
    WriteReview { booking_id: u64, property_id: u64 },
    MessageHost { booking_id: u64, host_id: u64 },
}

/// One row of the list, with everything derived for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingCard {
    pub booking: Booking,
    pub status: DisplayStatus,
    pub bucket: Bucket,
    pub cancellable: bool,
    pub nights: i64,
    pub actions: Vec<BookingAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingsSnapshot {
    pub bucket: Bucket,
    pub bookings: Vec<BookingCard>,
    pub phase: Phase,
    pub loading: bool,
    pub refreshing: bool,
    pub cancelling: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub upcoming: usize,
    pub past: usize,
    pub cancelled: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Upcoming => self.upcoming,
            Bucket::Past => self.past,
            Bucket::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug)]
struct State {
    bookings: Vec<Booking>,
    active_bucket: Bucket,
    settled: Settled,
    latest_token: u64,
    loading_token: Option<u64>,
    refreshing_token: Option<u64>,
    cancelling: Option<u64>,
    last_error: Option<String>,
    torn_down: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            active_bucket: Bucket::Upcoming,
            settled: Settled::Idle,
            latest_token: 0,
            loading_token: None,
            refreshing_token: None,
            cancelling: None,
            last_error: None,
            torn_down: false,
        }
    }
}

impl State {
    fn phase(&self) -> Phase {
        if let Some(id) = self.cancelling {
            return Phase::Cancelling(id);
        }
        if self.loading_token.is_some() {
            return Phase::Loading;
        }
        if self.refreshing_token.is_some() {
            return Phase::Refreshing;
        }
        match self.settled {
            Settled::Idle => Phase::Idle,
            Settled::Loaded => Phase::Loaded,
            Settled::LoadFailed => Phase::LoadFailed,
        }
    }

    fn indicator(&mut self, kind: FetchKind) -> &mut Option<u64> {
        match kind {
            FetchKind::Load => &mut self.loading_token,
            FetchKind::Refresh => &mut self.refreshing_token,
        }
    }

    /// Drop every indicator owned by `token` or an older fetch.
    fn settle_indicators(&mut self, token: u64) {
        for slot in [&mut self.loading_token, &mut self.refreshing_token] {
            if slot.is_some_and(|owner| owner <= token) {
                *slot = None;
            }
        }
    }
}

pub struct BookingListController<S> {
    store: Arc<S>,
    cancellation_window: Duration,
    state: Arc<Mutex<State>>,
}

impl<S> Clone for BookingListController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cancellation_window: self.cancellation_window,
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: BookingStore> BookingListController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            cancellation_window: cancellation_window(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_cancellation_window(mut self, window: Duration) -> Self {
        self.cancellation_window = window;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// First load, shown with the `loading` indicator.
    pub async fn load(&self) -> Result<LoadOutcome, ControllerError> {
        self.fetch(FetchKind::Load).await
    }

    /// User-pulled reload, shown with the `refreshing` indicator.
    pub async fn refresh(&self) -> Result<LoadOutcome, ControllerError> {
        self.fetch(FetchKind::Refresh).await
    }

    async fn fetch(&self, kind: FetchKind) -> Result<LoadOutcome, ControllerError> {
        let token = {
            let mut state = self.state();
            if state.torn_down {
                debug!("Ignoring {:?} on a torn down controller", kind);
                return Ok(LoadOutcome::Superseded);
            }
            state.latest_token += 1;
            let token = state.latest_token;
            *state.indicator(kind) = Some(token);
            token
        };

        debug!("Issuing {:?} #{}", kind, token);
        let result = self.store.get_bookings().await;

        let mut state = self.state();
        if *state.indicator(kind) == Some(token) {
            *state.indicator(kind) = None;
        }

        if state.torn_down || token != state.latest_token {
            debug!(
                "Discarding {:?} #{} (latest issued is #{})",
                kind, token, state.latest_token
            );
            return Ok(LoadOutcome::Superseded);
        }

        state.settle_indicators(token);

        match result {
            Ok(bookings) => {
                info!("Loaded {} bookings (#{})", bookings.len(), token);
                state.bookings = bookings;
                state.settled = Settled::Loaded;
                state.last_error = None;
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                warn!("Failed to load bookings (#{}): {}", token, e);
                state.settled = Settled::LoadFailed;
                state.last_error = Some(e.to_string());
                Err(ControllerError::LoadFailure(e))
            }
        }
    }

    pub fn select_bucket(&self, bucket: Bucket) {
        debug!("Selecting bucket {:?}", bucket);
        self.state().active_bucket = bucket;
    }

    pub fn active_bucket(&self) -> Bucket {
        self.state().active_bucket
    }

    /// Cancel a booking after re-checking eligibility against current state.
    /// Only one cancellation may be in flight at a time.
    ///
    /// On success the list is reloaded from the store. A failed reload is
    /// recorded as the controller's error but does not fail the cancel.
    pub async fn cancel(
        &self,
        booking_id: u64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ControllerError> {
        {
            let mut state = self.state();
            if let Some(pending) = state.cancelling {
                warn!(
                    "Refusing to cancel booking {}: booking {} is still being cancelled",
                    booking_id, pending
                );
                return Err(CancellationRejected::InFlight(pending).into());
            }

            let booking = state
                .bookings
                .iter()
                .find(|b| b.id == booking_id)
                .ok_or(CancellationRejected::UnknownBooking(booking_id))?;

            if !is_cancellable_within(booking, now, self.cancellation_window) {
                warn!(
                    "Refusing to cancel booking {}: outside cancellation window",
                    booking_id
                );
                return Err(CancellationRejected::PolicyViolation {
                    booking_id,
                    check_in: booking.check_in,
                }
                .into());
            }

            state.cancelling = Some(booking_id);
        }

        info!("Cancelling booking {}...", booking_id);
        let result = self.store.cancel_booking(booking_id, reason).await;

        {
            let mut state = self.state();
            if state.cancelling == Some(booking_id) {
                state.cancelling = None;
            }
        }

        if let Err(e) = result {
            warn!("Store rejected cancellation of booking {}: {}", booking_id, e);
            return Err(CancellationRejected::StoreRejected(e).into());
        }

        info!("Cancelled booking {}", booking_id);
        if let Err(e) = self.load().await {
            warn!("Booking {} cancelled but reload failed: {}", booking_id, e);
        }

        Ok(())
    }

    /// Bookings in the active bucket, in server order.
    pub fn filtered_view(&self, now: DateTime<Utc>) -> Vec<Booking> {
        let state = self.state();
        state
            .bookings
            .iter()
            .filter(|b| bucket_of(b, now) == state.active_bucket)
            .cloned()
            .collect()
    }

    pub fn bucket_counts(&self, now: DateTime<Utc>) -> BucketCounts {
        let state = self.state();
        let mut counts = BucketCounts::default();
        for booking in &state.bookings {
            match bucket_of(booking, now) {
                Bucket::Upcoming => counts.upcoming += 1,
                Bucket::Past => counts.past += 1,
                Bucket::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> BookingsSnapshot {
        let state = self.state();
        let window = self.cancellation_window;

        let bookings = state
            .bookings
            .iter()
            .filter_map(|b| {
                let bucket = bucket_of(b, now);
                (bucket == state.active_bucket).then(|| BookingCard {
                    status: display_status(&b.status),
                    bucket,
                    cancellable: is_cancellable_within(b, now, window),
                    nights: nights_between(b.check_in, b.check_out),
                    actions: available_actions(b, now, window),
                    booking: b.clone(),
                })
            })
            .collect();

        BookingsSnapshot {
            bucket: state.active_bucket,
            bookings,
            phase: state.phase(),
            loading: state.loading_token.is_some(),
            refreshing: state.refreshing_token.is_some(),
            cancelling: state.cancelling,
            error: state.last_error.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state().phase()
    }

    pub fn find(&self, booking_id: u64) -> Option<Booking> {
        self.state()
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
    }

    pub fn intent_for(&self, booking_id: u64, action: BookingAction) -> Option<NavigationIntent> {
        let booking = self.find(booking_id)?;
        let intent = match action {
            BookingAction::ViewDetails => NavigationIntent::BookingDetails { booking_id },
            BookingAction::Cancel => NavigationIntent::CancelBooking { booking_id },
            BookingAction::LeaveReview => NavigationIntent::WriteReview {
                booking_id,
                property_id: booking.property.id,
            },
            BookingAction::MessageHost => NavigationIntent::MessageHost {
                booking_id,
                host_id: booking.property.host.id,
            },
        };
        Some(intent)
    }

    pub fn open_details(&self, booking_id: u64) -> Option<NavigationIntent> {
        self.intent_for(booking_id, BookingAction::ViewDetails)
    }

    /// Detach from the view. In-flight fetches complete without touching state.
    pub fn teardown(&self) {
        let mut state = self.state();
        state.torn_down = true;
        state.latest_token += 1;
        state.loading_token = None;
        state.refreshing_token = None;
        state.cancelling = None;
        debug!("Controller torn down");
    }
}
